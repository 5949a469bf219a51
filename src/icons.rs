//! Icon shape families.
//!
//! The `type` string of an element selects a shape family from a closed set.
//! Unrecognized values fall back to [`IconKind::Unknown`], which renders the
//! banana-with-tape placeholder. Documents may also declare their own icons
//! under the top-level `icons` key; those names resolve through a secondary
//! registry and their SVG bodies pass through the pipeline untouched.

use indexmap::IndexMap;
use serde::Serialize;

/// Built-in shape families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IconKind {
    Server,
    Cloud,
    Database,
    Building,
    Firewall,
    Router,
    Laptop,
    Computer,
    Document,
    User,
    #[default]
    Unknown,
}

impl IconKind {
    /// Map a `type` string to a shape family. Anything unrecognized gets the
    /// fallback shape.
    pub fn from_type(s: &str) -> Self {
        match s {
            "server" => IconKind::Server,
            "cloud" => IconKind::Cloud,
            "database" => IconKind::Database,
            "building" => IconKind::Building,
            "firewall" => IconKind::Firewall,
            "router" => IconKind::Router,
            "laptop" => IconKind::Laptop,
            "computer" => IconKind::Computer,
            "document" => IconKind::Document,
            "user" => IconKind::User,
            _ => IconKind::Unknown,
        }
    }

    /// Cloud nodes attach edges on an ellipse instead of a rectangle.
    pub fn is_ellipse(&self) -> bool {
        matches!(self, IconKind::Cloud)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IconKind::Server => "server",
            IconKind::Cloud => "cloud",
            IconKind::Database => "database",
            IconKind::Building => "building",
            IconKind::Firewall => "firewall",
            IconKind::Router => "router",
            IconKind::Laptop => "laptop",
            IconKind::Computer => "computer",
            IconKind::Document => "document",
            IconKind::User => "user",
            IconKind::Unknown => "unknown",
        }
    }
}

/// A resolved shape reference: either a built-in family or a user-declared
/// icon from the document's `icons` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Shape {
    Builtin(IconKind),
    Custom(String),
}

impl Shape {
    pub fn is_ellipse(&self) -> bool {
        matches!(self, Shape::Builtin(kind) if kind.is_ellipse())
    }
}

/// Registry of user-declared icons, keyed by name in declaration order.
/// Values are opaque SVG fragments passed through to the renderer.
#[derive(Debug, Clone, Default)]
pub struct IconRegistry {
    custom: IndexMap<String, String>,
}

impl IconRegistry {
    pub fn new(custom: IndexMap<String, String>) -> Self {
        Self { custom }
    }

    /// Resolve a `type` string. Declared icon names win over the built-in
    /// set so a document can shadow a family with its own artwork.
    pub fn resolve(&self, type_name: &str) -> Shape {
        if self.custom.contains_key(type_name) {
            Shape::Custom(type_name.to_string())
        } else {
            Shape::Builtin(IconKind::from_type(type_name))
        }
    }

    /// The raw SVG fragment for a declared icon name.
    pub fn svg_body(&self, name: &str) -> Option<&str> {
        self.custom.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.custom.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_types_resolve() {
        assert_eq!(IconKind::from_type("server"), IconKind::Server);
        assert_eq!(IconKind::from_type("database"), IconKind::Database);
        assert_eq!(IconKind::from_type("user"), IconKind::User);
    }

    #[test]
    fn test_unknown_type_falls_back() {
        assert_eq!(IconKind::from_type("zeppelin"), IconKind::Unknown);
        assert_eq!(IconKind::from_type(""), IconKind::Unknown);
    }

    #[test]
    fn test_only_cloud_is_ellipse() {
        assert!(IconKind::Cloud.is_ellipse());
        assert!(!IconKind::Server.is_ellipse());
        assert!(!IconKind::Unknown.is_ellipse());
    }

    #[test]
    fn test_registry_resolves_custom_before_builtin() {
        let mut icons = IndexMap::new();
        icons.insert("server".to_string(), "<rect/>".to_string());
        let registry = IconRegistry::new(icons);

        assert_eq!(
            registry.resolve("server"),
            Shape::Custom("server".to_string())
        );
        assert_eq!(
            registry.resolve("cloud"),
            Shape::Builtin(IconKind::Cloud)
        );
        assert_eq!(registry.svg_body("server"), Some("<rect/>"));
    }
}
