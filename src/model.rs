use serde::{Deserialize, Deserializer, Serialize};

use crate::geometry::Point;

/// Containment scope of a child reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Full,
    Border,
}

/// A child reference inside a container's `contains` list.
///
/// Accepts both the object form `{"id": "...", "scope": "border"}` and the
/// bare string shorthand `"..."` (scope defaults to `full`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChildRef {
    pub id: String,
    #[serde(default)]
    pub scope: Scope,
}

impl<'de> Deserialize<'de> for ChildRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Bare(String),
            Full {
                id: String,
                #[serde(default)]
                scope: Scope,
            },
        }
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Bare(id) => ChildRef {
                id,
                scope: Scope::Full,
            },
            Repr::Full { id, scope } => ChildRef { id, scope },
        })
    }
}

/// Label rendering priority; high-priority labels paint last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LabelPriority {
    Low,
    #[default]
    Normal,
    High,
}

/// Requested label placement relative to the icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LabelPosition {
    Top,
    Bottom,
    Left,
    Right,
    #[default]
    Auto,
}

/// A node in the input document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    /// Shape family name; resolved through the icon registry.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Multi-line label text (lines separated by `\n`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// CSS colour name or `#RRGGBB`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Pixel coordinate hint; pins the node during auto-layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// Height multiplier; ignored for containers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<f64>,
    /// Width multiplier; ignored for containers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wp: Option<f64>,
    #[serde(default, skip_serializing_if = "is_default_priority")]
    pub label_priority: LabelPriority,
    #[serde(default, skip_serializing_if = "is_default_position")]
    pub label_position: LabelPosition,
    /// Children enclosed by this element; non-empty makes it a container.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contains: Vec<ChildRef>,
}

fn is_default_priority(p: &LabelPriority) -> bool {
    *p == LabelPriority::Normal
}

fn is_default_position(p: &LabelPosition) -> bool {
    *p == LabelPosition::Auto
}

impl Element {
    /// Minimal element with just an id, for tests and builders.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: None,
            label: None,
            color: None,
            x: None,
            y: None,
            hp: None,
            wp: None,
            label_priority: LabelPriority::Normal,
            label_position: LabelPosition::Auto,
            contains: Vec::new(),
        }
    }

    /// Explicit coordinate hint, when both axes are present.
    pub fn position_hint(&self) -> Option<Point> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some(Point::new(x, y)),
            _ => None,
        }
    }
}

/// Edge direction: which ends carry arrow markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
    Bidirectional,
    #[default]
    None,
}

/// Orthogonal route axis preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AxisPreference {
    Horizontal,
    Vertical,
    #[default]
    Auto,
}

/// Which side of a node an arc bulges from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArcSide {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
}

/// Per-edge routing specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RoutingSpec {
    Straight,
    Orthogonal {
        #[serde(default)]
        corner_radius: f64,
        #[serde(default)]
        preference: AxisPreference,
    },
    Bezier {
        #[serde(default = "default_curvature")]
        curvature: f64,
    },
    Arc {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        radius: Option<f64>,
        #[serde(default)]
        side: ArcSide,
    },
    Manual {
        waypoints: Vec<Point>,
    },
}

fn default_curvature() -> f64 {
    0.5
}

/// An edge in the input document.
///
/// Custom `Deserialize` promotes the legacy top-level `waypoints` array to a
/// `routing: {type: "manual", waypoints}` spec; an explicit `routing` object
/// wins when both are present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connection {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub direction: Direction,
    /// Edge weight used by the position optimiser (default 1).
    #[serde(default = "default_weight", skip_serializing_if = "is_unit_weight")]
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing: Option<RoutingSpec>,
}

fn default_weight() -> f64 {
    1.0
}

fn is_unit_weight(w: &f64) -> bool {
    *w == 1.0
}

/// Helper struct for deserializing Connection with waypoint promotion.
#[derive(Deserialize)]
struct ConnectionHelper {
    from: String,
    to: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    direction: Direction,
    #[serde(default = "default_weight")]
    weight: f64,
    #[serde(default)]
    routing: Option<RoutingSpec>,
    /// Legacy format: bare waypoint list. Promoted to manual routing on read.
    #[serde(default)]
    waypoints: Option<Vec<Point>>,
}

impl<'de> Deserialize<'de> for Connection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let helper = ConnectionHelper::deserialize(deserializer)?;

        let routing = match (helper.routing, helper.waypoints) {
            (Some(r), _) => Some(r),
            (None, Some(waypoints)) => Some(RoutingSpec::Manual { waypoints }),
            (None, None) => None,
        };

        Ok(Connection {
            from: helper.from,
            to: helper.to,
            label: helper.label,
            direction: helper.direction,
            weight: helper.weight,
            routing,
        })
    }
}

impl Connection {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label: None,
            direction: Direction::None,
            weight: 1.0,
            routing: None,
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

/// Initial canvas size hint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasHint {
    pub width: f64,
    pub height: f64,
}

/// A parsed input document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas: Option<CanvasHint>,
    /// User-declared icons: name to opaque SVG fragment. Presence of this
    /// key distinguishes the two document flavours.
    #[serde(default, skip_serializing_if = "indexmap::IndexMap::is_empty")]
    pub icons: indexmap::IndexMap<String, String>,
    pub elements: Vec<Element>,
    pub connections: Vec<Connection>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_ref_bare_string() {
        let child: ChildRef = serde_json::from_str(r#""web""#).unwrap();
        assert_eq!(child.id, "web");
        assert_eq!(child.scope, Scope::Full);
    }

    #[test]
    fn test_child_ref_object_with_scope() {
        let child: ChildRef = serde_json::from_str(r#"{"id":"fw","scope":"border"}"#).unwrap();
        assert_eq!(child.id, "fw");
        assert_eq!(child.scope, Scope::Border);
    }

    #[test]
    fn test_element_minimal() {
        let el: Element = serde_json::from_str(r#"{"id":"a"}"#).unwrap();
        assert_eq!(el.id, "a");
        assert!(el.kind.is_none());
        assert!(el.contains.is_empty());
        assert_eq!(el.label_priority, LabelPriority::Normal);
        assert_eq!(el.label_position, LabelPosition::Auto);
    }

    #[test]
    fn test_element_position_hint_requires_both_axes() {
        let mut el = Element::new("a");
        el.x = Some(10.0);
        assert!(el.position_hint().is_none());
        el.y = Some(20.0);
        assert_eq!(el.position_hint(), Some(Point::new(10.0, 20.0)));
    }

    #[test]
    fn test_connection_defaults() {
        let conn: Connection = serde_json::from_str(r#"{"from":"a","to":"b"}"#).unwrap();
        assert_eq!(conn.direction, Direction::None);
        assert_eq!(conn.weight, 1.0);
        assert!(conn.routing.is_none());
        assert!(!conn.is_self_loop());
    }

    #[test]
    fn test_connection_legacy_waypoints_promoted() {
        let conn: Connection =
            serde_json::from_str(r#"{"from":"a","to":"b","waypoints":[[10,20],[30,40]]}"#).unwrap();
        match conn.routing {
            Some(RoutingSpec::Manual { ref waypoints }) => {
                assert_eq!(waypoints.len(), 2);
                assert_eq!(waypoints[0], Point::new(10.0, 20.0));
            }
            other => panic!("expected manual routing, got {:?}", other),
        }
    }

    #[test]
    fn test_connection_explicit_routing_wins_over_waypoints() {
        let conn: Connection = serde_json::from_str(
            r#"{"from":"a","to":"b","routing":{"type":"straight"},"waypoints":[[1,2]]}"#,
        )
        .unwrap();
        assert_eq!(conn.routing, Some(RoutingSpec::Straight));
    }

    #[test]
    fn test_routing_spec_orthogonal() {
        let spec: RoutingSpec = serde_json::from_str(
            r#"{"type":"orthogonal","corner_radius":8,"preference":"vertical"}"#,
        )
        .unwrap();
        assert_eq!(
            spec,
            RoutingSpec::Orthogonal {
                corner_radius: 8.0,
                preference: AxisPreference::Vertical
            }
        );
    }

    #[test]
    fn test_routing_spec_bezier_default_curvature() {
        let spec: RoutingSpec = serde_json::from_str(r#"{"type":"bezier"}"#).unwrap();
        assert_eq!(spec, RoutingSpec::Bezier { curvature: 0.5 });
    }

    #[test]
    fn test_routing_spec_arc() {
        let spec: RoutingSpec =
            serde_json::from_str(r#"{"type":"arc","radius":50,"side":"top"}"#).unwrap();
        assert_eq!(
            spec,
            RoutingSpec::Arc {
                radius: Some(50.0),
                side: ArcSide::Top
            }
        );
    }

    #[test]
    fn test_diagram_document() {
        let json = r#"{
            "canvas": {"width": 800, "height": 600},
            "icons": {"blob": "<circle r='10'/>"},
            "elements": [
                {"id": "grp", "contains": ["a", {"id": "b", "scope": "border"}]},
                {"id": "a", "type": "server"},
                {"id": "b", "type": "database"}
            ],
            "connections": [
                {"from": "a", "to": "b", "direction": "forward"}
            ]
        }"#;
        let diagram: Diagram = serde_json::from_str(json).unwrap();
        assert_eq!(diagram.elements.len(), 3);
        assert_eq!(diagram.connections.len(), 1);
        assert_eq!(diagram.elements[0].contains.len(), 2);
        assert!(diagram.icons.contains_key("blob"));
        assert_eq!(diagram.canvas.unwrap().width, 800.0);
    }
}
