pub mod config;
pub mod diag;
pub mod geometry;
pub mod icons;
pub mod layout;
pub mod model;
pub mod parser;
pub mod svg;

pub use config::{Config, ConfigError};
pub use diag::{Diagnostic, DiagnosticKind, LayoutError};
pub use icons::{IconKind, IconRegistry, Shape};
pub use layout::{compute, Layout, LayoutOutput, RenderList, Renderable};
pub use model::{CanvasHint, Connection, Diagram, Direction, Element, RoutingSpec};
pub use parser::{load_diagram, parse_diagram, ParseError};
pub use svg::write_svg;
