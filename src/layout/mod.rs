//! The layout pipeline.
//!
//! A strict sequence of ten stages transforms a parsed [`Diagram`] into
//! pixel geometry: structure analysis, topology tagging, centrality
//! ordering, abstract placement, position optimisation, expansion,
//! inflation, vertical redistribution, edge routing, and assembly. Every
//! stage reads and writes the single [`Layout`] value; computed fields grow
//! monotonically and each stage is the sole writer of its outputs.

pub mod assemble;
pub mod centrality;
pub mod expand;
pub mod inflate;
pub mod optimize;
pub mod placer;
pub mod redistribute;
pub mod route;
pub mod structure;
pub mod topology;

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::Config;
use crate::diag::{Diagnostic, DiagnosticKind, LayoutError};
use crate::geometry::{Point, Rect, Size};
use crate::icons::{IconRegistry, Shape};
use crate::model::{
    ChildRef, Diagram, Direction, LabelPosition, LabelPriority, RoutingSpec,
};

pub use assemble::{GlowFilter, RenderList, Renderable};

/// A node with its computed layout state.
#[derive(Debug, Clone)]
pub struct NodeState {
    pub id: String,
    /// Resolved shape family.
    pub shape: Shape,
    /// Original `type` string, kept for trace output.
    pub type_name: String,
    pub label: Option<String>,
    pub color: String,
    pub hp: f64,
    pub wp: f64,
    pub label_priority: LabelPriority,
    pub label_position: LabelPosition,
    /// Direct children (dangling references pruned by the analyser).
    pub children: Vec<ChildRef>,
    /// Containment parent, or `None` for primary nodes.
    pub parent: Option<String>,
    /// Explicit pixel position from the input; pins the node.
    pub pinned: Option<Point>,
    // Computed fields, written by the stages noted on each.
    /// Pixel size (inflator; containers re-sized by the grower).
    pub size: Size,
    /// Pixel centre (inflator, then redistributor).
    pub center: Point,
    /// Topological level over the un-condensed edge graph (analyser).
    pub level: usize,
    /// Accessibility score (analyser).
    pub score: f64,
    /// Condensation group index, if the node is a VC member (analyser).
    pub cluster: Option<usize>,
    /// Containment depth; primary nodes sit at depth 0 (analyser).
    pub depth: usize,
}

impl NodeState {
    pub fn is_container(&self) -> bool {
        !self.children.is_empty()
    }

    /// The node's pixel rectangle.
    pub fn rect(&self) -> Rect {
        Rect::from_center(self.center, self.size)
    }
}

/// An edge with its computed route.
#[derive(Debug, Clone)]
pub struct EdgeState {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    pub direction: Direction,
    pub weight: f64,
    /// Routing spec as parsed; `None` selects the default for the edge kind.
    /// Never rewritten by the router.
    pub routing: Option<RoutingSpec>,
    /// Computed route (router).
    pub path: Option<EdgePath>,
    /// Set when an endpoint did not resolve; the edge is skipped downstream.
    pub dropped: bool,
}

impl EdgeState {
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

/// Geometric shape of a computed route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PathShape {
    Line,
    Polyline {
        corner_radius: f64,
    },
    Cubic {
        c1: Point,
        c2: Point,
    },
    Arc {
        center: Point,
        radius: f64,
        large_arc: bool,
        sweep: bool,
    },
}

/// A computed route: the shape plus its on-path vertices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgePath {
    pub shape: PathShape,
    pub points: Vec<Point>,
}

/// Horizontal text anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HAnchor {
    Start,
    Middle,
    End,
}

/// Vertical text anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VAnchor {
    Top,
    Middle,
    Bottom,
}

/// A placed label: anchor point, anchoring mode, and estimated extent.
#[derive(Debug, Clone, Serialize)]
pub struct LabelPlacement {
    pub pos: Point,
    pub h_anchor: HAnchor,
    pub v_anchor: VAnchor,
    pub lines: Vec<String>,
    pub size: Size,
    pub priority: LabelPriority,
}

impl LabelPlacement {
    /// Bounding rectangle implied by the anchor point and anchoring mode.
    pub fn rect(&self) -> Rect {
        let x = match self.h_anchor {
            HAnchor::Start => self.pos.x,
            HAnchor::Middle => self.pos.x - self.size.width / 2.0,
            HAnchor::End => self.pos.x - self.size.width,
        };
        let y = match self.v_anchor {
            VAnchor::Top => self.pos.y,
            VAnchor::Middle => self.pos.y - self.size.height / 2.0,
            VAnchor::Bottom => self.pos.y - self.size.height,
        };
        Rect::new(x, y, self.size.width, self.size.height)
    }
}

/// One ordered horizontal layer of abstract nodes.
#[derive(Debug, Clone)]
pub struct Layer {
    /// Abstract y coordinate (layer index; fractional after expansion).
    pub y_abs: f64,
    /// Abstract node ids, left to right.
    pub ids: Vec<String>,
}

/// A condensation group: sibling nodes sharing a pivot neighbour pattern,
/// collapsed to a single representative for the abstract stages.
#[derive(Debug, Clone)]
pub struct VcGroup {
    /// Representative id (`ndpr0`, `ndpr1`, ...).
    pub rep: String,
    /// Member node ids in document order.
    pub members: Vec<String>,
}

/// Condensation state: groups plus the member-to-group inverse mapping.
#[derive(Debug, Clone, Default)]
pub struct Condensation {
    pub groups: Vec<VcGroup>,
    pub rep_of: IndexMap<String, usize>,
}

impl Condensation {
    /// Map a primary node id to its abstract id (the representative when the
    /// node is condensed, the node itself otherwise).
    pub fn abstract_id<'a>(&'a self, id: &'a str) -> &'a str {
        match self.rep_of.get(id) {
            Some(&group) => &self.groups[group].rep,
            None => id,
        }
    }
}

/// Derived structure: containment, adjacency, and the abstract graph.
#[derive(Debug, Clone, Default)]
pub struct Structure {
    /// Nodes whose containment parent is the root, in document order.
    pub primary: Vec<String>,
    /// Full connection graph, id to successor list in insertion order.
    pub adjacency: IndexMap<String, Vec<String>>,
    /// Reverse connection graph.
    pub reverse: IndexMap<String, Vec<String>>,
    /// Abstract graph over primary nodes and VC representatives.
    pub abstract_adjacency: IndexMap<String, Vec<String>>,
    pub abstract_reverse: IndexMap<String, Vec<String>>,
    /// Deduplicated abstract edges in insertion order.
    pub abstract_edges: Vec<(String, String)>,
    /// Abstract edges with multiplicity and the input edge weight.
    pub abstract_weighted_edges: Vec<(String, String, f64)>,
    /// Topological level per abstract node.
    pub abstract_level: IndexMap<String, usize>,
    /// Largest direct-child count over all containers.
    pub max_children: usize,
}

/// The single value threaded through all pipeline stages.
#[derive(Debug, Clone)]
pub struct Layout {
    pub canvas: Size,
    pub nodes: IndexMap<String, NodeState>,
    pub edges: Vec<EdgeState>,
    pub label_positions: IndexMap<String, LabelPlacement>,
    pub structure: Structure,
    pub condensation: Option<Condensation>,
    /// Centrality scalar per abstract node (centrality orderer).
    pub abstract_score: IndexMap<String, f64>,
    /// Abstract coordinates per abstract node (placer, optimiser, expander).
    pub abstract_pos: IndexMap<String, (f64, f64)>,
    /// Ordered per-layer sequences (tagger; rewritten by placer/expander).
    pub layers: Vec<Layer>,
    /// Best crossing count reached by the barycenter ordering (placer).
    pub crossing_count: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl Layout {
    /// Build the initial layout state from a parsed document.
    pub fn from_diagram(
        diagram: &Diagram,
        config: &Config,
        icons: &IconRegistry,
    ) -> Result<Self, LayoutError> {
        let mut nodes = IndexMap::new();
        for element in &diagram.elements {
            if nodes.contains_key(&element.id) {
                return Err(LayoutError::DuplicateId {
                    id: element.id.clone(),
                });
            }
            let type_name = element.kind.clone().unwrap_or_default();
            nodes.insert(
                element.id.clone(),
                NodeState {
                    id: element.id.clone(),
                    shape: icons.resolve(&type_name),
                    type_name,
                    label: element.label.clone(),
                    color: element
                        .color
                        .clone()
                        .unwrap_or_else(|| "steelblue".to_string()),
                    hp: element.hp.unwrap_or(1.0),
                    wp: element.wp.unwrap_or(1.0),
                    label_priority: element.label_priority,
                    label_position: element.label_position,
                    children: element.contains.clone(),
                    parent: None,
                    pinned: element.position_hint(),
                    size: Size::default(),
                    center: Point::default(),
                    level: 0,
                    score: 0.0,
                    cluster: None,
                    depth: 0,
                },
            );
        }

        let edges = diagram
            .connections
            .iter()
            .map(|conn| EdgeState {
                from: conn.from.clone(),
                to: conn.to.clone(),
                label: conn.label.clone(),
                direction: conn.direction,
                weight: conn.weight,
                routing: conn.routing.clone(),
                path: None,
                dropped: false,
            })
            .collect();

        let canvas = match diagram.canvas {
            Some(hint) => Size::new(hint.width, hint.height),
            None => Size::new(config.canvas_width, config.canvas_height),
        };

        Ok(Self {
            canvas,
            nodes,
            edges,
            label_positions: IndexMap::new(),
            structure: Structure::default(),
            condensation: None,
            abstract_score: IndexMap::new(),
            abstract_pos: IndexMap::new(),
            layers: Vec::new(),
            crossing_count: 0,
            diagnostics: Vec::new(),
        })
    }

    /// Record a non-fatal diagnostic and log it.
    pub fn warn(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(?kind, "{message}");
        self.diagnostics.push(Diagnostic::new(kind, message));
    }

    /// All containment ancestors of a node, inner to outer.
    pub fn ancestors(&self, id: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut current = id;
        while let Some(node) = self.nodes.get(current) {
            match &node.parent {
                Some(parent) => {
                    chain.push(parent.clone());
                    current = parent;
                }
                None => break,
            }
        }
        chain
    }

    /// The outermost ancestor of a node (the node itself when primary).
    pub fn primary_ancestor<'a>(&'a self, id: &'a str) -> &'a str {
        let mut current = id;
        while let Some(parent) = self.nodes.get(current).and_then(|n| n.parent.as_deref()) {
            current = parent;
        }
        current
    }

    /// Container ids ordered by decreasing depth (deepest first).
    pub fn containers_by_depth_desc(&self) -> Vec<String> {
        let mut containers: Vec<(usize, String)> = self
            .nodes
            .values()
            .filter(|n| n.is_container())
            .map(|n| (n.depth, n.id.clone()))
            .collect();
        containers.sort_by(|a, b| b.0.cmp(&a.0));
        containers.into_iter().map(|(_, id)| id).collect()
    }

    /// Direct and transitive descendants of a container, in document order.
    pub fn descendants(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack: Vec<String> = match self.nodes.get(id) {
            Some(node) => node.children.iter().map(|c| c.id.clone()).collect(),
            None => return out,
        };
        stack.reverse();
        while let Some(child) = stack.pop() {
            if let Some(node) = self.nodes.get(&child) {
                for grandchild in node.children.iter().rev() {
                    stack.push(grandchild.id.clone());
                }
            }
            out.push(child);
        }
        out
    }

    /// Shift a primary node and all its descendants by a pixel delta.
    pub fn shift_subtree(&mut self, id: &str, dx: f64, dy: f64) {
        let mut targets = vec![id.to_string()];
        targets.extend(self.descendants(id));
        for target in targets {
            if let Some(node) = self.nodes.get_mut(&target) {
                node.center.x += dx;
                node.center.y += dy;
            }
        }
    }
}

/// The pipeline output: the final layout state plus the render list.
#[derive(Debug, Clone)]
pub struct LayoutOutput {
    pub layout: Layout,
    pub render: RenderList,
}

/// Run the full ten-stage pipeline on a parsed document.
pub fn compute(diagram: &Diagram, config: &Config) -> Result<LayoutOutput, LayoutError> {
    let icons = IconRegistry::new(diagram.icons.clone());
    let mut layout = Layout::from_diagram(diagram, config, &icons)?;

    structure::analyse(&mut layout, config)?;
    topology::tag(&mut layout);
    centrality::order(&mut layout);
    placer::place(&mut layout, config);
    optimize::refine(&mut layout, config);
    expand::expand(&mut layout, config);
    inflate::inflate(&mut layout, config);
    redistribute::redistribute(&mut layout, config);
    route::route(&mut layout, config);
    let render = assemble::assemble(&mut layout, config);

    Ok(LayoutOutput { layout, render })
}
