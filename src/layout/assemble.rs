//! Assembler (stage G).
//!
//! Emits the render list in paint order: containers outermost first (so
//! children draw on top), then icons, then routed edges, then labels (so
//! text paints over everything). Also computes the text-glow filter
//! descriptor, the per-renderable trace identifiers, and the final canvas
//! over every drawable including label bounding boxes.

use serde::Serialize;

use crate::config::Config;
use crate::diag::DiagnosticKind;
use crate::geometry::{Point, Rect, Size};
use crate::icons::Shape;
use crate::layout::{EdgePath, LabelPlacement, Layout, PathShape};
use crate::model::{Direction, LabelPriority};

/// Gaussian text-glow filter attached to every label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GlowFilter {
    pub std_deviation: f64,
}

/// One drawable in the output, tagged by kind. Each variant carries only
/// what that shape needs.
#[derive(Debug, Clone, Serialize)]
pub enum Renderable {
    Container {
        id: String,
        rect: Rect,
        color: String,
        trace: String,
    },
    Icon {
        id: String,
        shape: Shape,
        rect: Rect,
        color: String,
        trace: String,
    },
    Edge {
        from: String,
        to: String,
        direction: Direction,
        path: EdgePath,
        trace: String,
    },
    Label {
        owner: String,
        placement: LabelPlacement,
        trace: String,
    },
}

/// The assembled output: canvas size plus drawables in paint order.
#[derive(Debug, Clone, Serialize)]
pub struct RenderList {
    pub canvas: Size,
    pub glow: GlowFilter,
    pub items: Vec<Renderable>,
}

pub fn assemble(layout: &mut Layout, config: &Config) -> RenderList {
    let mut items = Vec::new();

    // Containers, outermost first so nesting paints back to front; equal
    // depths keep document order.
    let mut containers: Vec<(usize, String)> = layout
        .nodes
        .values()
        .filter(|n| n.is_container())
        .map(|n| (n.depth, n.id.clone()))
        .collect();
    containers.sort_by_key(|(depth, _)| *depth);
    for (_, id) in containers {
        let node = &layout.nodes[id.as_str()];
        items.push(Renderable::Container {
            id: id.clone(),
            rect: node.rect(),
            color: node.color.clone(),
            trace: format!("ndfn:container:{}", id),
        });
    }

    // Icons in document order.
    for node in layout.nodes.values() {
        if node.is_container() {
            continue;
        }
        items.push(Renderable::Icon {
            id: node.id.clone(),
            shape: node.shape.clone(),
            rect: node.rect(),
            color: node.color.clone(),
            trace: format!("ndfn:icon:{}:{}", node.type_name, node.id),
        });
    }

    // Edges in document order; dropped edges were already diagnosed.
    for (i, edge) in layout.edges.iter().enumerate() {
        let Some(path) = &edge.path else {
            continue;
        };
        items.push(Renderable::Edge {
            from: edge.from.clone(),
            to: edge.to.clone(),
            direction: edge.direction,
            path: path.clone(),
            trace: format!("ndfn:edge:{}:{}->{}", i, edge.from, edge.to),
        });
    }

    // Labels last, low priority first so high-priority text paints on top.
    let mut labels: Vec<(LabelPriority, Renderable)> = Vec::new();
    for (owner, placement) in &layout.label_positions {
        labels.push((
            placement.priority,
            Renderable::Label {
                owner: owner.clone(),
                placement: placement.clone(),
                trace: format!("ndfn:label:{}", owner),
            },
        ));
    }
    for (i, edge) in layout.edges.iter().enumerate() {
        let (Some(text), Some(path)) = (&edge.label, &edge.path) else {
            continue;
        };
        let placement = edge_label_placement(text, path, config);
        labels.push((
            LabelPriority::Normal,
            Renderable::Label {
                owner: format!("edge:{}", i),
                placement,
                trace: format!("ndfn:label:edge:{}", i),
            },
        ));
    }
    labels.sort_by_key(|(priority, _)| *priority);
    items.extend(labels.into_iter().map(|(_, label)| label));

    let canvas = final_canvas(layout, &items, config);
    layout.canvas = canvas;

    RenderList {
        canvas,
        glow: GlowFilter { std_deviation: 2.0 },
        items,
    }
}

/// Midpoint label for an edge, anchored middle/bottom just above the path.
fn edge_label_placement(text: &str, path: &EdgePath, config: &Config) -> LabelPlacement {
    let mid = path_midpoint(path);
    let lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    let size = crate::layout::inflate::label_extent(Some(text), config);
    LabelPlacement {
        pos: Point::new(mid.x, mid.y - 4.0),
        h_anchor: crate::layout::HAnchor::Middle,
        v_anchor: crate::layout::VAnchor::Bottom,
        lines,
        size,
        priority: LabelPriority::Normal,
    }
}

fn path_midpoint(path: &EdgePath) -> Point {
    match &path.shape {
        PathShape::Arc { center, radius, .. } => {
            // Apex of the bulge: from the centre through the chord midpoint.
            let (a, b) = (path.points[0], path.points[1]);
            let chord_mid = Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
            let dir = center.direction_to(chord_mid);
            Point::new(center.x + dir.x * radius, center.y + dir.y * radius)
        }
        _ => {
            let points = &path.points;
            if points.len() < 2 {
                return points.first().copied().unwrap_or_default();
            }
            // Midpoint by arc length over the polyline vertices.
            let total: f64 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
            let mut remaining = total / 2.0;
            for pair in points.windows(2) {
                let seg = pair[0].distance(pair[1]);
                if seg >= remaining && seg > 0.0 {
                    let t = remaining / seg;
                    return Point::new(
                        pair[0].x + (pair[1].x - pair[0].x) * t,
                        pair[0].y + (pair[1].y - pair[0].y) * t,
                    );
                }
                remaining -= seg;
            }
            points[points.len() / 2]
        }
    }
}

/// Bounding extent of a routed path, conservative for curves.
fn path_bounds(path: &EdgePath) -> Rect {
    let mut bounds: Option<Rect> = None;
    let mut add = |p: Point| {
        let r = Rect::new(p.x, p.y, 0.0, 0.0);
        bounds = Some(match bounds {
            Some(b) => b.union(r),
            None => r,
        });
    };
    for p in &path.points {
        add(*p);
    }
    match &path.shape {
        PathShape::Cubic { c1, c2 } => {
            add(*c1);
            add(*c2);
        }
        PathShape::Arc { center, radius, .. } => {
            add(Point::new(center.x - radius, center.y - radius));
            add(Point::new(center.x + radius, center.y + radius));
        }
        _ => {}
    }
    bounds.unwrap_or_default()
}

/// Final canvas: the working canvas grown to cover every drawable plus the
/// configured margin.
fn final_canvas(layout: &mut Layout, items: &[Renderable], config: &Config) -> Size {
    let mut max_x = 0.0_f64;
    let mut max_y = 0.0_f64;
    let mut cover = |rect: Rect| {
        max_x = max_x.max(rect.right());
        max_y = max_y.max(rect.bottom());
    };
    for item in items {
        match item {
            Renderable::Container { rect, .. } | Renderable::Icon { rect, .. } => cover(*rect),
            Renderable::Edge { path, .. } => cover(path_bounds(path)),
            Renderable::Label { placement, .. } => cover(placement.rect()),
        }
    }

    let needed = Size::new(max_x + config.canvas_margin, max_y + config.canvas_margin);
    let width = layout.canvas.width.max(needed.width);
    let height = layout.canvas.height.max(needed.height);

    if max_x + config.route_safety_margin > layout.canvas.width
        || max_y + config.route_safety_margin > layout.canvas.height
    {
        layout.warn(
            DiagnosticKind::CanvasOverflow,
            format!(
                "drawables extend to ({:.0}, {:.0}); canvas expanded to {:.0}x{:.0}",
                max_x, max_y, width, height
            ),
        );
    }

    Size::new(width, height)
}
