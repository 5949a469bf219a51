//! Vertical redistributor (stage R).
//!
//! Container growth leaves the levels with heterogeneous heights. This
//! stage recomputes each level's y from the real heights, enforces the
//! minimum horizontal gap inside each level by rescaling about the level
//! centroid, re-centres every level about the canvas midline using its
//! bounding box, and finally shifts the whole drawing into positive
//! territory. Pinned nodes never move.

use crate::config::Config;
use crate::diag::DiagnosticKind;
use crate::geometry::Rect;
use crate::layout::inflate::place_labels;
use crate::layout::Layout;

pub fn redistribute(layout: &mut Layout, config: &Config) {
    if layout.layers.is_empty() {
        return;
    }

    redistribute_vertical(layout, config);
    redistribute_horizontal(layout, config);
    place_labels(layout, config);
    shift_into_view(layout, config);
    place_labels(layout, config);
}

fn redistribute_vertical(layout: &mut Layout, config: &Config) {
    let mut cursor = 0.0_f64;
    for li in 0..layout.layers.len() {
        let ids = layout.layers[li].ids.clone();
        let max_height = ids
            .iter()
            .filter_map(|id| layout.nodes.get(id).map(|n| n.size.height))
            .fold(0.0_f64, f64::max);
        let level_center = cursor + max_height / 2.0;
        for id in &ids {
            let Some(node) = layout.nodes.get(id) else {
                continue;
            };
            if node.pinned.is_some() {
                continue;
            }
            let dy = level_center - node.center.y;
            layout.shift_subtree(id, 0.0, dy);
        }
        cursor += max_height + config.vertical_gap;
    }
}

fn redistribute_horizontal(layout: &mut Layout, config: &Config) {
    for li in 0..layout.layers.len() {
        let ids = layout.layers[li].ids.clone();
        // A pinned node anchors its level: leave the whole level alone
        // rather than move siblings relative to an immovable point.
        let any_pinned = ids
            .iter()
            .any(|id| layout.nodes.get(id).map(|n| n.pinned.is_some()) == Some(true));
        if any_pinned || ids.is_empty() {
            continue;
        }

        let centers: Vec<f64> = ids.iter().map(|id| layout.nodes[id.as_str()].center.x).collect();
        let half_widths: Vec<f64> = ids
            .iter()
            .map(|id| layout.nodes[id.as_str()].size.width / 2.0)
            .collect();

        // Worst gap violation decides the rescale factor about the centroid.
        let mut scale = 1.0_f64;
        let mut degenerate = false;
        for i in 1..centers.len() {
            let required = half_widths[i - 1] + half_widths[i] + config.min_horizontal_gap;
            let actual = centers[i] - centers[i - 1];
            if actual < 1e-6 {
                degenerate = true;
            } else {
                scale = scale.max(required / actual);
            }
        }

        if degenerate {
            // Coincident siblings cannot be rescaled; walk them apart.
            layout.warn(
                DiagnosticKind::NumericDegenerate,
                format!("coincident nodes in level {}; spread sequentially", li),
            );
            let mut next_min = f64::NEG_INFINITY;
            for (i, id) in ids.iter().enumerate() {
                let x = layout.nodes[id.as_str()].center.x;
                let lo = if i == 0 {
                    x
                } else {
                    x.max(next_min)
                };
                let dx = lo - x;
                if dx != 0.0 {
                    layout.shift_subtree(id, dx, 0.0);
                }
                next_min = lo + half_widths[i] + config.min_horizontal_gap
                    + half_widths.get(i + 1).copied().unwrap_or(0.0);
            }
        } else if scale > 1.0 {
            let centroid = centers.iter().sum::<f64>() / centers.len() as f64;
            for (i, id) in ids.iter().enumerate() {
                let dx = (centroid + (centers[i] - centroid) * scale) - centers[i];
                layout.shift_subtree(id, dx, 0.0);
            }
        }

        // Centre the level about the canvas midline using its bounding box.
        let mut bounds: Option<(f64, f64)> = None;
        for id in &ids {
            let rect = layout.nodes[id.as_str()].rect();
            bounds = Some(match bounds {
                Some((lo, hi)) => (lo.min(rect.left()), hi.max(rect.right())),
                None => (rect.left(), rect.right()),
            });
        }
        if let Some((lo, hi)) = bounds {
            let dx = layout.canvas.width / 2.0 - (lo + hi) / 2.0;
            if dx != 0.0 {
                for id in &ids {
                    layout.shift_subtree(id, dx, 0.0);
                }
            }
        }
    }
}

/// Bounding box of all drawables placed so far (node rects and labels).
fn content_bounds(layout: &Layout) -> Option<Rect> {
    let mut bounds: Option<Rect> = None;
    let mut add = |rect: Rect| {
        bounds = Some(match bounds {
            Some(b) => b.union(rect),
            None => rect,
        });
    };
    for node in layout.nodes.values() {
        add(node.rect());
    }
    for placement in layout.label_positions.values() {
        add(placement.rect());
    }
    bounds
}

fn shift_into_view(layout: &mut Layout, config: &Config) {
    let Some(bounds) = content_bounds(layout) else {
        return;
    };
    let margin = config.route_safety_margin;
    let dx = if bounds.x < margin { margin - bounds.x } else { 0.0 };
    let dy = if bounds.y < margin { margin - bounds.y } else { 0.0 };
    if dx == 0.0 && dy == 0.0 {
        return;
    }
    let primaries: Vec<String> = layout
        .structure
        .primary
        .iter()
        .filter(|id| layout.nodes[id.as_str()].pinned.is_none())
        .cloned()
        .collect();
    for id in primaries {
        layout.shift_subtree(&id, dx, dy);
    }
}
