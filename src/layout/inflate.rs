//! Inflator and container grower (stage I).
//!
//! The sole frame-changer: abstract coordinates become pixel coordinates
//! here. Primary nodes land on a spacing grid scaled to the widest
//! container, icons take their configured dimensions, and containers grow
//! bottom-up to fit their children, the children's labels, and their own
//! header. Explicit input coordinates override the computed position.

use indexmap::IndexMap;

use crate::config::Config;
use crate::geometry::{Point, Rect, Size};
use crate::layout::{HAnchor, LabelPlacement, Layout, VAnchor};
use crate::model::{LabelPosition, Scope};

pub fn inflate(layout: &mut Layout, config: &Config) {
    let spacing_h = config.horizontal_spacing(layout.structure.max_children);
    let spacing_v = config.vertical_spacing(layout.structure.max_children);

    // Icon sizes. Containers are sized by the grower below; the hp/wp
    // multipliers do not apply to them.
    for node in layout.nodes.values_mut() {
        if !node.is_container() {
            node.size = Size::new(config.icon_width * node.wp, config.icon_height * node.hp);
        }
    }

    // Abstract to pixel for every placed (primary) node.
    let positions: Vec<(String, Point)> = layout
        .abstract_pos
        .iter()
        .map(|(id, &(x, y))| (id.clone(), Point::new(x * spacing_h, y * spacing_v)))
        .collect();
    for (id, center) in positions {
        if let Some(node) = layout.nodes.get_mut(&id) {
            node.center = center;
        }
    }

    // Input coordinates win over the computed placement.
    let pinned: Vec<(String, Point)> = layout
        .nodes
        .values()
        .filter(|n| n.parent.is_none())
        .filter_map(|n| n.pinned.map(|p| (n.id.clone(), p)))
        .collect();
    for (id, center) in pinned {
        layout.nodes.get_mut(&id).unwrap().center = center;
    }

    grow_containers(layout, config);
    place_labels(layout, config);
    ensure_containment(layout, config);
    place_labels(layout, config);
}

/// Estimated pixel extent of a node's label block (zero when unlabeled).
pub(crate) fn label_extent(label: Option<&str>, config: &Config) -> Size {
    match label {
        None => Size::default(),
        Some(text) => {
            let lines: Vec<&str> = text.split('\n').collect();
            let max_len = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
            Size::new(
                config.label_char_width * max_len as f64,
                config.label_line_height * lines.len() as f64,
            )
        }
    }
}

// ── Container growth ────────────────────────────────────────────────────

/// Full footprint of a child inside its parent's grid: the icon plus the
/// label block below it. Child containers carry their label inside, so
/// their footprint is just their grown size.
fn child_footprint(layout: &Layout, id: &str, config: &Config) -> Size {
    let node = &layout.nodes[id];
    if node.is_container() {
        node.size
    } else {
        let label = label_extent(node.label.as_deref(), config);
        Size::new(
            node.size.width.max(label.width),
            node.size.height + label.height,
        )
    }
}

fn header_height(layout: &Layout, id: &str, config: &Config) -> f64 {
    let label = label_extent(layout.nodes[id].label.as_deref(), config);
    config.icon_height.max(label.height)
}

fn grow_containers(layout: &mut Layout, config: &Config) {
    let pad = config.icon_width / 8.0;
    let order = layout.containers_by_depth_desc();

    // Local centre of each grid child, relative to the container's top-left.
    let mut local: IndexMap<String, Vec<(String, Point)>> = IndexMap::new();

    for cid in &order {
        let node = &layout.nodes[cid.as_str()];
        let grid_children: Vec<String> = node
            .children
            .iter()
            .filter(|c| c.scope == Scope::Full)
            .map(|c| c.id.clone())
            .collect();
        let border_children: Vec<String> = node
            .children
            .iter()
            .filter(|c| c.scope == Scope::Border)
            .map(|c| c.id.clone())
            .collect();

        let footprints: Vec<(String, Size)> = grid_children
            .iter()
            .map(|ch| (ch.clone(), child_footprint(layout, ch, config)))
            .collect();

        let n = footprints.len();
        let cols = (n as f64).sqrt().ceil() as usize;
        let rows = if cols == 0 { 0 } else { n.div_ceil(cols) };

        let mut col_widths = vec![0.0_f64; cols];
        let mut row_heights = vec![0.0_f64; rows];
        for (i, (_, size)) in footprints.iter().enumerate() {
            let (row, col) = (i / cols.max(1), i % cols.max(1));
            col_widths[col] = col_widths[col].max(size.width);
            row_heights[row] = row_heights[row].max(size.height);
        }

        let header = header_height(layout, cid, config);
        let inner_width: f64 = col_widths.iter().sum::<f64>() + pad * (cols as f64 + 1.0);
        let inner_height: f64 = row_heights.iter().sum::<f64>() + pad * (rows as f64 + 1.0);

        let mut width = inner_width.max(2.0 * config.icon_width);
        let mut height = header + inner_height.max(pad * 2.0);

        // Grid placement: icons centred in their cell, label space below.
        let mut entries: Vec<(String, Point)> = Vec::new();
        for (i, (child, _)) in footprints.iter().enumerate() {
            let (row, col) = (i / cols.max(1), i % cols.max(1));
            let cell_x = pad + col_widths[..col].iter().sum::<f64>() + pad * col as f64;
            let cell_y = header
                + pad
                + row_heights[..row].iter().sum::<f64>()
                + pad * row as f64;
            let icon = layout.nodes[child.as_str()].size;
            let centre = Point::new(
                cell_x + col_widths[col] / 2.0,
                cell_y + icon.height / 2.0,
            );
            entries.push((child.clone(), centre));
        }

        // Second measurement pass over the placed content; grow if the
        // estimate fell short in either axis.
        let measured = measure_placed_content(layout, &entries, config);
        if let Some(bounds) = measured {
            let needed_width = bounds.right() + pad;
            let needed_height = bounds.bottom() + pad;
            if needed_width > width {
                width = needed_width;
            }
            if needed_height > height {
                height = needed_height;
            }
        }

        // Border-scoped children straddle the top edge, evenly spread.
        let nb = border_children.len();
        for (i, child) in border_children.iter().enumerate() {
            let x = width * (i as f64 + 1.0) / (nb as f64 + 1.0);
            entries.push((child.clone(), Point::new(x, 0.0)));
        }

        layout.nodes.get_mut(cid).unwrap().size = Size::new(width, height);
        local.insert(cid.clone(), entries);
    }

    // Rewrite child coordinates to global, outermost container first.
    let mut stack: Vec<String> = layout
        .structure
        .primary
        .iter()
        .filter(|id| layout.nodes[id.as_str()].is_container())
        .cloned()
        .collect();
    while let Some(cid) = stack.pop() {
        let origin = {
            let rect = layout.nodes[cid.as_str()].rect();
            Point::new(rect.x, rect.y)
        };
        let Some(entries) = local.get(&cid).cloned() else {
            continue;
        };
        for (child, offset) in entries {
            let node = layout.nodes.get_mut(&child).unwrap();
            node.center = Point::new(origin.x + offset.x, origin.y + offset.y);
            if node.is_container() {
                stack.push(child);
            }
        }
    }
}

/// Bounding box of placed children (icons plus label blocks) in the
/// container-local frame.
fn measure_placed_content(
    layout: &Layout,
    entries: &[(String, Point)],
    config: &Config,
) -> Option<Rect> {
    let mut bounds: Option<Rect> = None;
    for (child, centre) in entries {
        let node = &layout.nodes[child.as_str()];
        let icon = Rect::from_center(*centre, node.size);
        let mut rect = icon;
        if !node.is_container() {
            let label = label_extent(node.label.as_deref(), config);
            if label.height > 0.0 {
                let label_rect = Rect::new(
                    centre.x - label.width / 2.0,
                    icon.bottom(),
                    label.width,
                    label.height,
                );
                rect = rect.union(label_rect);
            }
        }
        bounds = Some(match bounds {
            Some(b) => b.union(rect),
            None => rect,
        });
    }
    bounds
}

// ── Labels ──────────────────────────────────────────────────────────────

/// (Re)compute every node label placement from the current geometry.
/// Containers carry their label in the header; icons default to a label
/// immediately below, anchored middle/top.
pub(crate) fn place_labels(layout: &mut Layout, config: &Config) {
    let mut placements = IndexMap::new();
    for node in layout.nodes.values() {
        let Some(label) = &node.label else {
            continue;
        };
        let lines: Vec<String> = label.split('\n').map(str::to_string).collect();
        let size = label_extent(Some(label), config);
        let rect = node.rect();

        let (pos, h_anchor, v_anchor) = if node.is_container() {
            (
                Point::new(rect.left() + config.icon_width / 8.0, rect.top() + 4.0),
                HAnchor::Start,
                VAnchor::Top,
            )
        } else {
            match node.label_position {
                LabelPosition::Auto | LabelPosition::Bottom => (
                    Point::new(node.center.x, rect.bottom()),
                    HAnchor::Middle,
                    VAnchor::Top,
                ),
                LabelPosition::Top => (
                    Point::new(node.center.x, rect.top()),
                    HAnchor::Middle,
                    VAnchor::Bottom,
                ),
                LabelPosition::Left => (
                    Point::new(rect.left() - 4.0, node.center.y),
                    HAnchor::End,
                    VAnchor::Middle,
                ),
                LabelPosition::Right => (
                    Point::new(rect.right() + 4.0, node.center.y),
                    HAnchor::Start,
                    VAnchor::Middle,
                ),
            }
        };

        placements.insert(
            node.id.clone(),
            LabelPlacement {
                pos,
                h_anchor,
                v_anchor,
                lines,
                size,
                priority: node.label_priority,
            },
        );
    }
    layout.label_positions = placements;
}

// ── Containment repair ──────────────────────────────────────────────────

/// Restore the containment invariant after rounding: every grid child's
/// icon and label block must sit inside its container. Runs deepest-first
/// so expansions propagate upward through parents.
fn ensure_containment(layout: &mut Layout, config: &Config) {
    for cid in layout.containers_by_depth_desc() {
        let children: Vec<(String, Scope)> = layout.nodes[cid.as_str()]
            .children
            .iter()
            .map(|c| (c.id.clone(), c.scope))
            .collect();
        let mut needed = layout.nodes[cid.as_str()].rect();
        for (child, scope) in children {
            if scope == Scope::Border {
                continue;
            }
            let node = &layout.nodes[child.as_str()];
            let mut rect = node.rect();
            if !node.is_container() {
                let label = label_extent(node.label.as_deref(), config);
                if label.height > 0.0 {
                    rect = rect.union(Rect::new(
                        node.center.x - label.width / 2.0,
                        rect.bottom(),
                        label.width,
                        label.height,
                    ));
                }
            }
            needed = needed.union(rect);
        }
        let current = layout.nodes[cid.as_str()].rect();
        if needed != current {
            let node = layout.nodes.get_mut(&cid).unwrap();
            node.size = Size::new(needed.width, needed.height);
            node.center = needed.center();
        }
    }
}
