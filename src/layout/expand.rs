//! Expander (stage X).
//!
//! Replaces each virtual-container representative in the abstract positions
//! with its member nodes, distributed around the representative: members on
//! one sub-level spread horizontally, and sub-levels (distinct member
//! topological levels from the un-condensed graph) stack vertically. The
//! per-layer sequences are rebuilt from the resulting coordinates because
//! the pre-expansion layer lists go stale.

use crate::config::Config;
use crate::layout::{Layer, Layout};

pub fn expand(layout: &mut Layout, config: &Config) {
    let Some(cond) = layout.condensation.clone() else {
        return;
    };

    for group in &cond.groups {
        let Some((rep_x, rep_y)) = layout.abstract_pos.shift_remove(&group.rep) else {
            continue;
        };

        // Sub-levels preserve each member's original topological level.
        let mut sublevels: Vec<usize> = group
            .members
            .iter()
            .filter_map(|m| layout.nodes.get(m).map(|n| n.level))
            .collect();
        sublevels.sort_unstable();
        sublevels.dedup();

        for (k, sublevel) in sublevels.iter().enumerate() {
            let members: Vec<&String> = group
                .members
                .iter()
                .filter(|m| layout.nodes.get(*m).map(|n| n.level) == Some(*sublevel))
                .collect();
            let count = members.len();
            for (j, member) in members.into_iter().enumerate() {
                let x = rep_x
                    + (j as f64 - (count as f64 - 1.0) / 2.0) * config.member_spacing;
                let y = rep_y + k as f64 * config.sublevel_spacing;
                layout.abstract_pos.insert(member.clone(), (x, y));
            }
        }
    }

    rebuild_layers(layout);
}

/// Rebuild the per-layer ordered sequences from the abstract coordinates.
fn rebuild_layers(layout: &mut Layout) {
    let mut entries: Vec<(f64, f64, usize, String)> = layout
        .abstract_pos
        .iter()
        .enumerate()
        .map(|(doc_index, (id, &(x, y)))| (y, x, doc_index, id.clone()))
        .collect();
    entries.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .then_with(|| a.2.cmp(&b.2))
    });

    let mut layers: Vec<Layer> = Vec::new();
    for (y, _, _, id) in entries {
        match layers.last_mut() {
            Some(layer) if (layer.y_abs - y).abs() < 1e-9 => layer.ids.push(id),
            _ => layers.push(Layer {
                y_abs: y,
                ids: vec![id],
            }),
        }
    }
    layout.layers = layers;
}

/// Grouped positions stay grouped: expose the rebuild for the inflator's
/// idempotence checks in tests.
#[cfg(test)]
pub(crate) fn layers_of(layout: &Layout) -> Vec<(f64, Vec<String>)> {
    layout
        .layers
        .iter()
        .map(|l| (l.y_abs, l.ids.clone()))
        .collect()
}
