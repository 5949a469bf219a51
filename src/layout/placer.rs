//! Abstract placer (stage A).
//!
//! Sugiyama-style placement on the abstract graph: layering comes from the
//! topological levels, ordering within each layer runs bidirectional
//! barycenter sweeps with keep-best crossing counting, and the continuous x
//! assignment centres each layer around zero with a centrality-weighted
//! pull toward the middle.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::config::Config;
use crate::geometry::{segments_cross, Point};
use crate::layout::{Layer, Layout};

pub fn place(layout: &mut Layout, config: &Config) {
    if layout.layers.is_empty() {
        return;
    }

    let adjacency = layout.structure.abstract_adjacency.clone();
    let reverse = layout.structure.abstract_reverse.clone();
    let edges = layout.structure.abstract_edges.clone();
    let scores = layout.abstract_score.clone();
    let ys: Vec<f64> = layout.layers.iter().map(|l| l.y_abs).collect();

    let mut orders: Vec<Vec<String>> = layout.layers.iter().map(|l| l.ids.clone()).collect();
    let mut best = orders.clone();
    let mut best_crossings = count_crossings(&best, &edges);

    for sweep in 0..config.ordering_sweeps {
        for i in 1..orders.len() {
            reorder_layer(&mut orders, i, Direction::FromAbove, &adjacency, &reverse, &scores, config);
        }
        if orders.len() >= 2 {
            for i in (0..orders.len() - 1).rev() {
                reorder_layer(&mut orders, i, Direction::FromBelow, &adjacency, &reverse, &scores, config);
            }
        }
        let crossings = count_crossings(&orders, &edges);
        tracing::debug!(sweep, crossings, best_crossings, "barycenter sweep");
        if crossings < best_crossings {
            best_crossings = crossings;
            best = orders.clone();
        }
        if best_crossings == 0 {
            break;
        }
    }

    // Continuous x: unit spacing centred around 0, then the centrality
    // blend pulls high-score nodes inward by at most the configured share
    // of their offset. A small forward clamp keeps the layer ordering
    // strictly monotone when the blend compresses neighbours.
    let mut positions: IndexMap<String, (f64, f64)> = IndexMap::new();
    for (li, ids) in best.iter().enumerate() {
        let n = ids.len();
        let max_score = ids
            .iter()
            .map(|id| scores.get(id).copied().unwrap_or(0.0))
            .fold(0.0_f64, f64::max);
        let mut xs: Vec<f64> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let x = i as f64 - (n as f64 - 1.0) / 2.0;
                if max_score > 0.0 {
                    let pull = scores.get(id).copied().unwrap_or(0.0) / max_score;
                    x * (1.0 - config.score_center_influence * pull)
                } else {
                    x
                }
            })
            .collect();
        for i in 1..n {
            if xs[i] <= xs[i - 1] {
                xs[i] = xs[i - 1] + 0.05;
            }
        }
        for (i, id) in ids.iter().enumerate() {
            positions.insert(id.clone(), (xs[i], ys[li]));
        }
    }

    layout.abstract_pos = positions;
    layout.layers = best
        .into_iter()
        .enumerate()
        .map(|(li, ids)| Layer { y_abs: ys[li], ids })
        .collect();
    layout.crossing_count = best_crossings;
}

#[derive(Clone, Copy, PartialEq)]
enum Direction {
    /// Forward sweep: barycenter over predecessors one layer up.
    FromAbove,
    /// Backward sweep: barycenter over successors one layer down.
    FromBelow,
}

fn reorder_layer(
    orders: &mut [Vec<String>],
    layer: usize,
    direction: Direction,
    adjacency: &IndexMap<String, Vec<String>>,
    reverse: &IndexMap<String, Vec<String>>,
    scores: &IndexMap<String, f64>,
    config: &Config,
) {
    let other_layer = match direction {
        Direction::FromAbove => layer - 1,
        Direction::FromBelow => layer + 1,
    };
    let other_pos: HashMap<&str, f64> = orders[other_layer]
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i as f64))
        .collect();
    let own_pos: HashMap<&str, f64> = orders[layer]
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i as f64))
        .collect();

    let mut keyed: Vec<(f64, f64, String)> = orders[layer]
        .iter()
        .map(|id| {
            let cross_neighbors = match direction {
                Direction::FromAbove => reverse.get(id),
                Direction::FromBelow => adjacency.get(id),
            };
            let mut weighted_sum = 0.0;
            let mut weight_total = 0.0;
            for n in cross_neighbors.map(|v| v.as_slice()).unwrap_or(&[]) {
                if let Some(p) = other_pos.get(n.as_str()) {
                    weighted_sum += config.cross_level_weight * p;
                    weight_total += config.cross_level_weight;
                }
            }
            // Same-level edges contribute with the reduced weight so they
            // pull without dominating.
            for n in adjacency
                .get(id)
                .into_iter()
                .chain(reverse.get(id))
                .flatten()
            {
                if n != id {
                    if let Some(p) = own_pos.get(n.as_str()) {
                        weighted_sum += config.same_level_weight * p;
                        weight_total += config.same_level_weight;
                    }
                }
            }
            let barycenter = if weight_total > 0.0 {
                weighted_sum / weight_total
            } else {
                own_pos[id.as_str()]
            };
            let score = scores.get(id).copied().unwrap_or(0.0);
            (barycenter, score, id.clone())
        })
        .collect();

    keyed.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal))
            .then_with(|| a.2.cmp(&b.2))
    });

    orders[layer] = keyed.into_iter().map(|(_, _, id)| id).collect();
}

/// Geometric crossing count over the provisional layer coordinates.
pub(crate) fn count_crossings(orders: &[Vec<String>], edges: &[(String, String)]) -> usize {
    let mut coords: HashMap<&str, Point> = HashMap::new();
    for (li, ids) in orders.iter().enumerate() {
        let n = ids.len();
        for (i, id) in ids.iter().enumerate() {
            let x = i as f64 - (n as f64 - 1.0) / 2.0;
            coords.insert(id.as_str(), Point::new(x, li as f64));
        }
    }

    let segments: Vec<(Point, Point)> = edges
        .iter()
        .filter_map(|(a, b)| {
            match (coords.get(a.as_str()), coords.get(b.as_str())) {
                (Some(&pa), Some(&pb)) => Some((pa, pb)),
                _ => None,
            }
        })
        .collect();

    let mut crossings = 0;
    for i in 0..segments.len() {
        for j in (i + 1)..segments.len() {
            if segments_cross(segments[i].0, segments[i].1, segments[j].0, segments[j].1) {
                crossings += 1;
            }
        }
    }
    crossings
}
