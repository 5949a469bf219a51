//! Topology tagger (stage T).
//!
//! Pure decorator: groups abstract nodes into per-level ordered sequences
//! for the placer and emits diagnostic surfaces (level histogram, top
//! scores) on the debug log. No layout effect.

use crate::layout::{Layer, Layout};

pub fn tag(layout: &mut Layout) {
    let max_level = layout
        .structure
        .abstract_level
        .values()
        .copied()
        .max()
        .unwrap_or(0);

    let mut layers = Vec::new();
    for level in 0..=max_level {
        // Abstract node order follows the document order of the underlying
        // primaries, which keeps downstream ordering deterministic.
        let ids: Vec<String> = layout
            .structure
            .abstract_level
            .iter()
            .filter(|(_, l)| **l == level)
            .map(|(id, _)| id.clone())
            .collect();
        if !ids.is_empty() {
            layers.push(Layer {
                y_abs: level as f64,
                ids,
            });
        }
    }

    for layer in &layers {
        tracing::debug!(
            level = layer.y_abs,
            nodes = layer.ids.len(),
            "level population"
        );
    }
    let mut top: Vec<(&String, f64)> = layout
        .nodes
        .values()
        .map(|n| (&n.id, n.score))
        .collect();
    top.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    for (id, score) in top.iter().take(5) {
        if *score > 0.0 {
            tracing::debug!(%id, score, "top accessibility score");
        }
    }

    layout.layers = layers;
}
