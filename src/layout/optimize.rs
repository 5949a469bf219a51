//! Position optimiser (stage P).
//!
//! Refines the abstract x coordinates layer by layer. For each layer,
//! holding its neighbours fixed, bisection finds the uniform offset that
//! minimises the weighted edge length over all edges incident on the layer.
//! A proximate edge counts its input weight; a skip edge is discounted by
//! its layer span. A uniform offset per layer cannot reorder nodes, so the
//! ordering invariant holds for free.

use std::collections::HashMap;

use crate::config::Config;
use crate::diag::DiagnosticKind;
use crate::layout::Layout;

pub fn refine(layout: &mut Layout, config: &Config) {
    if layout.layers.len() < 2 {
        return;
    }

    let layer_of: HashMap<String, usize> = layout
        .layers
        .iter()
        .enumerate()
        .flat_map(|(li, layer)| layer.ids.iter().map(move |id| (id.clone(), li)))
        .collect();

    // (abstract tail, abstract head, effective weight) for every input edge.
    let terms: Vec<(String, String, f64)> = layout
        .structure
        .abstract_weighted_edges
        .iter()
        .filter_map(|(a, b, w)| {
            let la = *layer_of.get(a.as_str())?;
            let lb = *layer_of.get(b.as_str())?;
            let span = la.abs_diff(lb);
            if span == 0 {
                return None;
            }
            let discount = if span == 1 { 1.0 } else { 1.0 / span as f64 };
            Some((a.clone(), b.clone(), w * discount))
        })
        .collect();

    if terms.is_empty() {
        return;
    }

    let passes = config.optimizer_passes;
    let mut converged = false;
    for pass in 0..passes {
        let mut max_delta = 0.0_f64;
        for li in 0..layout.layers.len() {
            let delta = apply_layer_offset(layout, li, &layer_of, &terms);
            max_delta = max_delta.max(delta.abs());
        }
        for li in (0..layout.layers.len()).rev() {
            let delta = apply_layer_offset(layout, li, &layer_of, &terms);
            max_delta = max_delta.max(delta.abs());
        }
        tracing::debug!(pass, max_delta, "optimiser pass");
        if max_delta < config.optimizer_tolerance {
            converged = true;
            break;
        }
    }

    if !converged {
        layout.warn(
            DiagnosticKind::BudgetExceeded,
            format!(
                "position optimiser did not converge within {} passes; best result kept",
                passes
            ),
        );
    }
}

/// Find and apply the best offset for one layer. Returns the offset.
fn apply_layer_offset(
    layout: &mut Layout,
    layer_index: usize,
    layer_of: &HashMap<String, usize>,
    terms: &[(String, String, f64)],
) -> f64 {
    // Residuals: the offset that would align each incident edge exactly.
    let mut residuals: Vec<(f64, f64)> = Vec::new();
    for (a, b, w) in terms {
        let la = layer_of[a.as_str()];
        let lb = layer_of[b.as_str()];
        let xa = layout.abstract_pos[a.as_str()].0;
        let xb = layout.abstract_pos[b.as_str()].0;
        if la == layer_index && lb != layer_index {
            residuals.push((xb - xa, *w));
        } else if lb == layer_index && la != layer_index {
            residuals.push((xa - xb, *w));
        }
    }
    if residuals.is_empty() {
        return 0.0;
    }

    let delta = bisect_offset(&residuals);
    if delta != 0.0 {
        let ids = layout.layers[layer_index].ids.clone();
        for id in ids {
            if let Some(pos) = layout.abstract_pos.get_mut(&id) {
                pos.0 += delta;
            }
        }
    }
    delta
}

/// Bisection on the subgradient of f(d) = sum w * |d - r|, which is convex
/// and piecewise linear. The minimiser lies within the residual range; when
/// the minimum is a flat interval, both interval ends are located and the
/// midpoint is returned so symmetric layers settle instead of drifting.
fn bisect_offset(residuals: &[(f64, f64)]) -> f64 {
    let lo = residuals
        .iter()
        .map(|(r, _)| *r)
        .fold(f64::INFINITY, f64::min);
    let hi = residuals
        .iter()
        .map(|(r, _)| *r)
        .fold(f64::NEG_INFINITY, f64::max);
    if lo >= hi {
        return lo;
    }

    let gradient = |d: f64| -> f64 {
        residuals
            .iter()
            .map(|(r, w)| if d > *r { *w } else if d < *r { -*w } else { 0.0 })
            .sum()
    };

    // Lower end: where the gradient stops being negative.
    let (mut a_lo, mut a_hi) = (lo, hi);
    for _ in 0..60 {
        let mid = (a_lo + a_hi) / 2.0;
        if gradient(mid) < 0.0 {
            a_lo = mid;
        } else {
            a_hi = mid;
        }
        if a_hi - a_lo < 1e-9 {
            break;
        }
    }
    // Upper end: where the gradient starts being positive.
    let (mut b_lo, mut b_hi) = (lo, hi);
    for _ in 0..60 {
        let mid = (b_lo + b_hi) / 2.0;
        if gradient(mid) > 0.0 {
            b_hi = mid;
        } else {
            b_lo = mid;
        }
        if b_hi - b_lo < 1e-9 {
            break;
        }
    }

    (a_hi + b_lo) / 2.0
}
