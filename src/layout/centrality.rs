//! Centrality orderer (stage C).
//!
//! Assigns every abstract node a scalar used for horizontal centring: a
//! plain node keeps its accessibility score, a virtual-container
//! representative takes the maximum over its members. Each level is then
//! sorted by descending score; the sort is stable so document order remains
//! the final tiebreak.

use indexmap::IndexMap;

use crate::layout::Layout;

pub fn order(layout: &mut Layout) {
    let mut scores: IndexMap<String, f64> = IndexMap::new();

    for layer in &layout.layers {
        for id in &layer.ids {
            let score = match resolve_group(layout, id) {
                Some(members) => members
                    .iter()
                    .filter_map(|m| layout.nodes.get(m))
                    .map(|n| n.score)
                    .fold(0.0_f64, f64::max),
                None => layout.nodes.get(id).map(|n| n.score).unwrap_or(0.0),
            };
            scores.insert(id.clone(), score);
        }
    }

    for layer in &mut layout.layers {
        layer.ids.sort_by(|a, b| {
            let sa = scores.get(a).copied().unwrap_or(0.0);
            let sb = scores.get(b).copied().unwrap_or(0.0);
            sb.partial_cmp(&sa).unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    layout.abstract_score = scores;
}

/// Member list of a representative id, or `None` for a plain node.
fn resolve_group<'a>(layout: &'a Layout, id: &str) -> Option<&'a [String]> {
    let cond = layout.condensation.as_ref()?;
    cond.groups
        .iter()
        .find(|g| g.rep == id)
        .map(|g| g.members.as_slice())
}
