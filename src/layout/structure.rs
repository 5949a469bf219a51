//! Structure analyser (stage S).
//!
//! Builds the derived structures every later stage reads: the containment
//! tree, the connection and reverse-connection graphs, longest-path
//! topological levels, accessibility scores, and virtual-container
//! condensation with its abstract representative graph.

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexMap;
use petgraph::algo::tarjan_scc;
use petgraph::graph::DiGraph;

use crate::config::Config;
use crate::diag::{DiagnosticKind, LayoutError};
use crate::layout::{Condensation, Layout, VcGroup};

/// Run the full structural analysis.
pub fn analyse(layout: &mut Layout, config: &Config) -> Result<(), LayoutError> {
    build_containment(layout)?;
    build_adjacency(layout);
    compute_levels(layout, config);
    compute_scores(layout, config);
    detect_condensation(layout, config);
    build_abstract_graph(layout, config);
    Ok(())
}

// ── Containment tree ────────────────────────────────────────────────────

fn build_containment(layout: &mut Layout) -> Result<(), LayoutError> {
    let ids: Vec<String> = layout.nodes.keys().cloned().collect();

    // Assign parents; prune dangling and doubly-claimed children.
    for container_id in &ids {
        let children = layout.nodes.get(container_id).unwrap().children.clone();
        if children.is_empty() {
            continue;
        }
        let mut kept = Vec::new();
        for child in children {
            if child.id == *container_id {
                return Err(LayoutError::ContainmentCycle {
                    id: child.id.clone(),
                });
            }
            if !layout.nodes.contains_key(&child.id) {
                layout.warn(
                    DiagnosticKind::Reference,
                    format!(
                        "container '{}' references unknown child '{}'",
                        container_id, child.id
                    ),
                );
                continue;
            }
            if layout.nodes.get(&child.id).unwrap().parent.is_some() {
                layout.warn(
                    DiagnosticKind::Reference,
                    format!(
                        "'{}' is already contained; membership in '{}' ignored",
                        child.id, container_id
                    ),
                );
                continue;
            }
            layout.nodes.get_mut(&child.id).unwrap().parent = Some(container_id.clone());
            kept.push(child);
        }
        layout.nodes.get_mut(container_id).unwrap().children = kept;
    }

    // With single parents enforced, a cycle can only be a parent chain that
    // closes on itself. Detect it as a non-trivial strongly connected
    // component of the parent -> child graph.
    let mut graph = DiGraph::<(), ()>::new();
    let mut index_of = HashMap::new();
    for id in layout.nodes.keys() {
        index_of.insert(id.clone(), graph.add_node(()));
    }
    for node in layout.nodes.values() {
        if let Some(parent) = &node.parent {
            graph.add_edge(index_of[parent], index_of[&node.id], ());
        }
    }
    for scc in tarjan_scc(&graph) {
        if scc.len() > 1 {
            let id = layout
                .nodes
                .keys()
                .find(|k| scc.contains(&index_of[*k]))
                .cloned()
                .unwrap_or_default();
            return Err(LayoutError::ContainmentCycle { id });
        }
    }

    // Depths and the primary node list.
    for id in &ids {
        let mut depth = 0;
        let mut current = id.clone();
        while let Some(parent) = layout.nodes.get(&current).and_then(|n| n.parent.clone()) {
            depth += 1;
            current = parent;
        }
        layout.nodes.get_mut(id).unwrap().depth = depth;
    }

    layout.structure.primary = layout
        .nodes
        .values()
        .filter(|n| n.parent.is_none())
        .map(|n| n.id.clone())
        .collect();
    layout.structure.max_children = layout
        .nodes
        .values()
        .map(|n| n.children.len())
        .max()
        .unwrap_or(0);

    Ok(())
}

// ── Connection graphs ───────────────────────────────────────────────────

fn build_adjacency(layout: &mut Layout) {
    let mut adjacency: IndexMap<String, Vec<String>> = layout
        .nodes
        .keys()
        .map(|k| (k.clone(), Vec::new()))
        .collect();
    let mut reverse = adjacency.clone();

    for i in 0..layout.edges.len() {
        let (from, to, self_loop) = {
            let edge = &layout.edges[i];
            (edge.from.clone(), edge.to.clone(), edge.is_self_loop())
        };
        if !layout.nodes.contains_key(&from) || !layout.nodes.contains_key(&to) {
            layout.edges[i].dropped = true;
            layout.warn(
                DiagnosticKind::Reference,
                format!("edge '{}' -> '{}' dropped: endpoint not found", from, to),
            );
            continue;
        }
        // Self-loops are routed later but carry no topological information.
        if self_loop {
            continue;
        }
        adjacency.get_mut(&from).unwrap().push(to.clone());
        reverse.get_mut(&to).unwrap().push(from);
    }

    layout.structure.adjacency = adjacency;
    layout.structure.reverse = reverse;
}

// ── Topological levels (longest path) ───────────────────────────────────

/// Longest-path level assignment over an adjacency map.
///
/// Cycles are tolerated: each one is broken at the edge whose target has the
/// highest indegree, and the broken edges are reported back to the caller.
/// When `inherit_terminals` is set, nodes with no outgoing edges take their
/// deepest predecessor's level instead of incrementing past it.
pub(crate) fn longest_path_levels(
    order: &[String],
    adjacency: &IndexMap<String, Vec<String>>,
    inherit_terminals: bool,
) -> (IndexMap<String, usize>, Vec<(String, String)>) {
    let mut adj = adjacency.clone();
    let mut broken = Vec::new();

    // Break one cycle per round until the graph is acyclic.
    loop {
        let Some(scc) = first_cyclic_scc(order, &adj) else {
            break;
        };
        let in_scc: HashSet<&str> = scc.iter().map(String::as_str).collect();
        let mut indegree: HashMap<&str, usize> = HashMap::new();
        for succs in adj.values() {
            for s in succs {
                *indegree.entry(s.as_str()).or_insert(0) += 1;
            }
        }
        // First edge (in insertion order) whose target maximizes indegree.
        let mut choice: Option<(String, String, usize)> = None;
        for id in order {
            if !in_scc.contains(id.as_str()) {
                continue;
            }
            for succ in adj.get(id).map(|v| v.as_slice()).unwrap_or(&[]) {
                if !in_scc.contains(succ.as_str()) {
                    continue;
                }
                let deg = indegree.get(succ.as_str()).copied().unwrap_or(0);
                let better = match &choice {
                    Some((_, _, best)) => deg > *best,
                    None => true,
                };
                if better {
                    choice = Some((id.clone(), succ.clone(), deg));
                }
            }
        }
        let (u, v, _) = choice.expect("cyclic SCC must contain an internal edge");
        if let Some(succs) = adj.get_mut(&u) {
            if let Some(pos) = succs.iter().position(|s| *s == v) {
                succs.remove(pos);
            }
        }
        broken.push((u, v));
    }

    // Queue-seeded relaxation from indegree-zero nodes.
    let mut indegree: IndexMap<&str, usize> = order.iter().map(|id| (id.as_str(), 0)).collect();
    for succs in adj.values() {
        for s in succs {
            if let Some(deg) = indegree.get_mut(s.as_str()) {
                *deg += 1;
            }
        }
    }
    let mut level: IndexMap<String, usize> = order.iter().map(|id| (id.clone(), 0)).collect();
    let mut queue: VecDeque<String> = order
        .iter()
        .filter(|id| indegree.get(id.as_str()) == Some(&0))
        .cloned()
        .collect();

    while let Some(u) = queue.pop_front() {
        let u_level = *level.get(&u).unwrap();
        let succs = adj.get(&u).cloned().unwrap_or_default();
        for v in succs {
            let is_terminal = adj.get(&v).map(|s| s.is_empty()).unwrap_or(true);
            let candidate = if inherit_terminals && is_terminal {
                u_level
            } else {
                u_level + 1
            };
            let entry = level.get_mut(&v).unwrap();
            if candidate > *entry {
                *entry = candidate;
            }
            let deg = indegree.get_mut(v.as_str()).unwrap();
            *deg = deg.saturating_sub(1);
            if *deg == 0 {
                queue.push_back(v);
            }
        }
    }

    (level, broken)
}

fn first_cyclic_scc(
    order: &[String],
    adj: &IndexMap<String, Vec<String>>,
) -> Option<Vec<String>> {
    let mut graph = DiGraph::<(), ()>::new();
    let mut index_of = HashMap::new();
    for id in order {
        index_of.insert(id.clone(), graph.add_node(()));
    }
    for (from, succs) in adj {
        for to in succs {
            if let (Some(&a), Some(&b)) = (index_of.get(from), index_of.get(to)) {
                graph.add_edge(a, b, ());
            }
        }
    }
    let id_of: HashMap<_, _> = index_of.iter().map(|(k, v)| (*v, k.clone())).collect();
    tarjan_scc(&graph)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .map(|scc| scc.into_iter().map(|ix| id_of[&ix].clone()).collect())
        .next()
}

fn compute_levels(layout: &mut Layout, config: &Config) {
    let order: Vec<String> = layout.nodes.keys().cloned().collect();
    let (levels, broken) = longest_path_levels(
        &order,
        &layout.structure.adjacency,
        config.terminal_inherit_level,
    );
    for (id, lvl) in &levels {
        layout.nodes.get_mut(id).unwrap().level = *lvl;
    }
    for (u, v) in broken {
        layout.warn(
            DiagnosticKind::EdgeCycle,
            format!("edge cycle broken at '{}' -> '{}' for level assignment", u, v),
        );
    }
}

// ── Accessibility scores ────────────────────────────────────────────────

fn compute_scores(layout: &mut Layout, config: &Config) {
    let ids: Vec<String> = layout.nodes.keys().cloned().collect();
    for id in &ids {
        let level = layout.nodes.get(id).unwrap().level;
        let preds = layout
            .structure
            .reverse
            .get(id)
            .cloned()
            .unwrap_or_default();

        // A parent more than one level away marks a skip connection.
        let has_skip = preds.iter().any(|p| {
            let p_level = layout.nodes.get(p).map(|n| n.level).unwrap_or(0);
            level > p_level && level - p_level > 1
        });
        let w_precedence = if has_skip { 1.0 } else { 0.0 };

        let w_children = layout
            .structure
            .adjacency
            .get(id)
            .map(|s| s.len())
            .unwrap_or(0) as f64;

        let same_level_parents = preds
            .iter()
            .filter(|p| layout.nodes.get(*p).map(|n| n.level) == Some(level))
            .count();
        let w_fanin = same_level_parents.saturating_sub(1) as f64;

        let score = config.score_alpha * w_precedence
            + config.score_beta * w_children
            + config.score_gamma * w_fanin;
        layout.nodes.get_mut(id).unwrap().score = score;
    }
}

// ── Virtual-container condensation ──────────────────────────────────────

type Signature = (Vec<String>, Vec<String>);

fn detect_condensation(layout: &mut Layout, config: &Config) {
    let mut by_signature: IndexMap<Signature, Vec<String>> = IndexMap::new();

    for id in &layout.structure.primary {
        let node = layout.nodes.get(id).unwrap();
        if node.is_container() || node.pinned.is_some() {
            continue;
        }
        let mut out: Vec<String> = layout
            .structure
            .adjacency
            .get(id)
            .cloned()
            .unwrap_or_default();
        out.sort();
        out.dedup();
        let mut inn: Vec<String> = layout
            .structure
            .reverse
            .get(id)
            .cloned()
            .unwrap_or_default();
        inn.sort();
        inn.dedup();
        if out.is_empty() && inn.is_empty() {
            continue;
        }
        let pivots: HashSet<&String> = out.iter().chain(inn.iter()).collect();
        if pivots.len() > config.vc_max_pivots {
            continue;
        }
        by_signature.entry((out, inn)).or_default().push(id.clone());
    }

    let mut groups = Vec::new();
    let mut rep_of = IndexMap::new();
    for (_, members) in by_signature {
        if members.len() < config.vc_min_members {
            continue;
        }
        let index = groups.len();
        let mut rep = format!("ndpr{}", index);
        while layout.nodes.contains_key(&rep) {
            rep.push('_');
        }
        for member in &members {
            layout.nodes.get_mut(member).unwrap().cluster = Some(index);
            rep_of.insert(member.clone(), index);
        }
        tracing::debug!(rep = %rep, members = members.len(), "condensed virtual container");
        groups.push(VcGroup { rep, members });
    }

    if !groups.is_empty() {
        layout.condensation = Some(Condensation { groups, rep_of });
    }
}

// ── Abstract representative graph ───────────────────────────────────────

fn build_abstract_graph(layout: &mut Layout, config: &Config) {
    let cond = layout.condensation.clone().unwrap_or_default();

    let mut abstract_order: Vec<String> = Vec::new();
    let mut seen = HashSet::new();
    for id in &layout.structure.primary {
        let aid = cond.abstract_id(id).to_string();
        if seen.insert(aid.clone()) {
            abstract_order.push(aid);
        }
    }

    let mut adjacency: IndexMap<String, Vec<String>> = abstract_order
        .iter()
        .map(|id| (id.clone(), Vec::new()))
        .collect();
    let mut reverse = adjacency.clone();
    let mut edges = Vec::new();
    let mut weighted = Vec::new();
    let mut seen_edges = HashSet::new();

    let resolved: Vec<(String, String, f64)> = layout
        .edges
        .iter()
        .filter(|e| !e.dropped && !e.is_self_loop())
        .map(|e| {
            let a = cond
                .abstract_id(layout.primary_ancestor(&e.from))
                .to_string();
            let b = cond.abstract_id(layout.primary_ancestor(&e.to)).to_string();
            (a, b, e.weight)
        })
        .collect();

    for (a, b, weight) in resolved {
        if a == b {
            continue;
        }
        weighted.push((a.clone(), b.clone(), weight));
        if seen_edges.insert((a.clone(), b.clone())) {
            adjacency.get_mut(&a).unwrap().push(b.clone());
            reverse.get_mut(&b).unwrap().push(a.clone());
            edges.push((a, b));
        }
    }

    let (levels, _) = longest_path_levels(&abstract_order, &adjacency, config.terminal_inherit_level);

    layout.structure.abstract_adjacency = adjacency;
    layout.structure.abstract_reverse = reverse;
    layout.structure.abstract_edges = edges;
    layout.structure.abstract_weighted_edges = weighted;
    layout.structure.abstract_level = levels;
}
