use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use inkdag::layout;

#[derive(Serialize)]
struct LevelStat {
    level: usize,
    nodes: usize,
}

#[derive(Serialize)]
struct ScoreStat {
    id: String,
    score: f64,
}

#[derive(Serialize)]
struct StatsJsonOutput {
    nodes: usize,
    edges: usize,
    condensed_groups: usize,
    crossings: usize,
    levels: Vec<LevelStat>,
    top_scores: Vec<ScoreStat>,
    canvas_width: f64,
    canvas_height: f64,
}

pub fn run(input: &Path, config: Option<&Path>, json: bool) -> Result<()> {
    let cfg = super::load_config(config)?;
    let diagram = super::load_document(input)?;

    let result = layout::compute(&diagram, &cfg)?;
    let layout = &result.layout;

    let max_level = layout.nodes.values().map(|n| n.level).max().unwrap_or(0);
    let levels: Vec<LevelStat> = (0..=max_level)
        .map(|level| LevelStat {
            level,
            nodes: layout.nodes.values().filter(|n| n.level == level).count(),
        })
        .filter(|stat| stat.nodes > 0)
        .collect();

    let mut top_scores: Vec<ScoreStat> = layout
        .nodes
        .values()
        .map(|n| ScoreStat {
            id: n.id.clone(),
            score: n.score,
        })
        .collect();
    top_scores.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    top_scores.truncate(5);

    let condensed_groups = layout
        .condensation
        .as_ref()
        .map(|c| c.groups.len())
        .unwrap_or(0);

    if json {
        let output = StatsJsonOutput {
            nodes: layout.nodes.len(),
            edges: layout.edges.len(),
            condensed_groups,
            crossings: layout.crossing_count,
            levels,
            top_scores,
            canvas_width: result.render.canvas.width,
            canvas_height: result.render.canvas.height,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{} nodes, {} edges, {} condensed group(s), {} crossing(s)",
        layout.nodes.len(),
        layout.edges.len(),
        condensed_groups,
        layout.crossing_count
    );
    for stat in &levels {
        println!("  level {}: {} node(s)", stat.level, stat.nodes);
    }
    if top_scores.iter().any(|s| s.score > 0.0) {
        println!("Top scores:");
        for stat in top_scores.iter().filter(|s| s.score > 0.0) {
            println!("  {}: {:.3}", stat.id, stat.score);
        }
    }
    println!(
        "Canvas: {}x{}",
        result.render.canvas.width, result.render.canvas.height
    );

    Ok(())
}
