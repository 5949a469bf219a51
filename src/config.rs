//! Pipeline configuration.
//!
//! Every tunable constant of the layout pipeline lives here as a field of an
//! immutable [`Config`] value. Stages read it and never write it. Defaults
//! are compiled in; a TOML file can override individual fields via
//! [`Config::load`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Immutable layout configuration passed to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base icon width in pixels.
    #[serde(default = "default_icon_width")]
    pub icon_width: f64,

    /// Base icon height in pixels.
    #[serde(default = "default_icon_height")]
    pub icon_height: f64,

    /// Initial canvas width when the document carries no hint.
    #[serde(default = "default_canvas_width")]
    pub canvas_width: f64,

    /// Initial canvas height when the document carries no hint.
    #[serde(default = "default_canvas_height")]
    pub canvas_height: f64,

    /// Accessibility score weight for skip-connection precedence.
    #[serde(default = "default_score_alpha")]
    pub score_alpha: f64,

    /// Accessibility score weight per outgoing edge.
    #[serde(default = "default_score_beta")]
    pub score_beta: f64,

    /// Accessibility score weight per same-level extra parent.
    #[serde(default = "default_score_gamma")]
    pub score_gamma: f64,

    /// Number of bidirectional barycenter sweep iterations.
    #[serde(default = "default_ordering_sweeps")]
    pub ordering_sweeps: usize,

    /// Barycenter contribution weight of a same-level edge.
    #[serde(default = "default_same_level_weight")]
    pub same_level_weight: f64,

    /// Barycenter contribution weight of a cross-level edge.
    #[serde(default = "default_cross_level_weight")]
    pub cross_level_weight: f64,

    /// Maximum fraction of a node's offset that centrality may pull toward
    /// the layer centre.
    #[serde(default = "default_score_center_influence")]
    pub score_center_influence: f64,

    /// Minimum pixel gap between adjacent node rectangles in one level.
    #[serde(default = "default_min_horizontal_gap")]
    pub min_horizontal_gap: f64,

    /// Vertical pixel gap between consecutive levels after redistribution.
    #[serde(default = "default_vertical_gap")]
    pub vertical_gap: f64,

    /// Maximum position-optimiser passes before giving up.
    #[serde(default = "default_optimizer_passes")]
    pub optimizer_passes: usize,

    /// Convergence threshold for the position optimiser (max |offset|).
    #[serde(default = "default_optimizer_tolerance")]
    pub optimizer_tolerance: f64,

    /// Horizontal spacing between sibling members of an expanded virtual
    /// container, in abstract units.
    #[serde(default = "default_member_spacing")]
    pub member_spacing: f64,

    /// Vertical spacing between sub-levels of an expanded virtual container,
    /// in abstract units.
    #[serde(default = "default_sublevel_spacing")]
    pub sublevel_spacing: f64,

    /// Minimum member count for virtual-container condensation.
    #[serde(default = "default_vc_min_members")]
    pub vc_min_members: usize,

    /// Maximum pivot-set size for virtual-container condensation.
    #[serde(default = "default_vc_max_pivots")]
    pub vc_max_pivots: usize,

    /// Estimated label width per character, in pixels.
    #[serde(default = "default_label_char_width")]
    pub label_char_width: f64,

    /// Estimated label height per line, in pixels.
    #[serde(default = "default_label_line_height")]
    pub label_line_height: f64,

    /// Radial edge attachment offset for ordinary icon nodes.
    #[serde(default = "default_edge_offset")]
    pub edge_offset: f64,

    /// Radial edge attachment offset for cloud-kind nodes.
    #[serde(default = "default_cloud_edge_offset")]
    pub cloud_edge_offset: f64,

    /// Distance of self-loop endpoints from the side midpoint, in pixels.
    #[serde(default = "default_self_loop_offset")]
    pub self_loop_offset: f64,

    /// Default radius for self-loop arcs when the routing spec omits one.
    #[serde(default = "default_self_loop_radius")]
    pub self_loop_radius: f64,

    /// Margin added around all drawables for the final canvas.
    #[serde(default = "default_canvas_margin")]
    pub canvas_margin: f64,

    /// Safety margin routes must keep from the canvas edge.
    #[serde(default = "default_route_safety_margin")]
    pub route_safety_margin: f64,

    /// When true, nodes with no outgoing edges inherit the level of their
    /// deepest predecessor instead of incrementing past it. Off by default;
    /// the incrementing rule keeps terminals on their own level.
    #[serde(default)]
    pub terminal_inherit_level: bool,
}

fn default_icon_width() -> f64 {
    80.0
}

fn default_icon_height() -> f64 {
    50.0
}

fn default_canvas_width() -> f64 {
    1400.0
}

fn default_canvas_height() -> f64 {
    900.0
}

fn default_score_alpha() -> f64 {
    0.025
}

fn default_score_beta() -> f64 {
    0.015
}

fn default_score_gamma() -> f64 {
    0.010
}

fn default_ordering_sweeps() -> usize {
    4
}

fn default_same_level_weight() -> f64 {
    0.30
}

fn default_cross_level_weight() -> f64 {
    0.70
}

fn default_score_center_influence() -> f64 {
    0.3
}

fn default_min_horizontal_gap() -> f64 {
    30.0
}

fn default_vertical_gap() -> f64 {
    100.0
}

fn default_optimizer_passes() -> usize {
    10
}

fn default_optimizer_tolerance() -> f64 {
    0.001
}

fn default_member_spacing() -> f64 {
    0.4
}

fn default_sublevel_spacing() -> f64 {
    1.0
}

fn default_vc_min_members() -> usize {
    3
}

fn default_vc_max_pivots() -> usize {
    3
}

fn default_label_char_width() -> f64 {
    8.0
}

fn default_label_line_height() -> f64 {
    18.0
}

fn default_edge_offset() -> f64 {
    30.0
}

fn default_cloud_edge_offset() -> f64 {
    35.0
}

fn default_self_loop_offset() -> f64 {
    20.0
}

fn default_self_loop_radius() -> f64 {
    50.0
}

fn default_canvas_margin() -> f64 {
    250.0
}

fn default_route_safety_margin() -> f64 {
    50.0
}

impl Default for Config {
    fn default() -> Self {
        // Round-trips through an empty TOML table so every field picks up
        // its serde default.
        toml::from_str("").expect("empty config must deserialize")
    }
}

impl Config {
    /// Load a configuration from a TOML file, filling missing fields with
    /// defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Base horizontal spacing between abstract columns, in pixels.
    ///
    /// Wide containers need wider columns, so the spacing scales with the
    /// largest direct-child count over all containers.
    pub fn horizontal_spacing(&self, max_children: usize) -> f64 {
        (20.0 * self.icon_width).max(3.0 * max_children as f64 * self.icon_width)
    }

    /// Base vertical spacing between abstract layers, in pixels.
    pub fn vertical_spacing(&self, max_children: usize) -> f64 {
        1.5 * self.horizontal_spacing(max_children)
    }
}
