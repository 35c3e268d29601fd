//! Configuration types for procflow layout and routing.
//!
//! All types implement [`serde::Deserialize`] with per-field defaults, so a
//! configuration file only needs to name the values it overrides.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining layout and routing settings.
//! - [`LayoutConfig`] - Separation constants used by the rank layout adapter.
//! - [`RoutingConfig`] - Label wrapping and explicit path offsets used by edge routing.
//!
//! # Example
//!
//! ```
//! # use procflow::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.routing().label_wrap_width(), 15);
//! assert_eq!(config.layout().rank_separation(true), 250.0);
//! ```

use serde::Deserialize;

/// Top-level configuration combining layout and routing settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Routing configuration section.
    #[serde(default)]
    routing: RoutingConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    ///
    /// # Arguments
    ///
    /// * `layout` - Rank layout separation settings.
    /// * `routing` - Edge routing settings.
    pub fn new(layout: LayoutConfig, routing: RoutingConfig) -> Self {
        Self { layout, routing }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the routing configuration.
    pub fn routing(&self) -> &RoutingConfig {
        &self.routing
    }
}

/// Separation constants for the rank layout adapter.
///
/// Rank separation is the gap between consecutive ranks along the flow
/// direction; node separation is the gap between neighbours inside a rank.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    rank_separation: f32,
    decision_rank_separation: f32,
    top_down_rank_factor: f32,
    node_separation: f32,
    margin: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            rank_separation: 200.0,
            decision_rank_separation: 250.0,
            top_down_rank_factor: 1.5,
            node_separation: 60.0,
            margin: 50.0,
        }
    }
}

impl LayoutConfig {
    /// Returns the base rank separation, raised when the graph has a decision node.
    ///
    /// The top-down factor is applied separately by the layout adapter.
    pub fn rank_separation(&self, has_decision: bool) -> f32 {
        if has_decision {
            self.decision_rank_separation
        } else {
            self.rank_separation
        }
    }

    /// Multiplier applied to the rank separation for top-down layouts.
    pub fn top_down_rank_factor(&self) -> f32 {
        self.top_down_rank_factor
    }

    /// Returns the gap between neighbouring nodes of one rank.
    pub fn node_separation(&self) -> f32 {
        self.node_separation
    }

    /// Returns the empty border around the laid-out graph.
    pub fn margin(&self) -> f32 {
        self.margin
    }
}

/// Settings for edge routing and label placement.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    label_wrap_width: usize,
    reverse_offset: f32,
    loop_reach: f32,
    loop_rise: f32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            label_wrap_width: 15,
            reverse_offset: 50.0,
            loop_reach: 150.0,
            loop_rise: 100.0,
        }
    }
}

impl RoutingConfig {
    /// Maximum line length, in characters, before an edge label wraps.
    pub fn label_wrap_width(&self) -> usize {
        self.label_wrap_width
    }

    /// Offset applied to both endpoints of a reverse edge's explicit path.
    pub fn reverse_offset(&self) -> f32 {
        self.reverse_offset
    }

    /// How far a self-loop reaches out from the node's right side.
    pub fn loop_reach(&self) -> f32 {
        self.loop_reach
    }

    /// How far a self-loop rises above its source anchor.
    pub fn loop_rise(&self) -> f32 {
        self.loop_rise
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_default_layout_constants() {
        let layout = LayoutConfig::default();

        assert_approx_eq!(f32, layout.rank_separation(false), 200.0);
        assert_approx_eq!(f32, layout.rank_separation(true), 250.0);
        assert_approx_eq!(f32, layout.top_down_rank_factor(), 1.5);
        assert_approx_eq!(f32, layout.node_separation(), 60.0);
        assert_approx_eq!(f32, layout.margin(), 50.0);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let json = r#"{"routing": {"label_wrap_width": 20}}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.routing().label_wrap_width(), 20);
        assert_approx_eq!(f32, config.routing().loop_reach(), 150.0);
        assert_approx_eq!(f32, config.layout().margin(), 50.0);
    }
}
