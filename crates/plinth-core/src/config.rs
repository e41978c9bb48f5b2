// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Analysis parameters shared by the graph builder and the hypothesis loop.

/// Tunables for support analysis.
///
/// Missing fields deserialize to their defaults, so a partial JSON file is a
/// valid config.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct AnalysisConfig {
    /// Gravity magnitude in m/s² used to normalize support contributions.
    pub gravity_magnitude: f32,
    /// World scale factor applied to contact evidence.
    pub scaling: f32,
    /// Default simulation step in seconds.
    pub time_step: f32,
    /// Upper bound on ticks per hypothesis trial.
    pub max_ticks: u32,
    /// Linear speed (m/s) under which a body counts as settled.
    pub steady_linear_velocity: f32,
    /// Angular speed (rad/s) under which a body counts as settled.
    pub steady_angular_velocity: f32,
    /// Default overlap acceptance threshold on summed penetration depth.
    pub max_penetration_depth: f32,
    /// Default overlap acceptance threshold on summed intersecting volume.
    pub max_intersecting_volume: f32,
    /// Emit per-manifold diagnostics while building graphs.
    pub debug: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            gravity_magnitude: 9.81,
            scaling: 1.0,
            time_step: 1.0 / 120.0,
            max_ticks: 100,
            steady_linear_velocity: 1e-3,
            steady_angular_velocity: 1e-3,
            max_penetration_depth: 0.01,
            max_intersecting_volume: 1e-5,
            debug: false,
        }
    }
}

impl AnalysisConfig {
    /// Key under which the config is persisted.
    pub const STORE_KEY: &'static str = "analysis";
}
