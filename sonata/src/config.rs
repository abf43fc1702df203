//! Solver configuration.
use serde::Deserialize;

/// Configurable parameters used during solving.
///
/// Deserializable so partial configurations can be read from TOML files, with missing entries kept
/// at their defaults.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// Multiplicative decay for the VSIDS decision heuristic. (Default: 0.95)
    pub vsids_decay: f32,

    /// Scaling factor for Luby sequence based restarts (number of conflicts). (Default: 128)
    pub luby_restart_interval_scale: u64,

    /// Number of conflicts between reductions of the learned clause database. (Default: 15000)
    pub reduce_interval: u64,
}

impl Default for SolverConfig {
    fn default() -> SolverConfig {
        SolverConfig {
            vsids_decay: 0.95,
            luby_restart_interval_scale: 128,
            reduce_interval: 15000,
        }
    }
}
