use cad_kernel::Tolerance;
use serde::{Deserialize, Serialize};

/// Configuration for the relation resolver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    pub tolerance: Tolerance,
    /// Iteration cap for the curve-curve nearest-point search.
    pub max_iterations: usize,
    /// Grid resolution per curve used to seed the nearest-point search.
    pub seed_samples: usize,
    /// Sample count when locating extrema of non-analytic curves.
    pub critical_samples: usize,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::default(),
            max_iterations: 64,
            seed_samples: 8,
            critical_samples: 32,
        }
    }
}
