use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Termination settings for the equilibrium loop.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquilibriumConfig {
    /// Consecutive non-improving passes tolerated before declaring a stall.
    pub stall_threshold: usize,
    /// Hard ceiling on greedy passes per equilibrium run.
    pub max_iterations: usize,
}

impl Default for EquilibriumConfig {
    fn default() -> Self {
        Self { stall_threshold: 3, max_iterations: 1_000 }
    }
}

/// Weights of the eviction cost used when a greedy candidate targets a full point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvictionWeights {
    /// How strongly the target's accumulated elevation defends its incumbents.
    pub commitment_weight: f64,
    /// How strongly the claimant's accumulated elevation pushes its claim.
    pub starvation_weight: f64,
    /// Elevation added to a target per unit of excess length it accepts.
    pub commitment_step: f64,
    /// Elevation added to a point left incomplete after a pass.
    pub starvation_step: f64,
}

impl Default for EvictionWeights {
    fn default() -> Self {
        Self {
            commitment_weight: 0.5,
            starvation_weight: 0.5,
            commitment_step: 0.5,
            starvation_step: 0.25,
        }
    }
}

/// Ring merging settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Penalty per unit of joint elevation when ranking merge candidates.
    pub joint_bias: f64,
    /// Elevation added to each endpoint of an applied merge.
    pub joint_penalty: f64,
    /// Largest length increase a merge may introduce (`None` = unbounded).
    pub max_merge_delta: Option<f64>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self { joint_bias: 0.05, joint_penalty: 1.0, max_merge_delta: None }
    }
}

/// Engine configuration, passed explicitly into the solver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub equilibrium: EquilibriumConfig,
    pub eviction: EvictionWeights,
    pub merge: MergeConfig,
    /// Ceiling on equilibrium/detection/merge rounds.
    pub max_rounds: usize,
    /// Directory for the persisted distance table, if any.
    pub cache_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            equilibrium: EquilibriumConfig::default(),
            eviction: EvictionWeights::default(),
            merge: MergeConfig::default(),
            max_rounds: 256,
            cache_dir: None,
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("[config] failed to read {}", path.display()))?;
        let config: Self = serde_json::from_slice(&bytes)
            .with_context(|| format!("[config] invalid configuration in {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings under which the engine cannot make progress.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.equilibrium.max_iterations > 0, "[config] max_iterations must be positive");
        anyhow::ensure!(self.max_rounds > 0, "[config] max_rounds must be positive");

        let weights = [
            self.eviction.commitment_weight,
            self.eviction.starvation_weight,
            self.eviction.commitment_step,
            self.eviction.starvation_step,
            self.merge.joint_bias,
            self.merge.joint_penalty,
        ];
        anyhow::ensure!(
            weights.iter().all(|w| w.is_finite() && *w >= 0.0),
            "[config] weights must be finite and non-negative"
        );
        Ok(())
    }
}
