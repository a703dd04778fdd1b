use std::collections::BTreeSet;
use thiserror::Error;

pub const DEFAULT_MAX_ITERATIONS: usize = 200;
pub const DEFAULT_STEP_SCALE: f64 = 1.0;
pub const DEFAULT_CONVERGENCE_THRESHOLD: f64 = 0.01;
/// Backtracking stops once the step multiplier falls below this floor.
pub const MIN_STEP_SCALE: f64 = 1e-3;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationConfig {
    /// Hard cap on metrics evaluations. Zero is treated as one.
    pub max_iterations: usize,
    pub step_scale: f64,
    pub convergence_threshold: f64,
    pub evaporation_percent: f64,
    /// Ingredient ids whose masses are never adjusted.
    pub locked_ingredients: BTreeSet<String>,
    /// Rescale the result to the seed recipe's total mass.
    pub preserve_batch_mass: bool,
}

impl OptimizationConfig {
    pub fn evaluation_budget(&self) -> usize {
        self.max_iterations.max(1)
    }

    pub fn is_locked(&self, ingredient_id: &str) -> bool {
        self.locked_ingredients.contains(ingredient_id)
    }
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            step_scale: DEFAULT_STEP_SCALE,
            convergence_threshold: DEFAULT_CONVERGENCE_THRESHOLD,
            evaporation_percent: 0.0,
            locked_ingredients: BTreeSet::new(),
            preserve_batch_mass: false,
        }
    }
}

#[derive(Default)]
pub struct OptimizationConfigBuilder {
    max_iterations: Option<usize>,
    step_scale: Option<f64>,
    convergence_threshold: Option<f64>,
    evaporation_percent: Option<f64>,
    locked_ingredients: BTreeSet<String>,
    preserve_batch_mass: bool,
}

impl OptimizationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = Some(iterations);
        self
    }
    pub fn step_scale(mut self, scale: f64) -> Self {
        self.step_scale = Some(scale);
        self
    }
    pub fn convergence_threshold(mut self, threshold: f64) -> Self {
        self.convergence_threshold = Some(threshold);
        self
    }
    pub fn evaporation_percent(mut self, percent: f64) -> Self {
        self.evaporation_percent = Some(percent);
        self
    }
    pub fn lock_ingredient(mut self, id: &str) -> Self {
        self.locked_ingredients.insert(id.to_string());
        self
    }
    pub fn locked_ingredients<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locked_ingredients.extend(ids.into_iter().map(Into::into));
        self
    }
    pub fn preserve_batch_mass(mut self, preserve: bool) -> Self {
        self.preserve_batch_mass = preserve;
        self
    }

    pub fn build(self) -> Result<OptimizationConfig, ConfigError> {
        let max_iterations = self
            .max_iterations
            .ok_or(ConfigError::MissingParameter("max_iterations"))?;
        let step_scale = self
            .step_scale
            .ok_or(ConfigError::MissingParameter("step_scale"))?;
        let convergence_threshold = self
            .convergence_threshold
            .ok_or(ConfigError::MissingParameter("convergence_threshold"))?;
        let evaporation_percent = self.evaporation_percent.unwrap_or(0.0);

        if !step_scale.is_finite() || step_scale <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "step_scale",
                reason: format!("must be a positive number, got {step_scale}"),
            });
        }
        if !convergence_threshold.is_finite() || convergence_threshold < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "convergence_threshold",
                reason: format!("must be zero or positive, got {convergence_threshold}"),
            });
        }
        if !(0.0..=100.0).contains(&evaporation_percent) {
            return Err(ConfigError::InvalidParameter {
                name: "evaporation_percent",
                reason: format!("must lie within 0..=100, got {evaporation_percent}"),
            });
        }

        Ok(OptimizationConfig {
            max_iterations,
            step_scale,
            convergence_threshold,
            evaporation_percent,
            locked_ingredients: self.locked_ingredients,
            preserve_batch_mass: self.preserve_batch_mass,
        })
    }
}
