use cryoform::core::preservation::advice::DEFAULT_MAX_PARTICLE_MM;
use cryoform::engine::config::{
    DEFAULT_CONVERGENCE_THRESHOLD, DEFAULT_MAX_ITERATIONS, DEFAULT_STEP_SCALE,
};

pub struct DefaultsConfig {
    pub max_iterations: usize,
    pub step_scale: f64,
    pub convergence_threshold: f64,
    pub preserve_batch_mass: bool,
    pub evaporation_percent: f64,
    pub prefer_ambient: bool,
    pub clean_label: bool,
    pub max_particle_mm: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            step_scale: DEFAULT_STEP_SCALE,
            convergence_threshold: DEFAULT_CONVERGENCE_THRESHOLD,
            preserve_batch_mass: false,
            evaporation_percent: 0.0,
            prefer_ambient: false,
            clean_label: false,
            max_particle_mm: DEFAULT_MAX_PARTICLE_MM,
        }
    }
}
