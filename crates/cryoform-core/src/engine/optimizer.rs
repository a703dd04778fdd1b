use super::config::{MIN_STEP_SCALE, OptimizationConfig};
use super::progress::{Progress, ProgressReporter};
use super::state::{Candidate, SearchState};
use super::targets::TargetSet;
use crate::core::chemistry::metrics::{IngredientProfile, Metrics, compute_metrics, ingredient_profile};
use crate::core::models::recipe::RecipeLine;
use tracing::{debug, info};

/// Lines whose sensitivity reaches this share of the strongest one join the adjusted subset.
const SUBSET_SENSITIVITY_RATIO: f64 = 0.5;
const ERROR_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct FormulationResult {
    pub lines: Vec<RecipeLine>,
    pub metrics: Metrics,
    /// Trial steps taken after the initial evaluation.
    pub iterations: usize,
    pub converged: bool,
    pub objective: f64,
    /// Metrics evaluations performed, the seed included.
    pub evaluations: usize,
}

struct Problem<'a> {
    targets: &'a TargetSet,
    profiles: Vec<IngredientProfile>,
    adjustable: Vec<bool>,
    evaporation_percent: f64,
    template: Vec<RecipeLine>,
}

impl Problem<'_> {
    fn lines_with(&self, masses: &[f64]) -> Vec<RecipeLine> {
        self.template
            .iter()
            .zip(masses)
            .map(|(line, mass)| RecipeLine::new(line.ingredient.clone(), *mass))
            .collect()
    }

    fn evaluate(&self, masses: Vec<f64>) -> Candidate {
        let metrics = compute_metrics(&self.lines_with(&masses), self.evaporation_percent);
        let objective = self.targets.objective(&metrics);
        Candidate {
            masses,
            metrics,
            objective,
        }
    }

    /// Sum over erroring fields of the least-norm mass change that would zero that field's error
    /// to first order, restricted to the strongest adjustable lines.
    fn proposal(&self, at: &Candidate) -> Vec<f64> {
        let n = at.masses.len();
        let mut delta = vec![0.0; n];
        let total = at.metrics.total_g;
        if total <= 0.0 {
            return delta;
        }

        for (field, error) in self.targets.errors(&at.metrics) {
            if error.abs() < ERROR_EPSILON {
                continue;
            }
            let value = field.value(&at.metrics);
            let sensitivity: Vec<f64> = (0..n)
                .map(|i| {
                    if !self.adjustable[i] {
                        return 0.0;
                    }
                    let p = &self.profiles[i];
                    let s = (field.density(p) - value * p.retained) / total;
                    if s.is_finite() { s } else { 0.0 }
                })
                .collect();

            let strongest = sensitivity.iter().fold(0.0_f64, |m, s| m.max(s.abs()));
            if strongest <= 0.0 {
                continue;
            }
            let cutoff = strongest * SUBSET_SENSITIVITY_RATIO;
            let subset: Vec<usize> = (0..n).filter(|&i| sensitivity[i].abs() >= cutoff).collect();
            let norm_sq: f64 = subset.iter().map(|&i| sensitivity[i] * sensitivity[i]).sum();

            for &i in &subset {
                delta[i] -= error * sensitivity[i] / norm_sq;
            }
            debug!(field = %field, error, lines = ?subset, "Field correction");
        }
        delta
    }
}

fn apply(masses: &[f64], delta: &[f64], step: f64) -> Vec<f64> {
    masses
        .iter()
        .zip(delta)
        .map(|(m, d)| {
            let next = m + d * step;
            if next.is_finite() { next.max(0.0) } else { *m }
        })
        .collect()
}

/// Adjusts ingredient masses so the recipe's metrics approach `targets`.
///
/// The search is deterministic: from the best recipe seen so far it takes the sum of per-field
/// least-norm corrections, scaled by the current step. A trial that does not improve the
/// objective is discarded and the step halved; an accepted one grows the step again, up to the
/// configured scale. The search ends on convergence, when the step
/// falls below [`MIN_STEP_SCALE`], when no line can move, or when the evaluation budget is spent.
/// Not converging is not an error: the best recipe seen is always returned.
pub fn run(
    seed_lines: &[RecipeLine],
    targets: &TargetSet,
    config: &OptimizationConfig,
    reporter: &ProgressReporter,
) -> FormulationResult {
    let budget = config.evaluation_budget();
    let step_scale = if config.step_scale.is_finite() && config.step_scale > 0.0 {
        config.step_scale
    } else {
        1.0
    };

    let template: Vec<RecipeLine> = seed_lines.to_vec();
    let problem = Problem {
        targets,
        profiles: template
            .iter()
            .map(|l| ingredient_profile(&l.ingredient, config.evaporation_percent))
            .collect(),
        adjustable: template
            .iter()
            .map(|l| !config.is_locked(&l.ingredient.id))
            .collect(),
        evaporation_percent: config.evaporation_percent,
        template,
    };

    reporter.report(Progress::PhaseStart {
        name: "Formulation",
    });
    reporter.report(Progress::TaskStart {
        total_steps: budget as u64,
    });

    let seed_masses: Vec<f64> = problem.template.iter().map(|l| l.effective_mass()).collect();
    let seed_total: f64 = seed_masses.iter().sum();
    let initial = problem.evaluate(seed_masses);
    reporter.report(Progress::TaskIncrement);
    info!(
        lines = problem.template.len(),
        targets = targets.len(),
        objective = initial.objective,
        budget,
        "Starting formulation search."
    );

    let mut state = SearchState::new(initial, step_scale);
    let mut converged = state.best().objective < config.convergence_threshold;

    while !converged && state.evaluations() < budget {
        if state.step() < MIN_STEP_SCALE {
            debug!(step = state.step(), "Step below floor; search stalled.");
            break;
        }
        let delta = problem.proposal(state.best());
        if delta.iter().all(|d| *d == 0.0) {
            debug!("No adjustable line moves the objective; search stalled.");
            break;
        }

        let trial = problem.evaluate(apply(&state.best().masses, &delta, state.step()));
        reporter.report(Progress::TaskIncrement);
        let objective = trial.objective;
        if state.submit(trial) {
            reporter.report(Progress::Improved {
                evaluation: state.evaluations(),
                objective,
            });
        }
        debug!(
            iteration = state.iterations(),
            objective,
            best = state.best().objective,
            step = state.step(),
            "Formulation iteration"
        );
        converged = state.best().objective < config.convergence_threshold;
    }

    reporter.report(Progress::TaskFinish);

    let evaluations = state.evaluations();
    let iterations = state.iterations();
    let best = state.into_best();
    let objective = best.objective;

    let (masses, metrics) = match batch_scale(config, seed_total, &best) {
        Some(k) => (
            best.masses.iter().map(|m| m * k).collect::<Vec<_>>(),
            best.metrics.scaled(k),
        ),
        None => (best.masses, best.metrics),
    };

    if converged {
        reporter.message(format!("Converged after {evaluations} evaluation(s)."));
    }
    reporter.report(Progress::PhaseFinish);
    info!(
        converged,
        objective, evaluations, iterations, "Formulation search finished."
    );

    FormulationResult {
        lines: problem.lines_with(&masses),
        metrics,
        iterations,
        converged,
        objective,
        evaluations,
    }
}

fn batch_scale(config: &OptimizationConfig, seed_total: f64, best: &Candidate) -> Option<f64> {
    if !config.preserve_batch_mass {
        return None;
    }
    let current = best.metrics.total_mass_g;
    let k = seed_total / current;
    (current > 0.0 && seed_total > 0.0 && k.is_finite()).then_some(k)
}

/// Runs the search with default settings apart from the evaluation cap and step multiplier.
pub fn optimize(
    seed_lines: &[RecipeLine],
    targets: &TargetSet,
    max_iterations: usize,
    step_scale: f64,
) -> FormulationResult {
    let config = OptimizationConfig {
        max_iterations,
        step_scale,
        ..OptimizationConfig::default()
    };
    run(seed_lines, targets, &config, &ProgressReporter::new())
}
