use crate::core::chemistry::metrics::Metrics;

/// Factor applied to the step after an accepted trial.
pub const STEP_GROWTH: f64 = 1.5;

/// One evaluated point of the search: line masses, their metrics and the objective value.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub masses: Vec<f64>,
    pub metrics: Metrics,
    pub objective: f64,
}

impl Candidate {
    pub fn improves_on(&self, other: &Candidate) -> bool {
        self.objective < other.objective
    }
}

/// Search bookkeeping. The best candidate seen so far is always retained.
#[derive(Debug, Clone)]
pub struct SearchState {
    best: Candidate,
    step: f64,
    max_step: f64,
    evaluations: usize,
    iterations: usize,
}

impl SearchState {
    pub fn new(initial: Candidate, step: f64) -> Self {
        Self {
            best: initial,
            step,
            max_step: step,
            evaluations: 1,
            iterations: 0,
        }
    }

    pub fn best(&self) -> &Candidate {
        &self.best
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Records an evaluated trial. An improving trial becomes the new best and the step grows by
    /// [`STEP_GROWTH`], never past the initial step; anything else is discarded and the step is
    /// halved. Returns whether the trial was accepted.
    pub fn submit(&mut self, trial: Candidate) -> bool {
        self.evaluations += 1;
        self.iterations += 1;
        if trial.improves_on(&self.best) {
            self.best = trial;
            self.step = (self.step * STEP_GROWTH).min(self.max_step);
            true
        } else {
            self.step *= 0.5;
            false
        }
    }

    pub fn into_best(self) -> Candidate {
        self.best
    }
}
