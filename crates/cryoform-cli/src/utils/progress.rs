use cryoform::engine::progress::{Progress, ProgressCallback};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

/// Terminal view of one workflow phase and, when the phase searches, of the search itself.
struct PhaseView {
    bar: ProgressBar,
    phase: &'static str,
    budget: u64,
    evaluated: u64,
    best: Option<(usize, f64)>,
}

impl PhaseView {
    fn idle() -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr())
            .with_style(spinner_style());
        bar.finish_and_clear();
        Self {
            bar,
            phase: "",
            budget: 0,
            evaluated: 0,
            best: None,
        }
    }

    fn apply(&mut self, event: Progress) {
        match event {
            Progress::PhaseStart { name } => self.start_phase(name),
            Progress::TaskStart { total_steps } => self.start_search(total_steps),
            Progress::TaskIncrement => {
                self.evaluated += 1;
                self.bar.inc(1);
            }
            Progress::Improved {
                evaluation,
                objective,
            } => {
                self.best = Some((evaluation, objective));
                self.bar
                    .set_message(format!("objective {objective:.4} (eval {evaluation})"));
            }
            Progress::TaskFinish => self.bar.finish(),
            Progress::PhaseFinish => {
                self.bar.disable_steady_tick();
                self.bar.finish_with_message(self.summary());
            }
            Progress::Message(text) if self.bar.is_finished() => self.bar.set_message(text),
            Progress::Message(text) => self.bar.println(format!("  {text}")),
        }
    }

    fn start_phase(&mut self, name: &'static str) {
        self.phase = name;
        self.budget = 0;
        self.evaluated = 0;
        self.best = None;
        self.bar.reset();
        self.bar.set_length(0);
        self.bar.set_style(spinner_style());
        self.bar.set_message(name);
        self.bar
            .enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
    }

    fn start_search(&mut self, budget: u64) {
        self.budget = budget;
        self.bar.disable_steady_tick();
        self.bar.reset();
        self.bar.set_length(budget);
        self.bar.set_style(search_style());
        self.bar.set_message("searching");
    }

    /// Closing line of a phase: the best objective when a search improved on its seed, and how
    /// much of the evaluation budget the search used.
    fn summary(&self) -> String {
        if self.budget == 0 {
            return format!("✓ {} done", self.phase);
        }
        let spent = if self.evaluated < self.budget {
            format!("stopped after {} of {} evaluations", self.evaluated, self.budget)
        } else {
            format!("used all {} evaluations", self.budget)
        };
        match self.best {
            Some((evaluation, objective)) => format!(
                "✓ {}: objective {objective:.4} from evaluation {evaluation}, {spent}",
                self.phase
            ),
            None => format!("✓ {}: seed kept, {spent}", self.phase),
        }
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn search_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg:<28} [{bar:40.cyan/blue}] {pos}/{len} evaluations")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
}

#[derive(Clone)]
pub struct CliProgressHandler {
    view: Arc<Mutex<PhaseView>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self {
            view: Arc::new(Mutex::new(PhaseView::idle())),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let view = Arc::clone(&self.view);
        Box::new(move |event: Progress| match view.lock() {
            Ok(mut view) => view.apply(event),
            Err(_) => warn!("Progress display lock was poisoned; dropping update."),
        })
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
