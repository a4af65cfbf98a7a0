use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use primerforge::core::models::result::RelaxationStep;
use primerforge::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let pb = ProgressBar::new(0).with_message("Initializing...");
        if let Some(style) = Self::spinner_style() {
            pb.set_style(style);
        }
        pb.set_draw_target(ProgressDrawTarget::stderr());
        pb.finish_and_clear();

        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb_clone = self.pb.clone();

        Box::new(move |progress: Progress| {
            let Ok(pb_guard) = pb_clone.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::AttemptStart { step } => {
                    pb_guard.reset();
                    pb_guard.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    pb_guard.set_message(format!(
                        "Attempt {}/{}: {}",
                        step.index() + 1,
                        RelaxationStep::SEQUENCE.len(),
                        step.description()
                    ));
                }
                Progress::AttemptFinish { step, pairs } => {
                    pb_guard.disable_steady_tick();
                    let mark = if pairs > 0 { "✓" } else { "✗" };
                    pb_guard.finish_with_message(format!("{} {}: {} pair(s)", mark, step, pairs));
                }
                Progress::Message(msg) => {
                    if !pb_guard.is_finished() {
                        pb_guard.println(format!("  {}", msg));
                    } else {
                        pb_guard.set_message(msg);
                    }
                }
            }
        })
    }

    fn spinner_style() -> Option<ProgressStyle> {
        ProgressStyle::with_template("{spinner:.green} {msg}").ok()
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
