use hhxtruth::engine::progress::{Progress, ProgressCallback};
use hhxtruth::engine::selector::Outcome;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

struct BarState {
    pb: ProgressBar,
    emitted: u64,
}

#[derive(Clone)]
pub struct CliProgressHandler {
    state: Arc<Mutex<BarState>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let pb = ProgressBar::new(0)
            .with_style(Self::spinner_style())
            .with_message("Initializing...");
        pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        pb.disable_steady_tick();
        pb.finish_and_clear();

        Self {
            state: Arc::new(Mutex::new(BarState { pb, emitted: 0 })),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let state = self.state.clone();

        Box::new(move |progress: Progress| {
            let Ok(mut guard) = state.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::PhaseStart { name } => {
                    guard.pb.reset();
                    guard.pb.set_length(0);
                    guard.pb.set_style(Self::spinner_style());
                    guard
                        .pb
                        .enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    guard.pb.set_message(name.to_string());
                }
                Progress::PhaseFinish => {
                    guard.pb.disable_steady_tick();
                    guard.pb.finish_with_message("✓ Done");
                }
                Progress::EventLoopStart { total_events } => {
                    guard.emitted = 0;
                    guard.pb.disable_steady_tick();
                    guard.pb.reset();
                    guard.pb.set_position(0);
                    match total_events {
                        Some(total) => {
                            guard.pb.set_length(total);
                            guard.pb.set_style(Self::bar_style());
                        }
                        // Streamed input: count events without a known end.
                        None => {
                            guard.pb.set_length(0);
                            guard.pb.set_style(Self::counter_style());
                            guard
                                .pb
                                .enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                        }
                    }
                    guard.pb.set_message("0 rows");
                }
                Progress::EventProcessed { outcome } => {
                    if outcome.is_some_and(Outcome::is_emitted) {
                        guard.emitted += 1;
                        let message = format!("{} rows", guard.emitted);
                        guard.pb.set_message(message);
                    }
                    guard.pb.inc(1);
                }
                Progress::EventLoopFinish => {
                    guard.pb.disable_steady_tick();
                    let length = guard.pb.length().unwrap_or(0);
                    if guard.pb.position() < length {
                        guard.pb.set_position(length);
                    }
                    guard.pb.finish();
                }
                Progress::Message(msg) => {
                    if !guard.pb.is_finished() {
                        guard.pb.println(format!("  {}", msg));
                    } else {
                        guard.pb.set_message(msg);
                    }
                }
            }
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn counter_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg:<12} {pos} events ({per_sec})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<12} [{bar:40.cyan/blue}] {pos}/{len} events ({per_sec})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
