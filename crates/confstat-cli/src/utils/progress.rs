use confstat::engine::progress::{Progress, ProgressCallback};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use std::time::Duration;

const SPINNER_TICK_MS: u64 = 80;

/// Renders engine progress events as an `indicatif` spinner or bar on stderr.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: ProgressBar,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    /// A handler that tracks state but never draws, for `--quiet` runs.
    pub fn hidden() -> Self {
        Self::with_draw_target(ProgressDrawTarget::hidden())
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Self {
        let pb = ProgressBar::with_draw_target(Some(0), target).with_style(spinner_style());
        pb.finish_and_clear();
        Self { pb }
    }

    pub fn callback(&self) -> ProgressCallback<'static> {
        let pb = self.pb.clone();

        Box::new(move |progress: Progress| match progress {
            Progress::PhaseStart { name } => {
                pb.reset();
                pb.set_length(0);
                pb.set_style(spinner_style());
                pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                pb.set_message(name);
            }
            Progress::PhaseFinish => {
                pb.disable_steady_tick();
                pb.finish_with_message("✓ Done");
            }
            Progress::TaskStart { total_steps } => {
                pb.disable_steady_tick();
                pb.reset();
                pb.set_length(total_steps);
                pb.set_position(0);
                pb.set_style(bar_style());
            }
            Progress::TaskIncrement => pb.inc(1),
            Progress::TaskFinish => {
                let length = pb.length().unwrap_or(0);
                if pb.position() < length {
                    pb.set_position(length);
                }
                pb.finish_and_clear();
            }
            Progress::Message(msg) => {
                if pb.is_finished() {
                    pb.set_message(msg);
                } else {
                    pb.println(format!("  {msg}"));
                }
            }
        })
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg:<20} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .with_key(
            "eta",
            |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
            },
        )
        .progress_chars("##-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_starts_finished_and_empty() {
        let handler = CliProgressHandler::hidden();
        assert_eq!(handler.pb.length(), Some(0));
        assert!(handler.pb.is_finished());
    }

    #[test]
    fn callback_tracks_phases_and_tasks() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.callback();

        callback(Progress::PhaseStart { name: "Neighbor Grid" });
        assert_eq!(handler.pb.message(), "Neighbor Grid");
        assert!(!handler.pb.is_finished());

        callback(Progress::TaskStart { total_steps: 4 });
        assert_eq!(handler.pb.length(), Some(4));
        assert_eq!(handler.pb.position(), 0);

        callback(Progress::TaskIncrement);
        callback(Progress::TaskIncrement);
        assert_eq!(handler.pb.position(), 2);

        callback(Progress::TaskFinish);
        assert!(handler.pb.is_finished());
        assert_eq!(handler.pb.position(), 4);

        callback(Progress::PhaseFinish);
        assert_eq!(handler.pb.message(), "✓ Done");
    }
}
