//! Progress bar for evaluation runs.

use healthbench_eval::EvalProgress;
use indicatif::{ProgressBar, ProgressStyle};

/// Draws an indicatif bar from [`EvalProgress`] events.
///
/// A disabled reporter uses a hidden bar, so callers never branch on it.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a reporter. `label` is shown as the bar prefix.
    pub fn new(enabled: bool, label: &str) -> Self {
        let bar = if enabled {
            ProgressBar::new(0)
        } else {
            ProgressBar::hidden()
        };

        if let Ok(style) = ProgressStyle::default_bar()
            .template("{prefix} {spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar.set_prefix(label.to_string());

        Self { bar }
    }

    /// Update the bar for one event.
    pub fn handle(&self, event: EvalProgress) {
        match event {
            EvalProgress::Started { total, chunks } => {
                self.bar.set_length(total as u64);
                self.bar
                    .set_message(format!("Avaliando em {} lote(s)...", chunks));
            }
            EvalProgress::ItemCompleted { completed, .. } => {
                self.bar.set_position(completed as u64);
            }
            ref chunk @ EvalProgress::ChunkCompleted { .. } => {
                if let Some(accuracy) = chunk.running_accuracy() {
                    self.bar
                        .set_message(format!("acurácia parcial {:.3}", accuracy));
                }
            }
            _ => {} // Handle future variants gracefully
        }
    }

    /// Finish the bar, leaving it on screen.
    pub fn finish(&self) {
        self.bar.finish_with_message("Concluído");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_reporter_tracks_position() {
        let reporter = ProgressReporter::new(false, "mock");
        reporter.handle(EvalProgress::Started {
            total: 4,
            chunks: 2,
        });
        reporter.handle(EvalProgress::ItemCompleted {
            completed: 3,
            total: 4,
            call_failed: false,
        });

        assert_eq!(reporter.bar.length(), Some(4));
        assert_eq!(reporter.bar.position(), 3);
        reporter.finish();
        assert!(reporter.bar.is_finished());
    }
}
