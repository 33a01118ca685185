use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

pub const PBAR_INDEX: &str = "Indexing documents: {human_pos} ({percent}%) | \
        elapsed: {elapsed_precise}{msg}";

pub const PBAR_META: &str = "Reading metadata: {human_pos} ({percent}%) | \
        elapsed: {elapsed_precise}{msg}";

pub const PBAR_VALIDATE: &str =
    "Validating documents: {human_pos} ({percent}%) | \
        elapsed: {elapsed_precise}{msg}";

/// Builds progress bars which are drawn to stderr, unless the
/// builder is quiet.
pub struct ProgressBarBuilder {
    template: &'static str,
    quiet: bool,
    len: Option<u64>,
}

impl ProgressBarBuilder {
    pub fn new(template: &'static str, quiet: bool) -> Self {
        Self {
            template,
            quiet,
            len: None,
        }
    }

    pub fn len(mut self, len: u64) -> Self {
        self.len = Some(len);
        self
    }

    pub fn build(self) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }

        let pbar = match self.len {
            Some(len) => ProgressBar::new(len),
            None => ProgressBar::new_spinner(),
        };

        let style = ProgressStyle::with_template(self.template)
            .unwrap_or_else(|_| ProgressStyle::default_bar());

        pbar.set_draw_target(ProgressDrawTarget::stderr_with_hz(4));
        pbar.enable_steady_tick(Duration::from_millis(250));
        pbar.with_style(style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_progress_bar_is_hidden() {
        let pbar = ProgressBarBuilder::new(PBAR_INDEX, true).len(10).build();
        assert!(pbar.is_hidden());
    }

    #[test]
    fn templates_are_valid() {
        for template in [PBAR_INDEX, PBAR_META, PBAR_VALIDATE] {
            assert!(ProgressStyle::with_template(template).is_ok());
        }
    }
}
