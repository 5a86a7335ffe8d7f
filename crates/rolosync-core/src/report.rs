use serde::Serialize;

/// Per-run counters and failure messages, accumulated while the plan is
/// applied. Individual failures land here instead of aborting the sweep.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub rows_skipped: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub updated: usize,
    pub created: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
    pub failures: Vec<String>,
    pub dry_run: bool,
}

impl RunReport {
    pub fn new(dry_run: bool) -> RunReport {
        RunReport {
            dry_run,
            ..RunReport::default()
        }
    }

    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.failed += 1;
        self.failures.push(message.into());
    }
}
