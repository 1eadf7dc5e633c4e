use chrono::{DateTime, Local, TimeDelta};

/// Timing and counters collected while emptying one vault.
#[derive(Debug, Clone)]
pub struct RunMetrics {
    pub vault_name: String,
    pub start_time: DateTime<Local>,
    pub job_completion_time: Option<DateTime<Local>>,
    pub end_time: Option<DateTime<Local>>,
    pub archive_count: usize,
    pub deleted: usize,
    pub failed: usize,
    pub throttle_retries: u32,
}

impl RunMetrics {
    pub fn start(vault_name: &str, start_time: DateTime<Local>) -> Self {
        Self {
            vault_name: vault_name.to_owned(),
            start_time,
            job_completion_time: None,
            end_time: None,
            archive_count: 0,
            deleted: 0,
            failed: 0,
            throttle_retries: 0,
        }
    }

    /// Wall time from start to end, zero while the run is still going.
    pub fn elapsed(&self) -> TimeDelta {
        self.end_time
            .map(|end| end - self.start_time)
            .unwrap_or_else(TimeDelta::zero)
    }

    /// Time spent waiting on the inventory-retrieval job.
    pub fn job_wait(&self) -> TimeDelta {
        self.job_completion_time
            .map(|done| done - self.start_time)
            .unwrap_or_else(TimeDelta::zero)
    }

    /// Archives per second over the whole elapsed time (0 when nothing elapsed).
    pub fn deletion_rate(&self) -> f64 {
        let secs = match self.elapsed().num_microseconds() {
            Some(us) => us as f64 / 1_000_000.0,
            None => f64::MAX,
        };
        if secs > 0.0 {
            self.archive_count as f64 / secs
        } else {
            0.0
        }
    }

    pub fn summary_line(&self) -> String {
        format!(
            "Elapsed time for {} containing {} archives was {} including Glacier job time of {}. \
             Deletion rate: {:.4} archives/second.",
            self.vault_name,
            self.archive_count,
            format_elapsed(self.elapsed()),
            format_elapsed(self.job_wait()),
            self.deletion_rate()
        )
    }
}

/// Render a duration as `H:MM:SS`, adding `.ffffff` when there are sub-second
/// parts and a `N day(s), ` prefix beyond 24 hours. Negative spans render as zero.
pub fn format_elapsed(delta: TimeDelta) -> String {
    let micros = delta.num_microseconds().unwrap_or(i64::MAX).max(0);
    let secs = micros / 1_000_000;
    let frac = micros % 1_000_000;
    let days = secs / 86_400;
    let rem = secs % 86_400;

    let mut hms = format!("{}:{:02}:{:02}", rem / 3600, rem % 3600 / 60, rem % 60);
    if frac > 0 {
        hms.push_str(&format!(".{frac:06}"));
    }
    match days {
        0 => hms,
        1 => format!("1 day, {hms}"),
        d => format!("{d} days, {hms}"),
    }
}
