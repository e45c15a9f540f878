//! Periodic housekeeping task.
//!
//! Watches the marker files and the settings document on a fixed interval
//! and logs what the worker or the operator changed since the last tick.

use std::path::{Path, PathBuf};
use std::time::Duration;

use sha2::{Digest, Sha256};
use tixctl_core::{SignalFiles, SignalSnapshot};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// A change noticed between two observations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Paused,
    Resumed,
    QuestionPosted(String),
    QuestionCleared,
    LastUrlChanged(String),
    LaunchFailed(String),
    SettingsChanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Observation {
    snapshot: SignalSnapshot,
    settings_digest: Option<String>,
}

pub struct Housekeeper {
    signals: SignalFiles,
    settings_path: PathBuf,
    interval: Duration,
    last: Option<Observation>,
}

impl Housekeeper {
    pub fn new(signals: SignalFiles, settings_path: PathBuf, interval: Duration) -> Self {
        Self {
            signals,
            settings_path,
            interval,
            last: None,
        }
    }

    /// Take an observation and diff it against the previous one. The first
    /// call only records a baseline.
    pub fn observe(&mut self) -> Vec<Change> {
        let current = collect(&self.signals, &self.settings_path);
        self.record(current)
    }

    fn record(&mut self, current: Observation) -> Vec<Change> {
        let changes = match &self.last {
            Some(previous) => diff(previous, &current),
            None => Vec::new(),
        };
        self.last = Some(current);
        changes
    }

    /// Run until the token is cancelled.
    pub async fn run(mut self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(interval_ms = self.interval.as_millis() as u64, "Housekeeping started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let signals = self.signals.clone();
                    let settings_path = self.settings_path.clone();
                    let observed =
                        tokio::task::spawn_blocking(move || collect(&signals, &settings_path)).await;
                    match observed {
                        Ok(current) => {
                            for change in self.record(current) {
                                log_change(&change);
                            }
                        }
                        Err(e) => warn!(error = %e, "housekeeping observation failed"),
                    }
                }
            }
        }

        info!("Housekeeping stopped");
    }
}

/// Read the marker files and hash the settings document (blocking I/O).
fn collect(signals: &SignalFiles, settings_path: &Path) -> Observation {
    Observation {
        snapshot: signals.snapshot(),
        settings_digest: settings_digest(settings_path),
    }
}

fn settings_digest(path: &Path) -> Option<String> {
    match std::fs::read(path) {
        Ok(bytes) => Some(format!("{:x}", Sha256::digest(&bytes))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            debug!(error = %e, "cannot read settings for digest");
            None
        }
    }
}

fn diff(previous: &Observation, current: &Observation) -> Vec<Change> {
    let mut changes = Vec::new();
    let (old, new) = (&previous.snapshot, &current.snapshot);

    if old.paused != new.paused {
        changes.push(if new.paused {
            Change::Paused
        } else {
            Change::Resumed
        });
    }

    if new.question.exists && (!old.question.exists || old.question.text != new.question.text) {
        changes.push(Change::QuestionPosted(new.question.text.clone()));
    } else if old.question.exists && !new.question.exists {
        changes.push(Change::QuestionCleared);
    }

    if old.last_url != new.last_url && !new.last_url.is_empty() {
        changes.push(Change::LastUrlChanged(new.last_url.clone()));
    }

    if let Some(error) = &new.launch_error {
        if old.launch_error.as_ref() != Some(error) {
            changes.push(Change::LaunchFailed(error.clone()));
        }
    }

    if previous.settings_digest != current.settings_digest {
        changes.push(Change::SettingsChanged);
    }

    changes
}

fn log_change(change: &Change) {
    match change {
        Change::Paused => info!("Worker paused"),
        Change::Resumed => info!("Worker resumed"),
        Change::QuestionPosted(text) => info!(question = %text, "Worker is waiting for an answer"),
        Change::QuestionCleared => info!("Pending question cleared"),
        Change::LastUrlChanged(url) => debug!(%url, "Worker moved to a new page"),
        Change::LaunchFailed(reason) => warn!(%reason, "Worker launch failure recorded"),
        Change::SettingsChanged => info!("Settings document changed on disk"),
    }
}
