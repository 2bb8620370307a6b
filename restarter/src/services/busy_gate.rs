// File: restarter/src/services/busy_gate.rs
//! Busy-state gate: a restart may only proceed while no protected job runs.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A long-running job (backup, world render, ...) that must not be interrupted.
pub trait ProtectedJob: Send + Sync {
    fn name(&self) -> &str;
    fn is_processing(&self) -> bool;
}

#[derive(Clone, Default)]
pub struct BusyGate {
    jobs: Vec<Arc<dyn ProtectedJob>>,
}

impl BusyGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_job(mut self, job: Arc<dyn ProtectedJob>) -> Self {
        self.jobs.push(job);
        self
    }

    #[inline]
    pub fn is_busy(&self) -> bool {
        self.jobs.iter().any(|job| job.is_processing())
    }

    /// Names of the jobs currently in progress
    pub fn busy_jobs(&self) -> Vec<String> {
        self.jobs
            .iter()
            .filter(|job| job.is_processing())
            .map(|job| job.name().to_string())
            .collect()
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }
}

/// In-process flag flipped by the job itself.
pub struct JobFlag {
    name: String,
    processing: AtomicBool,
}

impl JobFlag {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            processing: AtomicBool::new(false),
        }
    }

    pub fn set_processing(&self, processing: bool) {
        self.processing.store(processing, Ordering::SeqCst);
    }
}

impl ProtectedJob for JobFlag {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }
}

/// Job owned by another program that holds a lock file while it runs.
pub struct LockFileJob {
    name: String,
    lock_file: PathBuf,
}

impl LockFileJob {
    pub fn new(name: &str, lock_file: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            lock_file: lock_file.into(),
        }
    }
}

impl ProtectedJob for LockFileJob {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_processing(&self) -> bool {
        self.lock_file.exists()
    }
}
