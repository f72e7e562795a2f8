//! Test doubles and common utilities for agent contract tests
//!
//! Minimal doubles that verify scheduling and shutdown constraints without
//! any real network or FTP machinery. Each double hands back a probe that
//! shares its counters, so tests can observe behavior after the double has
//! been moved into the agent.

use async_trait::async_trait;
use homecloud_core::config::AgentConfig;
use homecloud_core::error::{Error, Result};
use homecloud_core::traits::{PeriodicTask, TransferService};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::oneshot;

/// A transfer-service double with shared lifecycle counters
pub struct MockTransferService {
    started: Arc<AtomicUsize>,
    stopped: Arc<AtomicUsize>,
    fail_serve: bool,
    exit_immediately: bool,
}

/// Observer half of [`MockTransferService`]
pub struct ServiceProbe {
    started: Arc<AtomicUsize>,
    stopped: Arc<AtomicUsize>,
}

impl ServiceProbe {
    /// How many times the service reached its serving state
    pub fn start_count(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// How many times the service observed the stop signal
    pub fn stop_count(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl MockTransferService {
    fn with_flags(fail_serve: bool, exit_immediately: bool) -> (Self, ServiceProbe) {
        let started = Arc::new(AtomicUsize::new(0));
        let stopped = Arc::new(AtomicUsize::new(0));
        let service = Self {
            started: Arc::clone(&started),
            stopped: Arc::clone(&stopped),
            fail_serve,
            exit_immediately,
        };
        (service, ServiceProbe { started, stopped })
    }

    /// A service that serves until the stop signal
    pub fn new() -> (Self, ServiceProbe) {
        Self::with_flags(false, false)
    }

    /// A service whose startup fails
    pub fn failing() -> (Self, ServiceProbe) {
        Self::with_flags(true, false)
    }

    /// A service that exits cleanly right after starting
    pub fn exiting() -> (Self, ServiceProbe) {
        Self::with_flags(false, true)
    }
}

#[async_trait]
impl TransferService for MockTransferService {
    async fn serve(self: Box<Self>, shutdown: oneshot::Receiver<()>) -> Result<()> {
        if self.fail_serve {
            return Err(Error::service("simulated startup failure"));
        }
        self.started.fetch_add(1, Ordering::SeqCst);
        if self.exit_immediately {
            return Ok(());
        }
        let _ = shutdown.await;
        self.stopped.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn service_name(&self) -> &'static str {
        "mock"
    }
}

/// A periodic-task double that counts ticks and detects overlap
pub struct CountingTask {
    ticks: Arc<AtomicUsize>,
    in_flight: Arc<AtomicBool>,
    overlapped: Arc<AtomicBool>,
    delay: Duration,
}

/// Observer half of [`CountingTask`] and [`FailingTask`]
pub struct TaskProbe {
    ticks: Arc<AtomicUsize>,
    overlapped: Arc<AtomicBool>,
}

impl TaskProbe {
    /// How many ticks ran to completion
    pub fn tick_count(&self) -> usize {
        self.ticks.load(Ordering::SeqCst)
    }

    /// Whether two ticks were ever in flight at once
    pub fn overlapped(&self) -> bool {
        self.overlapped.load(Ordering::SeqCst)
    }
}

impl CountingTask {
    /// A task that completes instantly
    pub fn new() -> (Self, TaskProbe) {
        Self::slow(Duration::ZERO)
    }

    /// A task that takes `delay` per tick
    pub fn slow(delay: Duration) -> (Self, TaskProbe) {
        let ticks = Arc::new(AtomicUsize::new(0));
        let overlapped = Arc::new(AtomicBool::new(false));
        let task = Self {
            ticks: Arc::clone(&ticks),
            in_flight: Arc::new(AtomicBool::new(false)),
            overlapped: Arc::clone(&overlapped),
            delay,
        };
        (task, TaskProbe { ticks, overlapped })
    }
}

#[async_trait]
impl PeriodicTask for CountingTask {
    fn task_name(&self) -> &'static str {
        "counting"
    }

    async fn run_once(&self) -> Result<()> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            self.overlapped.store(true, Ordering::SeqCst);
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.ticks.fetch_add(1, Ordering::SeqCst);
        self.in_flight.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// A periodic-task double that fails on every tick
pub struct FailingTask {
    ticks: Arc<AtomicUsize>,
}

impl FailingTask {
    pub fn new() -> (Self, TaskProbe) {
        let ticks = Arc::new(AtomicUsize::new(0));
        let task = Self {
            ticks: Arc::clone(&ticks),
        };
        (
            task,
            TaskProbe {
                ticks,
                overlapped: Arc::new(AtomicBool::new(false)),
            },
        )
    }
}

#[async_trait]
impl PeriodicTask for FailingTask {
    fn task_name(&self) -> &'static str {
        "failing"
    }

    async fn run_once(&self) -> Result<()> {
        self.ticks.fetch_add(1, Ordering::SeqCst);
        Err(Error::transport("simulated announce failure"))
    }
}

/// A config with the given refresh interval for scheduler tests
pub fn test_config(refresh_secs: u64) -> AgentConfig {
    AgentConfig::new("http://127.0.0.1:9").with_refresh_interval(refresh_secs)
}
