// # Agent Scheduler
//
// Process-lifetime concurrency core. The agent runs two units of work:
// the transfer service, started once via the ServiceSupervisor, and the
// advertisement task, executed on a fixed period.
//
// ```text
// ┌──────────────┐  start once   ┌───────────────────┐
// │    Agent     │──────────────▶│ ServiceSupervisor │
// │  (run loop)  │               └───────────────────┘
// │              │  every tick   ┌───────────────────┐
// │              │──────────────▶│   PeriodicTask    │
// └──────────────┘               └───────────────────┘
// ```
//
// ## Scheduling
//
// The timer fires immediately on start, then every refresh period. Ticks
// run inline in the loop and therefore never overlap; a tick delayed past
// its deadline pushes the following tick out rather than bunching.
//
// ## Shutdown
//
// A termination signal moves the agent to ShuttingDown: the timer is
// dropped (already-scheduled ticks never fire), an in-flight tick is
// abandoned rather than joined, and the supervisor stops the transfer
// service exactly once before the run returns.
//
// ## Failure Semantics
//
// A failing tick is logged and the timer keeps running. The transfer
// service terminating on its own is fatal: the run returns the error
// without stopping a service that is already gone.

use crate::config::AgentConfig;
use crate::error::Result;
use crate::supervisor::ServiceSupervisor;
use crate::traits::{PeriodicTask, TransferService};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Events emitted by the agent for external observation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentEvent {
    /// The transfer service was submitted for startup
    ServiceStarted,

    /// One advertisement tick completed successfully
    TickCompleted,

    /// One advertisement tick failed; the timer keeps running
    TickFailed { error: String },

    /// Shutdown began; no further ticks follow
    ShuttingDown { reason: String },

    /// The agent stopped; this is always the final event
    Stopped,
}

/// Lifecycle states of the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    /// Created, not yet running
    Idle,
    /// Service started, timer active
    Running,
    /// Termination signal received, stopping the service
    ShuttingDown,
    /// Run complete
    Stopped,
}

/// Process-lifetime scheduler
///
/// ## Lifecycle
///
/// 1. Create with [`Agent::new()`]
/// 2. Start with [`Agent::run()`]
/// 3. The agent runs until a termination signal is received
pub struct Agent {
    supervisor: ServiceSupervisor,
    task: Box<dyn PeriodicTask>,
    period: Duration,
    state: AgentState,
    event_tx: mpsc::Sender<AgentEvent>,
}

impl Agent {
    /// Create a new agent
    ///
    /// # Parameters
    ///
    /// - `service`: the transfer service to supervise
    /// - `task`: the periodic advertisement task
    /// - `config`: agent configuration (validated here)
    ///
    /// # Returns
    ///
    /// A tuple of (agent, event_receiver) where event_receiver yields
    /// agent lifecycle events.
    pub fn new(
        service: Box<dyn TransferService>,
        task: Box<dyn PeriodicTask>,
        config: &AgentConfig,
    ) -> Result<(Self, mpsc::Receiver<AgentEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let agent = Self {
            supervisor: ServiceSupervisor::new(service),
            task,
            period: Duration::from_secs(config.refresh_interval_secs),
            state: AgentState::Idle,
            event_tx: tx,
        };

        Ok((agent, rx))
    }

    /// Current lifecycle state.
    pub fn state(&self) -> AgentState {
        self.state
    }

    /// Run the agent until a process termination signal arrives.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: clean shutdown
    /// - `Err(Error)`: the transfer service failed to start or terminated
    pub async fn run(self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Run the agent with a controlled shutdown signal.
    ///
    /// **TESTING ONLY**: contract tests require deterministic shutdown.
    /// Production code should use [`Agent::run()`], which manages shutdown
    /// via OS signals (SIGTERM/SIGINT) rather than programmatic channels.
    pub async fn run_with_shutdown(
        self,
        shutdown_rx: Option<oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }

    async fn run_internal(mut self, shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        self.supervisor.start()?;
        self.state = AgentState::Running;
        self.emit(AgentEvent::ServiceStarted);

        let shutdown = async move {
            match shutdown_rx {
                Some(rx) => {
                    let _ = rx.await;
                }
                None => wait_for_signal().await,
            }
        };
        tokio::pin!(shutdown);

        // Fires immediately, then every period; late ticks are not bunched.
        let mut timer = tokio::time::interval(self.period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let reason = loop {
            tokio::select! {
                _ = &mut shutdown => break "shutdown signal",

                err = self.supervisor.wait() => {
                    self.state = AgentState::Stopped;
                    self.emit(AgentEvent::Stopped);
                    return Err(err);
                }

                _ = timer.tick() => {
                    // Ticks run inline, so they never overlap. An in-flight
                    // tick is abandoned when shutdown fires.
                    tokio::select! {
                        _ = &mut shutdown => break "shutdown signal",

                        result = self.task.run_once() => match result {
                            Ok(()) => {
                                debug!("{} tick completed", self.task.task_name());
                                self.emit(AgentEvent::TickCompleted);
                            }
                            Err(e) => {
                                warn!("{} tick failed: {e}", self.task.task_name());
                                self.emit(AgentEvent::TickFailed {
                                    error: e.to_string(),
                                });
                            }
                        }
                    }
                }
            }
        };

        info!("shutting down ({reason})");
        self.state = AgentState::ShuttingDown;
        self.emit(AgentEvent::ShuttingDown {
            reason: reason.to_string(),
        });
        drop(timer);

        self.supervisor.stop().await?;

        self.state = AgentState::Stopped;
        self.emit(AgentEvent::Stopped);
        info!("agent stopped");
        Ok(())
    }

    /// Emit an agent event
    fn emit(&self, event: AgentEvent) {
        // Dropping an event is fine; the channel exists for observation,
        // not coordination.
        if self.event_tx.try_send(event).is_err() {
            debug!("agent event channel full or closed; dropping event");
        }
    }
}

/// Wait for a process termination signal (SIGTERM or SIGINT).
#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => info!("received SIGTERM"),
                _ = sigint.recv() => info!("received SIGINT"),
            }
        }
        _ => {
            warn!("failed to install unix signal handlers; falling back to ctrl-c");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

/// Wait for a process termination signal (ctrl-c).
#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
