// # Periodic Task Trait
//
// First-class unit of work for the agent's fixed-period timer. One
// execution is a "tick".

use async_trait::async_trait;

/// A unit of work executed by the agent on a fixed period
///
/// Tick failures are local: the scheduler logs them and keeps the timer
/// running. Implementations must bound their own worst-case duration (for
/// the advertiser, the HTTP connect timeout does this); the scheduler runs
/// ticks inline and a tick that never returns would stall the timer.
#[async_trait]
pub trait PeriodicTask: Send + Sync {
    /// Task name used in logs.
    fn task_name(&self) -> &'static str;

    /// Execute one tick.
    async fn run_once(&self) -> Result<(), crate::Error>;
}
