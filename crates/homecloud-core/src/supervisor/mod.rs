// # Service Supervisor
//
// Owns the handle to the running transfer service: starts it once,
// observes unexpected termination, and stops it at process shutdown.
//
// ## Lifecycle
//
// 1. `start()` spawns the serve future and stores the handle
// 2. `wait()` resolves only if the service task terminates on its own
// 3. `stop()` signals shutdown and joins the task under a grace timeout
//
// `stop()` is only meaningful after a successful `start()`; a service that
// never started, or that already terminated, is never stopped again.

use crate::error::{Error, Result};
use crate::traits::TransferService;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Grace period for the service to release resources after a stop signal
const STOP_GRACE: Duration = Duration::from_secs(15);

/// Handle to the running transfer service
///
/// Valid from successful start until stop; the shutdown sender doubles as
/// the stop trigger.
struct RunningService {
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<Result<()>>,
}

/// Supervises the lifetime of the transfer service
pub struct ServiceSupervisor {
    service: Option<Box<dyn TransferService>>,
    name: &'static str,
    running: Option<RunningService>,
}

impl ServiceSupervisor {
    /// Create a supervisor for a not-yet-started service
    pub fn new(service: Box<dyn TransferService>) -> Self {
        let name = service.service_name();
        Self {
            service: Some(service),
            name,
            running: None,
        }
    }

    /// Start the supervised service.
    ///
    /// The serve future is spawned onto the runtime; construction and bind
    /// failures surface through [`ServiceSupervisor::wait`].
    ///
    /// # Errors
    ///
    /// Returns `Error::Service` when the service was already started.
    pub fn start(&mut self) -> Result<()> {
        let service = self
            .service
            .take()
            .ok_or_else(|| Error::service("transfer service already started"))?;

        info!("starting {} service", self.name);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(service.serve(shutdown_rx));
        self.running = Some(RunningService { shutdown_tx, task });
        Ok(())
    }

    /// Wait for the running service task to terminate.
    ///
    /// Resolves only if the service ends on its own, which under normal
    /// operation it never does. A clean exit is still reported as an
    /// error: the agent is pointless without its transfer service. Pending
    /// forever when the service is not running.
    pub async fn wait(&mut self) -> Error {
        let Some(running) = self.running.as_mut() else {
            return std::future::pending().await;
        };

        let outcome = (&mut running.task).await;
        // The task is gone; a later stop() must not touch it.
        self.running = None;

        match outcome {
            Ok(Ok(())) => Error::service(format!("{} service exited unexpectedly", self.name)),
            Ok(Err(e)) => e,
            Err(e) => Error::service(format!("{} service task failed: {e}", self.name)),
        }
    }

    /// Stop the supervised service and release its resources.
    ///
    /// A no-op when the service never started or already terminated.
    pub async fn stop(&mut self) -> Result<()> {
        let Some(RunningService {
            shutdown_tx,
            mut task,
        }) = self.running.take()
        else {
            debug!("{} service is not running; nothing to stop", self.name);
            return Ok(());
        };

        info!("stopping {} service", self.name);
        // The service may have terminated between the last poll and now; a
        // failed send is settled by the join below either way.
        let _ = shutdown_tx.send(());

        match tokio::time::timeout(STOP_GRACE, &mut task).await {
            Ok(Ok(Ok(()))) => {
                info!("{} service stopped", self.name);
                Ok(())
            }
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(e)) => Err(Error::service(format!(
                "{} service task failed during shutdown: {e}",
                self.name
            ))),
            Err(_) => {
                warn!(
                    "{} service did not stop within {STOP_GRACE:?}; aborting",
                    self.name
                );
                task.abort();
                Err(Error::service(format!(
                    "{} service did not stop in time",
                    self.name
                )))
            }
        }
    }

    /// Whether the service is currently running.
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct BlockingService;

    #[async_trait]
    impl TransferService for BlockingService {
        async fn serve(self: Box<Self>, shutdown: oneshot::Receiver<()>) -> Result<()> {
            let _ = shutdown.await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn stop_without_start_is_a_no_op() {
        let mut supervisor = ServiceSupervisor::new(Box::new(BlockingService));
        assert!(!supervisor.is_running());
        supervisor.stop().await.expect("no-op stop succeeds");
    }

    #[tokio::test]
    async fn start_stop_round_trip() {
        let mut supervisor = ServiceSupervisor::new(Box::new(BlockingService));
        supervisor.start().expect("start succeeds");
        assert!(supervisor.is_running());
        supervisor.stop().await.expect("stop succeeds");
        assert!(!supervisor.is_running());
    }

    #[tokio::test]
    async fn double_start_is_rejected() {
        let mut supervisor = ServiceSupervisor::new(Box::new(BlockingService));
        supervisor.start().expect("first start succeeds");
        assert!(supervisor.start().is_err());
        supervisor.stop().await.expect("stop succeeds");
    }
}
