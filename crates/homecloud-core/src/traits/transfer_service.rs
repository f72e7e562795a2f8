// # Transfer Service Trait
//
// Defines the interface for the supervised file-transfer service. The
// agent only starts and stops the service; the transfer protocol itself is
// owned by the implementation.
//
// ## Implementations
//
// - libunftp-backed FTP service: `homecloud-ftp` crate

use async_trait::async_trait;
use tokio::sync::oneshot;

/// Trait for the supervised file-transfer service
///
/// The service is consumed on start: `serve` constructs the server, binds,
/// and runs until the `shutdown` receiver resolves (or its sender is
/// dropped), then releases all resources and returns.
#[async_trait]
pub trait TransferService: Send + Sync {
    /// Bind and serve until shutdown is signalled.
    ///
    /// A failure to construct or bind the service surfaces here; the
    /// supervisor's owner treats it as fatal, since an agent whose
    /// transfer service cannot start is pointless.
    async fn serve(self: Box<Self>, shutdown: oneshot::Receiver<()>) -> Result<(), crate::Error>;

    /// Service name used in logs.
    fn service_name(&self) -> &'static str {
        "transfer"
    }
}
