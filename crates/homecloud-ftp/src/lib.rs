// # FTP Transfer Service
//
// libunftp-backed implementation of the agent's `TransferService` seam.
//
// The agent never speaks FTP itself: it starts this service once at
// process start and stops it at shutdown. Users come from a JSON file
// understood by `unftp-auth-jsonfile`, which verifies PBKDF2
// salted-password credentials; files are served from a single root
// directory through the `unftp-sbe-fs` storage backend.
//
// ## Shutdown
//
// The supervisor's shutdown signal is wired into libunftp's shutdown
// indicator; active transfers get a bounded grace period before the
// listener returns.

use async_trait::async_trait;
use homecloud_core::config::TransferConfig;
use homecloud_core::traits::TransferService;
use homecloud_core::{Error, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::info;
use unftp_auth_jsonfile::JsonFileAuthenticator;
use unftp_sbe_fs::Filesystem;

/// Greeting sent to connecting clients
const GREETING: &str = "HomeCloud file service";

/// Grace period granted to active transfers after a stop signal
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// FTP transfer service
///
/// Construction is cheap and infallible; loading the user store and
/// binding the listener happen in [`TransferService::serve`], so a
/// misconfigured service fails the startup task rather than the
/// constructor.
pub struct FtpTransferService {
    bind_addr: String,
    root_dir: PathBuf,
    users_file: PathBuf,
}

impl FtpTransferService {
    /// Create the service from the agent's transfer configuration.
    pub fn new(config: &TransferConfig) -> Self {
        Self {
            bind_addr: config.bind_addr.clone(),
            root_dir: config.root_dir.clone(),
            users_file: config.users_file.clone(),
        }
    }
}

#[async_trait]
impl TransferService for FtpTransferService {
    async fn serve(self: Box<Self>, shutdown: oneshot::Receiver<()>) -> Result<()> {
        let authenticator = JsonFileAuthenticator::from_file(&self.users_file).map_err(|e| {
            Error::service(format!(
                "failed to load user store {}: {e}",
                self.users_file.display()
            ))
        })?;

        let root_dir = self.root_dir.clone();
        let server = libunftp::ServerBuilder::with_authenticator(
            Box::new(move || {
                Filesystem::new(root_dir.clone()).unwrap_or_else(|e| {
                    panic!("failed to open FTP root {}: {e}", root_dir.display())
                })
            }),
            Arc::new(authenticator),
        )
        .greeting(GREETING)
        .shutdown_indicator(async move {
            // Resolves on the stop signal, or when the supervisor is
            // dropped altogether.
            let _ = shutdown.await;
            libunftp::options::Shutdown::new().grace_period(SHUTDOWN_GRACE)
        })
        .build()
        .map_err(|e| Error::service(format!("failed to build FTP server: {e}")))?;

        info!(
            "FTP server listening on {} serving {}",
            self.bind_addr,
            self.root_dir.display()
        );

        server
            .listen(self.bind_addr.clone())
            .await
            .map_err(|e| Error::service(format!("FTP server terminated: {e}")))
    }

    fn service_name(&self) -> &'static str {
        "ftp"
    }
}
