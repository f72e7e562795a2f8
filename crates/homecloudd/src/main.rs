// # homecloudd - HomeCloud Agent Daemon
//
// Thin integration layer: reads configuration from environment variables,
// initializes logging and the runtime, wires the resolver, advertiser and
// FTP service together, and runs the agent until a termination signal.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// - `HOMECLOUD_SERVICE_URL`: base URL of the registration service (required)
// - `HOMECLOUD_SECRET_KEY`: shared secret; its presence selects the
//   authenticated announce variant (optional)
// - `HOMECLOUD_IP_REFRESH_SECS`: advertisement period in seconds (default 5)
// - `HOMECLOUD_FTP_BIND`: FTP listen address (default 0.0.0.0:2121)
// - `HOMECLOUD_FTP_ROOT`: directory served over FTP (default .)
// - `HOMECLOUD_USERS_FILE`: JSON user store path (default users.json)
// - `HOMECLOUD_LOG_LEVEL`: trace|debug|info|warn|error (default info)
//
// ## Example
//
// ```bash
// export HOMECLOUD_SERVICE_URL=https://registry.example.net
// export HOMECLOUD_SECRET_KEY=your_secret
// export HOMECLOUD_FTP_ROOT=/srv/homecloud
// export HOMECLOUD_USERS_FILE=/etc/homecloud/users.json
//
// homecloudd
// ```

use anyhow::Result;
use homecloud_announce::Advertiser;
use homecloud_core::config::AgentConfig;
use homecloud_core::scheduler::Agent;
use homecloud_ftp::FtpTransferService;
use homecloud_ip_ifaddrs::IfAddrsResolver;
use std::env;
use std::process::ExitCode;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum AgentExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<AgentExitCode> for ExitCode {
    fn from(code: AgentExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Load the agent configuration from environment variables.
fn config_from_env() -> Result<AgentConfig> {
    let service_url = env::var("HOMECLOUD_SERVICE_URL").map_err(|_| {
        anyhow::anyhow!(
            "HOMECLOUD_SERVICE_URL is required. \
            Set it via: export HOMECLOUD_SERVICE_URL=https://registry.example.net"
        )
    })?;

    let mut config = AgentConfig::new(service_url);

    if let Ok(raw) = env::var("HOMECLOUD_IP_REFRESH_SECS") {
        config.refresh_interval_secs = raw.parse().map_err(|_| {
            anyhow::anyhow!(
                "HOMECLOUD_IP_REFRESH_SECS must be a positive integer. Got: {}",
                raw
            )
        })?;
    }

    // An empty secret key means the unauthenticated variant, same as unset.
    config.secret_key = env::var("HOMECLOUD_SECRET_KEY")
        .ok()
        .filter(|key| !key.is_empty());

    if let Ok(bind) = env::var("HOMECLOUD_FTP_BIND") {
        config.transfer.bind_addr = bind;
    }
    if let Ok(root) = env::var("HOMECLOUD_FTP_ROOT") {
        config.transfer.root_dir = root.into();
    }
    if let Ok(users) = env::var("HOMECLOUD_USERS_FILE") {
        config.transfer.users_file = users.into();
    }

    Ok(config)
}

/// Parse the log level from the environment.
fn log_level_from_env() -> Result<Level> {
    let raw = env::var("HOMECLOUD_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    match raw.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => anyhow::bail!(
            "HOMECLOUD_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            other
        ),
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match config_from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return AgentExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return AgentExitCode::ConfigError.into();
    }

    let log_level = match log_level_from_env() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return AgentExitCode::ConfigError.into();
        }
    };

    // Initialize tracing
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return AgentExitCode::ConfigError.into();
    }

    info!("Starting homecloudd daemon");
    info!(
        "Advertising to {} every {}s ({} variant)",
        config.service_url,
        config.refresh_interval_secs,
        if config.secret_key.is_some() {
            "authenticated"
        } else {
            "unauthenticated"
        }
    );
    info!(
        "Transfer service on {} serving {}",
        config.transfer.bind_addr,
        config.transfer.root_dir.display()
    );

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return AgentExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_agent(config).await {
            error!("Agent error: {}", e);
            AgentExitCode::RuntimeError
        } else {
            AgentExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Wire the agent together and run it until a termination signal.
async fn run_agent(config: AgentConfig) -> Result<()> {
    let service = Box::new(FtpTransferService::new(&config.transfer));
    let resolver = Box::new(IfAddrsResolver::new());
    let advertiser = Box::new(Advertiser::new(&config, resolver)?);

    let (agent, mut events) = Agent::new(service, advertiser, &config)?;

    // Surface agent lifecycle events in the logs.
    let event_log = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!(?event, "agent event");
        }
    });

    let result = agent.run().await;
    event_log.abort();
    result.map_err(Into::into)
}
