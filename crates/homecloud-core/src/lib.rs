// # homecloud-core
//
// Core library for the HomeCloud host agent.
//
// The agent keeps a file-transfer service running for the lifetime of the
// process and periodically discovers the host's routable IPv6 address,
// advertising it to a remote registration service so that clients can find
// a machine behind a dynamically-assigned address.
//
// ## Architecture Overview
//
// - **TransferService**: Trait for the supervised file-transfer service
// - **AddressResolver**: Trait for local IPv6 address discovery
// - **PeriodicTask**: Trait for the fixed-period advertisement work
// - **ServiceSupervisor**: Owns the running transfer-service handle
// - **Agent**: Process-lifetime scheduler that runs the supervisor once,
//   the periodic task on a timer, and coordinates graceful shutdown
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Scheduling is separate from the transfer
//    protocol, the announce protocol, and address discovery
// 2. **First-Class Tasks**: The startup task and the periodic task are
//    explicit, independently testable units behind trait seams
// 3. **Tick-Local Failures**: A failing advertisement tick never cancels
//    future ticks; only a transfer-service failure is fatal
// 4. **Deterministic Shutdown**: The termination signal drops pending
//    ticks and stops the transfer service exactly once

pub mod config;
pub mod error;
pub mod scheduler;
pub mod supervisor;
pub mod traits;

// Re-export core types for convenience
pub use config::{AgentConfig, TransferConfig};
pub use error::{Error, Result};
pub use scheduler::{Agent, AgentEvent, AgentState};
pub use supervisor::ServiceSupervisor;
pub use traits::{AddressResolver, PeriodicTask, TransferService};
