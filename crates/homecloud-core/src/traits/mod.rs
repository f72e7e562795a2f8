//! Trait seams for the agent's collaborators
//!
//! The scheduler never talks to the network, the OS, or the transfer
//! protocol directly; everything it coordinates sits behind these traits.

pub mod address_resolver;
pub mod periodic_task;
pub mod transfer_service;

pub use address_resolver::AddressResolver;
pub use periodic_task::PeriodicTask;
pub use transfer_service::TransferService;
