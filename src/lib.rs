//! Rollups handler library: a Solidity ABI codec and a layered dispatch
//! engine for rollup application inputs.

// Core subsystems
pub mod abi;
pub mod codec;
pub mod rollups;
pub mod routing;

// Node plumbing
pub mod runner;
pub mod transport;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use codec::Codec;
pub use config::RollupsConfig;
pub use lifecycle::Shutdown;
pub use routing::{DispatchTable, DispatchTableBuilder, HandlerResult};
pub use runner::{RunError, Runner};
