//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Init logging/metrics → Build dispatch table → Run
//!
//! Shutdown (shutdown.rs):
//!     Signal received → runner loop cancelled → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Cancellation interrupts a pending `finish` long-poll immediately
//! - A request already being dispatched is not interrupted

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::{shutdown_signal, spawn_signal_listener};
