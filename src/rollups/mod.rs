//! Rollups vocabulary: requests, outputs, addresses and asset helpers.
//!
//! # Data Flow
//! ```text
//! finish response → types.rs (FinishEnvelope → RollupRequest)
//!     → routing (handler emits into Outbox)
//!     → runner flushes Outbox through the transport
//!
//! portal payload → assets.rs (packed decode → typed deposit)
//! withdrawal     → assets.rs (selector + standard encode → Voucher)
//! ```

pub mod addresses;
pub mod assets;
pub mod hex;
pub mod types;

pub use addresses::{KnownAddresses, NetworkAddresses};
pub use types::{
    AdvanceRequest, Exception, Finish, FinishEnvelope, FinishStatus, InspectRequest, Metadata,
    Notice, Outbox, Output, Report, RollupInput, RollupRequest, Voucher,
};
