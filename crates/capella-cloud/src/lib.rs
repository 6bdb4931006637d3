//! Capella resource lifecycle
//!
//! Control-plane operations are asynchronous: a create or delete request
//! returns once accepted, and the resource then moves through intermediate
//! states on its own. This crate observes those states.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  capella CLI                     │
//! │         (capella status / wait / id)             │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                capella-cloud                     │
//! │  ┌──────────────────┐  ┌─────────────────────┐  │
//! │  │ ResourceMonitor  │  │  wait_for_status    │  │
//! │  │ (kind → state)   │──▶  (poll until done)  │  │
//! │  └──────────────────┘  └─────────────────────┘  │
//! │  ┌──────────────────┐                           │
//! │  │   CompositeId    │                           │
//! │  └──────────────────┘                           │
//! └───────┬─────────────────────────────────────────┘
//!         │
//! ┌───────▼───────┐
//! │  capella-api  │  (retrying HTTP client)
//! └───────────────┘
//! ```

pub mod error;
pub mod import_id;
pub mod monitor;
pub mod resource;
pub mod status;
pub mod waiter;

// Re-exports
pub use error::{CloudError, Result};
pub use import_id::{CompositeId, IdError, decode, encode};
pub use monitor::ResourceMonitor;
pub use resource::ResourceKind;
pub use status::{Lifecycle, StatusSnapshot};
pub use waiter::{
    FetchError, WaitConfig, WaitError, WaitOutcome, WaitTarget, wait_for_status,
};
