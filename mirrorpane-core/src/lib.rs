//! # mirrorpane-core
//!
//! State reconciliation core for mirrorpane's UI process.
//!
//! mirrorpane is a two-process assistant app: a long-lived host process does
//! the work, and the UI process renders a panel for it. The two sides talk
//! only through asynchronous, one-way, fire-and-forget messages: no RPC, no
//! shared memory. The UI holds no authoritative state: everything it shows
//! was either pushed by the host as a full or partial snapshot, or derived
//! locally from the most recent one. This crate is the layer that folds that
//! message stream into one coherent view and gives consumers a stable
//! read/write surface.
//!
//! ## Architecture
//!
//! ```text
//! host → transport → StateScope::handle → store mutation → observers
//!                         StateHandle (facade) ← consumers
//! ```
//!
//! - One [`StateScope`] per UI-process lifetime owns the store and posts the
//!   one-time `ready` signal to the host at construction.
//! - Inbound messages ([`InboundMessage`]) are handled to completion, one at
//!   a time, in delivery order; observers are notified after each mutation.
//! - [`StateHandle`] is the consumer surface: one read-only [`StateView`]
//!   plus a small set of single-field mutators. Handles fail with
//!   [`Error::InactiveScope`] once their scope is gone.
//!
//! ## Example
//!
//! ```rust
//! use std::rc::Rc;
//! use mirrorpane_core::{HostSink, OutboundMessage, StateScope};
//!
//! struct Stdout;
//! impl HostSink for Stdout {
//!     fn post(&self, message: &OutboundMessage) {
//!         println!("{}", serde_json::to_string(message).unwrap());
//!     }
//! }
//!
//! let scope = StateScope::new(Rc::new(Stdout));
//! let state = scope.state();
//! scope.handle_raw(r#"{"type": "state", "snapshot": {"version": "1.0.0"}}"#)?;
//! assert!(state.view()?.hydrated);
//! # Ok::<(), mirrorpane_core::Error>(())
//! ```

// Re-export commonly used items at the crate root
pub use error::{Error, Result};
pub use message::{HostSink, InboundMessage, OutboundMessage};
pub use scope::{StateHandle, StateScope, SubscriptionId};
pub use store::StateView;
pub use types::*;

// Public modules
pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod message;
pub mod scope;
pub mod theme;
pub mod timeline;
pub mod types;

// The store itself is crate-internal: the scope is its only owner.
mod store;
