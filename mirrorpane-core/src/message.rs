//! Host ↔ UI message protocol
//!
//! Messages are one-way and fire-and-forget in both directions: the host
//! pushes [`InboundMessage`]s describing state changes, and the UI posts
//! [`OutboundMessage`]s through the [`HostSink`] seam. There is no
//! request/response pairing, no acks, and no retries at this layer; the
//! transport underneath is assumed reliable and in-order.
//!
//! ## Forward compatibility
//!
//! The tag set is closed from this crate's point of view, but the host may be
//! newer than the UI. Unrecognized tags decode to [`InboundMessage::Unknown`]
//! and are ignored by dispatch; an unknown host message must never crash the
//! UI process.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::Result;
use crate::types::{MarketplaceCatalog, ModelInfo, ServerDescriptor, Snapshot, TimelineEntry};

/// One message from the host, tagged by `type`.
///
/// Optional payload fields the host omits decode to `None`; each handler
/// decides whether that means "empty" or "keep the previous value".
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundMessage {
    /// Full snapshot replacement
    State { snapshot: Box<Snapshot> },

    /// Editor color scheme changed; payload is the raw scheme JSON
    #[serde(rename_all = "camelCase")]
    Theme {
        #[serde(default)]
        color_scheme_text: Option<String>,
    },

    /// Workspace file listing changed
    #[serde(rename_all = "camelCase")]
    WorkspaceUpdated {
        #[serde(default)]
        file_paths: Option<Vec<String>>,
    },

    /// In-progress refinement of a timeline entry already present
    PartialMessage { entry: TimelineEntry },

    /// OpenRouter model catalog fetch completed
    OpenRouterModels {
        #[serde(default)]
        catalog: Option<HashMap<String, ModelInfo>>,
    },

    /// OpenAI-compatible model id listing
    OpenAiModels {
        #[serde(default)]
        ids: Option<Vec<String>>,
    },

    /// Tool server list changed
    McpServers {
        #[serde(default)]
        servers: Option<Vec<ServerDescriptor>>,
    },

    /// Marketplace catalog fetch completed
    McpMarketplaceCatalog {
        #[serde(default)]
        catalog: Option<MarketplaceCatalog>,
    },

    /// Any tag this build does not recognize
    #[serde(other)]
    Unknown,
}

impl InboundMessage {
    /// Decode one host message from raw JSON text.
    ///
    /// Unrecognized tags decode successfully to [`InboundMessage::Unknown`];
    /// only malformed JSON is an error.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// One message from the UI to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundMessage {
    /// Zero-payload startup signal, sent exactly once per scope
    Ready,
}

/// Transport seam for UI → host delivery.
///
/// Implementations wrap whatever IPC the embedding process uses. Delivery is
/// fire-and-forget: failures are the transport's concern, not this crate's.
pub trait HostSink {
    /// Deliver one outbound message to the host.
    fn post(&self, message: &OutboundMessage);
}
