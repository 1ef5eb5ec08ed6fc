//! The state store: canonical snapshot plus auxiliary UI state
//!
//! The store owns everything the UI can display. Inbound host messages fold
//! into it one at a time through [`StateStore::apply`]; each handler is a
//! synchronous `current state + message → next state` transformation, so the
//! visible state after message *k* reflects messages 1..*k* in delivery
//! order. Nothing here blocks, suspends, or reorders.
//!
//! Collections are `Arc`-wrapped: replacing one swaps the pointer, so a
//! [`StateView`] taken earlier keeps whatever it was looking at and
//! unchanged collections stay shared between successive views.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog;
use crate::message::InboundMessage;
use crate::theme::{self, ColorScheme, Theme};
use crate::timeline;
use crate::types::{
    MarketplaceCatalog, ModelInfo, ProviderConfig, ServerDescriptor, Snapshot, TelemetrySetting,
};

/// Everything the UI can display, reconciled from the host's message stream.
///
/// Owned exclusively by a [`StateScope`](crate::StateScope); nothing else
/// ever holds a writable reference.
#[derive(Debug)]
pub(crate) struct StateStore {
    /// Canonical state record, wholesale-replaced on full updates
    snapshot: Snapshot,
    /// True once at least one full snapshot has arrived
    hydrated: bool,
    /// Derived: show onboarding because no credential is configured
    show_welcome: bool,
    /// Converted editor color scheme, if one has arrived
    theme: Option<Arc<Theme>>,
    /// Model catalog; the default entry is always present
    model_catalog: Arc<HashMap<String, ModelInfo>>,
    /// OpenAI-compatible model ids
    openai_models: Arc<Vec<String>>,
    /// Tool servers
    servers: Arc<Vec<ServerDescriptor>>,
    /// Marketplace catalog
    marketplace: Arc<MarketplaceCatalog>,
    /// Workspace file listing
    file_paths: Arc<Vec<String>>,
}

impl StateStore {
    pub(crate) fn new() -> Self {
        Self {
            snapshot: Snapshot::default(),
            hydrated: false,
            show_welcome: false,
            theme: None,
            // Seeded so the default model is selectable before the first fetch.
            model_catalog: Arc::new(catalog::merge_model_catalog(None)),
            openai_models: Arc::new(Vec::new()),
            servers: Arc::new(Vec::new()),
            marketplace: Arc::new(MarketplaceCatalog::default()),
            file_paths: Arc::new(Vec::new()),
        }
    }

    /// Fold one host message into the store.
    ///
    /// Returns true iff the store changed; callers publish to observers on
    /// true. Unknown tags, absent ignore-if-absent payloads, and stale
    /// partial updates all return false.
    pub(crate) fn apply(&mut self, message: InboundMessage) -> bool {
        match message {
            InboundMessage::State { snapshot } => {
                // Welcome is re-derived from the fresh config every time; a
                // snapshot without provider config means no credentials.
                self.show_welcome = !snapshot
                    .provider_config
                    .as_ref()
                    .map(ProviderConfig::has_any_credential)
                    .unwrap_or(false);
                self.snapshot = *snapshot;
                self.hydrated = true;
                true
            }

            InboundMessage::Theme { color_scheme_text } => {
                let Some(text) = color_scheme_text else {
                    return false;
                };
                match serde_json::from_str::<ColorScheme>(&text) {
                    Ok(scheme) => {
                        self.theme = Some(Arc::new(theme::convert(&scheme)));
                        true
                    }
                    Err(error) => {
                        // Keep the previous theme rather than blanking the UI.
                        warn!(%error, "discarding malformed color scheme payload");
                        false
                    }
                }
            }

            InboundMessage::WorkspaceUpdated { file_paths } => {
                self.file_paths = Arc::new(catalog::replace_or_empty(file_paths));
                true
            }

            InboundMessage::PartialMessage { entry } => {
                match timeline::merge_partial(&self.snapshot.timeline, entry) {
                    Some(merged) => {
                        self.snapshot.timeline = merged;
                        true
                    }
                    None => {
                        // No matching entry: a stale update for an entry that
                        // is no longer relevant. Dropped, never appended.
                        debug!("dropping partial update with no matching timestamp");
                        false
                    }
                }
            }

            InboundMessage::OpenRouterModels { catalog: models } => {
                self.model_catalog = Arc::new(catalog::merge_model_catalog(models));
                true
            }

            InboundMessage::OpenAiModels { ids } => {
                self.openai_models = Arc::new(catalog::replace_or_empty(ids));
                true
            }

            InboundMessage::McpServers { servers } => {
                self.servers = Arc::new(catalog::replace_or_empty(servers));
                true
            }

            InboundMessage::McpMarketplaceCatalog { catalog: update } => {
                if update.is_none() {
                    return false;
                }
                self.marketplace = catalog::merge_marketplace(self.marketplace.clone(), update);
                true
            }

            InboundMessage::Unknown => {
                debug!("ignoring unrecognized host message");
                false
            }
        }
    }

    /// Project the current state into a read-only view.
    pub(crate) fn view(&self) -> StateView {
        StateView {
            snapshot: self.snapshot.clone(),
            hydrated: self.hydrated,
            show_welcome: self.show_welcome,
            theme: self.theme.clone(),
            model_catalog: self.model_catalog.clone(),
            openai_models: self.openai_models.clone(),
            servers: self.servers.clone(),
            marketplace: self.marketplace.clone(),
            file_paths: self.file_paths.clone(),
        }
    }

    // Facade mutators: each patches exactly one snapshot field. The snapshot
    // record has value semantics, so views handed out earlier are unaffected.

    pub(crate) fn set_provider_config(&mut self, config: Option<ProviderConfig>) {
        self.snapshot.provider_config = config;
    }

    pub(crate) fn set_custom_instructions(&mut self, value: Option<String>) {
        self.snapshot.custom_instructions = value;
    }

    pub(crate) fn set_telemetry(&mut self, value: TelemetrySetting) {
        self.snapshot.telemetry = value;
    }

    pub(crate) fn set_show_announcement(&mut self, value: bool) {
        self.snapshot.show_announcement = value;
    }

    pub(crate) fn set_plan_act_separate_models(&mut self, value: bool) {
        self.snapshot.plan_act_separate_models = value;
    }
}

/// Read-only projection of the full reconciled state.
///
/// Cheap to clone: every collection is behind an `Arc`. A view is a value:
/// it stays exactly as it was taken no matter what the store does next.
#[derive(Debug, Clone)]
pub struct StateView {
    /// The canonical snapshot
    pub snapshot: Snapshot,
    /// True once at least one full snapshot has been received
    pub hydrated: bool,
    /// True iff no provider credential was set at the last full snapshot
    pub show_welcome: bool,
    /// Converted editor color scheme, if any has arrived
    pub theme: Option<Arc<Theme>>,
    /// Model catalog; always contains the default entry
    pub model_catalog: Arc<HashMap<String, ModelInfo>>,
    /// OpenAI-compatible model ids
    pub openai_models: Arc<Vec<String>>,
    /// Tool servers
    pub servers: Arc<Vec<ServerDescriptor>>,
    /// Marketplace catalog
    pub marketplace: Arc<MarketplaceCatalog>,
    /// Workspace file listing
    pub file_paths: Arc<Vec<String>>,
}
