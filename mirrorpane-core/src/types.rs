//! Core domain types for mirrorpane
//!
//! These types make up the canonical snapshot the host pushes to the UI
//! process, plus the collection payloads that ride alongside it. The host is
//! the only authority; everything here is a faithful decode of what it sent.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Snapshot** | The canonical state record; wholesale-replaced on a full update |
//! | **TimelineEntry** | One chat/task message; identified by its timestamp |
//! | **TaskSummary** | A finished task in the history list |
//! | **ProviderConfig** | Provider credentials and model selection |
//! | **ModelInfo** | Metadata for one model in a catalog |
//! | **ServerDescriptor** | One tool server the host is connected to |
//!
//! ## Wire format
//!
//! The host protocol is camelCase JSON; identity timestamps travel as epoch
//! milliseconds. Optional fields the host omits decode to defaults rather
//! than erroring; the host is trusted but may legitimately leave fields out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================
// Platform
// ============================================

/// Host platform tag, as reported in the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Macos,
    Windows,
    #[default]
    Unknown,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Macos => "macos",
            Platform::Windows => "windows",
            Platform::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linux" => Ok(Platform::Linux),
            "macos" => Ok(Platform::Macos),
            "windows" => Ok(Platform::Windows),
            "unknown" => Ok(Platform::Unknown),
            _ => Err(format!("unknown platform: {}", s)),
        }
    }
}

// ============================================
// Timeline
// ============================================

/// What kind of timeline entry this is.
///
/// `Say` entries stream output from the host; `Ask` entries request a
/// decision from the human.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Say,
    Ask,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Say => "say",
            EntryKind::Ask => "ask",
        }
    }
}

/// One chat/task message in the timeline.
///
/// The timestamp is identity-bearing: a later `partialMessage` carrying the
/// same `ts` refines this entry in place rather than appending a new one.
/// Timestamps are non-decreasing in normal operation but not guaranteed
/// unique (rapid successive entries can share a millisecond).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    /// Identity timestamp (epoch milliseconds on the wire)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub ts: DateTime<Utc>,
    /// Entry kind
    pub kind: EntryKind,
    /// Text content, if any
    #[serde(default)]
    pub text: Option<String>,
    /// True while the host is still streaming this entry
    #[serde(default)]
    pub partial: bool,
    /// Host-specific fields we pass through untouched
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// A finished task in the history list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    /// Unique identifier assigned by the host
    pub id: String,
    /// When the task ran (epoch milliseconds on the wire)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub ts: DateTime<Utc>,
    /// First-line description of the task
    pub description: String,
    /// Input tokens consumed
    #[serde(default)]
    pub tokens_in: i64,
    /// Output tokens generated
    #[serde(default)]
    pub tokens_out: i64,
    /// Total cost in dollars
    #[serde(default)]
    pub total_cost: f64,
}

// ============================================
// Settings
// ============================================

/// Which host actions may run without per-action confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutoApprovalActions {
    pub read_files: bool,
    pub edit_files: bool,
    pub run_commands: bool,
    pub use_browser: bool,
    pub use_mcp: bool,
}

/// Auto-approval settings sub-record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutoApprovalSettings {
    pub enabled: bool,
    pub actions: AutoApprovalActions,
    /// Hard cap on consecutive auto-approved requests
    pub max_requests: u32,
    pub enable_notifications: bool,
}

impl Default for AutoApprovalSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            actions: AutoApprovalActions::default(),
            max_requests: 20,
            enable_notifications: false,
        }
    }
}

/// Browser viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 900,
            height: 600,
        }
    }
}

/// Browser tool settings sub-record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub viewport: Viewport,
    pub headless: bool,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            headless: true,
        }
    }
}

/// Whether the assistant is planning or acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    Plan,
    #[default]
    Act,
}

impl InteractionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionMode::Plan => "plan",
            InteractionMode::Act => "act",
        }
    }
}

/// Chat settings sub-record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub mode: InteractionMode,
}

/// Telemetry opt-in state.
///
/// `Unset` means the human has not been asked yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TelemetrySetting {
    #[default]
    Unset,
    Enabled,
    Disabled,
}

impl TelemetrySetting {
    pub fn as_str(&self) -> &'static str {
        match self {
            TelemetrySetting::Unset => "unset",
            TelemetrySetting::Enabled => "enabled",
            TelemetrySetting::Disabled => "disabled",
        }
    }
}

impl std::str::FromStr for TelemetrySetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unset" => Ok(TelemetrySetting::Unset),
            "enabled" => Ok(TelemetrySetting::Enabled),
            "disabled" => Ok(TelemetrySetting::Disabled),
            _ => Err(format!("unknown telemetry setting: {}", s)),
        }
    }
}

// ============================================
// Provider configuration
// ============================================

/// Provider credentials and model selection.
///
/// One field per supported provider. The welcome screen is driven by whether
/// any of the credential fields below is set; see
/// [`ProviderConfig::has_any_credential`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// Selected provider slug (e.g. "anthropic", "openrouter")
    pub provider: Option<String>,
    /// Selected model within the provider
    pub model_id: Option<String>,

    // API keys
    pub api_key: Option<String>,
    pub openrouter_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub deepseek_api_key: Option<String>,
    pub mistral_api_key: Option<String>,
    pub together_api_key: Option<String>,
    pub xai_api_key: Option<String>,
    pub litellm_api_key: Option<String>,

    // Region/project identifiers (keyless cloud providers)
    pub aws_region: Option<String>,
    pub vertex_project_id: Option<String>,

    // Model selectors (local providers need no key)
    pub ollama_model_id: Option<String>,
    pub lmstudio_model_id: Option<String>,
}

impl ProviderConfig {
    /// True if any usable credential is present.
    ///
    /// Enumerates the full fixed field set every time: which fields matter
    /// depends on the selected provider, and any of them may have changed
    /// since the last full snapshot, so this is never patched incrementally.
    pub fn has_any_credential(&self) -> bool {
        [
            &self.api_key,
            &self.openrouter_api_key,
            &self.openai_api_key,
            &self.gemini_api_key,
            &self.deepseek_api_key,
            &self.mistral_api_key,
            &self.together_api_key,
            &self.xai_api_key,
            &self.litellm_api_key,
            &self.aws_region,
            &self.vertex_project_id,
            &self.ollama_model_id,
            &self.lmstudio_model_id,
        ]
        .iter()
        .any(|field| field.is_some())
    }
}

// ============================================
// Model catalogs
// ============================================

/// Metadata for one model in a catalog.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelInfo {
    /// Max output tokens per request
    pub max_tokens: Option<u32>,
    /// Context window size in tokens
    pub context_window: Option<u32>,
    pub supports_images: bool,
    pub supports_prompt_cache: bool,
    /// Dollars per million input tokens
    pub input_price: Option<f64>,
    /// Dollars per million output tokens
    pub output_price: Option<f64>,
    pub description: Option<String>,
}

// ============================================
// Tool servers
// ============================================

/// Connection state of a tool server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Connected,
    Connecting,
    Disconnected,
}

impl ServerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerStatus::Connected => "connected",
            ServerStatus::Connecting => "connecting",
            ServerStatus::Disconnected => "disconnected",
        }
    }
}

impl std::str::FromStr for ServerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "connected" => Ok(ServerStatus::Connected),
            "connecting" => Ok(ServerStatus::Connecting),
            "disconnected" => Ok(ServerStatus::Disconnected),
            _ => Err(format!("unknown server status: {}", s)),
        }
    }
}

/// One tool server the host manages on the UI's behalf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerDescriptor {
    pub name: String,
    pub status: ServerStatus,
    /// Last connection error, if any
    #[serde(default)]
    pub error: Option<String>,
    /// Tools the server advertises
    #[serde(default)]
    pub tool_names: Vec<String>,
}

// ============================================
// Marketplace
// ============================================

/// One installable item in the marketplace catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub stars: Option<u32>,
}

/// The marketplace catalog, replaced wholesale when the host supplies one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceCatalog {
    #[serde(default)]
    pub items: Vec<CatalogItem>,
}

// ============================================
// Snapshot
// ============================================

/// The canonical state record.
///
/// Exactly one Snapshot is live at a time. A full `state` message replaces it
/// wholesale; facade mutators patch a single field. The two sequences are
/// `Arc`-wrapped so replacement is copy-on-write: readers holding a prior
/// view keep their data, and unchanged sequences stay pointer-identical
/// across single-field updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    /// Host version string
    pub version: String,
    /// Stable identity of the host installation
    pub host_id: String,
    pub platform: Platform,
    /// Ordered chat/task messages for the current task
    pub timeline: Arc<Vec<TimelineEntry>>,
    /// Historical task summaries
    pub task_history: Arc<Vec<TaskSummary>>,
    /// Whether the release announcement is still pending
    pub show_announcement: bool,
    pub custom_instructions: Option<String>,
    pub auto_approval: AutoApprovalSettings,
    pub browser: BrowserSettings,
    pub chat: ChatSettings,
    pub telemetry: TelemetrySetting,
    /// Keep separate model selections for plan and act modes
    pub plan_act_separate_models: bool,
    pub provider_config: Option<ProviderConfig>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: String::new(),
            host_id: String::new(),
            platform: Platform::default(),
            timeline: Arc::new(Vec::new()),
            task_history: Arc::new(Vec::new()),
            show_announcement: false,
            custom_instructions: None,
            auto_approval: AutoApprovalSettings::default(),
            browser: BrowserSettings::default(),
            chat: ChatSettings::default(),
            telemetry: TelemetrySetting::default(),
            plan_act_separate_models: true,
            provider_config: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_snapshot() {
        let snapshot = Snapshot::default();
        assert!(snapshot.timeline.is_empty());
        assert!(snapshot.task_history.is_empty());
        assert!(snapshot.plan_act_separate_models);
        assert_eq!(snapshot.telemetry, TelemetrySetting::Unset);
        assert_eq!(snapshot.platform, Platform::Unknown);
        assert_eq!(snapshot.browser.viewport.width, 900);
        assert_eq!(snapshot.browser.viewport.height, 600);
        assert_eq!(snapshot.auto_approval.max_requests, 20);
    }

    #[test]
    fn test_snapshot_decodes_with_missing_fields() {
        // The host may omit any field; everything defaults.
        let snapshot: Snapshot = serde_json::from_str(r#"{"version": "2.1.0"}"#).unwrap();
        assert_eq!(snapshot.version, "2.1.0");
        assert!(snapshot.plan_act_separate_models);
        assert!(snapshot.provider_config.is_none());
        assert!(snapshot.timeline.is_empty());
    }

    #[test]
    fn test_timeline_entry_millisecond_timestamps() {
        let entry: TimelineEntry = serde_json::from_str(
            r#"{"ts": 1717000000123, "kind": "say", "text": "hello", "partial": true}"#,
        )
        .unwrap();
        assert_eq!(
            entry.ts,
            Utc.timestamp_millis_opt(1_717_000_000_123).unwrap()
        );
        assert_eq!(entry.kind, EntryKind::Say);
        assert!(entry.partial);
        assert!(entry.metadata.is_null());
    }

    #[test]
    fn test_has_any_credential_empty() {
        let config = ProviderConfig::default();
        assert!(!config.has_any_credential());

        // Model selection alone is not a credential.
        let config = ProviderConfig {
            provider: Some("anthropic".to_string()),
            model_id: Some("claude-sonnet-4".to_string()),
            ..Default::default()
        };
        assert!(!config.has_any_credential());
    }

    #[test]
    fn test_has_any_credential_single_field() {
        let config = ProviderConfig {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        assert!(config.has_any_credential());

        // Local providers count: a model selector is a usable credential.
        let config = ProviderConfig {
            ollama_model_id: Some("llama3.2".to_string()),
            ..Default::default()
        };
        assert!(config.has_any_credential());

        // So do region/project identifiers.
        let config = ProviderConfig {
            aws_region: Some("us-east-1".to_string()),
            ..Default::default()
        };
        assert!(config.has_any_credential());
    }

    #[test]
    fn test_provider_config_wire_format() {
        let config: ProviderConfig = serde_json::from_str(
            r#"{"provider": "openrouter", "openrouterApiKey": "or-key", "modelId": "some/model"}"#,
        )
        .unwrap();
        assert_eq!(config.openrouter_api_key.as_deref(), Some("or-key"));
        assert_eq!(config.model_id.as_deref(), Some("some/model"));
        assert!(config.has_any_credential());
    }

    #[test]
    fn test_enum_string_round_trips() {
        assert_eq!(
            "enabled".parse::<TelemetrySetting>().unwrap(),
            TelemetrySetting::Enabled
        );
        assert_eq!(TelemetrySetting::Disabled.as_str(), "disabled");
        assert_eq!("macos".parse::<Platform>().unwrap(), Platform::Macos);
        assert_eq!(
            "connecting".parse::<ServerStatus>().unwrap(),
            ServerStatus::Connecting
        );
        assert!("flatpak".parse::<Platform>().is_err());
    }
}
