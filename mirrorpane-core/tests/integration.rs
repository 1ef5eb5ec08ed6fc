//! Integration tests for the mirrorpane state reconciliation core
//!
//! These tests drive a full [`StateScope`] the way the UI process does:
//! raw JSON messages in, views and observer notifications out.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use mirrorpane_core::catalog::{default_model_info, DEFAULT_MODEL_ID};
use mirrorpane_core::{
    EntryKind, Error, HostSink, InboundMessage, ModelInfo, OutboundMessage, ProviderConfig,
    Snapshot, StateScope, TelemetrySetting, TimelineEntry,
};

/// Sink that records every message the UI posts to the host.
#[derive(Default)]
struct RecordingSink {
    posted: RefCell<Vec<OutboundMessage>>,
}

impl HostSink for RecordingSink {
    fn post(&self, message: &OutboundMessage) {
        self.posted.borrow_mut().push(*message);
    }
}

fn new_scope() -> (StateScope, Rc<RecordingSink>) {
    let sink = Rc::new(RecordingSink::default());
    let scope = StateScope::new(sink.clone());
    (scope, sink)
}

fn say(millis: i64, text: &str, partial: bool) -> TimelineEntry {
    TimelineEntry {
        ts: Utc.timestamp_millis_opt(millis).unwrap(),
        kind: EntryKind::Say,
        text: Some(text.to_string()),
        partial,
        metadata: serde_json::Value::Null,
    }
}

fn state_message(snapshot: Snapshot) -> InboundMessage {
    InboundMessage::State {
        snapshot: Box::new(snapshot),
    }
}

// ============================================
// Default-model invariant
// ============================================

#[test]
fn test_default_model_survives_any_catalog_sequence() {
    let (scope, _sink) = new_scope();
    let state = scope.state();

    // Before any catalog message.
    let view = state.view().unwrap();
    assert_eq!(view.model_catalog[DEFAULT_MODEL_ID], default_model_info());

    // Host omits the payload entirely.
    scope.handle(InboundMessage::OpenRouterModels { catalog: None });
    let view = state.view().unwrap();
    assert_eq!(view.model_catalog.len(), 1);
    assert_eq!(view.model_catalog[DEFAULT_MODEL_ID], default_model_info());

    // Host sends a catalog that overwrites the default id with junk.
    let mut catalog = HashMap::new();
    catalog.insert(
        DEFAULT_MODEL_ID.to_string(),
        ModelInfo {
            context_window: Some(1),
            ..Default::default()
        },
    );
    catalog.insert("mistral/mistral-large".to_string(), ModelInfo::default());
    scope.handle(InboundMessage::OpenRouterModels {
        catalog: Some(catalog),
    });

    let view = state.view().unwrap();
    assert_eq!(view.model_catalog.len(), 2);
    assert_eq!(view.model_catalog[DEFAULT_MODEL_ID], default_model_info());

    // And an empty catalog still leaves the default selectable.
    scope.handle(InboundMessage::OpenRouterModels {
        catalog: Some(HashMap::new()),
    });
    let view = state.view().unwrap();
    assert_eq!(view.model_catalog.len(), 1);
    assert!(view.model_catalog.contains_key(DEFAULT_MODEL_ID));
}

// ============================================
// Partial-update targeting
// ============================================

#[test]
fn test_partial_update_targets_last_duplicate_timestamp() {
    let (scope, _sink) = new_scope();
    let state = scope.state();

    scope.handle(state_message(Snapshot {
        timeline: Arc::new(vec![
            say(100, "first", false),
            say(200, "dup, older", false),
            say(200, "dup, newer", true),
        ]),
        ..Default::default()
    }));

    scope.handle(InboundMessage::PartialMessage {
        entry: say(200, "refined", true),
    });

    let timeline = state.view().unwrap().snapshot.timeline;
    assert_eq!(timeline.len(), 3);
    assert_eq!(timeline[1].text.as_deref(), Some("dup, older"));
    assert_eq!(timeline[2].text.as_deref(), Some("refined"));
}

#[test]
fn test_partial_update_miss_is_a_noop() {
    let (scope, _sink) = new_scope();
    let state = scope.state();

    scope.handle(state_message(Snapshot {
        timeline: Arc::new(vec![say(100, "only", false)]),
        ..Default::default()
    }));

    let before = state.view().unwrap();
    scope.handle(InboundMessage::PartialMessage {
        entry: say(9999, "late for a task long gone", true),
    });
    let after = state.view().unwrap();

    // Same length, same elements, same allocation: nothing was appended.
    assert!(Arc::ptr_eq(
        &before.snapshot.timeline,
        &after.snapshot.timeline
    ));
    assert_eq!(after.snapshot.timeline.len(), 1);
}

// ============================================
// Marketplace ignore-if-absent
// ============================================

#[test]
fn test_marketplace_absent_vs_empty() {
    let (scope, _sink) = new_scope();
    let state = scope.state();

    scope
        .handle_raw(
            r#"{"type": "mcpMarketplaceCatalog",
                "catalog": {"items": [{"id": "fetch", "name": "Fetch"}]}}"#,
        )
        .unwrap();
    assert_eq!(state.view().unwrap().marketplace.items.len(), 1);

    // Absent payload: existing catalog untouched.
    scope
        .handle_raw(r#"{"type": "mcpMarketplaceCatalog"}"#)
        .unwrap();
    assert_eq!(state.view().unwrap().marketplace.items.len(), 1);

    // Empty-items payload: a real catalog, and it replaces.
    scope
        .handle_raw(r#"{"type": "mcpMarketplaceCatalog", "catalog": {"items": []}}"#)
        .unwrap();
    assert!(state.view().unwrap().marketplace.items.is_empty());
}

// ============================================
// Welcome-flag derivation
// ============================================

#[test]
fn test_welcome_flag_follows_credentials() {
    let (scope, _sink) = new_scope();
    let state = scope.state();

    // All credential fields undefined.
    scope.handle(state_message(Snapshot {
        provider_config: Some(ProviderConfig::default()),
        ..Default::default()
    }));
    assert!(state.view().unwrap().show_welcome);

    // One API key set: welcome clears on the next full snapshot.
    scope.handle(state_message(Snapshot {
        provider_config: Some(ProviderConfig {
            xai_api_key: Some("xai-key".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }));
    assert!(!state.view().unwrap().show_welcome);

    // Credentials removed again: welcome comes back.
    scope.handle(state_message(Snapshot {
        provider_config: None,
        ..Default::default()
    }));
    assert!(state.view().unwrap().show_welcome);
}

// ============================================
// Full-replace idempotence
// ============================================

#[test]
fn test_full_replace_is_idempotent() {
    let (scope, _sink) = new_scope();
    let state = scope.state();

    let snapshot = Snapshot {
        version: "1.2.3".to_string(),
        timeline: Arc::new(vec![say(1, "hello", false)]),
        provider_config: Some(ProviderConfig {
            api_key: Some("sk-1".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    };

    scope.handle(state_message(snapshot.clone()));
    let once = state.view().unwrap();

    scope.handle(state_message(snapshot));
    let twice = state.view().unwrap();

    assert_eq!(once.snapshot, twice.snapshot);
    assert_eq!(once.hydrated, twice.hydrated);
    assert_eq!(once.show_welcome, twice.show_welcome);
}

// ============================================
// Mutator isolation
// ============================================

#[test]
fn test_telemetry_mutator_leaves_everything_else_shared() {
    let (scope, _sink) = new_scope();
    let state = scope.state();

    scope.handle(state_message(Snapshot {
        version: "1.2.3".to_string(),
        timeline: Arc::new(vec![say(1, "hello", false)]),
        ..Default::default()
    }));

    let before = state.view().unwrap();
    state.set_telemetry(TelemetrySetting::Disabled).unwrap();
    let after = state.view().unwrap();

    assert_eq!(after.snapshot.telemetry, TelemetrySetting::Disabled);

    // Everything else is untouched; sequences are pointer-identical.
    assert!(Arc::ptr_eq(
        &before.snapshot.timeline,
        &after.snapshot.timeline
    ));
    assert!(Arc::ptr_eq(
        &before.snapshot.task_history,
        &after.snapshot.task_history
    ));
    assert!(Arc::ptr_eq(&before.model_catalog, &after.model_catalog));
    assert_eq!(before.snapshot.version, after.snapshot.version);
    assert_eq!(before.snapshot.chat, after.snapshot.chat);
    assert_eq!(before.snapshot.browser, after.snapshot.browser);
}

#[test]
fn test_each_mutator_patches_its_field() {
    let (scope, _sink) = new_scope();
    let state = scope.state();

    state
        .set_provider_config(Some(ProviderConfig {
            api_key: Some("sk-2".to_string()),
            ..Default::default()
        }))
        .unwrap();
    state
        .set_custom_instructions(Some("be terse".to_string()))
        .unwrap();
    state.set_show_announcement(true).unwrap();
    state.set_plan_act_separate_models(false).unwrap();

    let view = state.view().unwrap();
    let snapshot = &view.snapshot;
    assert_eq!(
        snapshot
            .provider_config
            .as_ref()
            .unwrap()
            .api_key
            .as_deref(),
        Some("sk-2")
    );
    assert_eq!(snapshot.custom_instructions.as_deref(), Some("be terse"));
    assert!(snapshot.show_announcement);
    assert!(!snapshot.plan_act_separate_models);

    // Local-only: mutators never talk to the host, and the welcome flag is
    // only re-derived from full snapshots.
    assert!(!view.show_welcome);
    assert!(!view.hydrated);
}

// ============================================
// Bootstrap exactly-once
// ============================================

#[test]
fn test_ready_sent_once_per_scope() {
    let sink = Rc::new(RecordingSink::default());

    for _ in 0..3 {
        let scope = StateScope::new(sink.clone());
        let state = scope.state();

        // Reads within a scope never re-send.
        state.view().unwrap();
        scope.handle(state_message(Snapshot::default()));
        state.view().unwrap();
    }

    assert_eq!(
        *sink.posted.borrow(),
        vec![
            OutboundMessage::Ready,
            OutboundMessage::Ready,
            OutboundMessage::Ready
        ]
    );
}

// ============================================
// Scope lifetime and forward compatibility
// ============================================

#[test]
fn test_handles_fail_after_scope_teardown() {
    let (scope, _sink) = new_scope();
    let state = scope.state();
    drop(scope);

    assert!(matches!(state.view(), Err(Error::InactiveScope)));
    assert!(matches!(
        state.set_custom_instructions(None),
        Err(Error::InactiveScope)
    ));
}

#[test]
fn test_unknown_tags_from_newer_hosts_are_ignored() {
    let (scope, _sink) = new_scope();
    let state = scope.state();

    scope.handle(state_message(Snapshot {
        version: "1.0.0".to_string(),
        ..Default::default()
    }));

    scope
        .handle_raw(r#"{"type": "gpuTelemetry", "frames": [1, 2, 3]}"#)
        .unwrap();
    scope.handle_raw(r#"{"type": "shutdownHint"}"#).unwrap();

    let view = state.view().unwrap();
    assert_eq!(view.snapshot.version, "1.0.0");
    assert!(view.hydrated);
}

#[test]
fn test_observer_sees_cumulative_stream_in_order() {
    let (scope, _sink) = new_scope();
    let state = scope.state();

    let versions = Rc::new(RefCell::new(Vec::new()));
    let log = versions.clone();
    state
        .subscribe(move |view| log.borrow_mut().push(view.snapshot.version.clone()))
        .unwrap();

    scope.handle(state_message(Snapshot {
        version: "a".to_string(),
        ..Default::default()
    }));
    // No-op messages publish nothing.
    scope.handle(InboundMessage::McpMarketplaceCatalog { catalog: None });
    scope.handle(state_message(Snapshot {
        version: "b".to_string(),
        ..Default::default()
    }));

    assert_eq!(*versions.borrow(), vec!["a".to_string(), "b".to_string()]);
}
