//! Merge rules for host-supplied collections
//!
//! Each replaceable collection has its own policy, and the differences are
//! deliberate:
//!
//! | Collection | Policy |
//! |------------|--------|
//! | Model catalog | Overlay host entries, default entry always forced in |
//! | Server list / model ids | Wholesale replace, absent → empty |
//! | Marketplace catalog | Wholesale replace, absent → keep previous |

use std::collections::HashMap;
use std::sync::Arc;

use crate::types::{MarketplaceCatalog, ModelInfo};

/// The model id that must always be selectable.
pub const DEFAULT_MODEL_ID: &str = "anthropic/claude-sonnet-4";

/// Built-in metadata for [`DEFAULT_MODEL_ID`].
///
/// This is the one catalog entry whose value never comes from the host.
pub fn default_model_info() -> ModelInfo {
    ModelInfo {
        max_tokens: Some(8192),
        context_window: Some(200_000),
        supports_images: true,
        supports_prompt_cache: true,
        input_price: Some(3.0),
        output_price: Some(15.0),
        description: Some("Workhorse model for coding and agentic tasks".to_string()),
    }
}

/// Build the exposed model catalog from a host payload.
///
/// Host entries win on key collision, except the default id: its entry is
/// forced back to the built-in metadata after the overlay, so the UI can
/// always render a usable default model even when the host's catalog fetch
/// failed or came back empty.
pub fn merge_model_catalog(host: Option<HashMap<String, ModelInfo>>) -> HashMap<String, ModelInfo> {
    let mut catalog = host.unwrap_or_default();
    catalog.insert(DEFAULT_MODEL_ID.to_string(), default_model_info());
    catalog
}

/// Wholesale-replace policy: the payload is the new truth, absent means empty.
pub fn replace_or_empty<T>(update: Option<Vec<T>>) -> Vec<T> {
    update.unwrap_or_default()
}

/// Marketplace policy: replace only when the host actually supplied a
/// catalog. An absent payload must not clear an existing catalog; unlike
/// the server list, a marketplace fetch that produced nothing is not news.
pub fn merge_marketplace(
    current: Arc<MarketplaceCatalog>,
    update: Option<MarketplaceCatalog>,
) -> Arc<MarketplaceCatalog> {
    match update {
        Some(catalog) => Arc::new(catalog),
        None => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CatalogItem;

    #[test]
    fn test_default_entry_present_with_no_payload() {
        let catalog = merge_model_catalog(None);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[DEFAULT_MODEL_ID], default_model_info());
    }

    #[test]
    fn test_host_entries_overlay_but_default_is_forced() {
        let mut host = HashMap::new();
        host.insert(
            "openai/gpt-4o".to_string(),
            ModelInfo {
                context_window: Some(128_000),
                ..Default::default()
            },
        );
        // Host tries to overwrite the default entry with junk.
        host.insert(
            DEFAULT_MODEL_ID.to_string(),
            ModelInfo {
                context_window: Some(1),
                ..Default::default()
            },
        );

        let catalog = merge_model_catalog(Some(host));
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog["openai/gpt-4o"].context_window, Some(128_000));
        // The default id never takes the host's value.
        assert_eq!(catalog[DEFAULT_MODEL_ID], default_model_info());
    }

    #[test]
    fn test_replace_or_empty() {
        assert_eq!(replace_or_empty(Some(vec![1, 2, 3])), vec![1, 2, 3]);
        assert_eq!(replace_or_empty::<i32>(Some(Vec::new())), Vec::<i32>::new());
        assert_eq!(replace_or_empty::<i32>(None), Vec::<i32>::new());
    }

    #[test]
    fn test_marketplace_absent_keeps_previous() {
        let current = Arc::new(MarketplaceCatalog {
            items: vec![CatalogItem {
                id: "weather".to_string(),
                name: "Weather".to_string(),
                description: None,
                author: None,
                stars: Some(41),
            }],
        });

        let kept = merge_marketplace(current.clone(), None);
        assert!(Arc::ptr_eq(&kept, &current));

        // An empty-items catalog is a real payload and does replace.
        let replaced = merge_marketplace(current, Some(MarketplaceCatalog::default()));
        assert!(replaced.items.is_empty());
    }
}
