//! Footprint cache shared by all placed parts.

use super::{Footprint, ParseError};
use std::collections::HashMap;
use std::sync::Arc;

/// Load state of one footprint asset.
#[derive(Debug, Clone)]
pub enum FootprintEntry {
    /// A load has been handed out and not completed yet.
    Loading,
    /// The asset was parsed.
    Ready(Arc<Footprint>),
    /// The asset could not be loaded; parts using it render as placeholders.
    Failed(ParseError),
}

/// A footprint load the host should perform on behalf of a placed part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FootprintRequest {
    /// The placed part that asked for the footprint.
    pub part_id: String,
    /// Asset reference to fetch.
    pub asset_ref: String,
}

/// Caches footprints by asset reference.
#[derive(Debug, Clone, Default)]
pub struct FootprintCache {
    entries: HashMap<String, FootprintEntry>,
}

impl FootprintCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a loaded footprint.
    pub fn get(&self, asset_ref: &str) -> Option<&Arc<Footprint>> {
        match self.entries.get(asset_ref) {
            Some(FootprintEntry::Ready(footprint)) => Some(footprint),
            _ => None,
        }
    }

    /// Get the load state of an asset.
    pub fn entry(&self, asset_ref: &str) -> Option<&FootprintEntry> {
        self.entries.get(asset_ref)
    }

    /// Whether nothing is known about the asset yet.
    pub fn is_unrequested(&self, asset_ref: &str) -> bool {
        !self.entries.contains_key(asset_ref)
    }

    /// Mark an asset as being loaded.
    pub fn mark_loading(&mut self, asset_ref: &str) {
        self.entries
            .insert(asset_ref.to_string(), FootprintEntry::Loading);
    }

    /// Store the outcome of a load.
    pub fn complete(&mut self, asset_ref: &str, result: Result<Footprint, ParseError>) {
        let entry = match result {
            Ok(footprint) => FootprintEntry::Ready(Arc::new(footprint)),
            Err(e) => {
                log::warn!("Footprint {} failed to load: {}", asset_ref, e);
                FootprintEntry::Failed(e)
            }
        };
        self.entries.insert(asset_ref.to_string(), entry);
    }

    /// Drop a pending load so the asset can be requested again.
    pub fn forget_loading(&mut self, asset_ref: &str) {
        if matches!(self.entries.get(asset_ref), Some(FootprintEntry::Loading)) {
            self.entries.remove(asset_ref);
        }
    }

    /// Number of known assets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn footprint() -> Footprint {
        Footprint {
            raw_markup: "<svg/>".into(),
            width: 10.0,
            height: 10.0,
            connector_positions: HashMap::new(),
        }
    }

    #[test]
    fn test_lifecycle() {
        let mut cache = FootprintCache::new();
        assert!(cache.is_unrequested("/a.svg"));

        cache.mark_loading("/a.svg");
        assert!(!cache.is_unrequested("/a.svg"));
        assert!(cache.get("/a.svg").is_none());

        cache.complete("/a.svg", Ok(footprint()));
        assert!(cache.get("/a.svg").is_some());
    }

    #[test]
    fn test_forget_only_pending() {
        let mut cache = FootprintCache::new();
        cache.mark_loading("/a.svg");
        cache.forget_loading("/a.svg");
        assert!(cache.is_unrequested("/a.svg"));

        cache.complete("/b.svg", Ok(footprint()));
        cache.forget_loading("/b.svg");
        assert!(cache.get("/b.svg").is_some());
    }
}
