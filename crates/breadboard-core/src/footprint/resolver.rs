//! Asset resolution for footprint references.

use super::ParseError;
use crate::BoxFuture;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Prefix prepended to a descriptor's breadboard image to form its asset reference.
pub const DEFAULT_ASSET_PREFIX: &str = "/parts/svg/core/";

/// Turns descriptor image names into asset references and fetches asset markup.
///
/// Note: implementations must be Send + Sync so a resolver can be shared
/// between the catalog loader and footprint loads.
pub trait AssetResolver: Send + Sync {
    /// Build the asset reference for an image named by a descriptor view.
    fn resolve(&self, image: &str) -> String;

    /// Fetch the raw markup of an asset.
    fn fetch(&self, asset_ref: &str) -> BoxFuture<'_, Result<String, ParseError>>;
}

/// Join a prefix and an image name with exactly one separator.
fn join_ref(prefix: &str, image: &str) -> String {
    let image = image.trim_start_matches('/');
    if prefix.is_empty() {
        image.to_string()
    } else if prefix.ends_with('/') {
        format!("{}{}", prefix, image)
    } else {
        format!("{}/{}", prefix, image)
    }
}

/// Resolves assets against a directory on disk.
///
/// Asset references look like `<prefix><image>`; the prefix is stripped and
/// the remainder is read relative to `root`.
pub struct DirectoryAssets {
    root: PathBuf,
    prefix: String,
}

impl DirectoryAssets {
    /// Create a resolver rooted at `root` with the default reference prefix.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_prefix(root, DEFAULT_ASSET_PREFIX)
    }

    /// Create a resolver with a custom reference prefix.
    pub fn with_prefix(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
        }
    }

    /// Map an asset reference to a file path under the root.
    fn asset_path(&self, asset_ref: &str) -> Option<PathBuf> {
        let relative = asset_ref
            .strip_prefix(self.prefix.as_str())
            .unwrap_or(asset_ref)
            .trim_start_matches('/');
        let relative = Path::new(relative);
        // Refuse references that climb out of the root.
        if relative
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl AssetResolver for DirectoryAssets {
    fn resolve(&self, image: &str) -> String {
        join_ref(&self.prefix, image)
    }

    fn fetch(&self, asset_ref: &str) -> BoxFuture<'_, Result<String, ParseError>> {
        let path = self.asset_path(asset_ref);
        let asset_ref = asset_ref.to_string();

        Box::pin(async move {
            let path = path.ok_or_else(|| {
                ParseError::AssetUnavailable(format!("{} escapes the asset root", asset_ref))
            })?;
            fs::read_to_string(&path).map_err(|e| {
                ParseError::AssetUnavailable(format!("Failed to read {}: {}", path.display(), e))
            })
        })
    }
}

/// In-memory assets for tests and bundled sample parts.
pub struct MemoryAssets {
    prefix: String,
    assets: RwLock<HashMap<String, String>>,
}

impl MemoryAssets {
    /// Create an empty store using the default reference prefix.
    pub fn new() -> Self {
        Self {
            prefix: DEFAULT_ASSET_PREFIX.to_string(),
            assets: RwLock::new(HashMap::new()),
        }
    }

    /// Register markup under an asset reference.
    pub fn insert(&self, asset_ref: impl Into<String>, markup: impl Into<String>) {
        if let Ok(mut assets) = self.assets.write() {
            assets.insert(asset_ref.into(), markup.into());
        }
    }
}

impl Default for MemoryAssets {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetResolver for MemoryAssets {
    fn resolve(&self, image: &str) -> String {
        join_ref(&self.prefix, image)
    }

    fn fetch(&self, asset_ref: &str) -> BoxFuture<'_, Result<String, ParseError>> {
        let asset_ref = asset_ref.to_string();
        Box::pin(async move {
            let assets = self
                .assets
                .read()
                .map_err(|e| ParseError::AssetUnavailable(format!("Lock error: {}", e)))?;
            assets
                .get(&asset_ref)
                .cloned()
                .ok_or(ParseError::AssetUnavailable(asset_ref))
        })
    }
}
