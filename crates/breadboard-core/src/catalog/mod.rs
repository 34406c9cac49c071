//! Part catalog: the set of part definitions available for placement.

mod samples;

pub use samples::{
    ARDUINO_UNO_FOOTPRINT, LED_RED_FOOTPRINT, RESISTOR_330_FOOTPRINT, sample_assets, sample_parts,
};

use crate::footprint::{AssetResolver, ConnectorDefinition, PartDefinition, parse_descriptor};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Family filter value that matches every part.
pub const ALL_FAMILIES: &str = "all";

/// Errors from catalog maintenance operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Part already exists: {0}")]
    Duplicate(String),
    #[error("Part not found: {0}")]
    NotFound(String),
    #[error("Part source unavailable: {0}")]
    Source(String),
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Filter for [`PartCatalog::list_parts`].
#[derive(Debug, Clone, Default)]
pub struct PartFilter {
    /// Case-insensitive substring over title, description and tags.
    pub search: Option<String>,
    /// Exact family, or [`ALL_FAMILIES`].
    pub family: Option<String>,
    pub skip: usize,
    pub limit: Option<usize>,
}

/// Partial update to a part definition. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct PartPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub properties: Option<BTreeMap<String, String>>,
    pub tags: Option<Vec<String>>,
    pub footprint_ref: Option<String>,
    pub connectors: Option<Vec<ConnectorDefinition>>,
}

impl PartPatch {
    fn apply(self, part: &mut PartDefinition) {
        if let Some(title) = self.title {
            part.title = title;
        }
        if let Some(description) = self.description {
            part.description = description;
        }
        if let Some(author) = self.author {
            part.author = author;
        }
        if let Some(properties) = self.properties {
            part.properties = properties;
        }
        if let Some(tags) = self.tags {
            part.tags = tags;
        }
        if let Some(footprint_ref) = self.footprint_ref {
            part.footprint_ref = footprint_ref;
        }
        if let Some(connectors) = self.connectors {
            part.connectors = connectors;
        }
    }
}

/// Provides raw descriptor documents for a catalog reload.
pub trait PartSource {
    /// Return `(origin, text)` pairs. The origin is only used in log messages.
    fn descriptors(&self) -> CatalogResult<Vec<(String, String)>>;
}

/// A directory of `.fzp` descriptor files.
pub struct FzpDirectory {
    path: PathBuf,
}

impl FzpDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PartSource for FzpDirectory {
    fn descriptors(&self) -> CatalogResult<Vec<(String, String)>> {
        let entries = fs::read_dir(&self.path).map_err(|e| {
            CatalogError::Source(format!("Failed to read {}: {}", self.path.display(), e))
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "fzp"))
            .collect();
        paths.sort();

        let mut descriptors = Vec::with_capacity(paths.len());
        for path in paths {
            match fs::read_to_string(&path) {
                Ok(text) => descriptors.push((path.display().to_string(), text)),
                Err(e) => log::warn!("Skipping {}: {}", path.display(), e),
            }
        }
        Ok(descriptors)
    }
}

/// The catalog of part definitions, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct PartCatalog {
    parts: Vec<PartDefinition>,
}

impl PartCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog from definitions. Later duplicates of an id are dropped.
    pub fn with_parts(parts: impl IntoIterator<Item = PartDefinition>) -> Self {
        let mut catalog = Self::new();
        for part in parts {
            if catalog.get(&part.id).is_some() {
                log::warn!("Ignoring duplicate part definition {}", part.id);
                continue;
            }
            catalog.parts.push(part);
        }
        catalog
    }

    /// The built-in sample catalog.
    pub fn samples() -> Self {
        Self::with_parts(sample_parts())
    }

    /// Load from a source, falling back to the samples when nothing loads.
    pub fn load_or_samples<S, R>(source: &S, resolver: &R) -> Self
    where
        S: PartSource + ?Sized,
        R: AssetResolver + ?Sized,
    {
        let mut catalog = Self::new();
        match catalog.reload_from_source(source, resolver, true) {
            Ok(count) if count > 0 => catalog,
            Ok(_) => {
                log::warn!("Part source is empty, using sample parts");
                Self::samples()
            }
            Err(e) => {
                log::warn!("{}, using sample parts", e);
                Self::samples()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PartDefinition> {
        self.parts.iter()
    }

    /// Look up a definition by id.
    pub fn get(&self, id: &str) -> Option<&PartDefinition> {
        self.parts.iter().find(|p| p.id == id)
    }

    /// Search by free text and family.
    ///
    /// Empty text matches everything; text is matched case-insensitively
    /// against title, description and each tag. A family of `None` or
    /// [`ALL_FAMILIES`] does not filter; any other family must equal the
    /// part's family ignoring case.
    pub fn search(&self, text: &str, family: Option<&str>) -> Vec<&PartDefinition> {
        let needle = text.trim().to_lowercase();
        let family = family
            .map(str::trim)
            .filter(|f| !f.is_empty() && !f.eq_ignore_ascii_case(ALL_FAMILIES))
            .map(str::to_lowercase);

        self.parts
            .iter()
            .filter(|part| needle.is_empty() || matches_text(part, &needle))
            .filter(|part| match &family {
                Some(family) => part.family().is_some_and(|f| f.to_lowercase() == *family),
                None => true,
            })
            .collect()
    }

    /// List parts matching a filter, with pagination.
    pub fn list_parts(&self, filter: &PartFilter) -> Vec<&PartDefinition> {
        self.search(
            filter.search.as_deref().unwrap_or_default(),
            filter.family.as_deref(),
        )
        .into_iter()
        .skip(filter.skip)
        .take(filter.limit.unwrap_or(usize::MAX))
        .collect()
    }

    /// Sorted distinct non-empty families.
    ///
    /// Families differing only in case are one family, spelled as the
    /// first part that uses it.
    pub fn list_families(&self) -> Vec<String> {
        let mut families: BTreeMap<String, &str> = BTreeMap::new();
        for family in self.parts.iter().filter_map(|p| p.family()) {
            families.entry(family.to_lowercase()).or_insert(family);
        }
        families.into_values().map(str::to_string).collect()
    }

    /// Families for a picker, with [`ALL_FAMILIES`] first.
    pub fn family_options(&self) -> Vec<String> {
        std::iter::once(ALL_FAMILIES.to_string())
            .chain(self.list_families())
            .collect()
    }

    /// Add a new definition.
    pub fn create_part(&mut self, part: PartDefinition) -> CatalogResult<&PartDefinition> {
        if self.get(&part.id).is_some() {
            return Err(CatalogError::Duplicate(part.id));
        }
        log::info!("Added part {}", part.id);
        self.parts.push(part);
        Ok(&self.parts[self.parts.len() - 1])
    }

    /// Apply a partial update to an existing definition.
    pub fn update_part(&mut self, id: &str, patch: PartPatch) -> CatalogResult<&PartDefinition> {
        let part = self
            .parts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        patch.apply(part);
        Ok(&*part)
    }

    /// Remove a definition.
    pub fn delete_part(&mut self, id: &str) -> CatalogResult<PartDefinition> {
        let index = self
            .parts
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        Ok(self.parts.remove(index))
    }

    /// Reload definitions from a descriptor source.
    ///
    /// Without `force` a populated catalog is left alone and its current size
    /// is returned. Otherwise definitions whose id already exists are replaced
    /// in place, descriptors that fail to parse are skipped with a warning,
    /// and the number of definitions loaded is returned.
    pub fn reload_from_source<S, R>(
        &mut self,
        source: &S,
        resolver: &R,
        force: bool,
    ) -> CatalogResult<usize>
    where
        S: PartSource + ?Sized,
        R: AssetResolver + ?Sized,
    {
        if !force && !self.parts.is_empty() {
            log::info!("Catalog already has {} parts, skipping reload", self.parts.len());
            return Ok(self.parts.len());
        }

        let mut loaded = 0;
        for (origin, text) in source.descriptors()? {
            match parse_descriptor(&text, resolver) {
                Ok(part) => {
                    self.upsert(part);
                    loaded += 1;
                    if loaded % 100 == 0 {
                        log::info!("Loaded {} parts...", loaded);
                    }
                }
                Err(e) => log::warn!("Skipping {}: {}", origin, e),
            }
        }
        log::info!("Loaded {} parts", loaded);
        Ok(loaded)
    }

    fn upsert(&mut self, part: PartDefinition) {
        match self.parts.iter_mut().find(|p| p.id == part.id) {
            Some(existing) => *existing = part,
            None => self.parts.push(part),
        }
    }
}

fn matches_text(part: &PartDefinition, needle: &str) -> bool {
    part.title.to_lowercase().contains(needle)
        || part.description.to_lowercase().contains(needle)
        || part.tags.iter().any(|t| t.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::footprint::MemoryAssets;

    struct StaticSource(Vec<(&'static str, &'static str)>);

    impl PartSource for StaticSource {
        fn descriptors(&self) -> CatalogResult<Vec<(String, String)>> {
            Ok(self
                .0
                .iter()
                .map(|(o, t)| (o.to_string(), t.to_string()))
                .collect())
        }
    }

    fn ids(parts: &[&PartDefinition]) -> Vec<String> {
        parts.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn test_search_text_and_family() {
        let catalog = PartCatalog::samples();
        assert_eq!(ids(&catalog.search("led", Some("all"))), vec!["led-red"]);
        assert_eq!(ids(&catalog.search("LED", None)), vec!["led-red"]);
        assert_eq!(catalog.search("", None).len(), 3);
        assert_eq!(
            ids(&catalog.search("", Some("resistor"))),
            vec!["resistor-330"]
        );
        assert!(catalog.search("led", Some("Arduino")).is_empty());
        // Matches tags too.
        assert_eq!(ids(&catalog.search("microcontroller", None)), vec!["arduino-uno"]);
    }

    #[test]
    fn test_families() {
        let catalog = PartCatalog::samples();
        assert_eq!(catalog.list_families(), vec!["Arduino", "LED", "Resistor"]);
        assert_eq!(catalog.family_options()[0], ALL_FAMILIES);
    }

    #[test]
    fn test_families_ignore_case() {
        let mut catalog = PartCatalog::samples();
        let mut part = PartDefinition::new("led-blue", "Blue LED");
        part.properties.insert("family".into(), "led".into());
        catalog.create_part(part).unwrap();

        assert_eq!(catalog.list_families(), vec!["Arduino", "LED", "Resistor"]);
        assert_eq!(catalog.family_options().len(), 4);
    }

    #[test]
    fn test_list_parts_pagination() {
        let catalog = PartCatalog::samples();
        let filter = PartFilter {
            skip: 1,
            limit: Some(1),
            ..Default::default()
        };
        assert_eq!(ids(&catalog.list_parts(&filter)), vec!["resistor-330"]);
    }

    #[test]
    fn test_crud() {
        let mut catalog = PartCatalog::samples();
        assert!(matches!(
            catalog.create_part(PartDefinition::new("led-red", "again")),
            Err(CatalogError::Duplicate(_))
        ));
        catalog
            .create_part(PartDefinition::new("cap", "Capacitor"))
            .unwrap();

        let patch = PartPatch {
            title: Some("Ceramic Capacitor".into()),
            ..Default::default()
        };
        assert_eq!(
            catalog.update_part("cap", patch).unwrap().title,
            "Ceramic Capacitor"
        );
        assert!(matches!(
            catalog.update_part("nope", PartPatch::default()),
            Err(CatalogError::NotFound(_))
        ));

        catalog.delete_part("cap").unwrap();
        assert!(catalog.get("cap").is_none());
        assert!(matches!(
            catalog.delete_part("cap"),
            Err(CatalogError::NotFound(_))
        ));
    }

    #[test]
    fn test_reload_skips_bad_descriptors() {
        let source = StaticSource(vec![
            ("good.fzp", r#"<module moduleId="good"><title>Good</title></module>"#),
            ("bad.fzp", r#"<module><title>No id</title></module>"#),
            ("broken.fzp", "<module"),
        ]);
        let mut catalog = PartCatalog::new();
        let loaded = catalog
            .reload_from_source(&source, &MemoryAssets::new(), false)
            .unwrap();
        assert_eq!(loaded, 1);
        assert_eq!(catalog.get("good").unwrap().title, "Good");
    }

    #[test]
    fn test_reload_respects_force() {
        let source = StaticSource(vec![(
            "led.fzp",
            r#"<module moduleId="led-red"><title>Replaced</title></module>"#,
        )]);
        let assets = MemoryAssets::new();
        let mut catalog = PartCatalog::samples();

        assert_eq!(catalog.reload_from_source(&source, &assets, false).unwrap(), 3);
        assert_eq!(catalog.get("led-red").unwrap().title, "Red LED (5mm)");

        assert_eq!(catalog.reload_from_source(&source, &assets, true).unwrap(), 1);
        assert_eq!(catalog.get("led-red").unwrap().title, "Replaced");
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_load_or_samples_fallback() {
        let missing = FzpDirectory::new("/nonexistent/breadboard/parts");
        let catalog = PartCatalog::load_or_samples(&missing, &MemoryAssets::new());
        assert_eq!(catalog.len(), 3);

        let empty = StaticSource(Vec::new());
        let catalog = PartCatalog::load_or_samples(&empty, &MemoryAssets::new());
        assert!(catalog.get("arduino-uno").is_some());
    }

    #[test]
    fn test_fzp_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("led.fzp"),
            r#"<module moduleId="dir-led"><title>LED</title></module>"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let catalog =
            PartCatalog::load_or_samples(&FzpDirectory::new(dir.path()), &MemoryAssets::new());
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("dir-led").is_some());
    }
}
