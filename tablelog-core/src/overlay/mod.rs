//! Per-directory metadata overlay
//!
//! Each watched directory owns one `modifier.json`, registered in the
//! [`DocumentStore`] under the directory path. It holds every file's
//! [`FileMetadata`]: display name, date, tags, bookmark and per-tab
//! settings. Source HTML is never touched.
//!
//! Every save stamps the running [`AppVersion`]. The stamp records
//! provenance only; no load is ever refused because of it.

mod document;

pub use document::StoredModifierDocument;

use crate::classify::classify;
use crate::color::parse_hex;
use crate::error::{Error, Result};
use crate::store::DocumentStore;
use crate::types::{
    AppVersion, DirectoryModifierDocument, FileMetadata, Statement, TabKind, TabSetting,
};
use std::collections::btree_map::Entry;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Color given to a tab first created through an explicit edit.
pub const DEFAULT_TAB_COLOR: &str = "#fff3f3";

/// Default overlay file name inside a watched directory.
pub const DEFAULT_MODIFIER_FILE: &str = "modifier.json";

/// Tab settings for one file's statements, in first-appearance order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedTabs {
    pub tabs: Vec<(String, TabSetting)>,
    /// How many labels were new and received a classifier default
    pub inserted: usize,
}

impl ResolvedTabs {
    pub fn get(&self, label: &str) -> Option<&TabSetting> {
        self.tabs
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, setting)| setting)
    }
}

/// Fill in tab settings for every label in `statements`.
///
/// Labels without a stored setting get `{ tabType: classify(label) }`; stored
/// settings are returned unchanged even when the classifier disagrees. A
/// missing file entry is created from `file_name` alone, so callers that know
/// the full path should create it first with
/// [`DirectoryModifierDocument::file_entry`].
pub fn resolve_statement_tabs(
    document: &mut DirectoryModifierDocument,
    file_name: &str,
    statements: &[Statement],
) -> ResolvedTabs {
    let metadata = document.file_entry(file_name, Path::new(file_name));
    let mut resolved = ResolvedTabs::default();
    let mut seen = HashSet::new();

    for statement in statements {
        if !seen.insert(statement.tab.as_str()) {
            continue;
        }
        let setting = match metadata.tab_settings.entry(statement.tab.clone()) {
            Entry::Occupied(stored) => stored.get().clone(),
            Entry::Vacant(slot) => {
                resolved.inserted += 1;
                slot.insert(TabSetting {
                    tab_type: classify(&statement.tab),
                    tab_color: None,
                })
                .clone()
            }
        };
        resolved.tabs.push((statement.tab.clone(), setting));
    }

    resolved
}

/// Loads, edits and saves `modifier.json` documents through a [`DocumentStore`].
#[derive(Debug, Clone)]
pub struct MetadataOverlay {
    version: AppVersion,
    modifier_file: String,
}

impl MetadataOverlay {
    pub fn new(version: AppVersion) -> Self {
        Self {
            version,
            modifier_file: DEFAULT_MODIFIER_FILE.to_string(),
        }
    }

    /// Use a different overlay file name inside each directory.
    pub fn with_modifier_file(mut self, modifier_file: impl Into<String>) -> Self {
        self.modifier_file = modifier_file.into();
        self
    }

    pub fn version(&self) -> AppVersion {
        self.version
    }

    /// `directory/modifier.json`
    pub fn modifier_path(&self, directory: &Path) -> PathBuf {
        directory.join(&self.modifier_file)
    }

    fn store_name(directory: &Path) -> String {
        directory.to_string_lossy().into_owned()
    }

    fn register(&self, store: &mut DocumentStore, directory: &Path) -> Result<String> {
        let name = Self::store_name(directory);
        if !store.is_defined(&name) {
            store.init(
                &name,
                &self.modifier_path(directory),
                &DirectoryModifierDocument::new(self.version),
            )?;
        }
        Ok(name)
    }

    /// Overlay for `directory`, created empty on first use.
    ///
    /// Served from the store cache once registered.
    pub fn load(
        &self,
        store: &mut DocumentStore,
        directory: &Path,
    ) -> Result<DirectoryModifierDocument> {
        let name = self.register(store, directory)?;
        self.decode(store, &name)
    }

    /// Like [`load`](Self::load) but re-reads the file first.
    pub fn load_fresh(
        &self,
        store: &mut DocumentStore,
        directory: &Path,
    ) -> Result<DirectoryModifierDocument> {
        let name = Self::store_name(directory);
        if store.is_defined(&name) {
            store.reload(&name)?;
        } else {
            self.register(store, directory)?;
        }
        self.decode(store, &name)
    }

    fn decode(&self, store: &DocumentStore, name: &str) -> Result<DirectoryModifierDocument> {
        let raw = store.get(name)?.clone();
        let stored = StoredModifierDocument::decode(raw).map_err(|source| {
            Error::MalformedDocument {
                path: store.path_of(name).map(Path::to_path_buf).unwrap_or_default(),
                source,
            }
        })?;
        if stored.is_legacy() {
            tracing::info!(directory = name, "Upgrading legacy modifier document");
        }
        Ok(stored.upgrade(self.version))
    }

    /// Stamp the running version into `document` and write it through.
    pub fn save(
        &self,
        store: &mut DocumentStore,
        directory: &Path,
        document: &mut DirectoryModifierDocument,
    ) -> Result<()> {
        let name = self.register(store, directory)?;
        document.version = self.version;
        store.update_as(&name, document)?;
        tracing::info!(
            directory = %directory.display(),
            files = document.columns.len(),
            "Saved modifier document"
        );
        Ok(())
    }

    /// Set a tab's kind, and its color when one is given.
    ///
    /// A tab created here starts as `Other` with [`DEFAULT_TAB_COLOR`]. Omitting
    /// `color` keeps whatever color is stored.
    pub fn set_tab_setting(
        &self,
        store: &mut DocumentStore,
        directory: &Path,
        file_name: &str,
        label: &str,
        tab_type: TabKind,
        color: Option<&str>,
    ) -> Result<TabSetting> {
        let color = color.map(parse_hex).transpose()?;
        let mut document = self.load(store, directory)?;

        let setting = document
            .file_entry(file_name, &directory.join(file_name))
            .tab_settings
            .entry(label.to_string())
            .or_insert_with(|| TabSetting {
                tab_type: TabKind::Other,
                tab_color: Some(DEFAULT_TAB_COLOR.to_string()),
            });
        setting.tab_type = tab_type;
        if let Some(color) = color {
            setting.tab_color = Some(color);
        }
        let setting = setting.clone();

        self.save(store, directory, &mut document)?;
        tracing::debug!(file = file_name, label, tab_type = %tab_type, "Updated tab setting");
        Ok(setting)
    }

    /// Replace one file's metadata wholesale.
    pub fn set_file_metadata(
        &self,
        store: &mut DocumentStore,
        directory: &Path,
        file_name: &str,
        metadata: FileMetadata,
    ) -> Result<()> {
        let mut document = self.load(store, directory)?;
        document.columns.insert(file_name.to_string(), metadata);
        self.save(store, directory, &mut document)
    }

    /// Stored bookmark, `0` when never set.
    pub fn get_bookmark(
        &self,
        store: &mut DocumentStore,
        directory: &Path,
        file_name: &str,
    ) -> Result<usize> {
        let document = self.load(store, directory)?;
        Ok(document
            .columns
            .get(file_name)
            .and_then(|metadata| metadata.bookmark)
            .unwrap_or(0))
    }

    pub fn set_bookmark(
        &self,
        store: &mut DocumentStore,
        directory: &Path,
        file_name: &str,
        index: usize,
    ) -> Result<()> {
        let mut document = self.load(store, directory)?;
        document
            .file_entry(file_name, &directory.join(file_name))
            .bookmark = Some(index);
        self.save(store, directory, &mut document)
    }
}
