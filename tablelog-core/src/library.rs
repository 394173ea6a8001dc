//! The log library: watched directories, listing and detail views.
//!
//! [`LogLibrary`] is what a shell talks to. It owns the [`DocumentStore`],
//! reads `setting.json` for the watched directories, and routes every
//! per-file request to the overlay of the file's parent directory.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tablelog_core::{Config, LogLibrary};
//!
//! let config = Config::load()?;
//! let mut library = LogLibrary::open(&config)?;
//! for metadata in library.list_library()? {
//!     println!("{}", metadata.display_name);
//! }
//! # Ok::<(), tablelog_core::Error>(())
//! ```

use crate::config::Config;
use crate::error::{Error, Result};
use crate::ingest::{self, GlobFileSource, LogFileSource};
use crate::overlay::{resolve_statement_tabs, MetadataOverlay};
use crate::store::DocumentStore;
use crate::types::{AppSettings, AppVersion, FileMetadata, LogView, TabKind, TabSetting};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Logical store name of `setting.json`
pub const SETTINGS_DOCUMENT: &str = "setting";

// ============================================
// File ids
// ============================================

/// Percent-encoded file path used to address a detail view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileId(String);

impl FileId {
    pub fn from_path(path: &Path) -> Self {
        Self(urlencoding::encode(&path.to_string_lossy()).into_owned())
    }

    /// Wrap an already-encoded id.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The file path this id refers to.
    pub fn decode(&self) -> Result<PathBuf> {
        urlencoding::decode(&self.0)
            .map(|path| PathBuf::from(path.into_owned()))
            .map_err(|e| Error::InvalidPath(format!("{}: {}", self.0, e)))
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Split a log file path into its directory and bare file name.
pub fn split_file_path(path: &Path) -> Result<(PathBuf, String)> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| Error::InvalidPath(format!("{} has no file name", path.display())))?;
    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .ok_or_else(|| {
            Error::InvalidPath(format!("{} has no parent directory", path.display()))
        })?;
    Ok((directory.to_path_buf(), file_name))
}

// ============================================
// Library
// ============================================

/// Entry point for every shell operation.
#[derive(Debug)]
pub struct LogLibrary<S: LogFileSource = GlobFileSource> {
    store: DocumentStore,
    overlay: MetadataOverlay,
    source: S,
}

impl LogLibrary<GlobFileSource> {
    /// Open the library described by `config`.
    pub fn open(config: &Config) -> Result<Self> {
        let overlay = MetadataOverlay::new(AppVersion::current())
            .with_modifier_file(config.library.modifier_file.clone());
        Self::with_source(
            &config.library.settings_path(),
            overlay,
            GlobFileSource::new(&config.library.extensions),
        )
    }
}

impl<S: LogFileSource> LogLibrary<S> {
    /// Open with an explicit settings path and file source.
    ///
    /// `setting.json` is created empty when missing.
    pub fn with_source(settings_path: &Path, overlay: MetadataOverlay, source: S) -> Result<Self> {
        let mut store = DocumentStore::new();
        store.init(SETTINGS_DOCUMENT, settings_path, &AppSettings::default())?;
        tracing::debug!(settings = %settings_path.display(), "Opened log library");
        Ok(Self {
            store,
            overlay,
            source,
        })
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn settings(&self) -> Result<AppSettings> {
        self.store.get_as(SETTINGS_DOCUMENT)
    }

    pub fn watched_directories(&self) -> Result<Vec<PathBuf>> {
        Ok(self.settings()?.watched_directories)
    }

    /// Append `directory` to the watch list. Returns `false` if already watched.
    pub fn add_directory(&mut self, directory: &Path) -> Result<bool> {
        let mut settings = self.settings()?;
        if settings.watched_directories.iter().any(|d| d == directory) {
            return Ok(false);
        }
        settings.watched_directories.push(directory.to_path_buf());
        self.store.update_as(SETTINGS_DOCUMENT, &settings)?;
        tracing::info!(dir = %directory.display(), "Watching directory");
        Ok(true)
    }

    /// Drop `directory` from the watch list. Returns `false` if it was not watched.
    ///
    /// The directory's overlay file is left in place.
    pub fn remove_directory(&mut self, directory: &Path) -> Result<bool> {
        let mut settings = self.settings()?;
        let before = settings.watched_directories.len();
        settings.watched_directories.retain(|d| d != directory);
        if settings.watched_directories.len() == before {
            return Ok(false);
        }
        self.store.update_as(SETTINGS_DOCUMENT, &settings)?;
        tracing::info!(dir = %directory.display(), "Stopped watching directory");
        Ok(true)
    }

    /// Every log file under the watched directories.
    pub fn list_log_files(&self) -> Result<Vec<PathBuf>> {
        self.source.list_log_files(&self.watched_directories()?)
    }

    /// Parse `path` and merge it with its directory overlay.
    ///
    /// Labels seen for the first time get a classifier default, which is
    /// written back together with a new file entry when either was added.
    pub fn parse_and_merge(&mut self, path: &Path) -> Result<LogView> {
        let (directory, file_name) = split_file_path(path)?;
        let parsed = ingest::parse_file(path)?;
        let mut document = self.overlay.load(&mut self.store, &directory)?;

        let created = !document.columns.contains_key(&file_name);
        document.file_entry(&file_name, path);
        let resolved = resolve_statement_tabs(&mut document, &file_name, &parsed.statements);
        if created || resolved.inserted > 0 {
            self.overlay.save(&mut self.store, &directory, &mut document)?;
        }

        let mut metadata = document
            .columns
            .remove(&file_name)
            .unwrap_or_else(|| FileMetadata::for_path(path));
        locate(&mut metadata, &directory, &file_name);

        tracing::debug!(
            path = %path.display(),
            statements = parsed.statements.len(),
            new_tabs = resolved.inserted,
            "Merged log with overlay"
        );
        Ok(LogView {
            metadata,
            statements: parsed.statements,
            tabs: parsed.tabs,
        })
    }

    /// Metadata for every file of one directory, sorted by source path.
    ///
    /// Each entry's `source_path` is `directory` joined with its key, whatever
    /// path was stored when the entry was written. Re-reads the overlay from disk. Log files without an entry get
    /// defaults, persisted in a single write. Entries whose file is gone are
    /// still listed.
    pub fn list_file_metadata(&mut self, directory: &Path) -> Result<Vec<FileMetadata>> {
        let mut document = self.overlay.load_fresh(&mut self.store, directory)?;

        let mut added = 0;
        for file in self.source.list_directory(directory)? {
            let (_, file_name) = split_file_path(&file)?;
            if !document.columns.contains_key(&file_name) {
                document.file_entry(&file_name, &file);
                added += 1;
            }
        }
        if added > 0 {
            tracing::info!(dir = %directory.display(), added, "Registered new log files");
            self.overlay.save(&mut self.store, directory, &mut document)?;
        }

        let mut entries: Vec<FileMetadata> = document
            .columns
            .into_iter()
            .map(|(file_name, mut metadata)| {
                locate(&mut metadata, directory, &file_name);
                metadata
            })
            .collect();
        entries.sort_by(|a, b| a.source_path.cmp(&b.source_path));
        Ok(entries)
    }

    /// Metadata for every log file under every watched directory.
    pub fn list_library(&mut self) -> Result<Vec<FileMetadata>> {
        let directories: BTreeSet<PathBuf> = self
            .list_log_files()?
            .into_iter()
            .filter_map(|file| file.parent().map(Path::to_path_buf))
            .collect();

        let mut entries = Vec::new();
        for directory in &directories {
            entries.extend(self.list_file_metadata(directory)?);
        }
        entries.sort_by(|a, b| a.source_path.cmp(&b.source_path));
        Ok(entries)
    }

    /// Persist a list-view edit. The target file is `metadata.source_path`.
    pub fn update_file_metadata(&mut self, metadata: FileMetadata) -> Result<()> {
        let (directory, file_name) = split_file_path(&metadata.source_path)?;
        self.overlay
            .set_file_metadata(&mut self.store, &directory, &file_name, metadata)
    }

    /// Persist a detail-view tab change for the file at `path`.
    pub fn update_tab_setting(
        &mut self,
        path: &Path,
        label: &str,
        tab_type: TabKind,
        color: Option<&str>,
    ) -> Result<TabSetting> {
        let (directory, file_name) = split_file_path(path)?;
        self.overlay.set_tab_setting(
            &mut self.store,
            &directory,
            &file_name,
            label,
            tab_type,
            color,
        )
    }

    pub fn get_bookmark(&mut self, path: &Path) -> Result<usize> {
        let (directory, file_name) = split_file_path(path)?;
        self.overlay
            .get_bookmark(&mut self.store, &directory, &file_name)
    }

    pub fn set_bookmark(&mut self, path: &Path, index: usize) -> Result<()> {
        let (directory, file_name) = split_file_path(path)?;
        self.overlay
            .set_bookmark(&mut self.store, &directory, &file_name, index)
    }
}

// Entries are keyed by directory and bare file name. The stored path is
// stale once the directory moves, and empty in legacy documents.
fn locate(metadata: &mut FileMetadata, directory: &Path, file_name: &str) {
    metadata.source_path = directory.join(file_name);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const LOG: &str = r#"<html><body>
<p style="color:#112233;"><span>[main]</span><span>GM</span><span>Welcome.<br>Roll.</span></p>
<p style="color:#445566;"><span>[雑談]</span><span>Alice</span><span>hi</span></p>
<p><span>[dice]</span><span>system</span><span>[ Alice ] HP : 10 → 8</span></p>
</body></html>"#;

    struct Fixture {
        _root: TempDir,
        logs: PathBuf,
        library: LogLibrary,
    }

    fn fixture() -> Fixture {
        crate::logging::init_test();
        let root = TempDir::new().unwrap();
        let logs = root.path().join("logs");
        fs::create_dir_all(&logs).unwrap();
        let library = LogLibrary::with_source(
            &root.path().join("data/setting.json"),
            MetadataOverlay::new(AppVersion([1, 0, 0])),
            GlobFileSource::default(),
        )
        .unwrap();
        Fixture {
            _root: root,
            logs,
            library,
        }
    }

    fn write_log(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, LOG).unwrap();
    }

    #[test]
    fn test_file_id_round_trip() {
        let path = Path::new("/logs/2024 campaign/night #1.html");
        let id = FileId::from_path(path);
        assert!(!id.as_str().contains('/'));
        assert!(!id.as_str().contains(' '));
        assert_eq!(id.decode().unwrap(), path);
        assert_eq!(FileId::new(id.to_string()), id);
    }

    #[test]
    fn test_split_file_path() {
        let (dir, name) = split_file_path(Path::new("/logs/a.html")).unwrap();
        assert_eq!(dir, PathBuf::from("/logs"));
        assert_eq!(name, "a.html");
        assert!(matches!(
            split_file_path(Path::new("a.html")),
            Err(Error::InvalidPath(_))
        ));
        assert!(matches!(
            split_file_path(Path::new("/")),
            Err(Error::InvalidPath(_))
        ));
    }

    #[test]
    fn test_add_and_remove_directory() {
        let mut fx = fixture();
        let logs = fx.logs.clone();

        assert!(fx.library.store().is_defined(SETTINGS_DOCUMENT));
        assert!(fx.library.watched_directories().unwrap().is_empty());
        assert!(fx.library.add_directory(&logs).unwrap());
        assert!(!fx.library.add_directory(&logs).unwrap());
        assert_eq!(fx.library.watched_directories().unwrap(), vec![logs.clone()]);

        assert!(fx.library.remove_directory(&logs).unwrap());
        assert!(!fx.library.remove_directory(&logs).unwrap());
        assert!(fx.library.watched_directories().unwrap().is_empty());
    }

    #[test]
    fn test_parse_and_merge_assigns_defaults_and_persists() {
        let mut fx = fixture();
        let path = fx.logs.join("night1.html");
        write_log(&path);

        let view = fx.library.parse_and_merge(&path).unwrap();

        assert_eq!(view.statements.len(), 3);
        assert_eq!(view.statements[0].content, "Welcome.\nRoll.");
        assert_eq!(view.tabs, vec!["main", "雑談", "dice"]);
        assert_eq!(view.metadata.display_name, "night1.html");
        assert_eq!(view.metadata.source_path, path);
        assert_eq!(view.tab_setting("main").unwrap().tab_type, TabKind::Main);
        assert_eq!(view.tab_setting("雑談").unwrap().tab_type, TabKind::Chat);
        assert_eq!(view.tab_setting("dice").unwrap().tab_type, TabKind::Other);

        let on_disk: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(fx.logs.join("modifier.json")).unwrap())
                .unwrap();
        assert_eq!(
            on_disk["columns"]["night1.html"]["tabSettings"]["main"]["tabType"],
            serde_json::json!(1)
        );
    }

    #[test]
    fn test_stored_tab_setting_wins_over_classifier() {
        let mut fx = fixture();
        let path = fx.logs.join("night1.html");
        write_log(&path);

        fx.library
            .update_tab_setting(&path, "main", TabKind::Info, None)
            .unwrap();
        let view = fx.library.parse_and_merge(&path).unwrap();

        let setting = view.tab_setting("main").unwrap();
        assert_eq!(setting.tab_type, TabKind::Info);
        assert_eq!(setting.tab_color.as_deref(), Some("#fff3f3"));
        assert_eq!(view.statements_in(&[TabKind::Info]).len(), 1);
    }

    #[test]
    fn test_tab_color_preserved_on_type_only_edit() {
        let mut fx = fixture();
        let path = fx.logs.join("night1.html");
        write_log(&path);

        fx.library
            .update_tab_setting(&path, "雑談", TabKind::Other, Some("#ffffff"))
            .unwrap();
        fx.library
            .update_tab_setting(&path, "雑談", TabKind::Chat, None)
            .unwrap();

        let view = fx.library.parse_and_merge(&path).unwrap();
        let setting = view.tab_setting("雑談").unwrap();
        assert_eq!(setting.tab_type, TabKind::Chat);
        assert_eq!(setting.tab_color.as_deref(), Some("#ffffff"));
    }

    #[test]
    fn test_bookmarks() {
        let mut fx = fixture();
        let path = fx.logs.join("night1.html");
        write_log(&path);

        assert_eq!(fx.library.get_bookmark(&path).unwrap(), 0);
        fx.library.set_bookmark(&path, 2).unwrap();
        assert_eq!(fx.library.get_bookmark(&path).unwrap(), 2);
        assert_eq!(
            fx.library.parse_and_merge(&path).unwrap().metadata.bookmark,
            Some(2)
        );
    }

    #[test]
    fn test_list_library_registers_defaults_once() {
        let mut fx = fixture();
        let logs = fx.logs.clone();
        write_log(&logs.join("b.html"));
        write_log(&logs.join("a.HTM"));
        write_log(&logs.join("campaign/c.html"));
        fs::write(logs.join("notes.txt"), "ignored").unwrap();
        fx.library.add_directory(&logs).unwrap();

        let entries = fx.library.list_library().unwrap();

        let names: Vec<&str> = entries.iter().map(|m| m.display_name.as_str()).collect();
        assert_eq!(names, vec!["a.HTM", "b.html", "c.html"]);
        assert!(entries.iter().all(|m| m.date == 0 && m.tags.is_empty()));
        assert!(logs.join("modifier.json").exists());
        assert!(logs.join("campaign/modifier.json").exists());

        let before = fs::read_to_string(logs.join("modifier.json")).unwrap();
        fx.library.list_library().unwrap();
        let after = fs::read_to_string(logs.join("modifier.json")).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_update_file_metadata_shows_in_listing() {
        let mut fx = fixture();
        let logs = fx.logs.clone();
        let path = logs.join("night1.html");
        write_log(&path);
        fx.library.add_directory(&logs).unwrap();

        let mut entry = fx.library.list_file_metadata(&logs).unwrap().remove(0);
        entry.display_name = "First night".into();
        entry.date = 1_700_000_000_000;
        entry.tags = vec!["horror".into(), "oneshot".into()];
        fx.library.update_file_metadata(entry.clone()).unwrap();

        let listed = fx.library.list_library().unwrap();
        assert_eq!(listed, vec![entry]);
    }

    #[test]
    fn test_list_file_metadata_sees_external_edits() {
        let mut fx = fixture();
        let logs = fx.logs.clone();
        write_log(&logs.join("a.html"));
        fx.library.list_file_metadata(&logs).unwrap();

        fs::write(
            logs.join("modifier.json"),
            r#"{ "version": [1, 0, 0], "columns": { "a.html": { "displayName": "Edited" } } }"#,
        )
        .unwrap();

        let entries = fx.library.list_file_metadata(&logs).unwrap();
        assert_eq!(entries[0].display_name, "Edited");
        assert_eq!(entries[0].source_path, logs.join("a.html"));
    }

    #[test]
    fn test_moved_directory_keeps_edits_and_follows_new_path() {
        let mut fx = fixture();
        let logs = fx.logs.clone();
        let path = logs.join("night1.html");
        write_log(&path);
        fx.library
            .update_tab_setting(&path, "雑談", TabKind::Colored, Some("#a0b0c0"))
            .unwrap();
        fx.library.set_bookmark(&path, 7).unwrap();
        let mut entry = fx.library.list_file_metadata(&logs).unwrap().remove(0);
        entry.tags = vec!["horror".into()];
        fx.library.update_file_metadata(entry).unwrap();

        let moved = logs.with_file_name("moved");
        fs::rename(&logs, &moved).unwrap();
        let moved_path = moved.join("night1.html");

        let mut entry = fx.library.list_file_metadata(&moved).unwrap().remove(0);
        assert_eq!(entry.source_path, moved_path);
        assert_eq!(entry.tags, vec!["horror"]);
        assert_eq!(entry.bookmark, Some(7));

        entry.display_name = "Renamed".into();
        fx.library.update_file_metadata(entry).unwrap();

        let view = fx.library.parse_and_merge(&moved_path).unwrap();
        assert_eq!(view.metadata.source_path, moved_path);
        assert_eq!(view.metadata.display_name, "Renamed");
        assert_eq!(view.metadata.tags, vec!["horror"]);
        assert_eq!(view.metadata.bookmark, Some(7));
        assert_eq!(
            view.tab_setting("雑談").unwrap().tab_color.as_deref(),
            Some("#a0b0c0")
        );
        assert!(!logs.exists());
    }

    /// Serves a fixed file list regardless of directory.
    struct FixedSource(Vec<PathBuf>);

    impl LogFileSource for FixedSource {
        fn list_log_files(&self, _directories: &[PathBuf]) -> Result<Vec<PathBuf>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_custom_source_drives_listing() {
        let root = TempDir::new().unwrap();
        let logs = root.path().join("logs");
        write_log(&logs.join("kept.html"));
        write_log(&logs.join("hidden.html"));
        let source = FixedSource(vec![logs.join("kept.html"), root.path().join("elsewhere.html")]);
        let mut library = LogLibrary::with_source(
            &root.path().join("setting.json"),
            MetadataOverlay::new(AppVersion([1, 0, 0])),
            source,
        )
        .unwrap();

        let entries = library.list_file_metadata(&logs).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].display_name, "kept.html");
    }

    #[test]
    fn test_missing_log_file_is_io_error() {
        let mut fx = fixture();
        let err = fx
            .library
            .parse_and_merge(&fx.logs.join("gone.html"))
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
