//! Core domain types for tablelog
//!
//! These types cover both halves of the data model: statements freshly
//! parsed from an exported chat log (never persisted), and the overlay
//! documents that carry user edits on top of them.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Statement** | One utterance or system event extracted from a log file |
//! | **Tab** | A labeled channel within one log file (main narration, side chat, ...) |
//! | **Overlay** | Persisted, user-editable metadata layered on top of parsed statements |
//! | **Modifier document** | The per-directory `modifier.json` holding every file's overlay |
//! | **Legacy shape** | The pre-versioning layout where the document body was the file map itself |

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

// ============================================
// Statements
// ============================================

/// Speaker name used by the export tool for synthetic events.
pub const SYSTEM_SPEAKER: &str = "system";

/// One parsed paragraph of a log file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// Trimmed display name of the author
    pub speaker: String,
    /// Channel label with surrounding brackets stripped
    pub tab: String,
    /// Body text, line breaks preserved as `\n`
    pub content: String,
    /// `#rrggbb` accent color from the paragraph style, or empty
    pub color: String,
}

impl Statement {
    /// Whether this is a synthetic event rather than a player line
    pub fn is_system(&self) -> bool {
        self.speaker == SYSTEM_SPEAKER
    }
}

// ============================================
// Tab settings
// ============================================

/// Semantic classification of a tab.
///
/// Stored on disk as its integer code. Codes this build does not know read
/// as `Other`, the same way they render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(into = "u8", from = "i64")]
pub enum TabKind {
    #[default]
    Other,
    Main,
    Chat,
    Info,
    /// Only ever chosen by the user, never inferred.
    Colored,
}

impl TabKind {
    /// All kinds in code order
    pub const ALL: [TabKind; 5] = [
        TabKind::Other,
        TabKind::Main,
        TabKind::Chat,
        TabKind::Info,
        TabKind::Colored,
    ];

    /// Integer code used in `modifier.json`
    pub fn code(self) -> u8 {
        match self {
            TabKind::Other => 0,
            TabKind::Main => 1,
            TabKind::Chat => 2,
            TabKind::Info => 3,
            TabKind::Colored => 4,
        }
    }

    /// Returns the identifier used on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            TabKind::Other => "other",
            TabKind::Main => "main",
            TabKind::Chat => "chat",
            TabKind::Info => "info",
            TabKind::Colored => "colored",
        }
    }
}

impl From<TabKind> for u8 {
    fn from(kind: TabKind) -> Self {
        kind.code()
    }
}

impl From<i64> for TabKind {
    fn from(code: i64) -> Self {
        u8::try_from(code)
            .ok()
            .and_then(|code| TabKind::try_from(code).ok())
            .unwrap_or_default()
    }
}

impl TryFrom<u8> for TabKind {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        TabKind::ALL
            .into_iter()
            .find(|kind| kind.code() == code)
            .ok_or_else(|| format!("unknown tab type: {}", code))
    }
}

impl std::fmt::Display for TabKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TabKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(code) = s.parse::<u8>() {
            return TabKind::try_from(code);
        }
        TabKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown tab type: {}", s))
    }
}

/// Per-file, per-tab user setting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSetting {
    #[serde(alias = "tabtype")]
    pub tab_type: TabKind,
    #[serde(default, alias = "tabcolor", skip_serializing_if = "Option::is_none")]
    pub tab_color: Option<String>,
}

// ============================================
// Overlay documents
// ============================================

/// User-editable metadata for one log file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileMetadata {
    #[serde(alias = "name")]
    pub display_name: String,
    #[serde(alias = "path")]
    pub source_path: PathBuf,
    /// Epoch milliseconds; 0 when never set
    pub date: i64,
    #[serde(alias = "tag")]
    pub tags: Vec<String>,
    #[serde(alias = "tabs")]
    pub tab_settings: BTreeMap<String, TabSetting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookmark: Option<usize>,
}

impl FileMetadata {
    /// Defaults derived from the file's path: the display name is the file name.
    pub fn for_path(path: &Path) -> Self {
        let display_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            display_name,
            source_path: path.to_path_buf(),
            ..Default::default()
        }
    }
}

/// `[major, minor, patch]` stamp written into every modifier document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct AppVersion(pub [u32; 3]);

impl AppVersion {
    /// Version of the running build
    pub fn current() -> Self {
        env!("CARGO_PKG_VERSION").parse().unwrap_or_default()
    }
}

impl std::fmt::Display for AppVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [major, minor, patch] = self.0;
        write!(f, "{}.{}.{}", major, minor, patch)
    }
}

impl std::str::FromStr for AppVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Pre-release and build suffixes do not take part in the stamp.
        let core = s.split(['-', '+']).next().unwrap_or(s);
        let parts = core
            .split('.')
            .map(|part| part.parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("invalid version {:?}: {}", s, e))?;
        match parts.as_slice() {
            [major, minor, patch] => Ok(AppVersion([*major, *minor, *patch])),
            _ => Err(format!("invalid version {:?}: expected major.minor.patch", s)),
        }
    }
}

/// Overlay for every log file of one directory (`modifier.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryModifierDocument {
    /// Provenance only. A stamp that is not three integers reads as the
    /// default; loads replace it either way.
    #[serde(alias = "ver", default, deserialize_with = "lenient_version")]
    pub version: AppVersion,
    /// Keyed by bare file name
    #[serde(default, alias = "cols")]
    pub columns: BTreeMap<String, FileMetadata>,
}

fn lenient_version<'de, D>(deserializer: D) -> Result<AppVersion, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

impl DirectoryModifierDocument {
    /// Empty document stamped with `version`
    pub fn new(version: AppVersion) -> Self {
        Self {
            version,
            columns: BTreeMap::new(),
        }
    }

    /// Metadata for `file_name`, created from `source_path` when missing.
    pub fn file_entry(&mut self, file_name: &str, source_path: &Path) -> &mut FileMetadata {
        self.columns
            .entry(file_name.to_string())
            .or_insert_with(|| FileMetadata::for_path(source_path))
    }
}

// ============================================
// Application settings
// ============================================

/// Global settings (`setting.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    #[serde(alias = "logdir")]
    pub watched_directories: Vec<PathBuf>,
}

// ============================================
// Detail view
// ============================================

/// A parsed log merged with its overlay.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogView {
    /// Stored or default metadata with resolved tab settings
    pub metadata: FileMetadata,
    pub statements: Vec<Statement>,
    /// Distinct tab labels in first-appearance order
    pub tabs: Vec<String>,
}

impl LogView {
    /// Resolved setting for a tab label
    pub fn tab_setting(&self, label: &str) -> Option<&TabSetting> {
        self.metadata.tab_settings.get(label)
    }

    /// Statements whose tab resolves to one of `kinds`.
    pub fn statements_in(&self, kinds: &[TabKind]) -> Vec<&Statement> {
        let wanted: HashSet<TabKind> = kinds.iter().copied().collect();
        self.statements
            .iter()
            .filter(|statement| {
                let kind = self
                    .tab_setting(&statement.tab)
                    .map(|setting| setting.tab_type)
                    .unwrap_or_default();
                wanted.contains(&kind)
            })
            .collect()
    }
}
