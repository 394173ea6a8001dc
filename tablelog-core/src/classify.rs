//! Default tab classification.
//!
//! Only consulted the first time a label is seen for a file; a stored
//! [`TabSetting`](crate::types::TabSetting) always wins afterwards.

use crate::types::TabKind;

/// Exact-match synonyms. English and Japanese labels exported by the session tool.
const TAB_SYNONYMS: &[(&str, TabKind)] = &[
    ("main", TabKind::Main),
    ("メイン", TabKind::Main),
    ("other", TabKind::Chat),
    ("雑談", TabKind::Chat),
    ("info", TabKind::Info),
    ("情報", TabKind::Info),
];

/// Map a raw tab label to its default kind. Case-sensitive, no normalization.
pub fn classify(label: &str) -> TabKind {
    TAB_SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == label)
        .map(|(_, kind)| *kind)
        .unwrap_or(TabKind::Other)
}
