//! Shared text rendering for statements and list rows.

use tablelog_core::format::{format_date, preview};
use tablelog_core::{FileMetadata, Statement, StatusChange, TabKind, TabSetting};

/// Widest display name shown in the file list.
const NAME_WIDTH: usize = 40;

/// Short bracketed label for a tab kind.
pub fn kind_label(kind: TabKind) -> &'static str {
    match kind {
        TabKind::Main => "[main]",
        TabKind::Chat => "[chat]",
        TabKind::Info => "[info]",
        TabKind::Colored => "[colored]",
        TabKind::Other => "[other]",
    }
}

/// One detail-view line. System statements that announce a status change
/// collapse to a single `*` line.
pub fn statement_line(statement: &Statement) -> String {
    if let Some(change) = StatusChange::from_statement(statement) {
        return format!("  * {}", change);
    }

    let mut lines = statement.content.lines();
    let first = lines.next().unwrap_or_default();
    let mut out = format!("[{}] {}: {}", statement.tab, statement.speaker, first);
    // Continuation lines line up under the body.
    let indent = " ".repeat(statement.tab.chars().count() + statement.speaker.chars().count() + 5);
    for line in lines {
        out.push('\n');
        out.push_str(&indent);
        out.push_str(line);
    }
    out
}

/// One row of the tab table.
pub fn tab_line(label: &str, setting: Option<&TabSetting>) -> String {
    let kind = setting.map(|s| s.tab_type).unwrap_or_default();
    let color = setting
        .and_then(|s| s.tab_color.as_deref())
        .unwrap_or("-");
    format!("{:<10} {:<8} {}", kind_label(kind), color, label)
}

pub fn tags_label(tags: &[String]) -> String {
    if tags.is_empty() {
        "-".to_string()
    } else {
        tags.join(", ")
    }
}

/// One row of the file list.
pub fn metadata_row(metadata: &FileMetadata) -> String {
    format!(
        "{:<10}  {:<width$}  {}",
        format_date(metadata.date),
        preview(&metadata.display_name, NAME_WIDTH),
        tags_label(&metadata.tags),
        width = NAME_WIDTH
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement(tab: &str, speaker: &str, content: &str) -> Statement {
        Statement {
            speaker: speaker.into(),
            tab: tab.into(),
            content: content.into(),
            color: String::new(),
        }
    }

    #[test]
    fn test_statement_line_indents_continuations() {
        let line = statement_line(&statement("main", "GM", "one\ntwo"));
        assert_eq!(line, "[main] GM: one\n           two");
    }

    #[test]
    fn test_status_change_collapses() {
        let line = statement_line(&statement("main", "system", "[ Alice ] HP : 10 → 8"));
        assert_eq!(line, "  * Alice: HP 10 -> 8");
    }

    #[test]
    fn test_system_text_without_change_is_plain() {
        let line = statement_line(&statement("main", "system", "Alice joined"));
        assert_eq!(line, "[main] system: Alice joined");
    }

    #[test]
    fn test_tab_line_defaults() {
        assert_eq!(tab_line("dice", None), "[other]    -        dice");
    }

    #[test]
    fn test_metadata_row() {
        let metadata = FileMetadata {
            display_name: "night1.html".into(),
            tags: vec!["horror".into()],
            ..Default::default()
        };
        let row = metadata_row(&metadata);
        assert!(row.starts_with("-           night1.html"));
        assert!(row.ends_with("horror"));
    }
}
