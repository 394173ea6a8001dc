//! Presentation rule for system statements.
//!
//! The session tool logs character status edits as `system` statements
//! whose body reads `[ name ] parameter : before → after`.

use crate::types::Statement;
use serde::Serialize;

const DELIMITERS: [char; 4] = ['[', ']', ':', '→'];

/// A character parameter change announced by a system statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    pub character: String,
    pub parameter: String,
    pub before: String,
    pub after: String,
}

impl StatusChange {
    /// Split `content` on brackets, colons and arrows.
    ///
    /// The first four non-empty parts are used; anything after them is
    /// ignored. Returns `None` when fewer than four remain.
    pub fn parse(content: &str) -> Option<Self> {
        let parts: Vec<&str> = content
            .split(DELIMITERS)
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .take(4)
            .collect();
        match parts.as_slice() {
            [character, parameter, before, after] => Some(Self {
                character: character.to_string(),
                parameter: parameter.to_string(),
                before: before.to_string(),
                after: after.to_string(),
            }),
            _ => None,
        }
    }

    /// The status change carried by `statement`, if it is a system statement.
    pub fn from_statement(statement: &Statement) -> Option<Self> {
        if statement.is_system() {
            Self::parse(&statement.content)
        } else {
            None
        }
    }
}

impl std::fmt::Display for StatusChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} {} -> {}",
            self.character, self.parameter, self.before, self.after
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_change() {
        let change = StatusChange::parse("[ Alice ] HP : 10 → 8").unwrap();
        assert_eq!(change.character, "Alice");
        assert_eq!(change.parameter, "HP");
        assert_eq!(change.before, "10");
        assert_eq!(change.after, "8");
        assert_eq!(change.to_string(), "Alice: HP 10 -> 8");
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        assert!(StatusChange::parse("Alice joined the room").is_none());
        assert!(StatusChange::parse("[ Alice ] HP : 10").is_none());
        assert!(StatusChange::parse("").is_none());
    }

    #[test]
    fn test_extra_parts_are_ignored() {
        let change = StatusChange::parse("[ Bob ] MP : 5 → 3 → 1").unwrap();
        assert_eq!(change.before, "5");
        assert_eq!(change.after, "3");

        let change = StatusChange::parse("[ Bob ] Note : 12:30 → 13:00").unwrap();
        assert_eq!(change.parameter, "Note");
        assert_eq!(change.before, "12");
        assert_eq!(change.after, "30");
    }

    #[test]
    fn test_only_system_statements_are_interpreted() {
        let mut statement = Statement {
            speaker: "Alice".into(),
            content: "[ Alice ] SAN : 50 → 45".into(),
            ..Default::default()
        };
        assert!(StatusChange::from_statement(&statement).is_none());

        statement.speaker = "system".into();
        let change = StatusChange::from_statement(&statement).unwrap();
        assert_eq!(change.parameter, "SAN");
    }
}
