//! Statement reconstruction from exported chat-log HTML
//!
//! The export writes one paragraph per statement, with three spans in a
//! fixed order:
//!
//! ```html
//! <p style="color:#1a2b3c;">
//!   <span> [main]</span>
//!   <span>Alice</span> :
//!   <span>Hello<br>there</span>
//! </p>
//! ```
//!
//! Span #1 carries the tab label, span #2 the speaker, span #3 the body.
//! Text between spans (the ` : ` separator) is discarded.
//!
//! ## Error Handling
//!
//! The format is not schema-validated, so nothing here fails. Missing spans
//! leave fields empty, extra spans are ignored, and structural surprises are
//! recorded in [`ParsedLog::warnings`]:
//!
//! - a paragraph opened while another is open closes the earlier one
//! - a paragraph still open at end of input is emitted as-is

use super::tokenizer::{HtmlEvent, StartTag, Tokenizer};
use crate::types::Statement;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// First `#` + exactly six hex digits in an inline style.
static COLOR_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)#[0-9a-f]{6}\b").expect("color token pattern is valid"));

const PARAGRAPH_TAG: &str = "p";
const SPAN_TAG: &str = "span";
const LINE_BREAK_TAG: &str = "br";

/// Output of one parse pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedLog {
    /// Statements in document order
    pub statements: Vec<Statement>,
    /// Distinct tab labels in first-appearance order
    pub tabs: Vec<String>,
    /// Non-fatal structural anomalies
    pub warnings: Vec<String>,
}

/// Where the parser is within the current paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Outside any paragraph
    Idle,
    /// Inside a paragraph, between spans; `spans_seen` spans opened so far
    InParagraph { spans_seen: usize },
    /// Inside the `index`-th span (1-based) of the current paragraph
    InSpan { index: usize },
}

/// What a span contributes, by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpanRole {
    Tab,
    Speaker,
    Body,
}

impl SpanRole {
    fn at(index: usize) -> Option<Self> {
        match index {
            1 => Some(SpanRole::Tab),
            2 => Some(SpanRole::Speaker),
            3 => Some(SpanRole::Body),
            _ => None,
        }
    }
}

/// Single-pass state machine over [`HtmlEvent`]s.
///
/// Holds no state between parses: [`LogHtmlParser::parse`] on the same
/// input always yields the same output.
#[derive(Debug)]
pub struct LogHtmlParser {
    state: ParserState,
    current: Statement,
    paragraphs_opened: usize,
    seen_tabs: HashSet<String>,
    output: ParsedLog,
}

impl Default for LogHtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LogHtmlParser {
    pub fn new() -> Self {
        Self {
            state: ParserState::Idle,
            current: Statement::default(),
            paragraphs_opened: 0,
            seen_tabs: HashSet::new(),
            output: ParsedLog::default(),
        }
    }

    /// Parse a complete document.
    pub fn parse(html: &str) -> ParsedLog {
        let mut parser = Self::new();
        for event in Tokenizer::new(html) {
            parser.feed(event);
        }
        parser.finish()
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Consume one event.
    pub fn feed(&mut self, event: HtmlEvent<'_>) {
        match event {
            HtmlEvent::Open(tag) => self.open_tag(&tag),
            HtmlEvent::Close(name) => self.close_tag(&name),
            HtmlEvent::Text(text) => self.text(&text),
        }
    }

    /// Flush any open paragraph and return the result.
    pub fn finish(mut self) -> ParsedLog {
        if self.state != ParserState::Idle {
            self.warn(format!(
                "paragraph {} was not closed before end of input",
                self.paragraphs_opened
            ));
            self.close_paragraph();
        }
        self.output
    }

    fn open_tag(&mut self, tag: &StartTag<'_>) {
        match tag.name.as_str() {
            PARAGRAPH_TAG => self.open_paragraph(tag),
            SPAN_TAG => {
                self.state = match self.state {
                    ParserState::Idle => ParserState::Idle,
                    ParserState::InParagraph { spans_seen } => ParserState::InSpan {
                        index: spans_seen + 1,
                    },
                    ParserState::InSpan { index } => ParserState::InSpan { index: index + 1 },
                };
            }
            LINE_BREAK_TAG => {
                if let ParserState::InSpan { index } = self.state {
                    if SpanRole::at(index) == Some(SpanRole::Body) {
                        self.current.content.push('\n');
                    }
                }
            }
            _ => {}
        }
    }

    fn close_tag(&mut self, name: &str) {
        match name {
            PARAGRAPH_TAG if self.state != ParserState::Idle => self.close_paragraph(),
            SPAN_TAG => {
                if let ParserState::InSpan { index } = self.state {
                    self.state = ParserState::InParagraph { spans_seen: index };
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        let ParserState::InSpan { index } = self.state else {
            return;
        };
        match SpanRole::at(index) {
            Some(SpanRole::Tab) => self
                .current
                .tab
                .extend(text.chars().filter(|c| !matches!(c, '[' | ']'))),
            Some(SpanRole::Speaker) => self.current.speaker.push_str(text),
            Some(SpanRole::Body) => self.current.content.push_str(text),
            None => {}
        }
    }

    fn open_paragraph(&mut self, tag: &StartTag<'_>) {
        if self.state != ParserState::Idle {
            self.warn(format!(
                "paragraph {} implicitly closed by the next paragraph",
                self.paragraphs_opened
            ));
            self.close_paragraph();
        }

        self.paragraphs_opened += 1;
        self.current = Statement::default();
        if let Some(color) = tag
            .attr("style")
            .and_then(|style| COLOR_TOKEN.find(style))
        {
            self.current.color = color.as_str().to_string();
        }
        self.state = ParserState::InParagraph { spans_seen: 0 };
    }

    fn close_paragraph(&mut self) {
        let current = std::mem::take(&mut self.current);
        let statement = Statement {
            speaker: current.speaker.trim().to_string(),
            tab: current.tab.trim().to_string(),
            content: current.content.trim().to_string(),
            color: current.color,
        };

        if self.seen_tabs.insert(statement.tab.clone()) {
            self.output.tabs.push(statement.tab.clone());
        }
        self.output.statements.push(statement);
        self.state = ParserState::Idle;
    }

    fn warn(&mut self, message: String) {
        tracing::debug!(warning = %message, "Log HTML anomaly");
        self.output.warnings.push(message);
    }
}
