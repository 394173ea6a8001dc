//! Streaming HTML lexer
//!
//! Produces open-tag / text / close-tag events in document order without
//! building a tree. It is deliberately forgiving: exported logs are not
//! validated markup, so anything that does not look like a tag is text and
//! an unterminated construct simply runs to the end of input.
//!
//! - Tag and attribute names are lowercased.
//! - Void elements (`<br>`, `<img>`, ...) and `<x/>` are reported with
//!   [`StartTag::self_closing`] set and never get a close event.
//! - Comments, doctypes, processing instructions and the bodies of
//!   `<script>`/`<style>` produce no events.
//! - Character references are decoded in text and attribute values.

use std::borrow::Cow;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// One lexical event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlEvent<'a> {
    Open(StartTag<'a>),
    /// Lowercased tag name
    Close(String),
    Text(Cow<'a, str>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag<'a> {
    /// Lowercased tag name
    pub name: String,
    pub attributes: Vec<(String, Cow<'a, str>)>,
    pub self_closing: bool,
}

impl StartTag<'_> {
    /// Value of the first attribute called `name` (lowercase).
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_ref())
    }
}

/// Iterator over the events of an HTML string.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    /// Set after `<script>`/`<style>`: the closing tag to skip ahead to.
    raw_text_end: Option<&'static str>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            raw_text_end: None,
        }
    }

    fn bytes(&self) -> &'a [u8] {
        self.input.as_bytes()
    }

    fn skip_past(&mut self, terminator: &str) {
        self.pos = match self.input[self.pos..].find(terminator) {
            Some(offset) => self.pos + offset + terminator.len(),
            None => self.input.len(),
        };
    }

    fn text_event(&mut self, start: usize) -> HtmlEvent<'a> {
        // A stray '<' belongs to this text run; don't stop on it.
        let from = if self.bytes()[start] == b'<' { start + 1 } else { start };
        let end = self.input[from..]
            .find('<')
            .map(|offset| from + offset)
            .unwrap_or(self.input.len());
        self.pos = end;
        HtmlEvent::Text(decode_entities(&self.input[start..end]))
    }

    fn read_name(&mut self) -> String {
        let bytes = self.bytes();
        let start = self.pos;
        while self.pos < bytes.len()
            && !bytes[self.pos].is_ascii_whitespace()
            && !matches!(bytes[self.pos], b'/' | b'>' | b'=')
        {
            self.pos += 1;
        }
        self.input[start..self.pos].to_ascii_lowercase()
    }

    fn skip_whitespace(&mut self) {
        let bytes = self.bytes();
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn read_attribute_value(&mut self) -> Cow<'a, str> {
        let bytes = self.bytes();
        match bytes.get(self.pos) {
            Some(&quote @ (b'"' | b'\'')) => {
                let start = self.pos + 1;
                let end = bytes[start..]
                    .iter()
                    .position(|&b| b == quote)
                    .map(|offset| start + offset)
                    .unwrap_or(bytes.len());
                self.pos = (end + 1).min(bytes.len());
                decode_entities(&self.input[start..end])
            }
            _ => {
                let start = self.pos;
                while self.pos < bytes.len()
                    && !bytes[self.pos].is_ascii_whitespace()
                    && bytes[self.pos] != b'>'
                {
                    self.pos += 1;
                }
                decode_entities(&self.input[start..self.pos])
            }
        }
    }

    /// Lex a start tag; `self.pos` is just past the `<`.
    fn start_tag(&mut self) -> StartTag<'a> {
        let name = self.read_name();
        let mut attributes = Vec::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            let bytes = self.bytes();
            match bytes.get(self.pos) {
                None => break,
                Some(b'>') => {
                    self.pos += 1;
                    break;
                }
                Some(b'/') if bytes.get(self.pos + 1) == Some(&b'>') => {
                    self_closing = true;
                    self.pos += 2;
                    break;
                }
                Some(b'/') | Some(b'=') => {
                    self.pos += 1;
                }
                Some(_) => {
                    let key = self.read_name();
                    self.skip_whitespace();
                    let value = if self.bytes().get(self.pos) == Some(&b'=') {
                        self.pos += 1;
                        self.skip_whitespace();
                        self.read_attribute_value()
                    } else {
                        Cow::Borrowed("")
                    };
                    attributes.push((key, value));
                }
            }
        }

        if VOID_ELEMENTS.contains(&name.as_str()) {
            self_closing = true;
        } else if !self_closing {
            self.raw_text_end = match name.as_str() {
                "script" => Some("</script"),
                "style" => Some("</style"),
                _ => None,
            };
        }

        StartTag {
            name,
            attributes,
            self_closing,
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = HtmlEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.pos >= self.input.len() {
                return None;
            }

            if let Some(end_tag) = self.raw_text_end.take() {
                self.pos = find_ignore_case(&self.input[self.pos..], end_tag)
                    .map(|offset| self.pos + offset)
                    .unwrap_or(self.input.len());
                continue;
            }

            let start = self.pos;
            let rest = &self.bytes()[start..];
            if rest[0] != b'<' {
                return Some(self.text_event(start));
            }

            match rest.get(1) {
                Some(b'!') if rest.starts_with(b"<!--") => {
                    self.pos += 4;
                    self.skip_past("-->");
                }
                Some(b'!') | Some(b'?') => self.skip_past(">"),
                Some(b'/') if rest.get(2).is_some_and(u8::is_ascii_alphabetic) => {
                    self.pos += 2;
                    let name = self.read_name();
                    self.skip_past(">");
                    return Some(HtmlEvent::Close(name));
                }
                Some(c) if c.is_ascii_alphabetic() => {
                    self.pos += 1;
                    return Some(HtmlEvent::Open(self.start_tag()));
                }
                _ => return Some(self.text_event(start)),
            }
        }
    }
}

fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

/// Decode character references. Unknown references are kept literally.
pub fn decode_entities(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest[1..]
            .find(';')
            .filter(|&semi| semi > 0 && semi <= 32)
            .and_then(|semi| decode_reference(&rest[1..1 + semi]).map(|ch| (ch, semi + 2)));

        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn decode_reference(reference: &str) -> Option<char> {
    if let Some(numeric) = reference.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    match reference {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(html: &str) -> Vec<HtmlEvent<'_>> {
        Tokenizer::new(html).collect()
    }

    fn open<'a>(name: &str, attributes: &[(&str, &'a str)], self_closing: bool) -> HtmlEvent<'a> {
        HtmlEvent::Open(StartTag {
            name: name.to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), Cow::Borrowed(*v)))
                .collect(),
            self_closing,
        })
    }

    fn text(s: &str) -> HtmlEvent<'_> {
        HtmlEvent::Text(Cow::Borrowed(s))
    }

    #[test]
    fn test_basic_sequence() {
        assert_eq!(
            events(r#"<P style="color:#123456;">hi<BR>there</p>"#),
            vec![
                open("p", &[("style", "color:#123456;")], false),
                text("hi"),
                open("br", &[], true),
                text("there"),
                HtmlEvent::Close("p".to_string()),
            ]
        );
    }

    #[test]
    fn test_attribute_forms() {
        let evs = events("<span class=tab data-x='a b' hidden id = \"z\"/>");
        match &evs[0] {
            HtmlEvent::Open(tag) => {
                assert_eq!(tag.attr("class"), Some("tab"));
                assert_eq!(tag.attr("data-x"), Some("a b"));
                assert_eq!(tag.attr("hidden"), Some(""));
                assert_eq!(tag.attr("id"), Some("z"));
                assert!(tag.self_closing);
            }
            other => panic!("expected open tag, got {:?}", other),
        }
    }

    #[test]
    fn test_skips_comments_doctype_and_scripts() {
        let html = "<!DOCTYPE html><!-- <p>no</p> --><script>if (a < b) {}</script><style>p{}</STYLE>ok";
        assert_eq!(
            events(html),
            vec![
                open("script", &[], false),
                HtmlEvent::Close("script".to_string()),
                open("style", &[], false),
                HtmlEvent::Close("style".to_string()),
                text("ok"),
            ]
        );
    }

    #[test]
    fn test_stray_angle_bracket_is_text() {
        assert_eq!(
            events("a < b <3"),
            vec![text("a "), text("< b "), text("<3")]
        );
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("plain"), "plain");
        assert_eq!(decode_entities("a &amp; b &lt;c&gt;"), "a & b <c>");
        assert_eq!(decode_entities("&#12354;&#x3042;"), "ああ");
        assert_eq!(decode_entities("&quot;&apos;&nbsp;"), "\"'\u{a0}");
        assert_eq!(decode_entities("&unknown; & &;"), "&unknown; & &;");
    }

    #[test]
    fn test_entities_in_text_and_attributes() {
        let evs = events(r#"<p title="a&amp;b">x &gt; y</p>"#);
        match &evs[0] {
            HtmlEvent::Open(tag) => assert_eq!(tag.attr("title"), Some("a&b")),
            other => panic!("expected open tag, got {:?}", other),
        }
        assert_eq!(evs[1], HtmlEvent::Text(Cow::Owned("x > y".to_string())));
    }

    #[test]
    fn test_unterminated_tag_runs_to_end() {
        let evs = events("<p class=\"open");
        assert_eq!(evs.len(), 1);
        match &evs[0] {
            HtmlEvent::Open(tag) => assert_eq!(tag.attr("class"), Some("open")),
            other => panic!("expected open tag, got {:?}", other),
        }
    }

    #[test]
    fn test_multibyte_text_is_preserved() {
        assert_eq!(
            events("<span>[メイン]</span>"),
            vec![
                open("span", &[], false),
                text("[メイン]"),
                HtmlEvent::Close("span".to_string()),
            ]
        );
    }
}
