//! Forward-only pull cursor over an XML byte stream.
//!
//! Wraps a `quick_xml::Reader` and exposes one "current event" at a time.
//! Whitespace-only text, comments, processing instructions and the XML
//! declaration are never surfaced. Empty elements (`<Foo/>`) are reported as a
//! start tag immediately followed by its end tag.

use quick_xml::Reader;
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::BufRead;

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur while decoding a single document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The stream is not well-formed XML, or it ended inside an element.
    #[error("malformed document at byte {position}: {detail}")]
    MalformedDocument { position: u64, detail: String },

    /// The current event is not what the decoder requires at this point.
    #[error("expected {expected}, found {found} at byte {position}")]
    UnexpectedElement {
        expected: String,
        found: String,
        position: u64,
    },

    /// A required element never appeared before the stream ended.
    #[error("element <{name}> not found")]
    ElementNotFound { name: String },

    /// A required field had no value in the document and no default.
    #[error("missing field <{field}>")]
    MissingField { field: &'static str },

    /// A numeric field held text that is not a base-10 integer.
    #[error("invalid value {value:?} for <{field}>")]
    InvalidValue { field: String, value: String },
}

// ===========================================================================
// Configuration
// ===========================================================================

/// What to do when a document carries a `<!DOCTYPE ...>` declaration.
///
/// Entities are never expanded under any policy: only the five predefined XML
/// entities and character references are understood, and no external
/// resource is ever fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoctypePolicy {
    /// Any DOCTYPE is a malformed document.
    Reject,
    /// A DOCTYPE naming a `SYSTEM` or `PUBLIC` identifier is a malformed
    /// document; other declarations are skipped.
    #[default]
    ForbidExternal,
    /// Every DOCTYPE is skipped.
    Ignore,
}

/// Parser settings handed to each [`DocumentCursor`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    pub doctype: DoctypePolicy,
}

// ===========================================================================
// Events
// ===========================================================================

/// The event a [`DocumentCursor`] is positioned on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    /// Nothing has been read yet.
    StartDocument,
    /// A start tag, by local name.
    Start(String),
    /// An end tag, by local name.
    End(String),
    /// Unescaped character data, surrounding whitespace kept.
    Text(String),
    EndDocument,
}

impl fmt::Display for XmlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XmlEvent::StartDocument => f.write_str("start of document"),
            XmlEvent::Start(name) => write!(f, "<{name}>"),
            XmlEvent::End(name) => write!(f, "</{name}>"),
            XmlEvent::Text(text) => write!(f, "text {text:?}"),
            XmlEvent::EndDocument => f.write_str("end of document"),
        }
    }
}

/// An element the cursor has entered, obtained from
/// [`DocumentCursor::open_scope`]. Bounds [`DocumentCursor::find_within`] and
/// [`DocumentCursor::close_scope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    depth: usize,
}

/// One event pulled from quick-xml, with everything borrowed from the read
/// buffer already copied out.
enum RawEvent {
    Start(String),
    Empty(String),
    End(String),
    Text(String),
    DocType(String),
    Ignored,
    Eof,
}

// ===========================================================================
// Cursor
// ===========================================================================

/// Pull-based, forward-only view over one XML document.
///
/// A cursor owns its source and is not shareable; decode independent files
/// with independent cursors.
pub struct DocumentCursor<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    config: CursorConfig,
    current: XmlEvent,
    /// Local names of the currently open elements, outermost first.
    open: Vec<String>,
    /// End tag still owed for an empty element.
    pending_end: Option<String>,
}

impl<'a> DocumentCursor<&'a [u8]> {
    /// Cursor over an in-memory document.
    pub fn from_text(text: &'a str, config: CursorConfig) -> Self {
        Self::new(text.as_bytes(), config)
    }
}

impl<R: BufRead> DocumentCursor<R> {
    pub fn new(source: R, config: CursorConfig) -> Self {
        let mut reader = Reader::from_reader(source);
        let reader_config = reader.config_mut();
        reader_config.trim_text(false);
        reader_config.check_end_names = true;
        Self {
            reader,
            buf: Vec::new(),
            config,
            current: XmlEvent::StartDocument,
            open: Vec::new(),
            pending_end: None,
        }
    }

    pub fn config(&self) -> &CursorConfig {
        &self.config
    }

    pub fn current(&self) -> &XmlEvent {
        &self.current
    }

    /// Number of elements currently open.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Byte offset of the reader in the source stream.
    pub fn position(&self) -> u64 {
        self.reader.buffer_position()
    }

    // -----------------------------------------------------------------------
    // Core operations
    // -----------------------------------------------------------------------

    /// Advance to the next start or end tag.
    ///
    /// Non-whitespace text before the tag, a premature end of the stream, and
    /// ill-formed markup are all [`DecodeError::MalformedDocument`].
    pub fn advance_to_next_tag(&mut self) -> Result<&XmlEvent, DecodeError> {
        loop {
            self.step()?;
            if !matches!(&self.current, XmlEvent::Text(text) if text.trim().is_empty()) {
                break;
            }
        }
        match &self.current {
            XmlEvent::Start(_) | XmlEvent::End(_) => Ok(&self.current),
            XmlEvent::Text(text) => Err(self.malformed(format!(
                "unexpected text {:?} where a tag was expected",
                text.trim()
            ))),
            XmlEvent::StartDocument | XmlEvent::EndDocument => {
                Err(self.malformed("unexpected end of document".to_string()))
            }
        }
    }

    /// Fail unless the current event is the start tag `name`.
    pub fn require_current_is_start(&self, name: &str) -> Result<(), DecodeError> {
        match &self.current {
            XmlEvent::Start(found) if found == name => Ok(()),
            other => Err(DecodeError::UnexpectedElement {
                expected: format!("<{name}>"),
                found: other.to_string(),
                position: self.position(),
            }),
        }
    }

    /// Text content of the current element, consuming through its end tag.
    ///
    /// Text split by comments or CDATA sections is joined as written and only
    /// the result is trimmed. Fails if the element contains child elements.
    pub fn current_text(&mut self) -> Result<String, DecodeError> {
        let name = match &self.current {
            XmlEvent::Start(name) => name.clone(),
            other => return Err(self.unexpected("a start tag", other)),
        };
        let mut text = String::new();
        loop {
            self.step()?;
            match &self.current {
                XmlEvent::Text(chunk) => text.push_str(chunk),
                XmlEvent::End(_) => return Ok(text.trim().to_string()),
                other => {
                    return Err(self.unexpected(&format!("text content of <{name}>"), other));
                }
            }
        }
    }

    /// Discard the current element and everything nested in it, leaving the
    /// cursor on its end tag.
    pub fn skip_subtree(&mut self) -> Result<(), DecodeError> {
        let scope = self.open_scope()?;
        self.close_scope(scope)
    }

    /// Advance, at any depth, to the next start tag `name`.
    ///
    /// Fails with [`DecodeError::ElementNotFound`] if the document ends first.
    pub fn skip_forward_until_start(&mut self, name: &str) -> Result<(), DecodeError> {
        loop {
            self.step()?;
            match &self.current {
                XmlEvent::Start(found) if found == name => return Ok(()),
                XmlEvent::EndDocument => {
                    return Err(DecodeError::ElementNotFound {
                        name: name.to_string(),
                    });
                }
                _ => {}
            }
        }
    }

    // -----------------------------------------------------------------------
    // Scoped navigation
    // -----------------------------------------------------------------------

    /// Enter the element whose start tag is the current event.
    pub fn open_scope(&self) -> Result<Scope, DecodeError> {
        match &self.current {
            XmlEvent::Start(_) => Ok(Scope {
                depth: self.open.len(),
            }),
            other => Err(self.unexpected("a start tag", other)),
        }
    }

    /// Advance, at any depth inside `scope`, to the next start tag `name`.
    ///
    /// Returns `false` when the scope's end tag is reached first; the cursor
    /// is then left on that end tag.
    pub fn find_within(&mut self, scope: Scope, name: &str) -> Result<bool, DecodeError> {
        loop {
            if self.is_closed(scope) {
                return Ok(false);
            }
            self.step()?;
            if matches!(&self.current, XmlEvent::Start(found) if found == name) {
                return Ok(true);
            }
        }
    }

    /// Consume the rest of `scope` through its end tag.
    pub fn close_scope(&mut self, scope: Scope) -> Result<(), DecodeError> {
        while !self.is_closed(scope) {
            self.step()?;
        }
        Ok(())
    }

    fn is_closed(&self, scope: Scope) -> bool {
        matches!(self.current, XmlEvent::End(_)) && self.open.len() < scope.depth
    }

    // -----------------------------------------------------------------------
    // Child iteration
    // -----------------------------------------------------------------------

    /// Advance to the next child of the element being scanned.
    ///
    /// Returns the child's name, or `None` at the parent's end tag.
    pub fn next_child(&mut self) -> Result<Option<String>, DecodeError> {
        match self.advance_to_next_tag()? {
            XmlEvent::Start(name) => Ok(Some(name.clone())),
            _ => Ok(None),
        }
    }

    /// Visit every child of the current element.
    ///
    /// `handle` returns `true` if it consumed the child through its end tag;
    /// children it declines are skipped with [`Self::skip_subtree`].
    pub fn for_each_child<F>(&mut self, mut handle: F) -> Result<(), DecodeError>
    where
        F: FnMut(&mut Self, &str) -> Result<bool, DecodeError>,
    {
        while let Some(tag) = self.next_child()? {
            if !handle(self, &tag)? {
                self.skip_subtree()?;
            }
        }
        Ok(())
    }

    /// Text of the current element parsed as a base-10 integer.
    pub fn read_integer(&mut self, field: &str) -> Result<i64, DecodeError> {
        let text = self.current_text()?;
        text.trim()
            .parse::<i64>()
            .map_err(|_| DecodeError::InvalidValue {
                field: field.to_string(),
                value: text,
            })
    }

    // -----------------------------------------------------------------------
    // Event pump
    // -----------------------------------------------------------------------

    fn step(&mut self) -> Result<(), DecodeError> {
        if let Some(name) = self.pending_end.take() {
            self.open.pop();
            self.current = XmlEvent::End(name);
            return Ok(());
        }
        loop {
            match self.read_raw()? {
                RawEvent::Start(name) => {
                    self.open.push(name.clone());
                    self.current = XmlEvent::Start(name);
                }
                RawEvent::Empty(name) => {
                    self.open.push(name.clone());
                    self.pending_end = Some(name.clone());
                    self.current = XmlEvent::Start(name);
                }
                RawEvent::End(name) => {
                    self.open.pop();
                    self.current = XmlEvent::End(name);
                }
                RawEvent::Text(text) => self.current = XmlEvent::Text(text),
                RawEvent::DocType(declaration) => {
                    self.check_doctype(&declaration)?;
                    continue;
                }
                RawEvent::Ignored => continue,
                RawEvent::Eof => {
                    if let Some(open) = self.open.last() {
                        return Err(
                            self.malformed(format!("unexpected end of document inside <{open}>"))
                        );
                    }
                    self.current = XmlEvent::EndDocument;
                }
            }
            return Ok(());
        }
    }

    fn read_raw(&mut self) -> Result<RawEvent, DecodeError> {
        self.buf.clear();
        let position = self.reader.buffer_position();
        let malformed = |detail: String| DecodeError::MalformedDocument { position, detail };

        let event = self
            .reader
            .read_event_into(&mut self.buf)
            .map_err(|e| malformed(e.to_string()))?;
        let raw = match event {
            Event::Start(e) => RawEvent::Start(utf8(e.local_name().as_ref()).map_err(malformed)?),
            Event::Empty(e) => RawEvent::Empty(utf8(e.local_name().as_ref()).map_err(malformed)?),
            Event::End(e) => RawEvent::End(utf8(e.local_name().as_ref()).map_err(malformed)?),
            Event::Text(e) => {
                let text = e.unescape().map_err(|e| malformed(e.to_string()))?;
                if text.is_empty() {
                    RawEvent::Ignored
                } else {
                    RawEvent::Text(text.into_owned())
                }
            }
            Event::CData(e) => {
                let text = utf8(&e).map_err(malformed)?;
                if text.is_empty() {
                    RawEvent::Ignored
                } else {
                    RawEvent::Text(text)
                }
            }
            Event::DocType(e) => RawEvent::DocType(String::from_utf8_lossy(&e).into_owned()),
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) => RawEvent::Ignored,
            Event::Eof => RawEvent::Eof,
        };
        Ok(raw)
    }

    fn check_doctype(&self, declaration: &str) -> Result<(), DecodeError> {
        match self.config.doctype {
            DoctypePolicy::Ignore => Ok(()),
            DoctypePolicy::Reject => {
                Err(self.malformed("document type declarations are not accepted".to_string()))
            }
            DoctypePolicy::ForbidExternal if declares_external_id(declaration) => Err(
                self.malformed(format!("external identifier in DOCTYPE {declaration:?}")),
            ),
            DoctypePolicy::ForbidExternal => Ok(()),
        }
    }

    fn malformed(&self, detail: String) -> DecodeError {
        DecodeError::MalformedDocument {
            position: self.position(),
            detail,
        }
    }

    fn unexpected(&self, expected: &str, found: &XmlEvent) -> DecodeError {
        DecodeError::UnexpectedElement {
            expected: expected.to_string(),
            found: found.to_string(),
            position: self.position(),
        }
    }
}

fn utf8(bytes: &[u8]) -> Result<String, String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| e.to_string())
}

fn declares_external_id(declaration: &str) -> bool {
    declaration
        .split(|c: char| c.is_whitespace() || matches!(c, '<' | '>' | '[' | ']'))
        .any(|token| token == "SYSTEM" || token == "PUBLIC")
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(xml: &str) -> DocumentCursor<&[u8]> {
        DocumentCursor::from_text(xml, CursorConfig::default())
    }

    fn start(name: &str) -> XmlEvent {
        XmlEvent::Start(name.to_string())
    }

    fn end(name: &str) -> XmlEvent {
        XmlEvent::End(name.to_string())
    }

    // -----------------------------------------------------------------------
    // advance_to_next_tag
    // -----------------------------------------------------------------------

    #[test]
    fn advance_visits_tags_in_order() {
        let mut c = cursor("<?xml version=\"1.0\"?><A><!-- note --><B>x</B></A>");
        assert_eq!(c.current(), &XmlEvent::StartDocument);
        assert_eq!(c.advance_to_next_tag().unwrap(), &start("A"));
        assert_eq!(c.advance_to_next_tag().unwrap(), &start("B"));
        assert_eq!(c.current_text().unwrap(), "x");
        assert_eq!(c.current(), &end("B"));
        assert_eq!(c.advance_to_next_tag().unwrap(), &end("A"));
        assert_eq!(c.depth(), 0);
    }

    #[test]
    fn malformed_error_reports_byte_offset() {
        let mut c = cursor("<A>stray<B/></A>");
        c.advance_to_next_tag().unwrap();
        assert_eq!(c.position(), 3);
        match c.advance_to_next_tag() {
            Err(DecodeError::MalformedDocument { position, .. }) => assert_eq!(position, 8),
            other => panic!("expected malformed document, got {other:?}"),
        }
    }

    #[test]
    fn advance_past_root_is_premature_end() {
        let mut c = cursor("<A></A>");
        c.advance_to_next_tag().unwrap();
        c.advance_to_next_tag().unwrap();
        assert!(matches!(
            c.advance_to_next_tag(),
            Err(DecodeError::MalformedDocument { .. })
        ));
    }

    #[test]
    fn advance_rejects_text_between_tags() {
        let mut c = cursor("<A>stray<B/></A>");
        c.advance_to_next_tag().unwrap();
        assert!(matches!(
            c.advance_to_next_tag(),
            Err(DecodeError::MalformedDocument { ref detail, .. }) if detail.contains("stray")
        ));
    }

    #[test]
    fn truncated_stream_is_malformed() {
        let mut c = cursor("<A><B>");
        c.advance_to_next_tag().unwrap();
        c.advance_to_next_tag().unwrap();
        assert!(matches!(
            c.advance_to_next_tag(),
            Err(DecodeError::MalformedDocument { .. })
        ));
    }

    #[test]
    fn mismatched_end_tag_is_malformed() {
        let mut c = cursor("<A><B></C></A>");
        c.advance_to_next_tag().unwrap();
        c.advance_to_next_tag().unwrap();
        assert!(matches!(
            c.advance_to_next_tag(),
            Err(DecodeError::MalformedDocument { .. })
        ));
    }

    #[test]
    fn empty_element_is_start_then_end() {
        let mut c = cursor("<A><B/></A>");
        c.advance_to_next_tag().unwrap();
        assert_eq!(c.advance_to_next_tag().unwrap(), &start("B"));
        assert_eq!(c.depth(), 2);
        assert_eq!(c.advance_to_next_tag().unwrap(), &end("B"));
        assert_eq!(c.depth(), 1);
        assert_eq!(c.advance_to_next_tag().unwrap(), &end("A"));
    }

    // -----------------------------------------------------------------------
    // require_current_is_start
    // -----------------------------------------------------------------------

    #[test]
    fn require_start_checks_name_and_kind() {
        let mut c = cursor("<A></A>");
        c.advance_to_next_tag().unwrap();
        assert!(c.require_current_is_start("A").is_ok());
        assert!(matches!(
            c.require_current_is_start("B"),
            Err(DecodeError::UnexpectedElement { ref expected, ref found, .. })
                if expected == "<B>" && found == "<A>"
        ));
        c.advance_to_next_tag().unwrap();
        assert!(matches!(
            c.require_current_is_start("A"),
            Err(DecodeError::UnexpectedElement { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // current_text
    // -----------------------------------------------------------------------

    #[test]
    fn text_is_unescaped_and_trimmed() {
        let mut c = cursor("<A>  Fish &amp; Chips\n</A>");
        c.advance_to_next_tag().unwrap();
        assert_eq!(c.current_text().unwrap(), "Fish & Chips");
        assert_eq!(c.current(), &end("A"));
    }

    #[test]
    fn text_of_empty_element() {
        let mut c = cursor("<R><A/><B></B></R>");
        c.advance_to_next_tag().unwrap();
        c.advance_to_next_tag().unwrap();
        assert_eq!(c.current_text().unwrap(), "");
        c.advance_to_next_tag().unwrap();
        assert_eq!(c.current_text().unwrap(), "");
    }

    #[test]
    fn text_includes_cdata_and_skips_comments() {
        let mut c = cursor("<A>one<!-- c --><![CDATA[<two>]]></A>");
        c.advance_to_next_tag().unwrap();
        assert_eq!(c.current_text().unwrap(), "one<two>");
    }

    #[test]
    fn text_split_by_comment_keeps_inner_whitespace() {
        let mut c = cursor("<A> Iron <!-- x --> Ore </A>");
        c.advance_to_next_tag().unwrap();
        assert_eq!(c.current_text().unwrap(), "Iron  Ore");

        let mut c = cursor("<A>Fine <![CDATA[Cloth]]> Bales</A>");
        c.advance_to_next_tag().unwrap();
        assert_eq!(c.current_text().unwrap(), "Fine Cloth Bales");
    }

    #[test]
    fn whitespace_between_tags_is_ignorable() {
        let mut c = cursor("<?xml version=\"1.0\"?>\n<R>\n  <A/>\n\t</R>\n");
        assert_eq!(c.advance_to_next_tag().unwrap(), &XmlEvent::Start("R".into()));
        assert_eq!(c.advance_to_next_tag().unwrap(), &XmlEvent::Start("A".into()));
        assert_eq!(c.advance_to_next_tag().unwrap(), &end("A"));
        assert_eq!(c.advance_to_next_tag().unwrap(), &end("R"));
    }

    #[test]
    fn text_rejects_nested_elements() {
        let mut c = cursor("<A>x<B/></A>");
        c.advance_to_next_tag().unwrap();
        assert!(matches!(
            c.current_text(),
            Err(DecodeError::UnexpectedElement { ref found, .. }) if found == "<B>"
        ));
    }

    #[test]
    fn unknown_entity_is_not_expanded() {
        let mut c = cursor("<A>&secret;</A>");
        c.advance_to_next_tag().unwrap();
        assert!(matches!(
            c.current_text(),
            Err(DecodeError::MalformedDocument { .. })
        ));
    }

    #[test]
    fn read_integer_parses_and_reports_field() {
        let mut c = cursor("<R><N> 42 </N><M>4.5</M></R>");
        c.advance_to_next_tag().unwrap();
        c.advance_to_next_tag().unwrap();
        assert_eq!(c.read_integer("N").unwrap(), 42);
        c.advance_to_next_tag().unwrap();
        assert_eq!(
            c.read_integer("M"),
            Err(DecodeError::InvalidValue {
                field: "M".to_string(),
                value: "4.5".to_string(),
            })
        );
    }

    // -----------------------------------------------------------------------
    // skip_subtree
    // -----------------------------------------------------------------------

    #[test]
    fn skip_subtree_handles_deep_nesting() {
        let depth = 500;
        let mut xml = String::from("<R>");
        for _ in 0..depth {
            xml.push_str("<X>");
        }
        for _ in 0..depth {
            xml.push_str("</X>");
        }
        xml.push_str("<After>ok</After></R>");

        let mut c = cursor(&xml);
        c.advance_to_next_tag().unwrap();
        c.advance_to_next_tag().unwrap();
        c.skip_subtree().unwrap();
        assert_eq!(c.current(), &end("X"));
        assert_eq!(c.depth(), 1);
        assert_eq!(c.advance_to_next_tag().unwrap(), &start("After"));
    }

    #[test]
    fn skip_subtree_fails_on_truncated_stream() {
        let mut c = cursor("<R><X><Y></Y>");
        c.advance_to_next_tag().unwrap();
        c.advance_to_next_tag().unwrap();
        assert!(matches!(
            c.skip_subtree(),
            Err(DecodeError::MalformedDocument { .. })
        ));
    }

    #[test]
    fn skip_subtree_requires_start_tag() {
        let mut c = cursor("<R></R>");
        c.advance_to_next_tag().unwrap();
        c.advance_to_next_tag().unwrap();
        assert!(matches!(
            c.skip_subtree(),
            Err(DecodeError::UnexpectedElement { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // skip_forward_until_start
    // -----------------------------------------------------------------------

    #[test]
    fn skip_forward_finds_nested_start() {
        let mut c = cursor("<R>text<A><B>1</B></A><Target>t</Target></R>");
        c.skip_forward_until_start("Target").unwrap();
        assert_eq!(c.current(), &start("Target"));
        assert_eq!(c.current_text().unwrap(), "t");
    }

    #[test]
    fn skip_forward_reports_missing_element() {
        let mut c = cursor("<R><A/></R>");
        assert_eq!(
            c.skip_forward_until_start("Target"),
            Err(DecodeError::ElementNotFound {
                name: "Target".to_string()
            })
        );
    }

    // -----------------------------------------------------------------------
    // Scopes
    // -----------------------------------------------------------------------

    #[test]
    fn find_within_stops_at_scope_end() {
        let mut c = cursor("<R><S><T>1</T><X><T>2</T></X></S><T>outside</T></R>");
        c.advance_to_next_tag().unwrap();
        c.advance_to_next_tag().unwrap();
        let scope = c.open_scope().unwrap();

        let mut found = Vec::new();
        while c.find_within(scope, "T").unwrap() {
            found.push(c.current_text().unwrap());
        }
        assert_eq!(found, vec!["1", "2"]);
        assert_eq!(c.current(), &end("S"));
        assert_eq!(c.advance_to_next_tag().unwrap(), &start("T"));
    }

    #[test]
    fn close_scope_consumes_remainder() {
        let mut c = cursor("<R><S><A/><B><C/></B></S><Next/></R>");
        c.advance_to_next_tag().unwrap();
        c.advance_to_next_tag().unwrap();
        let scope = c.open_scope().unwrap();
        c.advance_to_next_tag().unwrap();
        c.close_scope(scope).unwrap();
        assert_eq!(c.current(), &end("S"));
        assert_eq!(c.advance_to_next_tag().unwrap(), &start("Next"));
    }

    #[test]
    fn for_each_child_skips_declined_children() {
        let mut c = cursor("<R><Keep>a</Keep><Drop><Deep>x</Deep></Drop><Keep>b</Keep></R>");
        c.advance_to_next_tag().unwrap();
        let mut kept = Vec::new();
        c.for_each_child(|c, tag| match tag {
            "Keep" => {
                kept.push(c.current_text()?);
                Ok(true)
            }
            _ => Ok(false),
        })
        .unwrap();
        assert_eq!(kept, vec!["a", "b"]);
        assert_eq!(c.current(), &end("R"));
    }

    // -----------------------------------------------------------------------
    // DOCTYPE policy
    // -----------------------------------------------------------------------

    const EXTERNAL: &str =
        "<!DOCTYPE R [<!ENTITY xxe SYSTEM \"file:///etc/passwd\">]><R>&xxe;</R>";
    const INTERNAL: &str = "<!DOCTYPE R><R>ok</R>";

    fn with_policy(xml: &str, doctype: DoctypePolicy) -> DocumentCursor<&[u8]> {
        DocumentCursor::from_text(xml, CursorConfig { doctype })
    }

    #[test]
    fn external_identifier_rejected_by_default() {
        let mut c = with_policy(EXTERNAL, DoctypePolicy::default());
        assert!(matches!(
            c.advance_to_next_tag(),
            Err(DecodeError::MalformedDocument { .. })
        ));
    }

    #[test]
    fn plain_doctype_allowed_by_default() {
        let mut c = with_policy(INTERNAL, DoctypePolicy::ForbidExternal);
        c.advance_to_next_tag().unwrap();
        assert_eq!(c.current_text().unwrap(), "ok");
    }

    #[test]
    fn reject_policy_refuses_any_doctype() {
        let mut c = with_policy(INTERNAL, DoctypePolicy::Reject);
        assert!(matches!(
            c.advance_to_next_tag(),
            Err(DecodeError::MalformedDocument { .. })
        ));
    }

    #[test]
    fn ignore_policy_still_never_expands_entities() {
        let mut c = with_policy(EXTERNAL, DoctypePolicy::Ignore);
        c.advance_to_next_tag().unwrap();
        assert!(matches!(
            c.current_text(),
            Err(DecodeError::MalformedDocument { .. })
        ));
    }

    #[test]
    fn config_deserializes_from_toml() {
        let config: CursorConfig = toml::from_str("doctype = \"reject\"").unwrap();
        assert_eq!(config.doctype, DoctypePolicy::Reject);
        let config: CursorConfig = toml::from_str("").unwrap();
        assert_eq!(config, CursorConfig::default());
    }
}
