//! Syntax highlighting for the JSON viewers.
//!
//! A value is pretty-printed with two-space indentation and every lexical
//! token is wrapped in `<span class="...">`. Tokens are recognised left to
//! right with this precedence at each position:
//!
//! 1. a quoted string, optionally followed by whitespace and `:`. With the
//!    colon it is a *key*, without it a *string* value;
//! 2. `true`, `false` or `null` standing as a whole word;
//! 3. a number, `-?\d+\.?\d*`.
//!
//! Anything else is copied through. Text is HTML-escaped so the element's
//! `textContent` is exactly the pretty-printed JSON.

use std::io;

use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};
use serde_json::Value;

use crate::geojson::js_number_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Key,
    String,
    Boolean,
    Null,
    Number,
}

impl TokenClass {
    pub fn css_class(self) -> &'static str {
        match self {
            TokenClass::Key => "key",
            TokenClass::String => "string",
            TokenClass::Boolean => "boolean",
            TokenClass::Null => "null",
            TokenClass::Number => "number",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Plain(&'a str),
    Token(TokenClass, &'a str),
}

/// Two-space pretty printing with floats spelled as the browser spells them.
struct JsFormatter<'a> {
    pretty: PrettyFormatter<'a>,
}

impl<'a> JsFormatter<'a> {
    fn new() -> Self {
        JsFormatter { pretty: PrettyFormatter::new() }
    }
}

impl<'a> Formatter for JsFormatter<'a> {
    fn write_f64<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: f64) -> io::Result<()> {
        writer.write_all(js_number_text(value).as_bytes())
    }

    fn write_f32<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: f32) -> io::Result<()> {
        self.write_f64(writer, f64::from(value))
    }

    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.pretty.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.pretty.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_object_value(writer)
    }
}

/// Pretty-printed JSON, or an empty string for null/absent input.
pub fn plain_text(value: Option<&Value>) -> String {
    let value = match value {
        None | Some(Value::Null) => return String::new(),
        Some(v) => v,
    };
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, JsFormatter::new());
    // Serializing a Value into memory cannot fail: keys are always strings
    if value.serialize(&mut serializer).is_err() {
        return String::new();
    }
    String::from_utf8(out).unwrap_or_default()
}

/// Highlighted markup for `value`; null/absent input yields an empty string.
pub fn format(value: Option<&Value>) -> String {
    highlight_text(&plain_text(value))
}

/// Wrap every token of already-rendered JSON text in a span.
pub fn highlight_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for segment in tokenize(text) {
        match segment {
            Segment::Plain(s) => push_escaped(&mut out, s),
            Segment::Token(class, s) => {
                out.push_str("<span class=\"");
                out.push_str(class.css_class());
                out.push_str("\">");
                push_escaped(&mut out, s);
                out.push_str("</span>");
            }
        }
    }
    out
}

fn push_escaped(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// Split rendered JSON text into plain runs and classified tokens.
pub fn tokenize(text: &str) -> Vec<Segment<'_>> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let matched = match_string(bytes, i)
            .or_else(|| match_literal(bytes, i))
            .or_else(|| match_number(bytes, i));

        match matched {
            Some((class, end)) => {
                if plain_start < i {
                    segments.push(Segment::Plain(&text[plain_start..i]));
                }
                segments.push(Segment::Token(class, &text[i..end]));
                i = end;
                plain_start = end;
            }
            None => i += 1,
        }
    }
    if plain_start < bytes.len() {
        segments.push(Segment::Plain(&text[plain_start..]));
    }
    segments
}

fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

// Quoted string with `\uXXXX` and single-character escapes, plus an optional
// `\s*:` suffix that turns it into a key.
fn match_string(bytes: &[u8], start: usize) -> Option<(TokenClass, usize)> {
    if bytes[start] != b'"' {
        return None;
    }
    let mut i = start + 1;
    loop {
        match *bytes.get(i)? {
            b'"' => break,
            b'\\' => {
                let next = *bytes.get(i + 1)?;
                if next == b'u' {
                    let hex = bytes.get(i + 2..i + 6)?;
                    if !hex.iter().all(u8::is_ascii_alphanumeric) {
                        return None;
                    }
                    i += 6;
                } else {
                    i += 2;
                }
            }
            _ => i += 1,
        }
    }
    let close = i + 1;

    let mut j = close;
    while j < bytes.len() && is_space(bytes[j]) {
        j += 1;
    }
    if bytes.get(j) == Some(&b':') {
        Some((TokenClass::Key, j + 1))
    } else {
        Some((TokenClass::String, close))
    }
}

fn match_literal(bytes: &[u8], start: usize) -> Option<(TokenClass, usize)> {
    if start > 0 && is_word(bytes[start - 1]) {
        return None;
    }
    let rest = &bytes[start..];
    let (class, len) = if rest.starts_with(b"true") {
        (TokenClass::Boolean, 4)
    } else if rest.starts_with(b"false") {
        (TokenClass::Boolean, 5)
    } else if rest.starts_with(b"null") {
        (TokenClass::Null, 4)
    } else {
        return None;
    };
    let end = start + len;
    if bytes.get(end).is_some_and(|b| is_word(*b)) {
        return None;
    }
    Some((class, end))
}

fn match_number(bytes: &[u8], start: usize) -> Option<(TokenClass, usize)> {
    let mut i = start;
    if bytes[i] == b'-' {
        i += 1;
    }
    let digits_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == digits_start {
        return None;
    }
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    Some((TokenClass::Number, i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classes(text: &str) -> Vec<(TokenClass, &str)> {
        tokenize(text)
            .into_iter()
            .filter_map(|s| match s {
                Segment::Token(c, t) => Some((c, t)),
                Segment::Plain(_) => None,
            })
            .collect()
    }

    #[test]
    fn null_and_absent_render_empty() {
        assert_eq!(format(None), "");
        assert_eq!(format(Some(&Value::Null)), "");
        assert_eq!(format(Some(&json!(null))), "");
    }

    #[test]
    fn quoted_string_before_colon_is_a_key() {
        let html = format(Some(&json!({ "a": "a" })));
        assert_eq!(
            html,
            "{\n  <span class=\"key\">\"a\":</span> <span class=\"string\">\"a\"</span>\n}"
        );
    }

    #[test]
    fn every_token_kind_is_classified() {
        let text = plain_text(Some(&json!({ "n": -1.5, "t": true, "f": false, "z": null })));
        assert_eq!(
            classes(&text),
            vec![
                (TokenClass::Key, "\"n\":"),
                (TokenClass::Number, "-1.5"),
                (TokenClass::Key, "\"t\":"),
                (TokenClass::Boolean, "true"),
                (TokenClass::Key, "\"f\":"),
                (TokenClass::Boolean, "false"),
                (TokenClass::Key, "\"z\":"),
                (TokenClass::Null, "null"),
            ]
        );
    }

    #[test]
    fn literals_inside_strings_stay_strings() {
        let text = plain_text(Some(&json!(["true 12", "say \"null\""])));
        assert_eq!(
            classes(&text),
            vec![
                (TokenClass::String, "\"true 12\""),
                (TokenClass::String, "\"say \\\"null\\\"\""),
            ]
        );
    }

    #[test]
    fn whitespace_before_colon_still_makes_a_key() {
        assert_eq!(classes("\"k\"  :1"), vec![(TokenClass::Key, "\"k\"  :"), (TokenClass::Number, "1")]);
    }

    #[test]
    fn literals_need_word_boundaries() {
        assert!(classes("nullx xtrue").is_empty());
        assert_eq!(classes("[true,null]"), vec![
            (TokenClass::Boolean, "true"),
            (TokenClass::Null, "null"),
        ]);
    }

    #[test]
    fn exponents_split_into_number_runs() {
        // Same split a `-?\d+\.?\d*` scan produces on `1e-7`
        assert_eq!(
            classes("1e-7"),
            vec![(TokenClass::Number, "1"), (TokenClass::Number, "-7")]
        );
    }

    #[test]
    fn broken_unicode_escape_is_not_a_string() {
        assert_eq!(classes("\"\\u12\" 3"), vec![(TokenClass::Number, "12"), (TokenClass::Number, "3")]);
    }

    #[test]
    fn markup_is_escaped() {
        let html = format(Some(&json!(["<b>&"])));
        assert!(html.contains("\"&lt;b&gt;&amp;\""));
    }

    #[test]
    fn formatting_is_idempotent() {
        let value = json!([{ "type": "Feature", "properties": { "radius": 500 } }]);
        assert_eq!(format(Some(&value)), format(Some(&value)));
    }

    #[test]
    fn small_and_huge_floats_stay_single_number_tokens() {
        let value = json!([0.0000012, 1e16, -0.000001]);
        assert_eq!(plain_text(Some(&value)), "[\n  0.0000012,\n  10000000000000000,\n  -0.000001\n]");
        assert_eq!(
            classes(&plain_text(Some(&value))),
            vec![
                (TokenClass::Number, "0.0000012"),
                (TokenClass::Number, "10000000000000000"),
                (TokenClass::Number, "-0.000001"),
            ]
        );
    }

    #[test]
    fn empty_collections_render_compactly() {
        assert_eq!(plain_text(Some(&json!([]))), "[]");
        assert_eq!(
            format(Some(&json!({ "markers": [] }))),
            "{\n  <span class=\"key\">\"markers\":</span> []\n}"
        );
    }
}
