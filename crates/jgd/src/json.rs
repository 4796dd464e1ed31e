//
// json.rs
//
// Copyright (C) 2024 jgd contributors
//
//

//! A streaming, write-only JSON assembler.
//!
//! This is deliberately not `serde_json::Value` construction: the page
//! assembler needs byte-offset control over the in-progress buffer (to
//! splice out a delta payload and re-open the array for more appends), and
//! serde's `Value` tree has no notion of "the bytes I've already written".
//! Inbound control messages are simple enough that `serde_json` parses them
//! directly; this writer only ever produces bytes, never consumes them.

pub struct Writer {
    buf: String,
}

impl Writer {
    pub fn new() -> Self {
        Writer { buf: String::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Writer { buf: String::with_capacity(capacity) }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn into_string(self) -> String {
        self.buf
    }

    /// Truncate the buffer back to `len` bytes. `len` must fall on a char
    /// boundary (callers only ever pass offsets previously returned by
    /// [`Writer::len`]).
    pub fn truncate(&mut self, len: usize) {
        self.buf.truncate(len);
    }

    /// Append pre-built, already-valid JSON bytes without re-escaping them.
    /// Used to splice a delta slice from one buffer into another.
    pub fn raw(&mut self, s: &str) -> &mut Self {
        self.buf.push_str(s);
        self
    }

    pub fn raw_char(&mut self, c: char) -> &mut Self {
        self.buf.push(c);
        self
    }

    /// Write a quoted, escaped JSON string.
    pub fn string(&mut self, s: &str) -> &mut Self {
        self.buf.push('"');
        for c in s.chars() {
            match c {
                '"' => self.buf.push_str("\\\""),
                '\\' => self.buf.push_str("\\\\"),
                '\n' => self.buf.push_str("\\n"),
                '\r' => self.buf.push_str("\\r"),
                '\t' => self.buf.push_str("\\t"),
                c if (c as u32) < 0x20 => {
                    self.buf.push_str(&format!("\\u{:04x}", c as u32));
                },
                c => self.buf.push(c),
            }
        }
        self.buf.push('"');
        self
    }

    /// Write a bare `"key":` (including the trailing colon, no comma).
    pub fn key(&mut self, key: &str) -> &mut Self {
        self.string(key);
        self.buf.push(':');
        self
    }

    /// Write a number with at most 4 fractional digits; trailing zeros and
    /// a dangling `.` are trimmed. Non-finite values serialize as `null`.
    pub fn number(&mut self, n: f64) -> &mut Self {
        if !n.is_finite() {
            self.buf.push_str("null");
            return self;
        }
        let formatted = format!("{:.4}", n);
        let trimmed = formatted.trim_end_matches('0');
        let trimmed = trimmed.trim_end_matches('.');
        self.buf.push_str(if trimmed.is_empty() || trimmed == "-" {
            "0"
        } else {
            trimmed
        });
        self
    }

    pub fn int(&mut self, n: i64) -> &mut Self {
        self.buf.push_str(&n.to_string());
        self
    }

    pub fn bool(&mut self, b: bool) -> &mut Self {
        self.buf.push_str(if b { "true" } else { "false" });
        self
    }

    pub fn null(&mut self) -> &mut Self {
        self.buf.push_str("null");
        self
    }

    /// Write a string, or `null` if absent -- the shape every optional color
    /// and optional field in the op model takes on the wire.
    pub fn opt_string(&mut self, s: Option<&str>) -> &mut Self {
        match s {
            Some(s) => self.string(s),
            None => self.null(),
        };
        self
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_quotes_and_backslashes() {
        let mut w = Writer::new();
        w.string("a\"b\\c");
        assert_eq!(w.as_str(), r#""a\"b\\c""#);
    }

    #[test]
    fn escapes_control_bytes_as_u00xx() {
        let mut w = Writer::new();
        w.string("a\u{0001}b");
        assert_eq!(w.as_str(), r#""a\u0001b""#);
    }

    #[test]
    fn passes_through_newline_tab_cr_as_short_escapes() {
        let mut w = Writer::new();
        w.string("a\nb\tc\rd");
        assert_eq!(w.as_str(), r#""a\nb\tc\rd""#);
    }

    #[test]
    fn trims_trailing_zeros_and_dot() {
        let mut w = Writer::new();
        w.number(5.0);
        assert_eq!(w.as_str(), "5");

        let mut w = Writer::new();
        w.number(5.25);
        assert_eq!(w.as_str(), "5.25");

        let mut w = Writer::new();
        w.number(0.50000001);
        assert_eq!(w.as_str(), "0.5");
    }

    #[test]
    fn non_finite_becomes_null() {
        let mut w = Writer::new();
        w.number(f64::NAN);
        assert_eq!(w.as_str(), "null");

        let mut w = Writer::new();
        w.number(f64::INFINITY);
        assert_eq!(w.as_str(), "null");
    }

    #[test]
    fn truncate_reopens_a_spliced_array() {
        let mut w = Writer::new();
        w.raw("[1,2,3]");
        let splice_point = 6; // just before the closing bracket
        w.truncate(splice_point);
        w.raw(",4]");
        assert_eq!(w.as_str(), "[1,2,3,4]");
    }
}
