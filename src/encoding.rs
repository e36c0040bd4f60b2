//! Canonical JSON encoding.
//!
//! Fingerprints already in circulation were computed over JSON produced with
//! HTML-safe string escaping and a specific float layout. This module pins
//! those byte-level rules on top of `serde_json`:
//!
//! * `<`, `>`, `&`, U+2028 and U+2029 are written as `\u` escapes;
//! * floats use the shortest round-trip digits, integral values carry no
//!   fractional part (`0`, not `0.0`), and magnitudes below `1e-6` or at
//!   least `1e21` switch to exponent form with a signed exponent (`1e+21`).
//!
//! Everything else (field order, compact separators, control-character
//! escapes) is what `serde_json` already emits.

use crate::error::{LedgerError, Result};
use serde::Serialize;
use serde_json::ser::Formatter;
use std::io;

/// `serde_json` formatter applying the canonical escaping and float rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(format_float(value).as_bytes())
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            let escape = match ch {
                '<' => "\\u003c",
                '>' => "\\u003e",
                '&' => "\\u0026",
                '\u{2028}' => "\\u2028",
                '\u{2029}' => "\\u2029",
                _ => continue,
            };
            writer.write_all(fragment[start..i].as_bytes())?;
            writer.write_all(escape.as_bytes())?;
            start = i + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

/// Format a finite float the canonical way.
pub fn format_float(value: f64) -> String {
    let abs = value.abs();
    if abs != 0.0 && (abs < 1e-6 || abs >= 1e21) {
        let text = format!("{:e}", value);
        match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => text,
        }
    } else {
        format!("{}", value)
    }
}

/// Serialize `value` into canonical JSON bytes, appending to `writer`.
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let mut ser = serde_json::Serializer::with_formatter(writer, CanonicalFormatter);
    value.serialize(&mut ser)?;
    Ok(())
}

/// Serialize `value` into a canonical JSON string.
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let mut buf = Vec::new();
    to_writer(&mut buf, value)?;
    String::from_utf8(buf).map_err(|e| LedgerError::Corruption(e.to_string()))
}
