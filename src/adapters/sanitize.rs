//! Log sanitization for patient identifiers.
//!
//! Appointment records carry patient and appointment identifiers, and staff
//! sometimes paste contact details into free-text fields. Formatted log lines
//! are passed through `sanitize()` before reaching the sink so none of these
//! end up in log files.
//!
//! Feature values are never logged by this crate; only field names are.

use std::sync::OnceLock;

use regex::{Captures, Regex, RegexSet};
use tracing_subscriber::fmt::MakeWriter;

/// Maximum number of bytes sanitized per line; the rest is dropped.
const MAX_SANITIZE_BYTES: usize = 16 * 1024;

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

struct Rule {
    regex: Regex,
    replacement: &'static str,
    /// Leave matches that sit inside a decimal literal.
    skip_decimals: bool,
}

struct Patterns {
    set: RegexSet,
    rules: Vec<Rule>,
}

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| {
        let rules: [(&str, &'static str, bool); 5] = [
            // Labelled identifiers: "patient_id=123", "AppointmentID: 5642903"
            (
                r"(?i)\b(?:patient|appointment)[_ ]?id\b\s*[:=]\s*[A-Za-z0-9-]+",
                "[REDACTED-ID]",
                false,
            ),
            (
                r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
                "[REDACTED-UUID]",
                false,
            ),
            (
                r"(?i)\b[a-z0-9._%+-]{1,64}@(?:[a-z0-9-]{1,63}\.)+[a-z]{2,}\b",
                "[REDACTED-EMAIL]",
                false,
            ),
            // Unlabelled long numeric identifiers (patient ids run to 14+ digits)
            (r"\b\d{10,}\b", "[REDACTED-NUMBER]", true),
            (
                r"\b(?:\+?\d{1,3}[-.\s]?)?\(?\d{2,3}\)?[-.\s]?\d{4,5}[-.\s]?\d{4}\b",
                "[REDACTED-PHONE]",
                true,
            ),
        ];

        let set = RegexSet::new(rules.iter().map(|(p, _, _)| *p)).expect("Valid regex set");
        let rules = rules
            .into_iter()
            .map(|(p, replacement, skip_decimals)| Rule {
                regex: Regex::new(p).expect("Valid regex"),
                replacement,
                skip_decimals,
            })
            .collect();

        Patterns { set, rules }
    })
}

/// Whether the match at `start..end` lies inside a plain decimal literal
/// such as `12345678901.25` or `0.12345678901`.
fn is_decimal_literal(haystack: &str, start: usize, end: usize) -> bool {
    let bytes = haystack.as_bytes();
    let numeric = |b: &&u8| b.is_ascii_digit() || **b == b'.';
    let lead = bytes[..start].iter().rev().take_while(numeric).count();
    let trail = bytes[end..].iter().take_while(numeric).count();

    let literal = haystack[start - lead..end + trail].trim_matches('.');
    match literal.split_once('.') {
        Some((int, frac)) => {
            !int.is_empty()
                && !frac.is_empty()
                && int.bytes().all(|b| b.is_ascii_digit())
                && frac.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }
    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

/// Replace identifiers and contact details in `input`.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, MAX_SANITIZE_BYTES)
}

fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let patterns = patterns();
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let mut result = prefix.to_string();
    for idx in patterns.set.matches(prefix).into_iter() {
        let rule = &patterns.rules[idx];
        if !rule.skip_decimals {
            result = rule.regex.replace_all(&result, rule.replacement).into_owned();
            continue;
        }

        let haystack = result.as_str();
        result = rule
            .regex
            .replace_all(haystack, |caps: &Captures<'_>| match caps.get(0) {
                Some(m) if is_decimal_literal(haystack, m.start(), m.end()) => {
                    m.as_str().to_string()
                }
                _ => rule.replacement.to_string(),
            })
            .into_owned();
    }

    if truncated {
        result.push_str(" [TRUNCATED]");
    }
    result
}

/// `MakeWriter` wrapper that sanitizes each formatted log line.
#[derive(Debug, Clone)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

/// Line-buffering writer produced by [`SanitizingMakeWriter`].
pub struct SanitizingWriter<W: std::io::Write> {
    inner: W,
    buffer: Vec<u8>,
}

impl<W: std::io::Write> SanitizingWriter<W> {
    fn write_sanitized(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let text = String::from_utf8_lossy(bytes);
        self.inner.write_all(sanitize(&text).as_bytes())
    }

    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.write_sanitized(&line)?;
        }
        Ok(())
    }
}

impl<W: std::io::Write> std::io::Write for SanitizingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A line longer than the cap would never be sanitized in full anyway.
        if self.buffer.len() > MAX_SANITIZE_BYTES * 2 {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
            self.inner.write_all(b"\n")?;
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;
        if !self.buffer.is_empty() {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
        }
        self.inner.flush()
    }
}

impl<W: std::io::Write> Drop for SanitizingWriter<W> {
    fn drop(&mut self) {
        let _ = std::io::Write::flush(self);
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter {
            inner: self.inner.make_writer(),
            buffer: Vec::new(),
        }
    }
}
