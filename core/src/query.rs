//! Query string builder with omit-if-unset semantics.
//!
//! Only values that are actually set end up in the query. `Some(false)` is
//! set and serialises as `false`; only `None` is omitted. Encoding follows
//! `application/x-www-form-urlencoded`, so spaces become `+`.

use std::fmt::Display;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

const FORM: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'*')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b' ');

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryString {
    pairs: Vec<(&'static str, String)>,
}

impl QueryString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &'static str, value: impl Display) -> &mut Self {
        self.pairs.push((key, value.to_string()));
        self
    }

    /// Append `key` only when `value` is `Some`.
    pub fn push_opt<T: Display>(&mut self, key: &'static str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    /// Append a page number or size; zero counts as unset.
    pub fn push_count(&mut self, key: &'static str, value: Option<u32>) -> &mut Self {
        self.push_opt(key, value.filter(|v| *v > 0))
    }

    /// Append a text filter; the empty string counts as unset.
    pub fn push_text(&mut self, key: &'static str, value: Option<&str>) -> &mut Self {
        self.push_opt(key, value.filter(|v| !v.is_empty()))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `path?query`, or `path` unchanged when nothing was set.
    pub fn append_to(&self, path: &str) -> String {
        if self.is_empty() {
            return path.to_string();
        }
        format!("{path}?{self}")
    }
}

impl Display for QueryString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (key, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{key}={}", encode(value))?;
        }
        Ok(())
    }
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, FORM).to_string().replace(' ', "+")
}
