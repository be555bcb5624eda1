//! Placeholder Expander
//!
//! Turns a configured path template into a literal path. Date tokens
//! (`{Y}`, `{m}`, ...) are substituted when the field options enable
//! `dateformat`; record tokens (`{title}`, `{nav_title}`, `{subtitle}`) when
//! they enable `variableformat`. A template that still carries a `{...}` token
//! afterwards expands to the empty string, never to a partial path.

use crate::records::RecordLookup;
use crate::tree::ConfigTree;
use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;

/// Table holding the container records used for record tokens.
pub const CONTAINER_TABLE: &str = "pages";

/// Record fields available as `{field}` tokens.
pub const RECORD_FIELDS: [&str; 3] = ["title", "nav_title", "subtitle"];

/// Source of the current calendar date.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the running process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always reports the same date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Expansion flags attached to a configured path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FieldOptions {
    pub dateformat: bool,
    pub variableformat: bool,
}

impl FieldOptions {
    /// Read the flags from the children of a configured path node.
    pub fn from_tree(node: Option<&ConfigTree>) -> Self {
        let flag = |key: &str| {
            node.and_then(|n| n.value_at(&[key]))
                .map(is_enabled)
                .unwrap_or(false)
        };
        Self {
            dateformat: flag("dateformat"),
            variableformat: flag("variableformat"),
        }
    }
}

fn is_enabled(value: &str) -> bool {
    value.trim().parse::<i64>().map(|v| v == 1).unwrap_or(false)
}

/// Expands path templates against a clock and a record source.
pub struct Expander<'a> {
    clock: &'a dyn Clock,
    records: &'a dyn RecordLookup,
}

impl<'a> Expander<'a> {
    pub fn new(clock: &'a dyn Clock, records: &'a dyn RecordLookup) -> Self {
        Self { clock, records }
    }

    /// Expand `path` for the container `container_id`.
    ///
    /// Returns `path` untouched when it is blank and the empty string when a
    /// placeholder is left unresolved.
    pub fn expand(&self, path: &str, options: &FieldOptions, container_id: u64) -> String {
        if path.trim().is_empty() {
            return path.to_string();
        }

        let mut expanded = path.to_string();
        if options.dateformat {
            expanded = expand_date_tokens(&expanded, self.clock.today());
        }
        if options.variableformat {
            expanded = self.expand_record_tokens(&expanded, container_id);
        }

        if has_placeholder(&expanded) {
            debug!(template = path, expanded = %expanded, "Unresolved placeholder, discarding path");
            return String::new();
        }
        expanded
    }

    fn expand_record_tokens(&self, path: &str, container_id: u64) -> String {
        let fields = match self
            .records
            .record_fields(CONTAINER_TABLE, container_id, &RECORD_FIELDS)
        {
            Ok(fields) => fields,
            Err(e) => {
                warn!(container_id, error = %e, "Record lookup failed, using empty values");
                Default::default()
            }
        };

        RECORD_FIELDS.iter().fold(path.to_string(), |acc, field| {
            let value = fields.get(*field).map(String::as_str).unwrap_or("");
            acc.replace(&format!("{{{}}}", field), &slugify(value))
        })
    }
}

/// Substitute the date tokens for `date`.
///
/// `{W}` is the zero-padded ISO week, `{w}` the ISO weekday (Monday = 1).
pub fn expand_date_tokens(path: &str, date: NaiveDate) -> String {
    let replacements = [
        ("{Y}", format!("{:04}", date.year())),
        ("{y}", format!("{:02}", date.year().rem_euclid(100))),
        ("{m}", format!("{:02}", date.month())),
        ("{n}", date.month().to_string()),
        ("{j}", date.day().to_string()),
        ("{d}", format!("{:02}", date.day())),
        ("{W}", format!("{:02}", date.iso_week().week())),
        ("{w}", date.weekday().number_from_monday().to_string()),
    ];
    replacements
        .iter()
        .fold(path.to_string(), |acc, (token, value)| acc.replace(*token, value))
}

/// Whether `path` contains a `{...}` token with at least one character inside.
pub fn has_placeholder(path: &str) -> bool {
    path.match_indices('{')
        .any(|(i, _)| path[i + 1..].find('}').is_some_and(|j| j > 0))
}

/// URL/path friendly form of `input`.
///
/// Lowercases, spells out German umlauts, drops everything outside
/// `[a-z0-9]`, whitespace and `-`, then joins the remaining words with single
/// hyphens.
pub fn slugify(input: &str) -> String {
    let lowered = input.trim().nfc().collect::<String>().to_lowercase();

    let mut out = String::with_capacity(lowered.len());
    let mut separator = false;
    for c in lowered.chars() {
        let mapped = match c {
            'ä' => "ae",
            'ö' => "oe",
            'ü' => "ue",
            'ß' => "ss",
            c if c.is_ascii_lowercase() || c.is_ascii_digit() => {
                if separator && !out.is_empty() {
                    out.push('-');
                }
                separator = false;
                out.push(c);
                continue;
            }
            ' ' | '\t' | '\n' | '\r' | '\x0B' | '\x0C' | '-' => {
                separator = true;
                continue;
            }
            _ => continue,
        };
        if separator && !out.is_empty() {
            out.push('-');
        }
        separator = false;
        out.push_str(mapped);
    }
    out
}
