//! Explain presentation: one table row per configuration lookup.

use super::section_title;
use crate::error::ApiError;
use crate::resolver::Attempt;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

fn options_label(attempt: &Attempt) -> String {
    let mut flags = Vec::new();
    if attempt.options.dateformat {
        flags.push("date");
    }
    if attempt.options.variableformat {
        flags.push("variables");
    }
    if flags.is_empty() {
        "-".to_string()
    } else {
        flags.join(", ")
    }
}

pub fn format_explain_text(attempts: &[Attempt]) -> String {
    let mut out = section_title("Upload folder lookups");
    out.push('\n');

    if attempts.is_empty() {
        out.push_str("No lookups made.\n");
    } else {
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Tier", "Scope", "Key", "Configured", "Options", "Result"]);
        for attempt in attempts {
            let expanded = if attempt.is_match() {
                attempt.expanded.clone()
            } else {
                "-".to_string()
            };
            table.add_row(vec![
                attempt.tier.to_string(),
                attempt.scope.to_string(),
                attempt.key.clone(),
                attempt.raw.clone().unwrap_or_else(|| "-".to_string()),
                options_label(attempt),
                expanded,
            ]);
        }
        out.push_str(&table.to_string());
        out.push('\n');
    }

    match attempts.iter().find(|a| a.is_match()) {
        Some(hit) => out.push_str(&format!(
            "Resolved: {} (from {})",
            hit.expanded.green(),
            hit.key
        )),
        None => out.push_str(&format!("{}", "No upload folder configured".yellow())),
    }
    out
}

pub fn format_explain_json(attempts: &[Attempt]) -> Result<String, ApiError> {
    let resolved = attempts
        .iter()
        .find(|a| a.is_match())
        .map(|a| a.expanded.clone());
    let out = serde_json::json!({
        "attempts": attempts,
        "resolved": resolved,
    });
    serde_json::to_string_pretty(&out).map_err(|e| ApiError::Output(e.to_string()))
}
