//! CLI presentation: text and json formatters per command family.

mod explain;
mod info;

pub use explain::{format_explain_json, format_explain_text};
pub use info::{format_info_json, format_info_script, format_info_text};

use owo_colors::OwoColorize;

pub(crate) fn section_title(title: &str) -> String {
    format!("{}", title.bold().underline())
}
