//! Info presentation: display path of the resolved folder.

use crate::error::ApiError;
use crate::info::{InlineScriptSink, UploadFolderInfo};
use owo_colors::OwoColorize;

pub fn format_info_text(info: Option<&UploadFolderInfo>) -> String {
    let Some(info) = info else {
        return "No upload folder info (needs --table, --field and a configured path)".to_string();
    };
    let mut out = format!("Field: {}\nPath:  {}", info.field, info.display_path);
    if info.valid {
        out.push_str(&format!("\nState: {}", "ok".green()));
    } else {
        out.push_str(&format!("\nState: {}", "invalid".red()));
    }
    if let Some(message) = &info.message {
        out.push_str(&format!("\nNote:  {}", message));
    }
    out
}

pub fn format_info_json(info: Option<&UploadFolderInfo>) -> Result<String, ApiError> {
    serde_json::to_string_pretty(&info).map_err(|e| ApiError::Output(e.to_string()))
}

pub fn format_info_script(info: Option<&UploadFolderInfo>) -> Result<String, ApiError> {
    match info {
        Some(info) => InlineScriptSink::script_for(info),
        None => Ok(String::new()),
    }
}
