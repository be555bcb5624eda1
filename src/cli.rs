//! CLI domain: parse, route, help, output, and presentation only.
//! No domain logic; a single route table dispatches to the upload folder service.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands, ContextArgs};
pub use presentation::{
    format_explain_json, format_explain_text, format_info_json, format_info_script,
    format_info_text,
};
pub use route::RunContext;
