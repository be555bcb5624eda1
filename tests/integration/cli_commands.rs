//! CLI parsing and routing against a temporary workspace

use super::test_utils::{march_fifth, TestWorkspace};
use clap::Parser;
use std::sync::Arc;
use upfold::cli::{Cli, Commands, RunContext};
use upfold::expand::FixedClock;

fn workspace() -> TestWorkspace {
    let ws = TestWorkspace::new();
    ws.write(
        "config/page.tsconfig",
        "default_upload_folders.tt_content.image = 1:/content/{Y}/{W}\ndefault_upload_folders.tt_content.image.dateformat = 1\n",
    );
    ws.write(
        "config/config.toml",
        r#"
[trees]
installation = "config/page.tsconfig"

[storages.1]
name = "fileadmin"
base_path = "fileadmin"
"#,
    );
    ws
}

fn run(ws: &TestWorkspace, args: &[&str]) -> Result<String, upfold::error::ApiError> {
    let root = ws.root().to_string_lossy().to_string();
    let mut argv = vec!["upfold", "--workspace", root.as_str(), "--config"];
    let config = ws.root().join("config/config.toml");
    let config = config.to_string_lossy().to_string();
    argv.push(config.as_str());
    argv.extend_from_slice(args);

    let cli = Cli::try_parse_from(argv).unwrap();
    let ctx = RunContext::new(cli.workspace.clone(), cli.config.clone())
        .unwrap()
        .with_clock(Arc::new(FixedClock(march_fifth())));
    ctx.execute(&cli.command)
}

#[test]
fn test_parse_context_flags() {
    let cli = Cli::try_parse_from([
        "upfold", "ensure", "--table", "tt_content", "--field", "image", "--container", "12",
        "--default", "1:/user_upload",
    ])
    .unwrap();
    match cli.command {
        Commands::Ensure { context, default } => {
            assert_eq!(context.table.as_deref(), Some("tt_content"));
            assert_eq!(context.field.as_deref(), Some("image"));
            assert_eq!(context.container, 12);
            assert_eq!(default.as_deref(), Some("1:/user_upload"));
        }
        _ => panic!("expected ensure"),
    }
}

#[test]
fn test_resolve_command() {
    let ws = workspace();
    let out = run(
        &ws,
        &["resolve", "--table", "tt_content", "--field", "image", "--container", "3"],
    )
    .unwrap();
    assert_eq!(out, "1:/content/2024/10");
}

#[test]
fn test_ensure_command_creates_folder() {
    let ws = workspace();
    let out = run(
        &ws,
        &["ensure", "--table", "tt_content", "--field", "image", "--default", "1:/user_upload"],
    )
    .unwrap();
    assert_eq!(out, "1:/content/2024/10");
    assert!(ws.fileadmin().join("content/2024/10").is_dir());
}

#[test]
fn test_explain_json_lists_attempts() {
    let ws = workspace();
    let out = run(
        &ws,
        &["explain", "--table", "tt_content", "--field", "caption", "--format", "json"],
    )
    .unwrap();
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    // field x2, table x2, all tables x2
    assert_eq!(json["attempts"].as_array().unwrap().len(), 6);
    assert!(json["resolved"].is_null());
}

#[test]
fn test_info_script_command() {
    let ws = workspace();
    let out = run(
        &ws,
        &["info", "--table", "tt_content", "--field", "image", "--format", "script"],
    )
    .unwrap();
    assert!(out.contains("window.uploadFolderInfo[\"image\"]"));
    assert!(out.contains("content/2024/10"));
}

#[test]
fn test_ensure_with_malformed_default_fails() {
    let ws = workspace();
    let err = run(&ws, &["ensure", "--default", "user_upload"]).unwrap_err();
    assert!(matches!(err, upfold::error::ApiError::Identifier(_)));
}
