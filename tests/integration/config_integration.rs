//! Integration tests for configuration loading into a working service

use super::test_utils::TestWorkspace;
use upfold::cli::RunContext;
use upfold::config::ConfigLoader;
use upfold::tree::ConfigTree;
use upfold::types::ResolutionContext;

#[test]
fn test_config_file_wires_trees_records_and_storage() {
    let ws = TestWorkspace::new();
    ws.write(
        "config/page.tsconfig",
        r#"
/* uploads per page */
default_upload_folders {
    tt_content.image = 1:/pages/{nav_title}
    tt_content.image.variableformat = 1
}
"#,
    );
    ws.write(
        "config/records.toml",
        r#"
[pages.42]
title = "Startseite"
nav_title = "Home Page"
"#,
    );
    let config_file = ws.write(
        "upfold.toml",
        r#"
records = "config/records.toml"

[trees]
installation = "config/page.tsconfig"

[storages.1]
name = "fileadmin"
base_path = "fileadmin"
"#,
    );

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    assert!(config.validate(ws.root()).is_ok());

    let ctx = RunContext::from_config(&config, ws.root().to_path_buf()).unwrap();
    let context = ResolutionContext::new(Some("tt_content"), Some("image"), 42);
    assert_eq!(
        ctx.service().resolve_path(&context).unwrap(),
        "1:/pages/home-page"
    );
}

#[test]
fn test_toml_tree_dotted_option_keys() {
    let tree = ConfigTree::from_toml_str(
        r#"
[default_upload_folders.tt_content]
image = "1:/content/{Y}"
"image." = { dateformat = 1 }
"#,
    )
    .unwrap();

    assert_eq!(
        tree.value_at(&["default_upload_folders", "tt_content", "image"]),
        Some("1:/content/{Y}")
    );
    assert_eq!(
        tree.value_at(&["default_upload_folders", "tt_content", "image", "dateformat"]),
        Some("1")
    );
}

#[test]
fn test_tsconfig_syntax_error_reports_line() {
    let err = ConfigTree::from_tsconfig_str("a = 1\n[page|uid = 1]\n").unwrap_err();
    assert_eq!(
        err.to_string(),
        "TSconfig syntax error on line 2: conditions are not supported"
    );
}

#[test]
fn test_missing_tree_file_fails_validation() {
    let ws = TestWorkspace::new();
    let config_file = ws.write(
        "upfold.toml",
        "[trees]\ninstallation = \"nope.tsconfig\"\n",
    );
    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    let errors = config.validate(ws.root()).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(RunContext::from_config(&config, ws.root().to_path_buf()).is_err());
}
