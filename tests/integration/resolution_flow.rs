//! Resolution from TSconfig/TOML trees through the service to real folders

use super::test_utils::TestWorkspace;
use upfold::records::InMemoryRecords;
use upfold::resolver::{Scope, Tier};
use upfold::tree::ConfigTree;
use upfold::types::{CombinedIdentifier, FolderHandle, ResolutionContext};

const PAGE_TSCONFIG: &str = r#"
default_upload_folders {
    defaultForAllTables = 1:/user_upload/all
    tt_content = 1:/content
    tt_content.image = 1:/content/{Y}/{m}
    tt_content.image.dateformat = 1
    tx_news_domain_model_news.fal_media = 1:/news/{title}
    tx_news_domain_model_news.fal_media.variableformat = 1
    tx_events = 1:/events/{title}
}
"#;

fn default_folder() -> FolderHandle {
    FolderHandle::new(CombinedIdentifier::parse("1:/user_upload").unwrap())
}

fn installation() -> ConfigTree {
    ConfigTree::from_tsconfig_str(PAGE_TSCONFIG).unwrap()
}

#[test]
fn test_field_tier_with_date_tokens() {
    let ws = TestWorkspace::new();
    let service = ws.service(installation(), ConfigTree::new(), InMemoryRecords::new());
    let context = ResolutionContext::new(Some("tt_content"), Some("image"), 12);

    let folder = service.resolve_and_ensure_upload_folder(&context, default_folder());
    assert_eq!(folder.to_string(), "1:/content/2024/03");
    assert!(ws.fileadmin().join("content/2024/03").is_dir());
}

#[test]
fn test_record_tokens_are_slugified() {
    let ws = TestWorkspace::new();
    let records = InMemoryRecords::new().with("pages", 12, "title", "Über uns & Team");
    let service = ws.service(installation(), ConfigTree::new(), records);
    let context = ResolutionContext::new(
        Some("tx_news_domain_model_news"),
        Some("fal_media"),
        12,
    );

    assert_eq!(service.resolve_path(&context).unwrap(), "1:/news/ueber-uns-team");
    let folder = service.resolve_and_ensure_upload_folder(&context, default_folder());
    assert_eq!(folder.to_string(), "1:/news/ueber-uns-team");
}

#[test]
fn test_unresolved_token_skips_to_next_tier() {
    let ws = TestWorkspace::new();
    let service = ws.service(installation(), ConfigTree::new(), InMemoryRecords::new());
    let context = ResolutionContext::new(Some("tx_events"), Some("image"), 12);

    // `{title}` without variableformat stays a placeholder, so the table tier
    // yields nothing and the all-tables default applies.
    assert_eq!(service.resolve_path(&context).unwrap(), "1:/user_upload/all");
}

#[test]
fn test_table_tier_skipped_without_field() {
    let ws = TestWorkspace::new();
    let service = ws.service(installation(), ConfigTree::new(), InMemoryRecords::new());
    let context = ResolutionContext::new(Some("tt_content"), None, 12);

    assert_eq!(service.resolve_path(&context).unwrap(), "1:/user_upload/all");
}

#[test]
fn test_installation_before_actor_within_tier() {
    let ws = TestWorkspace::new();
    let actor = ConfigTree::from_toml_str(
        r#"
[default_upload_folders]
tt_content = "1:/mine/content"
defaultForAllTables = "1:/mine"
"#,
    )
    .unwrap();
    let service = ws.service(installation(), actor, InMemoryRecords::new());
    let context = ResolutionContext::new(Some("tt_content"), Some("media"), 12);

    let attempts = service.explain(&context).unwrap();
    let order: Vec<(Tier, Scope)> = attempts.iter().map(|a| (a.tier, a.scope)).collect();
    assert_eq!(
        order,
        vec![
            (Tier::Field, Scope::Installation),
            (Tier::Field, Scope::Actor),
            (Tier::Table, Scope::Installation),
        ]
    );
    assert_eq!(service.resolve_path(&context).unwrap(), "1:/content");
}

#[test]
fn test_actor_field_beats_installation_table() {
    let ws = TestWorkspace::new();
    let actor = ConfigTree::from_dotted([("default_upload_folders.tt_content.media", "1:/mine")]);
    let service = ws.service(installation(), actor, InMemoryRecords::new());
    let context = ResolutionContext::new(Some("tt_content"), Some("media"), 12);

    assert_eq!(service.resolve_path(&context).unwrap(), "1:/mine");
}

#[test]
fn test_nothing_configured_keeps_default_and_touches_nothing() {
    let ws = TestWorkspace::new();
    let service = ws.service(ConfigTree::new(), ConfigTree::new(), InMemoryRecords::new());
    let context = ResolutionContext::new(Some("tt_content"), Some("image"), 12);

    let folder = service.resolve_and_ensure_upload_folder(&context, default_folder());
    assert_eq!(folder, default_folder());
    let entries: Vec<_> = std::fs::read_dir(ws.fileadmin()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_unknown_storage_keeps_default() {
    let ws = TestWorkspace::new();
    let installation =
        ConfigTree::from_dotted([("default_upload_folders.defaultForAllTables", "9:/elsewhere")]);
    let service = ws.service(installation, ConfigTree::new(), InMemoryRecords::new());
    let context = ResolutionContext::new(Some("tt_content"), Some("image"), 12);

    let folder = service.resolve_and_ensure_upload_folder(&context, default_folder());
    assert_eq!(folder, default_folder());

    let info = service.folder_info(&context, "9:/elsewhere").unwrap();
    assert!(!info.valid);
    assert_eq!(info.message.as_deref(), Some("Storage with id 9 does not exist"));
}
