//! Path Resolver
//!
//! Finds the configured upload folder for a record field. Lookups run from the
//! most specific tier to the least specific one (field, table, all tables) and
//! within each tier the installation tree is consulted before the actor tree.
//! The first attempt that expands to a non-empty path wins.

use crate::expand::{Expander, FieldOptions};
use crate::tree::ConfigTree;
use crate::types::ResolutionContext;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Root key of the upload folder configuration.
pub const DEFAULT_UPLOAD_FOLDERS: &str = "default_upload_folders";

/// Key of the fallback used for every table.
pub const DEFAULT_FOR_ALL_TABLES: &str = "defaultForAllTables";

/// Specificity level of a configured path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Field,
    Table,
    AllTables,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Field => write!(f, "field"),
            Tier::Table => write!(f, "table"),
            Tier::AllTables => write!(f, "all tables"),
        }
    }
}

/// Configuration source of a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Installation,
    Actor,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Installation => write!(f, "installation"),
            Scope::Actor => write!(f, "actor"),
        }
    }
}

/// One lookup made while resolving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attempt {
    pub tier: Tier,
    pub scope: Scope,
    /// Dotted configuration key that was looked up.
    pub key: String,
    /// Configured template, if any.
    pub raw: Option<String>,
    pub options: FieldOptions,
    /// Expansion result; empty when absent or unresolved.
    pub expanded: String,
}

impl Attempt {
    /// Whitespace-only results count as unset, so the other tree at the same
    /// tier is still consulted.
    pub fn is_match(&self) -> bool {
        !self.expanded.trim().is_empty()
    }
}

/// Resolves candidate paths against installation and actor configuration.
pub struct PathResolver<'a> {
    expander: Expander<'a>,
}

impl<'a> PathResolver<'a> {
    pub fn new(expander: Expander<'a>) -> Self {
        Self { expander }
    }

    /// Resolved path, or the empty string when nothing is configured.
    pub fn resolve(
        &self,
        context: &ResolutionContext,
        installation: &ConfigTree,
        actor: &ConfigTree,
    ) -> String {
        self.explain(context, installation, actor)
            .into_iter()
            .find(Attempt::is_match)
            .map(|attempt| attempt.expanded)
            .unwrap_or_default()
    }

    /// Every attempt made, in order, up to and including the first match.
    pub fn explain(
        &self,
        context: &ResolutionContext,
        installation: &ConfigTree,
        actor: &ConfigTree,
    ) -> Vec<Attempt> {
        let mut attempts = Vec::new();
        let table = context.table.as_deref();
        let field = context.field.as_deref();

        if let (Some(table), Some(field)) = (table, field) {
            if self.try_tier(
                Tier::Field,
                &[DEFAULT_UPLOAD_FOLDERS, table, field],
                context,
                installation,
                actor,
                &mut attempts,
            ) {
                return attempts;
            }
        }

        if field.is_some() {
            if let Some(table) = table {
                if self.try_tier(
                    Tier::Table,
                    &[DEFAULT_UPLOAD_FOLDERS, table],
                    context,
                    installation,
                    actor,
                    &mut attempts,
                ) {
                    return attempts;
                }
            }
        }

        self.try_tier(
            Tier::AllTables,
            &[DEFAULT_UPLOAD_FOLDERS, DEFAULT_FOR_ALL_TABLES],
            context,
            installation,
            actor,
            &mut attempts,
        );
        attempts
    }

    fn try_tier(
        &self,
        tier: Tier,
        path: &[&str],
        context: &ResolutionContext,
        installation: &ConfigTree,
        actor: &ConfigTree,
        attempts: &mut Vec<Attempt>,
    ) -> bool {
        for (scope, tree) in [(Scope::Installation, installation), (Scope::Actor, actor)] {
            let attempt = self.attempt(tier, scope, path, tree, context.container_id);
            debug!(
                tier = %attempt.tier,
                scope = %attempt.scope,
                key = %attempt.key,
                expanded = %attempt.expanded,
                "Upload folder lookup"
            );
            let matched = attempt.is_match();
            attempts.push(attempt);
            if matched {
                return true;
            }
        }
        false
    }

    fn attempt(
        &self,
        tier: Tier,
        scope: Scope,
        path: &[&str],
        tree: &ConfigTree,
        container_id: u64,
    ) -> Attempt {
        let node = tree.get(path);
        let raw = node.and_then(ConfigTree::value).map(str::to_string);
        let options = FieldOptions::from_tree(node);
        let expanded = self
            .expander
            .expand(raw.as_deref().unwrap_or(""), &options, container_id);

        Attempt {
            tier,
            scope,
            key: path.join("."),
            raw,
            options,
            expanded,
        }
    }
}
