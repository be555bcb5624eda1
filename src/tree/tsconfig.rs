//! TSconfig-style text source for configuration trees.
//!
//! Supported subset: `a.b = value` assignments, `a.b { ... }` blocks,
//! `a.b >` removal, `a.b < other.path` copies (a leading `.` is relative to the
//! enclosing block), `a.b ( ... )` multi-line values, `#`/`//` line comments
//! and `/* ... */` comment blocks. Comments are recognised only at the start
//! of a line; a value runs to the end of its line, so `a = 1 /* x */` assigns
//! `1 /* x */`. Conditions and imports are rejected.

use super::ConfigTree;
use crate::error::ConfigError;
use std::path::Path;

impl ConfigTree {
    pub fn from_tsconfig_str(input: &str) -> Result<Self, ConfigError> {
        Parser::default().parse(input)
    }

    pub fn from_tsconfig_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_tsconfig_str(&contents)
    }
}

#[derive(Default)]
struct Parser {
    tree: ConfigTree,
    blocks: Vec<Vec<String>>,
}

struct MultiLine {
    path: Vec<String>,
    lines: Vec<String>,
    opened_at: usize,
}

impl Parser {
    fn parse(mut self, input: &str) -> Result<ConfigTree, ConfigError> {
        let mut in_comment = false;
        let mut multi_line: Option<MultiLine> = None;
        let mut last_line = 0;

        for (index, raw) in input.lines().enumerate() {
            let line_no = index + 1;
            last_line = line_no;
            let line = raw.trim();

            if let Some(mut pending) = multi_line.take() {
                if line == ")" {
                    let path: Vec<&str> = pending.path.iter().map(String::as_str).collect();
                    self.tree.entry(&path).set_value(pending.lines.join("\n"));
                } else {
                    pending.lines.push(line.to_string());
                    multi_line = Some(pending);
                }
                continue;
            }

            if in_comment {
                if line.contains("*/") {
                    in_comment = false;
                }
                continue;
            }
            if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
                continue;
            }
            if line.starts_with("/*") {
                in_comment = !line.ends_with("*/");
                continue;
            }
            if line == "}" {
                if self.blocks.pop().is_none() {
                    return Err(syntax(line_no, "unexpected '}'"));
                }
                continue;
            }
            if line.starts_with('[') {
                return Err(syntax(line_no, "conditions are not supported"));
            }
            if line.starts_with('@') || line.starts_with("<INCLUDE") {
                return Err(syntax(line_no, "imports are not supported"));
            }

            let split = line
                .find(|c: char| matches!(c, '=' | '{' | '>' | '<' | '(' | ':'))
                .ok_or_else(|| syntax(line_no, "missing operator"))?;
            let key = line[..split].trim();
            let rest = &line[split + 1..];
            if key.is_empty() {
                return Err(syntax(line_no, "missing key"));
            }
            let path = self.absolute(key);

            match &line[split..split + 1] {
                "=" => {
                    let path: Vec<&str> = path.iter().map(String::as_str).collect();
                    self.tree.entry(&path).set_value(rest.trim());
                }
                "{" => {
                    if !rest.trim().is_empty() {
                        return Err(syntax(line_no, "unexpected content after '{'"));
                    }
                    self.blocks.push(path);
                }
                ">" => {
                    let path: Vec<&str> = path.iter().map(String::as_str).collect();
                    self.tree.remove(&path);
                }
                "<" => {
                    let source = rest.trim();
                    let source = match source.strip_prefix('.') {
                        Some(relative) => self.absolute(relative),
                        None => split_key(source),
                    };
                    let source: Vec<&str> = source.iter().map(String::as_str).collect();
                    let copied = self
                        .tree
                        .get(&source)
                        .cloned()
                        .ok_or_else(|| syntax(line_no, "copy source does not exist"))?;
                    let path: Vec<&str> = path.iter().map(String::as_str).collect();
                    *self.tree.entry(&path) = copied;
                }
                "(" => {
                    multi_line = Some(MultiLine {
                        path,
                        lines: Vec::new(),
                        opened_at: line_no,
                    });
                }
                _ => return Err(syntax(line_no, "value modifiers are not supported")),
            }
        }

        if let Some(pending) = multi_line {
            return Err(syntax(pending.opened_at, "unterminated multi-line value"));
        }
        if !self.blocks.is_empty() {
            return Err(syntax(last_line, "unclosed '{'"));
        }
        Ok(self.tree)
    }

    fn absolute(&self, key: &str) -> Vec<String> {
        let mut path = self.blocks.last().cloned().unwrap_or_default();
        path.extend(split_key(key));
        path
    }
}

fn split_key(key: &str) -> Vec<String> {
    key.split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn syntax(line: usize, message: &str) -> ConfigError {
    ConfigError::Syntax {
        line,
        message: message.to_string(),
    }
}
