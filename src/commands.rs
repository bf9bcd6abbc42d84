//! Built-in commands
//!
//! `cd`, `select`, `deselect`, `pwd` and `history` run synchronously against
//! the [`ShellContext`] instead of being handed to the shell. Arguments are
//! split on whitespace only; quoting and escaping are not interpreted.

use std::path::{Component, Path, PathBuf};

use crate::context::ShellContext;
use crate::history::HistoryStore;
use crate::wildcard;

/// Names intercepted before falling through to the shell
pub const BUILTIN_NAMES: [&str; 5] = ["cd", "select", "deselect", "pwd", "history"];

/// Failures surfaced as the text of a built-in's exchange
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuiltinError {
    #[error("no back history")]
    NoBackHistory,

    #[error("no forward history")]
    NoForwardHistory,

    #[error("no history")]
    NoHistory,

    #[error("no such event: {0}")]
    NoSuchEvent(String),
}

/// Dispatcher for the built-in command set
#[derive(Debug, Clone)]
pub struct BuiltinDispatcher {
    /// Entries reported by `history` with no arguments
    listing_limit: usize,
}

impl BuiltinDispatcher {
    pub fn new(listing_limit: usize) -> Self {
        Self { listing_limit }
    }

    /// Whether `name` is handled here
    pub fn is_builtin(name: &str) -> bool {
        BUILTIN_NAMES.contains(&name)
    }

    /// Run `parts` if it names a built-in.
    ///
    /// Returns `None` when the first part is not a built-in, otherwise the
    /// text to report.
    pub fn dispatch(
        &self,
        parts: &[&str],
        context: &mut ShellContext,
        history: &HistoryStore,
    ) -> Option<Result<String, BuiltinError>> {
        let (name, args) = parts.split_first()?;
        let result = match *name {
            "cd" => Ok(self.change_directory(args, context)),
            "select" => Ok(self.select(args, context)),
            "deselect" => Ok(self.deselect(args, context)),
            "pwd" => self.working_directory(args, context),
            "history" => self.history(args, history),
            _ => return None,
        };
        debug!("Built-in '{}' finished: {:?}", name, result.as_ref().map(|_| ()));
        Some(result)
    }

    fn change_directory(&self, args: &[&str], context: &mut ShellContext) -> String {
        let target = match args.first() {
            None | Some(&"") => match context.filesystem().home_dir() {
                Some(home) => home,
                None => {
                    warn!("cd: home directory unknown");
                    return String::new();
                }
            },
            Some(arg) => normalize(&context.current_directory().join(arg)),
        };

        if context.filesystem().is_directory(&target) {
            context.open(target);
        } else {
            debug!("cd: {} is not a directory", target.display());
        }
        String::new()
    }

    fn select(&self, patterns: &[&str], context: &mut ShellContext) -> String {
        if patterns.is_empty() {
            let names = listing(context, |selected| !selected);
            return if names.is_empty() {
                "nothing to select".to_string()
            } else {
                names
            };
        }

        let matched = matching_paths(patterns, context);
        for path in matched {
            context.select(path);
        }
        String::new()
    }

    fn deselect(&self, patterns: &[&str], context: &mut ShellContext) -> String {
        if patterns.is_empty() {
            let names = listing(context, |selected| selected);
            return if names.is_empty() {
                "nothing to deselect".to_string()
            } else {
                names
            };
        }

        let matched = matching_paths(patterns, context);
        for path in matched {
            context.deselect(&path);
        }
        String::new()
    }

    fn working_directory(
        &self,
        args: &[&str],
        context: &mut ShellContext,
    ) -> Result<String, BuiltinError> {
        match args.first() {
            Some(arg) if arg.starts_with('b') => {
                if !context.go_back() {
                    return Err(BuiltinError::NoBackHistory);
                }
            }
            Some(arg) if arg.starts_with('f') => {
                if !context.go_forward() {
                    return Err(BuiltinError::NoForwardHistory);
                }
            }
            _ => {}
        }
        Ok(context.current_directory().display().to_string())
    }

    fn history(&self, args: &[&str], history: &HistoryStore) -> Result<String, BuiltinError> {
        let commands = history.command_lines();
        if commands.is_empty() {
            return Err(BuiltinError::NoHistory);
        }
        let last = commands.len() - 1;

        let (start, end) = match args {
            [] => (commands.len().saturating_sub(self.listing_limit), last),
            [start, rest @ ..] => {
                let start_index = parse_event(start)?;
                if start_index > last {
                    return Err(BuiltinError::NoSuchEvent(start.to_string()));
                }
                let end_index = match rest.first() {
                    Some(end) => parse_event(end)?.min(last),
                    None => last,
                };
                (start_index, end_index)
            }
        };

        let lines: Vec<String> = commands
            .iter()
            .enumerate()
            .skip(start)
            .take((end + 1).saturating_sub(start))
            .map(|(index, command)| format!("{:>5}  {}", index, command))
            .collect();
        Ok(lines.join("\n"))
    }
}

fn parse_event(arg: &str) -> Result<usize, BuiltinError> {
    arg.parse()
        .map_err(|_| BuiltinError::NoSuchEvent(arg.to_string()))
}

/// Names of current entries whose selection state passes `keep`, one per line
fn listing(context: &ShellContext, keep: impl Fn(bool) -> bool) -> String {
    context
        .entries()
        .iter()
        .filter(|entry| keep(context.is_selected(&entry.path)))
        .map(|entry| entry.name.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Paths of current entries matching any of `patterns`
fn matching_paths(patterns: &[&str], context: &ShellContext) -> Vec<PathBuf> {
    let mut matched = Vec::new();
    for pattern in patterns {
        for entry in context.entries() {
            if wildcard::matches(&entry.name, pattern) {
                matched.push(entry.path.clone());
            }
        }
    }
    matched
}

/// Resolve `.` and `..` lexically
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
