//! Unit tests for the built-in commands

#[path = "../test_utils/mod.rs"]
mod test_utils;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use mosaicsh::commands::{BuiltinDispatcher, BuiltinError};
use mosaicsh::{Exchange, HistoryStore, Payload, ShellContext, Termination};
use test_utils::MockFilesystem;

fn project_tree() -> Arc<MockFilesystem> {
    let fs = MockFilesystem::new().with_home("/home/user");
    fs.add_file("/work/Cargo.toml");
    fs.add_file("/work/README.md");
    fs.add_file("/work/notes.md");
    fs.add_file("/work/.hidden");
    fs.add_dir("/work/src");
    Arc::new(fs)
}

fn context_at(dir: &str) -> ShellContext {
    ShellContext::new(PathBuf::from(dir), project_tree())
}

fn run(
    line: &str,
    context: &mut ShellContext,
    history: &HistoryStore,
) -> Result<String, BuiltinError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    BuiltinDispatcher::new(16)
        .dispatch(&parts, context, history)
        .expect("not a built-in")
}

fn history_of(commands: &[&str]) -> HistoryStore {
    let mut store = HistoryStore::new();
    for command in commands {
        store.append(Exchange::completed(
            "% ",
            command,
            PathBuf::from("/work"),
            Payload::plain(""),
            Termination::Exited(0),
            Duration::ZERO,
        ));
    }
    store
}

#[cfg(test)]
mod cd_tests {
    use super::*;

    #[test]
    fn test_cd_relative_and_parent() {
        let mut context = context_at("/work");
        let history = HistoryStore::new();
        assert_eq!(run("cd src", &mut context, &history).unwrap(), "");
        assert_eq!(context.current_directory(), Path::new("/work/src"));

        run("cd ..", &mut context, &history).unwrap();
        assert_eq!(context.current_directory(), Path::new("/work"));
    }

    #[test]
    fn test_cd_without_argument_goes_home() {
        let mut context = context_at("/work");
        run("cd", &mut context, &HistoryStore::new()).unwrap();
        assert_eq!(context.current_directory(), Path::new("/home/user"));
    }

    #[test]
    fn test_cd_to_file_is_ignored() {
        let mut context = context_at("/work");
        run("cd README.md", &mut context, &HistoryStore::new()).unwrap();
        assert_eq!(context.current_directory(), Path::new("/work"));
        assert!(!context.navigation().can_go_back());
    }

    #[test]
    fn test_not_a_builtin() {
        let mut context = context_at("/work");
        let result = BuiltinDispatcher::new(16).dispatch(&["ls"], &mut context, &HistoryStore::new());
        assert!(result.is_none());
    }
}

#[cfg(test)]
mod pwd_tests {
    use super::*;

    #[test]
    fn test_pwd_back_and_forward() {
        let mut context = context_at("/work");
        let history = HistoryStore::new();
        assert_eq!(run("pwd", &mut context, &history).unwrap(), "/work");
        assert_eq!(run("pwd b", &mut context, &history), Err(BuiltinError::NoBackHistory));

        run("cd src", &mut context, &history).unwrap();
        assert_eq!(run("pwd back", &mut context, &history).unwrap(), "/work");
        assert_eq!(run("pwd f", &mut context, &history).unwrap(), "/work/src");
        assert_eq!(
            run("pwd forward", &mut context, &history),
            Err(BuiltinError::NoForwardHistory)
        );
    }
}

#[cfg(test)]
mod selection_tests {
    use super::*;

    #[test]
    fn test_select_by_pattern() {
        let mut context = context_at("/work");
        let history = HistoryStore::new();
        run("select *.md", &mut context, &history).unwrap();
        let selected: Vec<_> = context.selection().iter().cloned().collect();
        assert_eq!(
            selected,
            vec![PathBuf::from("/work/README.md"), PathBuf::from("/work/notes.md")]
        );
    }

    #[test]
    fn test_select_lists_unselected_names() {
        let mut context = context_at("/work");
        let history = HistoryStore::new();
        run("select src", &mut context, &history).unwrap();
        assert_eq!(
            run("select", &mut context, &history).unwrap(),
            "Cargo.toml\nREADME.md\nnotes.md"
        );
        assert_eq!(run("deselect", &mut context, &history).unwrap(), "src");
    }

    #[test]
    fn test_nothing_to_select_or_deselect() {
        let mut context = context_at("/work");
        let history = HistoryStore::new();
        assert_eq!(run("deselect", &mut context, &history).unwrap(), "nothing to deselect");
        run("select *", &mut context, &history).unwrap();
        assert_eq!(run("select", &mut context, &history).unwrap(), "nothing to select");
    }

    #[test]
    fn test_deselect_by_pattern() {
        let mut context = context_at("/work");
        let history = HistoryStore::new();
        run("select * ", &mut context, &history).unwrap();
        run("deselect ?EADME.* src", &mut context, &history).unwrap();
        assert!(!context.is_selected(Path::new("/work/README.md")));
        assert!(!context.is_selected(Path::new("/work/src")));
        assert!(context.is_selected(Path::new("/work/notes.md")));
    }

    #[test]
    fn test_hidden_entries_not_matched() {
        let mut context = context_at("/work");
        run("select .*", &mut context, &HistoryStore::new()).unwrap();
        assert!(context.selection().is_empty());
    }
}

#[cfg(test)]
mod history_tests {
    use super::*;

    #[test]
    fn test_empty_history() {
        let mut context = context_at("/work");
        assert_eq!(
            run("history", &mut context, &HistoryStore::new()),
            Err(BuiltinError::NoHistory)
        );
    }

    #[test]
    fn test_listing_is_limited() {
        let commands: Vec<String> = (0..20).map(|i| format!("cmd{}", i)).collect();
        let refs: Vec<&str> = commands.iter().map(String::as_str).collect();
        let history = history_of(&refs);
        let mut context = context_at("/work");

        let listing = run("history", &mut context, &history).unwrap();
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines.len(), 16);
        assert_eq!(lines[0], "    4  cmd4");
        assert_eq!(lines[15], "   19  cmd19");
    }

    #[test]
    fn test_range() {
        let history = history_of(&["a", "b", "c", "d"]);
        let mut context = context_at("/work");
        assert_eq!(
            run("history 1 2", &mut context, &history).unwrap(),
            "    1  b\n    2  c"
        );
        assert_eq!(
            run("history 2", &mut context, &history).unwrap(),
            "    2  c\n    3  d"
        );
        assert_eq!(run("history 3 99", &mut context, &history).unwrap(), "    3  d");
    }

    #[test]
    fn test_bad_event() {
        let history = history_of(&["a"]);
        let mut context = context_at("/work");
        assert_eq!(
            run("history 5", &mut context, &history),
            Err(BuiltinError::NoSuchEvent("5".to_string()))
        );
        assert_eq!(
            run("history x", &mut context, &history),
            Err(BuiltinError::NoSuchEvent("x".to_string()))
        );
    }
}
