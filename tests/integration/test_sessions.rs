//! Integration tests for external command sessions
//!
//! These run real commands under a pseudo-terminal through the [`Shell`]
//! facade and check what ends up in the two history stores.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use mosaicsh::ansi::{AnsiColor, PaletteColor};
use mosaicsh::platform::Platform;
use mosaicsh::{AppliedEvent, Payload, Shell, ShellContext, Termination, TextFormat};
use test_utils::{create_test_config, shell_in, shell_with_signals, RecordingSignals};
use tokio::time::timeout;

const DEADLINE: Duration = Duration::from_secs(15);

/// Apply events until idle, counting completions per exchange
async fn drain(shell: &mut Shell) -> Vec<AppliedEvent> {
    let mut applied = Vec::new();
    timeout(DEADLINE, async {
        while let Some(event) = shell.next_event().await {
            applied.push(event);
        }
    })
    .await
    .expect("sessions did not finish in time");
    applied
}

#[tokio::test]
async fn test_echo_produces_plain_output() {
    let dir = tempfile::tempdir().unwrap();
    let mut shell = shell_in(dir.path());

    let id = shell.submit("% ", "echo hello world").unwrap();
    drain(&mut shell).await;

    let exchange = shell.stdout_history().get(id).unwrap();
    assert_eq!(exchange.payload.text(), "hello world");
    assert_eq!(exchange.termination(), Some(Termination::Exited(0)));
    assert!(exchange.duration().is_some());
}

#[tokio::test]
async fn test_styled_output_is_attributed() {
    let dir = tempfile::tempdir().unwrap();
    let mut shell = shell_in(dir.path());

    let id = shell
        .submit("% ", r"printf '\033[1m\033[31mERR\033[0m\n'")
        .unwrap();
    drain(&mut shell).await;

    let Payload::Attributed(runs) = &shell.stdout_history().get(id).unwrap().payload else {
        panic!("expected attributed payload");
    };
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].text, "ERR");
    assert!(runs[0].style.bold);
    assert_eq!(runs[0].style.foreground, PaletteColor::Normal(AnsiColor::Red));
}

#[tokio::test]
async fn test_stderr_goes_to_error_history() {
    let dir = tempfile::tempdir().unwrap();
    let mut shell = shell_in(dir.path());

    let id = shell.submit("% ", "echo oops >&2; exit 2").unwrap();
    drain(&mut shell).await;

    let exchange = shell.stdout_history().get(id).unwrap();
    assert_eq!(exchange.exit_status(), Some(2));
    assert_eq!(exchange.payload.text(), "");

    let errors = shell.stderr_history().entries();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].payload.text(), "oops");
    assert_eq!(errors[0].command, "echo oops >&2; exit 2");
    assert_eq!(errors[0].exit_status(), Some(2));
}

#[tokio::test]
async fn test_streaming_updates_before_completion() {
    let dir = tempfile::tempdir().unwrap();
    let mut shell = shell_in(dir.path());

    let id = shell.submit("% ", "echo a; sleep 0.5; echo b").unwrap();

    let mut saw_partial = false;
    timeout(DEADLINE, async {
        while let Some(event) = shell.next_event().await {
            match event {
                AppliedEvent::Updated(updated) if updated == id => {
                    let exchange = shell.stdout_history().get(id).unwrap();
                    assert!(exchange.is_running());
                    if exchange.payload.text().starts_with('a') {
                        saw_partial = true;
                    }
                }
                _ => {}
            }
        }
    })
    .await
    .unwrap();

    assert!(saw_partial);
    assert_eq!(shell.stdout_history().get(id).unwrap().payload.text(), "a\nb");
}

#[tokio::test]
async fn test_markdown_envelope_is_never_streamed() {
    let dir = tempfile::tempdir().unwrap();
    let mut shell = shell_in(dir.path());

    let id = shell
        .submit(
            "% ",
            r"printf 'MIME-Version: 1.0\nContent-Type: text/markdown\n\n# Title\n\n- item\n'",
        )
        .unwrap();
    let applied = drain(&mut shell).await;

    assert!(!applied.contains(&AppliedEvent::Updated(id)));
    assert_eq!(
        shell.stdout_history().get(id).unwrap().payload,
        Payload::Structured {
            text: "# Title\n\n- item".to_string(),
            format: TextFormat::Markdown,
        }
    );
}

#[tokio::test]
async fn test_interrupt_signals_every_session_once() {
    let dir = tempfile::tempdir().unwrap();
    let signals = Arc::new(RecordingSignals::new());
    let mut shell = shell_with_signals(dir.path(), signals.clone());

    let first = shell.submit("% ", "sleep 30").unwrap();
    let second = shell.submit("% ", "sleep 30").unwrap();
    assert_eq!(shell.running_count(), 2);

    // Give both children a moment to start.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(shell.handle_control_key('c').await, Some(2));
    assert_eq!(signals.terminated().len(), 2);

    let applied = drain(&mut shell).await;
    let mut completions: HashMap<_, usize> = HashMap::new();
    for event in applied {
        if let AppliedEvent::Completed(id) = event {
            *completions.entry(id).or_default() += 1;
        }
    }
    assert_eq!(completions.get(&first), Some(&1));
    assert_eq!(completions.get(&second), Some(&1));

    for id in [first, second] {
        let exchange = shell.stdout_history().get(id).unwrap();
        assert_eq!(exchange.termination(), Some(Termination::Signaled(15)));
        assert_eq!(exchange.exit_status(), Some(143));
    }
    assert_eq!(shell.running_count(), 0);
}

#[tokio::test]
async fn test_stop_targets_one_session() {
    let dir = tempfile::tempdir().unwrap();
    let mut shell = shell_in(dir.path());

    let long = shell.submit("% ", "sleep 30").unwrap();
    let short = shell.submit("% ", "echo done").unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(shell.stop(long).await);
    drain(&mut shell).await;
    assert!(!shell.stop(long).await);

    assert_eq!(shell.stdout_history().get(long).unwrap().exit_status(), Some(143));
    assert_eq!(shell.stdout_history().get(short).unwrap().payload.text(), "done");
}

#[tokio::test]
async fn test_launch_failure_completes_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config();
    config.session.shell_path = "/definitely/not/a/shell".into();
    let context = ShellContext::new(dir.path().to_path_buf(), Arc::from(Platform::filesystem()));
    let mut shell = Shell::new(config, context);

    let id = shell.submit("% ", "echo unreachable").unwrap();
    assert!(!shell.is_running(id));

    let exchange = shell.stdout_history().get(id).unwrap();
    assert_eq!(exchange.termination(), Some(Termination::LaunchFailed));
    assert_eq!(exchange.exit_status(), Some(127));
    assert!(!exchange.payload.text().is_empty());
    assert_eq!(shell.stderr_history().len(), 1);
    assert!(shell.next_event().await.is_none());
}

#[tokio::test]
async fn test_commands_run_in_current_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    let mut shell = shell_in(dir.path());

    shell.submit("% ", "cd sub").unwrap();
    let id = shell.submit("% ", "/bin/pwd").unwrap();
    drain(&mut shell).await;

    let expected = std::fs::canonicalize(dir.path().join("sub")).unwrap();
    assert_eq!(
        shell.stdout_history().get(id).unwrap().payload.text(),
        expected.display().to_string()
    );
}

#[tokio::test]
async fn test_filter_applies_to_both_histories() {
    let dir = tempfile::tempdir().unwrap();
    let mut shell = shell_in(dir.path());

    shell.submit("% ", "echo keep >&2").unwrap();
    shell.submit("% ", "echo drop >&2").unwrap();
    drain(&mut shell).await;

    shell.set_filter("KEEP");
    assert_eq!(shell.stdout_history().filtered_len(), 1);
    assert_eq!(shell.stderr_history().filtered_len(), 1);
    assert_eq!(shell.stderr_history().len(), 2);
}
