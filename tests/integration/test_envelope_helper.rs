//! Integration tests for the `mosaicsh-ls` and `mosaicsh-cat` envelope producers

#[path = "../test_utils/mod.rs"]
mod test_utils;

use std::io::Cursor;
use std::process::Command;
use std::time::Duration;

use mosaicsh::terminal::{CapturedOutput, OutputClassifier};
use mosaicsh::{Payload, Termination, TextFormat};
use test_utils::shell_in;

const HELPER: &str = env!("CARGO_BIN_EXE_mosaicsh-ls");
const HELPER_CAT: &str = env!("CARGO_BIN_EXE_mosaicsh-cat");

fn populated_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
    std::fs::write(dir.path().join(".secret"), "x").unwrap();
    std::fs::create_dir(dir.path().join("docs")).unwrap();
    dir
}

#[test]
fn test_helper_output_classifies_as_markdown() {
    let dir = populated_dir();
    let output = Command::new(HELPER).arg(dir.path()).output().unwrap();
    assert!(output.status.success());

    let captured = CapturedOutput {
        text: String::from_utf8_lossy(&output.stdout).into_owned(),
        raw: output.stdout,
        stderr: String::new(),
        termination: Termination::Exited(0),
    };
    let payload = OutputClassifier::new().classify(&captured).payload.unwrap();
    let Payload::Structured { text, format } = payload else {
        panic!("expected structured payload");
    };
    assert_eq!(format, TextFormat::Markdown);
    assert!(text.starts_with("| Mode |"));
    assert!(text.contains("[notes.txt](file://"));
    assert!(text.contains("[docs/](file://"));
    assert!(!text.contains(".secret"));
}

#[test]
fn test_helper_all_flag_includes_hidden() {
    let dir = populated_dir();
    let output = Command::new(HELPER).arg("-a").arg(dir.path()).output().unwrap();
    assert!(String::from_utf8_lossy(&output.stdout).contains("[.secret]"));
}

#[test]
fn test_helper_rejects_unknown_option() {
    let output = Command::new(HELPER).arg("--bogus").output().unwrap();
    assert!(!output.status.success());
}

#[tokio::test]
async fn test_helper_through_shell() {
    let dir = populated_dir();
    let mut shell = shell_in(dir.path());

    let id = shell.submit("% ", HELPER).unwrap();
    tokio::time::timeout(Duration::from_secs(15), shell.wait_idle())
        .await
        .unwrap();

    let exchange = shell.stdout_history().get(id).unwrap();
    assert_eq!(exchange.exit_status(), Some(0));
    match &exchange.payload {
        Payload::Structured { text, format } => {
            assert_eq!(*format, TextFormat::Markdown);
            assert!(text.contains("notes.txt"));
            assert!(!text.contains('\r'));
        }
        other => panic!("unexpected payload {:?}", other),
    }
}

fn png_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    image::RgbImage::from_pixel(2, 2, image::Rgb([200, 10, 10]))
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

#[tokio::test]
async fn test_cat_image_through_shell() {
    let dir = tempfile::tempdir().unwrap();
    let png = png_bytes();
    let path = dir.path().join("dot.png");
    std::fs::write(&path, &png).unwrap();
    let mut shell = shell_in(dir.path());

    let id = shell
        .submit("% ", &format!("{} {}", HELPER_CAT, path.display()))
        .unwrap();
    tokio::time::timeout(Duration::from_secs(15), shell.wait_idle())
        .await
        .unwrap();

    let exchange = shell.stdout_history().get(id).unwrap();
    assert_eq!(exchange.exit_status(), Some(0));
    assert_eq!(exchange.payload, Payload::Image(Some(png)));
    assert_eq!(exchange.payload.image_format(), Some(image::ImageFormat::Png));
}

#[tokio::test]
async fn test_cat_text_through_shell() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), "first\nsecond\n").unwrap();
    let mut shell = shell_in(dir.path());

    let id = shell
        .submit("% ", &format!("{} notes.txt", HELPER_CAT))
        .unwrap();
    tokio::time::timeout(Duration::from_secs(15), shell.wait_idle())
        .await
        .unwrap();

    let exchange = shell.stdout_history().get(id).unwrap();
    assert_eq!(
        exchange.payload,
        Payload::Structured {
            text: "first\nsecond".to_string(),
            format: TextFormat::Plain,
        }
    );
}

#[test]
fn test_cat_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(HELPER_CAT)
        .arg(dir.path().join("absent"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("absent"));
}
