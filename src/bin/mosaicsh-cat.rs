//! mosaicsh-cat - file printer that declares what it prints
//!
//! Prints an output envelope whose `Content-Type` comes from the file's
//! leading bytes (`text/plain` when nothing matches), followed by the file
//! base64 encoded. The encoding keeps binary bodies intact through the
//! pseudo-terminal's newline translation.

use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use base64::Engine;

/// Encoded characters per body line
const LINE_WIDTH: usize = 76;

#[derive(Debug, Default)]
struct CatArgs {
    file: Option<PathBuf>,
}

impl CatArgs {
    fn parse() -> anyhow::Result<Self> {
        let mut args = CatArgs::default();
        for arg in env::args().skip(1) {
            match arg.as_str() {
                "--help" | "-h" => {
                    println!("USAGE:");
                    println!("    mosaicsh-cat FILE");
                    process::exit(0);
                }
                option if option.starts_with('-') => {
                    anyhow::bail!("Unknown option: {}", option);
                }
                _ if args.file.is_some() => {
                    anyhow::bail!("Only one file may be printed");
                }
                path => args.file = Some(PathBuf::from(path)),
            }
        }
        Ok(args)
    }
}

fn main() {
    let args = CatArgs::parse().unwrap_or_else(|e| {
        eprintln!("mosaicsh-cat: {}", e);
        process::exit(2);
    });
    let Some(file) = args.file else {
        eprintln!("mosaicsh-cat: missing file operand");
        process::exit(2);
    };

    if let Err(e) = run(&file) {
        eprintln!("mosaicsh-cat: {:#}", e);
        process::exit(1);
    }
}

fn run(file: &Path) -> anyhow::Result<()> {
    let data = fs::read(file).with_context(|| file.display().to_string())?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(render(&data).as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// Media type sniffed from the leading bytes
fn content_type(data: &[u8]) -> &'static str {
    image::guess_format(data)
        .map(|format| format.to_mime_type())
        .unwrap_or("text/plain")
}

fn render(data: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(data);

    let mut out = String::with_capacity(encoded.len() + encoded.len() / LINE_WIDTH + 96);
    out.push_str("MIME-Version: 1.0\n");
    out.push_str(&format!("Content-Type: {}\n", content_type(data)));
    out.push_str("Content-Transfer-Encoding: base64\n");
    out.push('\n');
    // base64 output is ASCII, so byte chunks are valid strings.
    for line in encoded.as_bytes().chunks(LINE_WIDTH) {
        out.push_str(&String::from_utf8_lossy(line));
        out.push('\n');
    }
    out
}
