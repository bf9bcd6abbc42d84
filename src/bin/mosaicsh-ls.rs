//! mosaicsh-ls - directory lister that renders as markdown
//!
//! Prints an output envelope declaring `text/markdown` followed by a table
//! of the listed directory, one row per entry with the name linked to its
//! `file://` URL.

use std::env;
use std::fs;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use chrono::{DateTime, Local};
use nix::unistd::{Gid, Group, Uid, User};

#[derive(Debug, Default)]
struct ListArgs {
    /// Include entries whose names start with `.`
    all: bool,
    directory: Option<PathBuf>,
}

impl ListArgs {
    fn parse() -> anyhow::Result<Self> {
        let mut args = ListArgs::default();
        for arg in env::args().skip(1) {
            match arg.as_str() {
                "-a" | "--all" => args.all = true,
                "--help" | "-h" => {
                    println!("USAGE:");
                    println!("    mosaicsh-ls [-a] [DIRECTORY]");
                    process::exit(0);
                }
                option if option.starts_with('-') => {
                    anyhow::bail!("Unknown option: {}", option);
                }
                _ if args.directory.is_some() => {
                    anyhow::bail!("Only one directory may be listed");
                }
                path => args.directory = Some(PathBuf::from(path)),
            }
        }
        Ok(args)
    }
}

struct Row {
    mode: String,
    links: u64,
    owner: String,
    group: String,
    size: u64,
    modified: String,
    name: String,
    path: PathBuf,
    is_dir: bool,
}

fn main() -> anyhow::Result<()> {
    let args = ListArgs::parse().unwrap_or_else(|e| {
        eprintln!("mosaicsh-ls: {}", e);
        process::exit(2);
    });

    let directory = match args.directory {
        Some(dir) => dir,
        None => env::current_dir().context("current directory is unavailable")?,
    };
    let directory = fs::canonicalize(&directory)
        .with_context(|| format!("{}: no such directory", directory.display()))?;

    let rows = collect_rows(&directory, args.all)?;
    print!("{}", render(&rows));
    Ok(())
}

fn collect_rows(directory: &Path, all: bool) -> anyhow::Result<Vec<Row>> {
    let mut rows = Vec::new();
    for entry in fs::read_dir(directory)
        .with_context(|| format!("cannot list {}", directory.display()))?
    {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !all && name.starts_with('.') {
            continue;
        }
        let metadata = entry.metadata()?;
        let modified = metadata
            .modified()
            .map(|time| {
                DateTime::<Local>::from(time)
                    .format("%b %e %H:%M")
                    .to_string()
            })
            .unwrap_or_default();

        rows.push(Row {
            mode: mode_string(metadata.is_dir(), metadata.permissions().mode()),
            links: metadata.nlink(),
            owner: owner_name(metadata.uid()),
            group: group_name(metadata.gid()),
            size: metadata.len(),
            modified,
            name,
            path: entry.path(),
            is_dir: metadata.is_dir(),
        });
    }
    rows.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(rows)
}

/// User name for `uid`, or the number when it has no entry
fn owner_name(uid: u32) -> String {
    User::from_uid(Uid::from_raw(uid))
        .ok()
        .flatten()
        .map(|user| user.name)
        .unwrap_or_else(|| uid.to_string())
}

/// Group name for `gid`, or the number when it has no entry
fn group_name(gid: u32) -> String {
    Group::from_gid(Gid::from_raw(gid))
        .ok()
        .flatten()
        .map(|group| group.name)
        .unwrap_or_else(|| gid.to_string())
}

/// `drwxr-xr-x` style permission string
fn mode_string(is_dir: bool, mode: u32) -> String {
    let mut out = String::with_capacity(10);
    out.push(if is_dir { 'd' } else { '-' });
    for shift in [6, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}

fn render(rows: &[Row]) -> String {
    let mut out = String::new();
    out.push_str("MIME-Version: 1.0\n");
    out.push_str("Content-Type: text/markdown\n");
    out.push('\n');
    out.push_str("| Mode | Links | Owner | Group | Size | Modified | Name |\n");
    out.push_str("|------|------:|-------|-------|-----:|----------|------|\n");
    for row in rows {
        let suffix = if row.is_dir { "/" } else { "" };
        out.push_str(&format!(
            "| `{}` | {} | {} | {} | {} | {} | [{}{}](file://{}) |\n",
            row.mode,
            row.links,
            row.owner,
            row.group,
            row.size,
            row.modified,
            row.name.replace('|', "\\|"),
            suffix,
            row.path.display().to_string().replace(' ', "%20"),
        ));
    }
    out
}
