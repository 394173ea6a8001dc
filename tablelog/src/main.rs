//! tablelog - browse and annotate exported tabletop session logs
//!
//! Provides commands for:
//! - Managing the watched log directories
//! - Listing and filtering log files by name, date and tag
//! - Reading one log with its tab settings applied
//! - Editing tab kinds and colors, bookmarks and list metadata
//!
//! Uses XDG Base Directory specification for file locations:
//! - Settings: $XDG_DATA_HOME/tablelog/setting.json (~/.local/share/tablelog/setting.json)
//! - Config: $XDG_CONFIG_HOME/tablelog/config.toml (~/.config/tablelog/config.toml)
//! - Logs: $XDG_STATE_HOME/tablelog/ (~/.local/state/tablelog/)

mod statement_format;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tablelog_core::library::split_file_path;
use tablelog_core::{color, Config, FileId, FileMetadata, LogLibrary, MetadataFilter, TabKind};

use crate::statement_format::{kind_label, metadata_row, statement_line, tab_line, tags_label};

#[derive(Parser)]
#[command(name = "tablelog")]
#[command(about = "Browse and annotate exported tabletop session logs")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage watched log directories
    Dirs {
        #[command(subcommand)]
        command: DirsCommand,
    },

    /// List log files under every watched directory
    Files {
        /// Whitespace-separated terms that must all appear in the name
        #[arg(short, long)]
        name: Option<String>,

        /// Earliest date to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Latest date to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Only files carrying this tag
        #[arg(short, long)]
        tag: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one log with its overlay applied
    Show {
        /// Log file path or file id
        file: String,

        /// Only statements in tabs of this kind (repeatable)
        #[arg(short = 'k', long = "kind")]
        kinds: Vec<TabKind>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Set the kind (and optionally color) of one tab
    Tab {
        /// Log file path or file id
        file: String,

        /// Tab label as it appears in the log
        label: String,

        /// other, main, chat, info, colored (or 0-4)
        kind: TabKind,

        /// Tab color as #rrggbb
        #[arg(short, long)]
        color: Option<String>,
    },

    /// Print or set the bookmarked statement index
    Bookmark {
        /// Log file path or file id
        file: String,

        /// New bookmark index
        index: Option<usize>,
    },

    /// Edit list metadata for one log
    Meta {
        /// Log file path or file id
        file: String,

        /// New display name
        #[arg(short, long)]
        name: Option<String>,

        /// New date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Replace tags (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Remove every tag
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,
    },

    /// Print a color in hex, RGB, HSL and HSV
    Color {
        /// Color as #rrggbb
        hex: String,
    },
}

#[derive(Subcommand)]
enum DirsCommand {
    /// List watched directories
    List,

    /// Start watching a directory
    Add { path: PathBuf },

    /// Stop watching a directory
    Remove { path: PathBuf },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    Config::ensure_xdg_env();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging (to file, stdout carries command output)
    let _log_guard =
        tablelog_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "tablelog starting");

    let open_library = || LogLibrary::open(&config).context("failed to open log library");

    match args.command {
        Command::Dirs { command } => cmd_dirs(&mut open_library()?, command),
        Command::Files {
            name,
            from,
            to,
            tag,
            json,
        } => {
            let mut filter = MetadataFilter::new().with_name(name.as_deref().unwrap_or_default());
            filter.from = from;
            filter.to = to;
            filter.tag = tag;
            cmd_files(&mut open_library()?, &filter, json)
        }
        Command::Show { file, kinds, json } => {
            cmd_show(&mut open_library()?, &file, &kinds, json)
        }
        Command::Tab {
            file,
            label,
            kind,
            color,
        } => cmd_tab(&mut open_library()?, &file, &label, kind, color.as_deref()),
        Command::Bookmark { file, index } => cmd_bookmark(&mut open_library()?, &file, index),
        Command::Meta {
            file,
            name,
            date,
            tags,
            clear_tags,
        } => cmd_meta(&mut open_library()?, &file, name, date, tags, clear_tags),
        Command::Color { hex } => cmd_color(&hex),
    }
}

/// Accept either a path to an existing file or a percent-encoded file id.
fn resolve_file(arg: &str) -> Result<PathBuf> {
    let direct = Path::new(arg);
    let path = if direct.exists() {
        direct.to_path_buf()
    } else {
        FileId::new(arg)
            .decode()
            .with_context(|| format!("invalid file id {arg:?}"))?
    };
    if !path.is_file() {
        anyhow::bail!("no log file at {}", path.display());
    }
    std::fs::canonicalize(&path).with_context(|| format!("failed to resolve {}", path.display()))
}

/// Canonical form of a directory argument. A directory that no longer exists
/// can still be named for removal, so it is only made absolute.
fn resolve_directory(path: &Path) -> Result<PathBuf> {
    let resolved = if path.exists() {
        std::fs::canonicalize(path)
    } else {
        std::path::absolute(path)
    };
    resolved.with_context(|| format!("failed to resolve {}", path.display()))
}

fn cmd_dirs(library: &mut LogLibrary, command: DirsCommand) -> Result<()> {
    match command {
        DirsCommand::List => {
            let dirs = library
                .watched_directories()
                .context("failed to read settings")?;
            if dirs.is_empty() {
                println!("No watched directories.");
                println!("Run 'tablelog dirs add <path>' to add one.");
            }
            for dir in dirs {
                let marker = if dir.is_dir() { "" } else { "  (missing)" };
                println!("{}{}", dir.display(), marker);
            }
        }
        DirsCommand::Add { path } => {
            if !path.is_dir() {
                anyhow::bail!("{} is not a directory", path.display());
            }
            let path = resolve_directory(&path)?;
            if library.add_directory(&path).context("failed to save settings")? {
                println!("Watching {}", path.display());
            } else {
                println!("Already watching {}", path.display());
            }
        }
        DirsCommand::Remove { path } => {
            let path = resolve_directory(&path)?;
            if library
                .remove_directory(&path)
                .context("failed to save settings")?
            {
                println!("Stopped watching {}", path.display());
            } else {
                println!("Not watching {}", path.display());
            }
        }
    }
    Ok(())
}

fn cmd_files(library: &mut LogLibrary, filter: &MetadataFilter, json: bool) -> Result<()> {
    let entries = library.list_library().context("failed to list log files")?;
    let matched = filter.apply(&entries);

    if json {
        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        struct FileRow<'a> {
            id: String,
            #[serde(flatten)]
            metadata: &'a FileMetadata,
        }

        let rows: Vec<FileRow> = matched
            .iter()
            .copied()
            .map(|metadata| FileRow {
                id: FileId::from_path(&metadata.source_path).to_string(),
                metadata,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No log files found.");
        return Ok(());
    }

    for metadata in &matched {
        println!("{}", metadata_row(metadata));
        println!("            {}", metadata.source_path.display());
    }
    println!();
    println!("{} of {} file(s)", matched.len(), entries.len());
    Ok(())
}

fn cmd_show(library: &mut LogLibrary, file: &str, kinds: &[TabKind], json: bool) -> Result<()> {
    let path = resolve_file(file)?;
    let view = library
        .parse_and_merge(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let statements = if kinds.is_empty() {
        view.statements.iter().collect()
    } else {
        view.statements_in(kinds)
    };

    if json {
        let output = serde_json::json!({
            "id": FileId::from_path(&path).to_string(),
            "metadata": &view.metadata,
            "tabs": &view.tabs,
            "statements": statements,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let metadata = &view.metadata;
    println!("{}", metadata.display_name);
    println!("Date:      {}", tablelog_core::format::format_date(metadata.date));
    println!("Tags:      {}", tags_label(&metadata.tags));
    println!("Bookmark:  {}", metadata.bookmark.unwrap_or(0));
    println!();
    println!("Tabs:");
    for label in &view.tabs {
        println!("  {}", tab_line(label, view.tab_setting(label)));
    }
    println!();
    for statement in statements {
        println!("{}", statement_line(statement));
    }
    Ok(())
}

fn cmd_tab(
    library: &mut LogLibrary,
    file: &str,
    label: &str,
    kind: TabKind,
    color: Option<&str>,
) -> Result<()> {
    let path = resolve_file(file)?;
    let setting = library
        .update_tab_setting(&path, label, kind, color)
        .with_context(|| format!("failed to update tab {label:?}"))?;
    println!(
        "{} {} {}",
        label,
        kind_label(setting.tab_type),
        setting.tab_color.as_deref().unwrap_or("-")
    );
    Ok(())
}

fn cmd_bookmark(library: &mut LogLibrary, file: &str, index: Option<usize>) -> Result<()> {
    let path = resolve_file(file)?;
    match index {
        Some(index) => {
            library
                .set_bookmark(&path, index)
                .context("failed to save bookmark")?;
            println!("Bookmark set to {}", index);
        }
        None => {
            let index = library
                .get_bookmark(&path)
                .context("failed to read bookmark")?;
            println!("{}", index);
        }
    }
    Ok(())
}

fn cmd_meta(
    library: &mut LogLibrary,
    file: &str,
    name: Option<String>,
    date: Option<NaiveDate>,
    tags: Vec<String>,
    clear_tags: bool,
) -> Result<()> {
    let path = resolve_file(file)?;
    let (directory, file_name) = split_file_path(&path)?;
    let mut metadata = library
        .list_file_metadata(&directory)
        .context("failed to read directory overlay")?
        .into_iter()
        .find(|m| m.source_path.file_name() == Some(OsStr::new(&file_name)))
        .unwrap_or_else(|| FileMetadata::for_path(&path));

    if let Some(name) = name {
        metadata.display_name = name;
    }
    if let Some(date) = date {
        metadata.date = date.and_time(NaiveTime::MIN).and_utc().timestamp_millis();
    }
    if clear_tags {
        metadata.tags.clear();
    } else if !tags.is_empty() {
        metadata.tags = tags;
    }

    library
        .update_file_metadata(metadata.clone())
        .context("failed to save metadata")?;
    println!("{}", metadata_row(&metadata));
    Ok(())
}

fn cmd_color(hex: &str) -> Result<()> {
    let code = color::parse_hex(hex)?;
    let rgb = color::hex_to_rgb(&code)?;
    let hsl = color::rgb_to_hsl(rgb);
    let hsv = color::hsl_to_hsv(hsl);
    println!("Hex:  {}", code);
    println!("RGB:  {} {} {}", rgb.r, rgb.g, rgb.b);
    println!("HSL:  {:.0} {:.0}% {:.0}%", hsl.h, hsl.s, hsl.l);
    println!("HSV:  {:.0} {:.0}% {:.0}%", hsv.h, hsv.s, hsv.v);
    Ok(())
}
