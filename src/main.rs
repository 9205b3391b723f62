//! spanmend - span consistency engine for sentence annotation.
//!
//! # Usage
//!
//! ```bash
//! spanmend paper.json
//! spanmend --create-context "heat shock" --output fixed.json paper.json
//! spanmend --resolve 3:17 paper.json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use spanmend::app::{App, Message, Model, Selection, Severity};
use spanmend::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use spanmend::document::{Snap, prettify, resolve_offset_to_word_index};
use spanmend::remote::MemoryRemote;
use spanmend::spans::Snapshot;

/// Load an annotation snapshot, repair its spans and apply edits
#[derive(Parser, Debug)]
#[command(name = "spanmend", version, about, long_about = None)]
struct Cli {
    /// Snapshot JSON file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Write the repaired snapshot here instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Print the word index at LINE:OFFSET of the display text and exit
    #[arg(long, value_name = "LINE:OFFSET")]
    resolve: Option<String>,

    /// Create an event from a selection of the display text
    #[arg(long, value_name = "LINE:FROM:TO")]
    create_event: Vec<String>,

    /// Create a context at every occurrence of TEXT
    #[arg(long, value_name = "TEXT")]
    create_context: Vec<String>,

    /// Print the grounding index instead of the snapshot
    #[arg(long)]
    groundings: bool,

    /// Drop automatic events from the view
    #[arg(long)]
    hide_automatic: bool,

    /// Move event edges around punctuation
    #[arg(long)]
    include_punctuation: bool,

    /// Leave automatic events overhanging manual ones alone
    #[arg(long)]
    no_manual_overlap_fix: bool,

    /// Keep contained and overlapping events visible
    #[arg(long)]
    keep_overlapping: bool,

    #[arg(long)]
    no_new_events: bool,

    #[arg(long)]
    no_delete_events: bool,

    #[arg(long)]
    no_resize: bool,

    #[arg(long)]
    no_resize_manual: bool,

    #[arg(long)]
    no_resize_automatic: bool,

    #[arg(long)]
    no_new_contexts: bool,

    #[arg(long)]
    no_delete_contexts: bool,

    /// Opening punctuation token (repeatable)
    #[arg(long, value_name = "TOKEN")]
    opening_punct: Vec<String>,

    /// Closing punctuation token (repeatable)
    #[arg(long, value_name = "TOKEN")]
    closing_punct: Vec<String>,

    /// Minimum interval between drag updates
    #[arg(long, value_name = "MS")]
    throttle_ms: Option<u64>,

    /// How long full-state requests wait for a newer version
    #[arg(long, value_name = "MS")]
    coalesce_ms: Option<u64>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn parse_numbers<const N: usize>(arg: &str, what: &str) -> Result<[usize; N]> {
    let parts = arg
        .split(':')
        .map(|part| {
            part.trim()
                .parse::<usize>()
                .with_context(|| format!("{what} expects numbers, got {arg:?}"))
        })
        .collect::<Result<Vec<_>>>()?;
    parts
        .try_into()
        .map_err(|_| anyhow::anyhow!("{what} expects {N} numbers separated by ':', got {arg:?}"))
}

fn resolve(model: &Model, arg: &str) -> Result<usize> {
    let [line, offset] = parse_numbers::<2>(arg, "--resolve")?;
    let Some(sentence) = model.paper.sentence(line) else {
        bail!("Line {line} does not exist");
    };
    let canonical = sentence.canonical();
    let pretty = prettify(&canonical, &model.view.punctuation);
    Ok(resolve_offset_to_word_index(
        &canonical,
        &pretty,
        offset,
        Snap::Nearest,
    ))
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let options = file_flags.union(&cli_flags).options();

    if !cli.file.exists() {
        bail!("File not found: {}", cli.file.display());
    }
    let text = std::fs::read_to_string(&cli.file)
        .with_context(|| format!("Failed to read {}", cli.file.display()))?;
    let (paper, store) = Snapshot::from_json(&text)
        .and_then(Snapshot::into_session)
        .with_context(|| format!("Failed to load {}", cli.file.display()))?;

    let first_free_id = store
        .events()
        .iter()
        .map(|e| e.server_id.0)
        .chain(store.contexts().iter().map(|c| c.server_id.0))
        .max()
        .map_or(1, |id| id + 1);
    let mut model = Model::new(paper, store)
        .with_annotator(options.annotator)
        .with_view(options.view);

    if let Some(arg) = &cli.resolve {
        println!("{}", resolve(&model, arg)?);
        return Ok(());
    }

    let mut app = App::new(MemoryRemote::new(first_free_id))
        .with_throttle_ms(options.throttle_ms)
        .with_coalesce_ms(options.coalesce_ms);
    let mut now_ms = 0;
    model = app.dispatch(model, Message::ReconcileAll, now_ms);
    for arg in &cli.create_event {
        let [line, from, to] = parse_numbers::<3>(arg, "--create-event")?;
        now_ms += 1;
        model = app.dispatch(
            model,
            Message::CreateEvent(Selection::on_line(line, from, to)),
            now_ms,
        );
        model = app.tick(model, now_ms);
    }
    for mention in &cli.create_context {
        now_ms += 1;
        model = app.dispatch(model, Message::CreateContexts(mention.clone()), now_ms);
        model = app.flush(model, now_ms);
    }
    model = app.flush(model, now_ms);

    let mut failed = false;
    for notice in model.take_notices() {
        failed |= notice.severity == Severity::Error;
        eprintln!("[{:?}] {}", notice.severity, notice.message);
    }

    let rendered = if cli.groundings {
        serde_json::to_string_pretty(&model.store.grounding_index())
    } else {
        serde_json::to_string_pretty(&Snapshot::capture(&model.paper, &model.store))
    }
    .context("Failed to serialize output")?;

    match &cli.output {
        Some(path) => std::fs::write(path, format!("{rendered}\n"))
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{rendered}"),
    }
    if failed {
        bail!("Some changes could not be saved");
    }
    Ok(())
}
