// SPDX-License-Identifier: MIT OR Apache-2.0
//! docshift CLI binary - plan, apply, and roll back JSON document migrations

use anyhow::{Context, Result, bail};
use clap::{Args as ClapArgs, Parser, Subcommand};
use docshift::diff::{json_merge_diff, merge_many};
use docshift::{Change, Command, Document, DocumentStore, PrettyOptions, Value, parse_document};
use docshift_cli::{DirStore, logging};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "docshift")]
#[command(version, about, long_about = None)]
struct Args {
    /// Trace every resolution step on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Colorized log output
    #[arg(long, global = true)]
    color: bool,

    /// Indentation width of the review diff
    #[arg(long, default_value = "2", global = true)]
    indent: usize,

    /// List unchanged keys in the review diff
    #[arg(long, global = true)]
    show_unchanged: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Args {
    fn pretty_options(&self) -> PrettyOptions {
        let options = PrettyOptions::default().with_indent(self.indent);
        if self.show_unchanged {
            options.show_unchanged()
        } else {
            options
        }
    }
}

/// Patch source shared by `plan` and `apply`
#[derive(ClapArgs)]
struct ChangeInput {
    /// Path of the target document
    doc_path: String,

    /// Patch document (JSON object)
    #[arg(long, value_name = "FILE", conflicts_with = "instruction")]
    patch: Option<PathBuf>,

    /// Literal merge-patch instruction
    #[arg(long, value_name = "JSON")]
    instruction: Option<String>,

    /// Operation kind: update, set, add, delete (inferred when unknown)
    #[arg(long = "command", value_name = "COMMAND", default_value = "unknown")]
    operation: Command,
}

/// Subcommands for docshift CLI
#[derive(Subcommand)]
enum Commands {
    /// Compute the merge patch between two documents
    Diff {
        /// Original document
        before: PathBuf,
        /// Target document
        after: PathBuf,
    },
    /// Apply merge patches to a document, in order
    Merge {
        /// Base document
        base: PathBuf,
        /// Merge patches
        patches: Vec<PathBuf>,
    },
    /// Resolve a change and print its review diff and rollback
    Plan {
        #[command(flatten)]
        input: ChangeInput,
        /// Last known state of the document
        #[arg(long, value_name = "FILE")]
        before: Option<PathBuf>,
    },
    /// Resolve a change against a directory store and push it
    Apply {
        #[command(flatten)]
        input: ChangeInput,
        /// Root directory of the document store
        #[arg(long, value_name = "DIR")]
        store: PathBuf,
        /// Resolve and present without writing
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() {
    let args = Args::parse();

    let options = logging::Options {
        verbose: args.verbose,
        color: args.color,
    };
    if let Err(e) = logging::set_up(options) {
        eprintln!("Error: {e}");
    }

    let result = match &args.command {
        Commands::Diff { before, after } => run_diff(before, after),
        Commands::Merge { base, patches } => run_merge(base, patches),
        Commands::Plan { input, before } => run_plan(&args, input, before.as_deref()),
        Commands::Apply {
            input,
            store,
            dry_run,
        } => run_apply(&args, input, store, *dry_run),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run_diff(before: &Path, after: &Path) -> Result<()> {
    let before = read_value(before)?;
    let after = read_value(after)?;
    let patch = json_merge_diff(&before, &after)?;
    write_output(&serde_json::to_string_pretty(&patch)?)
}

fn run_merge(base: &Path, patches: &[PathBuf]) -> Result<()> {
    let base = read_document(base)?;
    let patches = patches
        .iter()
        .map(|p| read_document(p))
        .collect::<Result<Vec<_>>>()?;
    let merged = merge_many(&base, &patches);
    write_output(&serde_json::to_string_pretty(&merged)?)
}

fn run_plan(args: &Args, input: &ChangeInput, before: Option<&Path>) -> Result<()> {
    let before = before.map(read_document).transpose()?;
    let mut change = build_change(args, input, before)?;
    let resolved = change.resolve().is_ok();
    change.present();
    if !resolved {
        bail!("change for {} could not be resolved", change.doc_path());
    }
    print_summary(&change)
}

fn run_apply(args: &Args, input: &ChangeInput, root: &Path, dry_run: bool) -> Result<()> {
    let store = DirStore::new(root);
    let before = if input.operation == Command::Add {
        None
    } else {
        Some(
            store
                .fetch(&input.doc_path)
                .with_context(|| format!("fetching {} from {}", input.doc_path, store.name()))?,
        )
    };

    let mut change = build_change(args, input, before)?;
    let resolved = change.resolve().is_ok();
    change.present();
    if !resolved {
        bail!("change for {} could not be resolved", change.doc_path());
    }

    if dry_run {
        info!(doc_path = change.doc_path(), "dry run, nothing written");
    } else {
        change
            .push(&store)
            .with_context(|| format!("pushing {}", change.doc_path()))?;
    }
    print_summary(&change)
}

fn build_change(args: &Args, input: &ChangeInput, before: Option<Document>) -> Result<Change> {
    let patch = input.patch.as_deref().map(read_document).transpose()?;
    let instruction = input.instruction.clone().unwrap_or_default();
    Ok(
        Change::new(input.doc_path.clone(), before, patch, input.operation, instruction)
            .with_pretty_options(args.pretty_options()),
    )
}

fn print_summary(change: &Change) -> Result<()> {
    let rollback = change.rollback().unwrap_or_default();
    write_output(&format!(
        "command: {}\nrollback: {rollback}\n",
        change.command()
    ))
}

fn read_value(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn read_document(path: &Path) -> Result<Document> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_document(&text).with_context(|| format!("parsing {}", path.display()))
}

fn write_output(output: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(output.as_bytes())?;
    if !output.ends_with('\n') {
        handle.write_all(b"\n")?;
    }
    Ok(())
}
