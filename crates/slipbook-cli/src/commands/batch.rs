//! Batch processing command for a directory of receipt images.
//!
//! The ledger is loaded once at the start and saved once at the end; an
//! image without a usable transcript is logged and skipped, never fatal.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use slipbook_core::ledger::{LedgerStore, OverwritePolicy, Reconciler, UpdateRecord, UpsertOutcome};
use slipbook_core::pipeline::{map_to_columns, Orchestrator};
use slipbook_core::transcript::TranscriptSource;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input directory or glob pattern
    #[arg(required = true)]
    input: String,

    /// Ledger CSV file
    #[arg(short, long, default_value = "Finances.csv")]
    ledger: PathBuf,

    /// Override the configured overwrite policy
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Directory holding transcript sidecar files (default: next to images)
    #[arg(short, long)]
    transcripts: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum PolicyArg {
    /// Last write wins, blanks included
    Replace,
    /// Fill empty cells only, never erase
    FillEmpty,
}

impl From<PolicyArg> for OverwritePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Replace => OverwritePolicy::Replace,
            PolicyArg::FillEmpty => OverwritePolicy::FillEmpty,
        }
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = super::load_config(config_path)?;
    if let Some(policy) = args.policy {
        config.ledger.overwrite = policy.into();
    }
    if args.transcripts.is_some() {
        config.transcripts.dir = args.transcripts.clone();
    }

    let images = discover_images(&args.input)?;
    if images.is_empty() {
        anyhow::bail!("No receipt images found for: {}", args.input);
    }
    println!(
        "{} Found {} image(s) to process",
        style("ℹ").blue(),
        images.len()
    );

    // Open the ledger once for the whole batch; no schema is a hard stop
    let store = super::ledger_store(&args.ledger, &config);
    let mut ledger = store.load()?;
    println!(
        "{} Ledger has {} column(s) and {} row(s)",
        style("ℹ").blue(),
        ledger.columns().len(),
        ledger.len()
    );

    let source = super::sidecar_source(&config);
    let orchestrator = Orchestrator::from_config(&config.extraction);
    let reconciler = Reconciler::from_config(&config.ledger);

    let pb = ProgressBar::new(images.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} images")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut processed = 0usize;
    let mut created = 0usize;
    let mut skipped = 0usize;

    for image in &images {
        let name = super::image_name(image)?;

        match source.transcript(image) {
            Ok(transcript) => {
                debug!(image = %name, lines = transcript.lines.len(), "transcript loaded");

                let fields = orchestrator.extract(&name, &transcript);
                let update = map_to_columns(&fields, ledger.columns());
                let outcome = reconciler.upsert(&mut ledger, &name, &update)?;
                if outcome == UpsertOutcome::Created {
                    created += 1;
                }
                processed += 1;

                pb.println(format!(
                    "{} {}: {}",
                    style("ok").green(),
                    name,
                    describe_update(&update)
                ));
            }
            Err(e) => {
                warn!(image = %name, error = %e, "skipping image without transcript");
                skipped += 1;
                pb.println(format!("{} {}: {}", style("skip").yellow(), name, e));
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    reconciler.finalize(&mut ledger);
    store.save(&ledger)?;

    println!();
    println!(
        "{} Processed {} image(s) in {:?} ({} new row(s), {} skipped)",
        style("✓").green(),
        processed,
        start.elapsed(),
        created,
        skipped
    );
    println!("{} Ledger updated: {}", style("✓").green(), args.ledger.display());

    Ok(())
}

/// Expand a directory or glob pattern into a sorted list of image files.
fn discover_images(input: &str) -> anyhow::Result<Vec<PathBuf>> {
    let pattern = if Path::new(input).is_dir() {
        format!("{}/*", input.trim_end_matches('/'))
    } else {
        input.to_string()
    };

    let mut images: Vec<PathBuf> = glob(&pattern)?
        .filter_map(|entry| entry.ok())
        .filter(|path| {
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .collect();
    images.sort();

    Ok(images)
}

fn describe_update(update: &UpdateRecord) -> String {
    let parts: Vec<String> = update
        .iter()
        .filter(|(_, cell)| !cell.is_empty())
        .map(|(column, cell)| format!("{}={}", column, cell))
        .collect();

    if parts.is_empty() {
        "(no fields extracted)".to_string()
    } else {
        parts.join(", ")
    }
}
