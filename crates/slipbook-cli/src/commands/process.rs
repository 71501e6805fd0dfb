//! Process command - extract fields from a single receipt image.

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use slipbook_core::ledger::{LedgerStore, Reconciler, UpsertOutcome};
use slipbook_core::pipeline::{map_to_columns, Orchestrator};
use slipbook_core::transcript::TranscriptSource;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Receipt image file
    #[arg(required = true)]
    input: PathBuf,

    /// Explicit transcript file (default: sidecar JSON next to the image)
    #[arg(short, long)]
    transcript: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Ledger CSV to upsert the extracted fields into
    #[arg(short, long)]
    ledger: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON field map
    Json,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }
    let image = super::image_name(&args.input)?;

    let source = super::sidecar_source(&config);
    let transcript = match &args.transcript {
        Some(path) => source.read_file(path)?,
        None => source.transcript(&args.input)?,
    };
    info!("Recognized {} transcript line(s)", transcript.lines.len());

    let orchestrator = Orchestrator::from_config(&config.extraction);
    let fields = orchestrator.extract(&image, &transcript);

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&fields)?),
        OutputFormat::Text => {
            for (field, value) in &fields {
                let shown = if value.is_empty() { "-" } else { value.as_str() };
                println!("{:>16}: {}", field, shown);
            }
        }
    }

    if let Some(ledger_path) = &args.ledger {
        let store = super::ledger_store(ledger_path, &config);
        let mut ledger = store.load()?;

        let update = map_to_columns(&fields, ledger.columns());
        let reconciler = Reconciler::from_config(&config.ledger);
        let outcome = reconciler.upsert(&mut ledger, &image, &update)?;
        reconciler.finalize(&mut ledger);
        store.save(&ledger)?;

        let verb = match outcome {
            UpsertOutcome::Created => "Created",
            UpsertOutcome::Updated => "Updated",
        };
        println!(
            "{} {} row for {} in {}",
            style("✓").green(),
            verb,
            image,
            ledger_path.display()
        );
    }

    Ok(())
}
