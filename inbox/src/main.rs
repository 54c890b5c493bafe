use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inbox::config::Config;
use inbox::error::Result;
use inbox::pipeline::{stage_files, AnalyzeOptions, Orchestrator, PipelineOutcome};
use inbox::processing::{Aggregator, ExtractionRun};

#[derive(Parser)]
#[command(name = "inbox")]
#[command(about = "Extract staged office documents and hand them to an analysis tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract text from every staged file into one JSON document
    Extract {
        /// Staging directory to scan
        #[arg(long)]
        staging_dir: Option<PathBuf>,
        /// Output path; falls back to the working directory when its parent is missing
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Extract, analyze, then commit and push the results
    Analyze {
        #[command(flatten)]
        options: AnalyzeArgs,
    },
    /// Copy files into the staging directory, stage them in git, then analyze
    Add {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[command(flatten)]
        options: AnalyzeArgs,
    },
}

#[derive(clap::Args)]
struct AnalyzeArgs {
    /// Classify only: single turn, no commit
    #[arg(long)]
    dry_run: bool,
    /// Model passed to the analysis tool
    #[arg(long)]
    model: Option<String>,
}

impl From<AnalyzeArgs> for AnalyzeOptions {
    fn from(args: AnalyzeArgs) -> Self {
        Self {
            dry_run: args.dry_run,
            model: args.model,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "inbox=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()?;
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()?;
    }

    let config = Config::from_env();

    if let Err(e) = run(cli.command, config) {
        tracing::error!(error = %e, "Run failed");
        std::process::exit(e.exit_code());
    }

    Ok(())
}

fn run(command: Command, mut config: Config) -> Result<()> {
    match command {
        Command::Extract {
            staging_dir,
            output,
        } => {
            config.extraction.staging_dir = staging_dir.unwrap_or_else(|| config.staging_dir());
            if let Some(output) = output {
                config.extraction.output_path = output;
            }

            match Aggregator::new(config.extraction).run()? {
                ExtractionRun::NoFiles => tracing::info!("No files found, nothing to extract"),
                ExtractionRun::Written(summary) => {
                    println!("{}", summary.output_path.display());
                }
            }
            Ok(())
        }
        Command::Analyze { options } => analyze(config, options.into()),
        Command::Add { files, options } => {
            let names = stage_files(&config, &files)?;
            tracing::info!(count = names.len(), "Files staged, starting analysis");
            analyze(config, options.into())
        }
    }
}

fn analyze(config: Config, options: AnalyzeOptions) -> Result<()> {
    match Orchestrator::new(config).run(&options)? {
        PipelineOutcome::NoFiles => {}
        PipelineOutcome::DryRun => tracing::info!("Dry run complete, nothing committed"),
        PipelineOutcome::Committed(outcome) => tracing::info!(?outcome, "Analysis complete"),
    }
    Ok(())
}
