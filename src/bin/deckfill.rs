/// Command-line front end: extract a template schema from a deck, or fill
/// a deck from a schema.
///
/// Usage:
///   deckfill extract template.pptx -o schema.json
///   deckfill fill template.pptx schema.json -o filled.pptx
use clap::{Parser, Subcommand};
use deckfill::fill::{FieldStatus, FillOptions, MetaExtractor, TemplateFiller, TemplateSchema};
use deckfill::ooxml::pptx::Presentation;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "deckfill", version, about = "Fill PowerPoint templates field by field")]
struct Cli {
    /// YAML file with fill options
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More output (-v: info, -vv: debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Write one schema record per text-bearing element of a deck
    Extract {
        /// Input presentation
        input: PathBuf,
        /// Schema output path (stdout when omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Replace element text according to a schema
    Fill {
        /// Template presentation
        input: PathBuf,
        /// Template schema (JSON)
        schema: PathBuf,
        /// Output presentation (defaults to `<input>_filled.pptx`)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Print the full report as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        },
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_options(path: Option<&Path>) -> deckfill::Result<FillOptions> {
    match path {
        Some(path) => FillOptions::from_yaml_file(path),
        None => Ok(FillOptions::default()),
    }
}

fn run(cli: Cli) -> deckfill::Result<ExitCode> {
    let options = load_options(cli.config.as_deref())?;

    match cli.command {
        Commands::Extract { input, output } => {
            let deck = Presentation::open(&input)?;
            let schema = MetaExtractor::new(options).extract(&deck)?;
            match output {
                Some(path) => {
                    schema.save(&path)?;
                    eprintln!(
                        "Extracted {} fields from {} slides into {}",
                        schema.len(),
                        deck.slide_count(),
                        path.display()
                    );
                },
                None => println!("{}", schema.to_json_string()?),
            }
            Ok(ExitCode::SUCCESS)
        },
        Commands::Fill {
            input,
            schema,
            output,
            json,
        } => {
            let mut deck = Presentation::open(&input)?;
            let schema = TemplateSchema::open(&schema)?;
            let report = TemplateFiller::new(options).fill(&mut deck, &schema)?;

            let output = output.unwrap_or_else(|| default_output(&input));
            deck.save(&output)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Filled {} ({} slides)", output.display(), report.slides);
                println!("{}", "-".repeat(60));
                for (field, status) in report.statuses() {
                    if status != FieldStatus::Matched {
                        println!("  {:<10} {}", format!("{status:?}").to_lowercase(), field);
                    }
                }
                println!("{}", report.summary());
            }

            let summary = report.summary();
            Ok(if summary.failed > 0 {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            })
        },
    }
}

/// `<dir>/<stem>_filled.pptx` next to the input.
fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "deck".to_string());
    input.with_file_name(format!("{stem}_filled.pptx"))
}
