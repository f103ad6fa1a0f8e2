//! Command-line interface for richtext

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io::Read;
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
use richtext::validators::TrackingListener;
#[cfg(feature = "cli")]
use richtext::{Document, ProcessorConfig, RichTextDataProcessor, Strictness};
#[cfg(feature = "cli")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "richtext")]
#[command(author, version, about = "RichText sanitation and conversion tool", long_about = None)]
struct Cli {
    /// Strictness level: strict, loose, legacy or none
    #[arg(short, long, global = true)]
    strictness: Option<String>,

    /// JSON configuration file
    #[arg(short, long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Log repairs and conversion steps to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Sanitize a stored RichText document
    Sanitize {
        /// RichText file (defaults to stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert HTML editing markup to RichText
    #[command(name = "to-data")]
    ToData {
        /// Markup file (defaults to stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert RichText to HTML editing markup
    #[command(name = "to-view")]
    ToView {
        /// RichText file (defaults to stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report the repairs a RichText document needs
    Check {
        /// RichText file (defaults to stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = processor(cli.config.as_deref(), cli.strictness.as_deref()).and_then(|processor| {
        match cli.command {
            Commands::Sanitize { file, output } => cmd_sanitize(&processor, file, output),
            Commands::ToData { file, output } => cmd_to_data(&processor, file, output),
            Commands::ToView { file, output } => cmd_to_view(&processor, file, output),
            Commands::Check { file } => cmd_check(&processor, file),
        }
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Build the processor from the configuration file and the strictness override
#[cfg(feature = "cli")]
fn processor(config: Option<&Path>, strictness: Option<&str>) -> CliResult<RichTextDataProcessor> {
    let mut config = match config {
        Some(path) => ProcessorConfig::from_file(path)?,
        None => ProcessorConfig::default(),
    };
    if let Some(strictness) = strictness {
        config = config.with_strictness(strictness.parse::<Strictness>()?);
    }
    Ok(RichTextDataProcessor::new(config)?)
}

#[cfg(feature = "cli")]
fn read_input(file: Option<PathBuf>) -> CliResult<String> {
    match file {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut content = String::new();
            std::io::stdin().read_to_string(&mut content)?;
            Ok(content)
        }
    }
}

#[cfg(feature = "cli")]
fn write_output(output: Option<PathBuf>, content: &str) -> CliResult<()> {
    match output {
        Some(path) => fs::write(path, content)?,
        None => println!("{}", content),
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn print_events(listener: &TrackingListener) {
    for event in listener.events() {
        eprintln!("  - {}", event);
    }
}

#[cfg(feature = "cli")]
fn cmd_sanitize(
    processor: &RichTextDataProcessor,
    file: Option<PathBuf>,
    output: Option<PathBuf>,
) -> CliResult<()> {
    let mut doc = Document::parse(&read_input(file)?)?;
    let mut listener = TrackingListener::new();
    let result = processor.sanitize(&mut doc, &mut listener);
    print_events(&listener);
    result?;
    write_output(output, &doc.to_xml())
}

#[cfg(feature = "cli")]
fn cmd_to_data(
    processor: &RichTextDataProcessor,
    file: Option<PathBuf>,
    output: Option<PathBuf>,
) -> CliResult<()> {
    let mut listener = TrackingListener::new();
    let result = processor.to_data_with(&read_input(file)?, &mut listener);
    print_events(&listener);
    write_output(output, &result?.to_xml())
}

#[cfg(feature = "cli")]
fn cmd_to_view(
    processor: &RichTextDataProcessor,
    file: Option<PathBuf>,
    output: Option<PathBuf>,
) -> CliResult<()> {
    let view = processor.to_view_string(&read_input(file)?)?;
    write_output(output, &view)
}

#[cfg(feature = "cli")]
fn cmd_check(processor: &RichTextDataProcessor, file: Option<PathBuf>) -> CliResult<()> {
    let mut doc = Document::parse(&read_input(file)?)?;
    let mut listener = TrackingListener::new();
    let result = processor.sanitize(&mut doc, &mut listener);

    if result.is_ok() && listener.severe_count() == 0 {
        println!("✓ Document is valid");
        if !listener.is_clean() {
            println!("{} minor repair(s):", listener.events().len());
            for event in listener.events() {
                println!("  - {}", event);
            }
        }
        return Ok(());
    }

    println!("✗ Document is invalid");
    println!();
    println!("Repairs:");
    for event in listener.events() {
        println!("  - {}", event);
    }
    if let Err(e) = result {
        println!();
        println!("Error: {}", e);
    }
    std::process::exit(1);
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
