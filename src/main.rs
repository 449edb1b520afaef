//! PDF field masking tool - command-line interface
//!
//! Blacks out target strings in a PDF using a character-level layout JSON.

use clap::builder::NonEmptyStringValueParser;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command, ValueEnum};
use pdfmask::config::{MaskColor, MaskConfig};
use pdfmask::error::{Error, Result};
use pdfmask::pipeline::{self, MaskJob};
use pdfmask::report::{ReportFormat, ReportFormatter};
use pdfmask::types::LayoutDocument;
use pdfmask::utils::logging::TracingSink;
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

/// Exit code for fatal input/output errors
const EXIT_FAILURE: i32 = 1;
/// Exit code for rejected arguments or configuration
const EXIT_USAGE: i32 = 2;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReportKind {
    /// Human-readable text (default)
    Text,
    /// JSON with every occurrence
    Json,
}

impl From<ReportKind> for ReportFormat {
    fn from(kind: ReportKind) -> Self {
        match kind {
            ReportKind::Text => ReportFormat::PlainText,
            ReportKind::Json => ReportFormat::Json,
        }
    }
}

fn main() {
    let matches = build_cli().get_matches();

    let config = match build_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            process::exit(EXIT_USAGE);
        }
    };

    init_logging(config.verbose);

    if let Some(term) = matches.get_one::<String>("list") {
        list_fields(&required_path(&matches, "layout"), term);
        return;
    }

    let job = MaskJob::new(
        required_path(&matches, "pdf"),
        required_path(&matches, "layout"),
        matches
            .get_many::<String>("targets")
            .map(|values| values.cloned().collect())
            .unwrap_or_default(),
        required_path(&matches, "output"),
    )
    .with_config(config);

    info!("🚀 Masking {} target(s) in {}", job.targets.len(), job.pdf_path.display());

    let report = match pipeline::run(&job, &TracingSink) {
        Ok(report) => report,
        Err(e) => {
            error!("❌ {}", e);
            let code = match e {
                Error::InvalidConfiguration(_) | Error::ConfigError(_) => EXIT_USAGE,
                _ => EXIT_FAILURE,
            };
            process::exit(code);
        }
    };

    if let Some(report_path) = matches.get_one::<PathBuf>("report") {
        let format = matches
            .get_one::<ReportKind>("format")
            .copied()
            .unwrap_or(ReportKind::Text);
        match report.write_to(report_path, format.into()) {
            Ok(()) => info!("📋 Report written to {}", report_path.display()),
            Err(e) => {
                error!("❌ {}", e);
                process::exit(EXIT_FAILURE);
            }
        }
    }
}

fn build_cli() -> Command {
    Command::new("pdfmask")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Mask strings in a PDF using a character-level layout JSON")
        .long_about(
            "Draws opaque rectangles over every occurrence of the given strings. \
             Character boxes come from the layout JSON written by the OCR/layout \
             extractor. The text underneath is covered, not removed.",
        )
        // Input/Output
        .arg(Arg::new("pdf")
            .value_name("PDF")
            .help("Source PDF file")
            .value_parser(value_parser!(PathBuf))
            .required(true))
        .arg(Arg::new("layout")
            .value_name("LAYOUT")
            .help("Character-level layout JSON")
            .value_parser(value_parser!(PathBuf))
            .required(true))
        .arg(Arg::new("targets")
            .value_name("TARGET")
            .help("Strings to mask (case-sensitive, exact)")
            .num_args(1..)
            .value_parser(NonEmptyStringValueParser::new())
            .required_unless_present("list"))
        .arg(Arg::new("output")
            .short('o')
            .long("output")
            .value_name("FILE")
            .help("Destination of the masked PDF")
            .value_parser(value_parser!(PathBuf))
            .required_unless_present("list"))

        // Appearance
        .arg(Arg::new("color")
            .long("color")
            .value_names(["R", "G", "B"])
            .num_args(1..=3)
            .allow_negative_numbers(true)
            .help("Fill colour: three values in [0, 1], a name (black, white, red, ...) or 'r,g,b' in 0-255 [default: 0 0 0]. \
                   Takes up to three values, so give it after the positional arguments"))
        .arg(Arg::new("padding")
            .long("padding")
            .value_name("RATIO")
            .value_parser(value_parser!(f32))
            .help("Widen each rectangle by RATIO of its width on both sides [default: 0]"))

        // Configuration
        .arg(Arg::new("config")
            .short('c')
            .long("config")
            .value_name("FILE")
            .value_parser(value_parser!(PathBuf))
            .help("Configuration file (JSON/YAML) with color, padding, verbose"))

        // Output and reporting
        .arg(Arg::new("report")
            .short('r')
            .long("report")
            .value_name("FILE")
            .value_parser(value_parser!(PathBuf))
            .help("Write a report of every target and occurrence"))
        .arg(Arg::new("format")
            .short('f')
            .long("format")
            .value_parser(value_parser!(ReportKind))
            .help("Report format [default: text]"))
        .arg(Arg::new("dry-run")
            .long("dry-run")
            .action(ArgAction::SetTrue)
            .help("Find and report occurrences without writing the output PDF"))

        // Inspection
        .arg(Arg::new("list")
            .long("list")
            .value_name("TERM")
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("")
            .help("List the layout's character keys with page and bbox, optionally only those containing TERM (--list=TERM); nothing is masked"))

        // Logging
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .action(ArgAction::SetTrue)
            .help("Log per-page and per-occurrence details"))
}

/// Config file first, then command-line overrides
fn build_config(matches: &ArgMatches) -> Result<MaskConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => MaskConfig::load(path)?,
        None => MaskConfig::default(),
    };

    if let Some(values) = matches.get_many::<String>("color") {
        let values: Vec<&String> = values.collect();
        config.color = MaskColor::from_args(values.as_slice())?;
    }
    if let Some(padding) = matches.get_one::<f32>("padding") {
        config.padding = *padding;
    }
    if matches.get_flag("verbose") {
        config.verbose = true;
    }
    if matches.get_flag("dry-run") {
        config.dry_run = true;
    }

    config.validate()?;
    Ok(config)
}

/// Prints the layout's keys; no PDF is loaded and nothing is written
fn list_fields(layout_path: &std::path::Path, term: &str) {
    match LayoutDocument::load(layout_path) {
        Ok(layout) => print!("{}", ReportFormatter::field_listing(&layout, Some(term))),
        Err(e) => {
            error!("❌ {}", e);
            process::exit(EXIT_FAILURE);
        }
    }
}

fn required_path(matches: &ArgMatches, id: &str) -> PathBuf {
    matches.get_one::<PathBuf>(id).cloned().unwrap_or_default()
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    let filter_level = if verbose { "debug" } else { "info" };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::new(format!("pdfmask={}", filter_level)))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install log subscriber: {}", e);
    }
}
