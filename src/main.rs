//! jlc2kicad: convert JLCPCB/EasyEDA component payloads into KiCad
//! footprints, symbols and 3-D models.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use jlc2kicad::config::{self, Config};
use jlc2kicad::easyeda::{ComponentPayload, ComponentResult, ConvertError, ConvertResult};
use jlc2kicad::footprint;
use jlc2kicad::library::{Container, Upsert};
use jlc2kicad::model3d;
use jlc2kicad::report::Reporter;
use jlc2kicad::symbol::{self, Symbol};

/// Convert JLCPCB/EasyEDA component payloads into KiCad library files.
///
/// Payloads are the JSON envelopes the EasyEDA component API serves;
/// symbol payloads update a shared `.kicad_sym` library, footprint
/// payloads produce `.kicad_mod` files, and an optional model file is
/// transcoded to VRML next to the footprint.
#[derive(Parser, Debug)]
#[command(name = "jlc2kicad")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Component payload JSON files
    #[arg(value_name = "PAYLOAD", required = true)]
    payloads: Vec<PathBuf>,

    /// OBJ-like 3-D model text file to transcode alongside the footprint
    #[arg(long, value_name = "MODEL_FILE")]
    model: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Output directory (overrides the configured one)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Symbol library name (overrides the configured one)
    #[arg(long, value_name = "NAME")]
    symbol_lib: Option<String>,

    /// Keep existing symbol records instead of replacing them
    #[arg(long)]
    skip_existing: bool,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN, // Default to warn for unknown levels
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Tags that identify a schematic-symbol payload.
const SYMBOL_TAGS: [&str; 9] = ["R", "E", "P", "T", "PL", "PG", "PT", "A", "AR"];

fn is_symbol_payload(result: &ComponentResult) -> bool {
    result
        .data_str
        .shape
        .iter()
        .filter_map(|line| line.split('~').next())
        .any(|tag| SYMBOL_TAGS.contains(&tag))
}

/// Builds the model path the footprint references, honouring the
/// configured KiCad path variable.
fn model_reference_path(cfg: &Config, name: &str) -> String {
    let base = &cfg.output.model_base_variable;
    let model_dir = &cfg.output.model_dir;
    if base.is_empty() {
        format!("{model_dir}/{name}.wrl")
    } else if base.starts_with('$') {
        format!("{base}/{model_dir}/{name}.wrl")
    } else {
        format!("$({base})/{model_dir}/{name}.wrl")
    }
}

fn write_file(path: &Path, contents: &str) -> ConvertResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConvertError::file_write(path, e))?;
    }
    std::fs::write(path, contents).map_err(|e| ConvertError::file_write(path, e))
}

fn convert_footprint(
    result: &ComponentResult,
    model_file: Option<&Path>,
    cfg: &Config,
    out_dir: &Path,
    report: &mut Reporter,
) -> ConvertResult<()> {
    let name = result.footprint_name(report);
    let lib_dir = out_dir.join(&cfg.output.footprint_lib);

    let mut model_path = String::new();
    if let Some(file) = model_file {
        let text =
            std::fs::read_to_string(file).map_err(|e| ConvertError::file_read(file, e))?;
        let scene = model3d::parser::parse(&text)?;
        let wrl_path = lib_dir
            .join(&cfg.output.model_dir)
            .join(format!("{name}.wrl"));
        write_file(&wrl_path, &model3d::writer::render(&scene))?;
        info!(path = %wrl_path.display(), "wrote 3-D model");
        model_path = model_reference_path(cfg, &name);
    }

    let document = footprint::decoders::decode_component(result, &name, &model_path, report);
    let mod_path = lib_dir.join(format!("{name}.kicad_mod"));
    write_file(&mod_path, &footprint::writer::render(&document))?;
    info!(path = %mod_path.display(), "wrote footprint");
    Ok(())
}

fn convert_symbol(
    result: &ComponentResult,
    cfg: &Config,
    out_dir: &Path,
    symbol_lib: &str,
    skip_existing: bool,
    report: &mut Reporter,
) -> ConvertResult<()> {
    let name = result.symbol_name(report);
    let footprint_lib = cfg
        .output
        .footprint_lib
        .trim_end_matches(".pretty")
        .to_string();

    let mut document = Symbol::new(&name);
    document.reference_prefix = result.reference_prefix(report);
    document.footprint = format!("{footprint_lib}:{}", result.footprint_name(report));
    document.datasheet = result.datasheet_link(report);
    document.keywords = result
        .data_str
        .head
        .c_para
        .get("Supplier Part")
        .cloned()
        .unwrap_or_default();
    document.value_attributes = result.value_attributes();
    document
        .units
        .push(symbol::decoders::decode_unit(result, report));

    let block = symbol::writer::render(&document);
    let container_path = out_dir.join(format!("{symbol_lib}.kicad_sym"));
    let mut container = Container::load_or_create(&container_path)?;
    let outcome = container.upsert(&name, &block, !skip_existing)?;
    container.save()?;
    match outcome {
        Upsert::Inserted => info!(component = %name, "added symbol to library"),
        Upsert::Replaced => info!(component = %name, "updated symbol in library"),
        Upsert::Skipped => {}
    }
    Ok(())
}

fn convert_file(path: &Path, args: &Args, cfg: &Config, report: &mut Reporter) -> ConvertResult<()> {
    let text = std::fs::read_to_string(path).map_err(|e| ConvertError::file_read(path, e))?;
    let payload = ComponentPayload::from_json(&text)?;
    let result = &payload.result;

    info!(payload = %path.display(), title = %result.title, "converting component");

    let out_dir = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&cfg.output.output_dir));

    if is_symbol_payload(result) {
        let symbol_lib = args
            .symbol_lib
            .clone()
            .unwrap_or_else(|| cfg.output.symbol_lib.clone());
        convert_symbol(
            result,
            cfg,
            &out_dir,
            &symbol_lib,
            args.skip_existing || cfg.library.skip_existing,
            report,
        )
    } else {
        convert_footprint(result, args.model.as_deref(), cfg, &out_dir, report)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration
    let config_path = args.config.as_deref();
    let cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            if config_path.is_none() {
                if let Some(default_path) = config::default_config_path() {
                    eprintln!("\nDefault config location: {}", default_path.display());
                }
            }
            return ExitCode::FAILURE;
        }
    };

    // Initialise logging
    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    info!(version = env!("CARGO_PKG_VERSION"), "starting jlc2kicad");

    let mut report = Reporter::new();
    let mut failed = false;
    for payload in &args.payloads {
        if let Err(e) = convert_file(payload, &args, &cfg, &mut report) {
            error!(payload = %payload.display(), error = %e, "conversion failed");
            failed = true;
            if !cfg.library.keep_going {
                break;
            }
        }
    }

    if !report.warnings().is_empty() {
        info!(
            warnings = report.warnings().len(),
            "conversion finished with warnings"
        );
    }

    if failed || !report.errors().is_empty() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
