//! downstyle: CLI tool to convert Markdown files to styled text runs

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing_subscriber::EnvFilter;

use config::{CONFIG_FILE_NAME, Config};
use downstyle_core::{RecordingSurface, StyleConfig, StyledText, SurfaceCall, convert};
use downstyle_mdast::parse_commonmark;

#[derive(Parser, Debug)]
#[command(name = "downstyle")]
#[command(about = "Convert Markdown files to styled text runs")]
#[command(version)]
#[command(after_help = "Examples:
  downstyle README.md                    # Convert single file to README.json
  downstyle README.md -o out.json        # Convert to specific output file
  downstyle docs/ -o styled/ -r          # Convert directory recursively
  downstyle docs/ -o styled/ -j4         # Use 4 parallel jobs
  downstyle README.md --preset dark      # Use the built-in dark preset
  downstyle --init                       # Write a sample downstyle.toml")]
struct Cli {
    /// Input Markdown file or directory
    #[arg(required_unless_present_any = ["init", "schema"])]
    input: Option<PathBuf>,

    /// Output file or directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of parallel jobs (defaults to number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Process directories recursively
    #[arg(short, long)]
    recursive: bool,

    /// Style preset: light, dark, or a preset defined in the config file
    #[arg(short, long)]
    preset: Option<String>,

    /// Configuration file (defaults to downstyle.toml in the current directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Include the embedded-object layout calls in the output
    #[arg(long)]
    layout: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Write a sample downstyle.toml to the current directory
    #[arg(long, conflicts_with = "schema")]
    init: bool,

    /// Print the JSON schema of the configuration file
    #[arg(long)]
    schema: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only show errors
    #[arg(short, long)]
    quiet: bool,
}

/// Settings shared by every file of a run
struct Options {
    style: StyleConfig,
    layout: bool,
    pretty: bool,
}

/// JSON document written per input file
#[derive(Serialize)]
struct Output<'a> {
    #[serde(flatten)]
    styled: &'a StyledText,
    #[serde(skip_serializing_if = "Option::is_none")]
    layout: Option<Vec<SurfaceCall>>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if cli.schema {
        println!("{}", Config::json_schema_string()?);
        return Ok(());
    }
    if cli.init {
        return init(cli.quiet);
    }

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_from_dir(Path::new("."))?.unwrap_or_default(),
    };
    let preset = cli
        .preset
        .as_deref()
        .or(config.output.preset.as_deref())
        .unwrap_or("light");
    let options = Options {
        style: config.style(preset)?,
        layout: cli.layout || config.output.layout.unwrap_or(false),
        pretty: cli.pretty || config.output.pretty.unwrap_or(false),
    };
    tracing::info!(preset, "Using style preset");

    let Some(input) = cli.input.as_deref() else {
        anyhow::bail!("No input path given");
    };
    if input.is_file() {
        convert_file(input, cli.output.as_deref(), &options, cli.quiet)?;
    } else if input.is_dir() {
        convert_directory(
            input,
            cli.output.as_deref(),
            cli.recursive,
            &options,
            cli.quiet,
            cli.jobs,
        )?;
    } else {
        anyhow::bail!("Input path does not exist: {}", input.display());
    }

    Ok(())
}

/// Write a sample configuration file, refusing to overwrite an existing one
fn init(quiet: bool) -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    let content = Config::sample().to_toml_with_schema()?;
    fs::write(path, content).with_context(|| format!("Failed to write: {}", path.display()))?;
    if !quiet {
        println!("{}", path.display());
    }
    Ok(())
}

/// Convert a single Markdown file to JSON
fn convert_file(input: &Path, output: Option<&Path>, options: &Options, quiet: bool) -> Result<()> {
    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => input.with_extension("json"),
    };

    tracing::info!(
        input = %input.display(),
        output = %output_path.display(),
        "Converting"
    );

    convert_file_inner(input, &output_path, options)?;

    if !quiet {
        println!("{}", output_path.display());
    }

    Ok(())
}

/// Convert a directory of Markdown files
fn convert_directory(
    input: &Path,
    output: Option<&Path>,
    recursive: bool,
    options: &Options,
    quiet: bool,
    jobs: Option<usize>,
) -> Result<()> {
    let output_dir = output.unwrap_or(input);

    let files = collect_markdown_files(input, recursive)?;

    if files.is_empty() {
        if !quiet {
            eprintln!("No Markdown files found in {}", input.display());
        }
        return Ok(());
    }

    tracing::info!(count = files.len(), "Found Markdown files");

    // Configure thread pool if jobs specified
    if let Some(n) = jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    // Atomic counters for thread-safe progress tracking
    let success = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);

    // Parallel conversion; documents are independent
    let errors: Vec<_> = files
        .par_iter()
        .filter_map(|file| {
            let relative = file.strip_prefix(input).unwrap_or(file);
            let output_file = output_dir.join(relative).with_extension("json");

            match convert_file_inner(file, &output_file, options) {
                Ok(()) => {
                    success.fetch_add(1, Ordering::Relaxed);
                    if !quiet {
                        println!("{}", output_file.display());
                    }
                    None
                }
                Err(e) => {
                    failed.fetch_add(1, Ordering::Relaxed);
                    Some((file.clone(), e))
                }
            }
        })
        .collect();

    // Report errors
    for (file, e) in &errors {
        eprintln!("Error converting {}: {:#}", file.display(), e);
    }

    let success_count = success.load(Ordering::Relaxed);
    let failed_count = failed.load(Ordering::Relaxed);

    if !quiet {
        eprintln!("Converted {} files, {} failed", success_count, failed_count);
    }

    if failed_count > 0 {
        anyhow::bail!("{} files failed to convert", failed_count);
    }

    Ok(())
}

/// Read, convert and write one file
fn convert_file_inner(input: &Path, output: &Path, options: &Options) -> Result<()> {
    let content = fs::read_to_string(input)
        .with_context(|| format!("Failed to read: {}", input.display()))?;

    let json = convert_markdown_to_json(&content, options)?;

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(output, json).with_context(|| format!("Failed to write: {}", output.display()))?;

    Ok(())
}

/// Collect all Markdown files in a directory
fn collect_markdown_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in
        fs::read_dir(dir).with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_file() {
            if let Some(ext) = path.extension() {
                if ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown") {
                    files.push(path);
                }
            }
        } else if path.is_dir() && recursive {
            files.extend(collect_markdown_files(&path, recursive)?);
        }
    }

    files.sort();
    Ok(files)
}

/// Core conversion function
fn convert_markdown_to_json(source: &str, options: &Options) -> Result<String> {
    let root = parse_commonmark(source);
    let styled = convert(&root, &options.style);

    let output = Output {
        styled: &styled,
        layout: options
            .layout
            .then(|| RecordingSurface::record(&styled).calls),
    };

    let mut json = if options.pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }
    .context("Failed to serialize styled text")?;
    json.push('\n');
    Ok(json)
}
