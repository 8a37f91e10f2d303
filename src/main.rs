//! blockliquid - compile page-builder content JSON to Liquid

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use blockliquid::{ContentTree, RenderOptions, content_to_liquid};

#[derive(Parser)]
#[command(name = "blockliquid")]
#[command(version, about = "Compile page-builder content to Liquid templates", long_about = None)]
#[command(after_help = "EXAMPLES:
    blockliquid page.json --model page                 Print the template to stdout
    blockliquid page.json -o page.liquid --extract-css Write page.liquid and page.css
    blockliquid page.json --config options.json        Load formatter options")]
struct Cli {
    /// Content JSON file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Model name for the root element (defaults to the content's modelName)
    #[arg(short, long)]
    model: Option<String>,

    /// Write the stylesheet separately instead of inlining it
    #[arg(long)]
    extract_css: bool,

    /// JSON file with render options
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output Liquid file (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    out: Option<PathBuf>,

    /// Output stylesheet file (implies --extract-css)
    #[arg(long, value_name = "FILE")]
    css_out: Option<PathBuf>,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.quiet { "error" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> blockliquid::Result<()> {
    let mut options = match &cli.config {
        Some(path) => RenderOptions::load(path)?,
        None => RenderOptions::default(),
    };
    if cli.extract_css || cli.css_out.is_some() {
        options.extract_css = true;
    }

    let json = std::fs::read_to_string(&cli.input)?;
    let content = ContentTree::from_json(&json)?;
    let model = cli
        .model
        .clone()
        .or_else(|| content.model_name.clone())
        .unwrap_or_else(|| "page".to_string());

    let result = content_to_liquid(&content, &model, &options)?;

    let css_path = cli
        .css_out
        .clone()
        .or_else(|| cli.out.as_deref().map(|out| out.with_extension("css")));

    match &cli.out {
        Some(path) => write_file(path, &result.html, cli.quiet)?,
        None => print!("{}", result.html),
    }
    if let Some(css) = &result.css {
        match &css_path {
            Some(path) => write_file(path, css, cli.quiet)?,
            None => print!("{css}"),
        }
    }

    if !cli.quiet && !result.diagnostics.is_empty() {
        eprintln!("{} warning(s)", result.diagnostics.len());
    }
    Ok(())
}

fn write_file(path: &Path, contents: &str, quiet: bool) -> blockliquid::Result<()> {
    std::fs::write(path, contents)?;
    if !quiet {
        eprintln!("Wrote {}", path.display());
    }
    Ok(())
}
