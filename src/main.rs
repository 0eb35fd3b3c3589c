//! sectionize - split a static HTML page into templates and a static asset tree

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use sectionize::config::ConverterConfig;
use sectionize::{TemplateConverter, logging};

#[derive(Parser)]
#[command(name = "sectionize")]
#[command(version, about = "Split an HTML page into section templates", long_about = None)]
#[command(after_help = "EXAMPLES:
    sectionize site/index.html                  Convert using site/sectionize.config.json
    sectionize index.html -n shop -o build      Override namespace and output directory")]
struct Cli {
    /// HTML document whose comment markers delimit sections
    #[arg(value_name = "DOCUMENT")]
    document: PathBuf,

    /// Namespace for copied assets and generated templates
    #[arg(short, long)]
    namespace: Option<String>,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Configuration file (defaults to sectionize.config.json next to the document)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log every copy and rewrite
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = logging::init_logging(cli.verbose) {
        eprintln!("warning: {err:#}");
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = load_config(cli)?;
    if let Some(namespace) = &cli.namespace {
        config.namespace = namespace.clone();
    }
    if let Some(output) = &cli.output {
        config.output_dir = output.clone();
    }

    let output = TemplateConverter::new(&config).run(&cli.document)?;
    for diagnostic in &output.result.diagnostics {
        eprintln!("warning: {diagnostic}");
    }

    println!(
        "{} sections, {} assets, {} page links",
        output.result.sections.len(),
        output.result.assets.len(),
        output.result.page_links.len()
    );
    for path in &output.written {
        println!("  {}", path.display());
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<ConverterConfig> {
    match &cli.config {
        Some(path) => ConverterConfig::from_path(path),
        None => {
            let document_dir = cli.document.parent().unwrap_or(Path::new("."));
            Ok(ConverterConfig::discover(document_dir))
        }
    }
}
