//! iconsplit CLI
//!
//! Extract symbolic icons from a master Inkscape drawing.

use anyhow::{Context, Result};
use clap::Parser;
use iconsplit_svg::MasterDrawing;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod editor;
mod extract;
mod walker;

use config::{ConfigArgs, IconsplitConfig};
use editor::Inkscape;
use extract::Extractor;

#[derive(Parser)]
#[command(name = "iconsplit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract symbolic icons from a master Inkscape drawing", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Print the icon catalog instead of rendering
    #[arg(long)]
    list: bool,

    /// Re-render icons whose output already exists
    #[arg(short, long)]
    force: bool,

    #[command(flatten)]
    config: ConfigArgs,

    /// Icon labels to render; every visible icon when omitted
    icons: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = IconsplitConfig::load(cli.config.config.as_deref())?.with_overrides(&cli.config);
    debug!("{:?}", config);

    let drawing = MasterDrawing::from_file(&config.master)
        .with_context(|| format!("Failed to load {}", config.master.display()))?;

    if cli.list {
        print_catalog(&drawing);
        return Ok(());
    }

    let tasks = walker::plan(&drawing, &config.output_root, &cli.icons, cli.force);
    let extractor = Extractor::new(&config, Inkscape::from_config(&config));
    let summary = extractor.run(tasks);
    summary.print();

    if summary.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}

fn print_catalog(drawing: &MasterDrawing) {
    for layer in drawing.layers() {
        println!("{}", layer.label);
        for icon in &layer.icons {
            let label = icon.label.as_deref().unwrap_or("(unlabeled)");
            let hidden = if icon.is_hidden() { "  [hidden]" } else { "" };
            println!("    {:<40} {}{}", label, icon.id, hidden);
        }
    }
}
