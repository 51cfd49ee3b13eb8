//! CLI entry point for stanza

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "stanza")]
#[command(version)]
#[command(about = "A minimal Markdown blog generator", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the site (default when no subcommand is given)
    #[command(alias = "b")]
    Build {
        /// Override the source directory
        #[arg(long)]
        source: Option<PathBuf>,

        /// Override the output directory
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Remove the output directory
    Clean,

    /// List all posts, including drafts
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "stanza=debug,info"
    } else {
        "stanza=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = cli.cwd.unwrap_or_else(|| std::env::current_dir().unwrap());

    match cli.command.unwrap_or(Commands::Build {
        source: None,
        output: None,
    }) {
        Commands::Build { source, output } => {
            let mut stanza = stanza::Stanza::new(&base_dir)?;

            if let Some(source) = source {
                stanza.source_dir = resolve(&base_dir, source);
            }
            if let Some(output) = output {
                stanza.public_dir = resolve(&base_dir, output);
            }

            tracing::info!("Building site from {:?}", stanza.source_dir);
            let count = stanza.build()?;
            println!("Generated {} pages", count);
        }

        Commands::Clean => {
            let stanza = stanza::Stanza::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            stanza.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List => {
            let stanza = stanza::Stanza::new(&base_dir)?;
            stanza::commands::list::run(&stanza)?;
        }
    }

    Ok(())
}

/// Resolve a possibly-relative path against the base directory
fn resolve(base_dir: &std::path::Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}
