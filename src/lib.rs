//! stanza: a minimal Markdown blog generator
//!
//! Reads a directory of Markdown posts with YAML front matter, renders
//! each public post to an HTML page with embedded Tera templates, and
//! writes an index page listing all public posts newest first.

pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod templates;

use anyhow::Result;
use std::path::Path;

/// The main Stanza application
#[derive(Clone)]
pub struct Stanza {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Source directory holding Markdown posts
    pub source_dir: std::path::PathBuf,
    /// Public (output) directory
    pub public_dir: std::path::PathBuf,
}

impl Stanza {
    /// Create a new Stanza instance from a base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("stanza.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let source_dir = base_dir.join(&config.source_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Ok(Self {
            config,
            base_dir,
            source_dir,
            public_dir,
        })
    }

    /// Generate the site, returning the number of post pages written
    pub fn build(&self) -> Result<usize> {
        commands::build::run(self)
    }

    /// Remove the output directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
