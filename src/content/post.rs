//! Post model

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A blog post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Post title
    pub title: String,

    /// Short description shown in the index listing
    pub description: Option<String>,

    /// Publication date
    pub date: DateTime<Local>,

    /// Whether the post is published
    pub public: bool,

    /// Slug derived from the source file stem; output file is `slug + ".html"`
    pub slug: String,

    /// Full source file path
    pub source: PathBuf,

    /// Raw markdown content
    pub raw: String,

    /// Rendered HTML content
    pub content: String,
}

impl Post {
    /// Output file name for this post
    pub fn output_name(&self) -> String {
        format!("{}.html", self.slug)
    }
}
