//! List site content

use anyhow::Result;

use crate::content::loader::ContentLoader;
use crate::Stanza;

/// List all posts, including unpublished ones, newest first
pub fn run(stanza: &Stanza) -> Result<()> {
    let loader = ContentLoader::new(stanza);
    let posts = loader.load_posts()?;

    println!("Posts ({}):", posts.len());
    for post in posts {
        let visibility = if post.public { "public" } else { "draft" };
        println!(
            "  {} - {} [{}] ({})",
            post.date.format("%Y-%m-%d"),
            post.title,
            post.slug,
            visibility
        );
    }

    Ok(())
}
