//! Generator module - renders pages and writes the output directory

use anyhow::{Context as _, Result};
use rayon::prelude::*;
use std::fs;

use tera::Context;

use crate::content::Post;
use crate::templates::{ConfigData, PostData, TemplateRenderer};
use crate::Stanza;

/// Static site generator using the embedded Tera templates
pub struct Generator {
    stanza: Stanza,
    renderer: TemplateRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(stanza: &Stanza) -> Result<Self> {
        let renderer = TemplateRenderer::new()?;

        Ok(Self {
            stanza: stanza.clone(),
            renderer,
        })
    }

    /// Generate the site from loaded posts.
    ///
    /// Only public posts get a page. Every page is rendered to a
    /// string before the output directory is touched, so a render
    /// failure leaves the previous output intact. Returns the number
    /// of post pages written (excluding the index).
    pub fn generate(&self, posts: &[Post]) -> Result<usize> {
        let mut public: Vec<&Post> = posts.iter().filter(|p| p.public).collect();

        // Newest first; slug tie-break keeps repeated builds byte-identical
        public.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));

        let config_data = self.build_config_data();

        // Render phase: all pages in memory before the first write
        let mut pages: Vec<(String, String)> = Vec::with_capacity(public.len() + 1);

        for post in &public {
            let mut context = Context::new();
            context.insert("config", &config_data);
            context.insert("post", &post_data(post));

            let html = self
                .renderer
                .render("post.html", &context)
                .with_context(|| format!("failed to render post {:?}", post.slug))?;
            pages.push((post.output_name(), html));
        }

        let post_list: Vec<PostData> = public.iter().map(|p| post_data(p)).collect();
        let mut context = Context::new();
        context.insert("config", &config_data);
        context.insert("posts", &post_list);

        let index_html = self
            .renderer
            .render("index.html", &context)
            .context("failed to render index")?;
        pages.push(("index.html".to_string(), index_html));

        // Write phase: reset the output directory, then write in parallel
        self.reset_public_dir()?;

        pages.par_iter().try_for_each(|(name, html)| -> Result<()> {
            let output_path = self.stanza.public_dir.join(name);
            fs::write(&output_path, html)
                .with_context(|| format!("failed to write {:?}", output_path))?;
            tracing::debug!("Generated: {:?}", output_path);
            Ok(())
        })?;

        Ok(public.len())
    }

    /// Delete and recreate the output directory.
    ///
    /// Reset policy: the output directory is fully owned by the
    /// generator, so anything inside it is discarded on every build.
    fn reset_public_dir(&self) -> Result<()> {
        let public_dir = &self.stanza.public_dir;

        if public_dir.exists() {
            fs::remove_dir_all(public_dir)
                .with_context(|| format!("failed to remove {:?}", public_dir))?;
        }
        fs::create_dir_all(public_dir)
            .with_context(|| format!("failed to create {:?}", public_dir))?;

        Ok(())
    }

    /// Build config data for templates
    fn build_config_data(&self) -> ConfigData {
        ConfigData {
            title: self.stanza.config.title.clone(),
            description: self.stanza.config.description.clone(),
            author: self.stanza.config.author.clone(),
            url: self.stanza.config.url.clone(),
        }
    }
}

/// Build template context data for a post
fn post_data(post: &Post) -> PostData {
    PostData {
        title: post.title.clone(),
        description: post.description.clone().unwrap_or_default(),
        date: post.date.format("%Y-%m-%d").to_string(),
        slug: post.slug.clone(),
        content: post.content.clone(),
    }
}
