//! Content loader - loads posts from the source directory

use anyhow::{anyhow, Context, Result};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use super::{FrontMatter, MarkdownRenderer, Post};
use crate::Stanza;

/// Loads content from the source directory
pub struct ContentLoader<'a> {
    stanza: &'a Stanza,
    renderer: MarkdownRenderer,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(stanza: &'a Stanza) -> Self {
        let renderer = MarkdownRenderer::with_options(
            &stanza.config.highlight.theme,
            stanza.config.highlight.line_numbers,
        );
        Self { stanza, renderer }
    }

    /// Load all posts from the source directory, sorted newest first.
    ///
    /// Posts are parsed and rendered in parallel; the first failing
    /// file aborts the whole load. Non-public posts are included so
    /// callers can list drafts; the generator filters them out.
    pub fn load_posts(&self) -> Result<Vec<Post>> {
        let source_dir = &self.stanza.source_dir;
        if !source_dir.exists() {
            return Err(anyhow!("source directory {:?} does not exist", source_dir));
        }

        let paths = scan_markdown_files(source_dir)?;

        let mut posts: Vec<Post> = paths
            .par_iter()
            .map(|path| {
                self.load_post(path)
                    .with_context(|| format!("failed to load post {:?}", path))
            })
            .collect::<Result<Vec<_>>>()?;

        // Newest first; slug tie-break keeps the order deterministic
        posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));

        Ok(posts)
    }

    /// Load a single post from a file
    fn load_post(&self, path: &Path) -> Result<Post> {
        let content = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&content)?;

        let date = fm.parse_date()?;

        // Required fields are enforced by FrontMatter::parse
        let title = fm.title.unwrap_or_default();

        // Slug comes from the file stem, never the title: "X.md" must
        // always produce "X.html"
        let slug = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow!("invalid file name {:?}", path))?
            .to_string();

        let content_html = self.renderer.render(body)?;

        Ok(Post {
            title,
            description: fm.description,
            date,
            public: fm.public,
            slug,
            source: path.to_path_buf(),
            raw: body.to_string(),
            content: content_html,
        })
    }
}

/// List markdown files directly under a directory.
///
/// Subdirectories are ignored; order is file-system dependent.
fn scan_markdown_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for entry in fs::read_dir(dir).with_context(|| format!("failed to read {:?}", dir))? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && is_markdown_file(&path) {
            paths.push(path);
        }
    }

    Ok(paths)
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_post(dir: &Path, name: &str, front: &str, body: &str) {
        fs::write(dir.join(name), format!("---\n{}---\n\n{}", front, body)).unwrap();
    }

    fn stanza_at(base: &Path) -> Stanza {
        fs::create_dir_all(base.join("posts")).unwrap();
        Stanza::new(base).unwrap()
    }

    #[test]
    fn test_load_posts_sorted_newest_first() {
        let tmp = tempfile::tempdir().unwrap();
        let stanza = stanza_at(tmp.path());
        let posts_dir = tmp.path().join("posts");

        write_post(
            &posts_dir,
            "old.md",
            "title: Old\ndate: 2023-01-01\npublic: true\n",
            "old",
        );
        write_post(
            &posts_dir,
            "new.md",
            "title: New\ndate: 2024-06-01\npublic: true\n",
            "new",
        );

        let loader = ContentLoader::new(&stanza);
        let posts = loader.load_posts().unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].slug, "new");
        assert_eq!(posts[1].slug, "old");
    }

    #[test]
    fn test_slug_from_file_stem() {
        let tmp = tempfile::tempdir().unwrap();
        let stanza = stanza_at(tmp.path());
        let posts_dir = tmp.path().join("posts");

        write_post(
            &posts_dir,
            "my-first-post.md",
            "title: A Completely Different Title\ndate: 2024-01-01\n",
            "body",
        );

        let loader = ContentLoader::new(&stanza);
        let posts = loader.load_posts().unwrap();
        assert_eq!(posts[0].slug, "my-first-post");
        assert_eq!(posts[0].output_name(), "my-first-post.html");
    }

    #[test]
    fn test_subdirectories_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let stanza = stanza_at(tmp.path());
        let posts_dir = tmp.path().join("posts");

        fs::create_dir_all(posts_dir.join("nested")).unwrap();
        write_post(
            &posts_dir.join("nested"),
            "hidden.md",
            "title: Hidden\ndate: 2024-01-01\npublic: true\n",
            "hidden",
        );
        write_post(
            &posts_dir,
            "top.md",
            "title: Top\ndate: 2024-01-01\npublic: true\n",
            "top",
        );
        fs::write(posts_dir.join("notes.txt"), "not markdown").unwrap();

        let loader = ContentLoader::new(&stanza);
        let posts = loader.load_posts().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "top");
    }

    #[test]
    fn test_malformed_front_matter_fails_load() {
        let tmp = tempfile::tempdir().unwrap();
        let stanza = stanza_at(tmp.path());
        let posts_dir = tmp.path().join("posts");

        write_post(
            &posts_dir,
            "good.md",
            "title: Good\ndate: 2024-01-01\npublic: true\n",
            "good",
        );
        fs::write(posts_dir.join("bad.md"), "no front matter here\n").unwrap();

        let loader = ContentLoader::new(&stanza);
        let err = loader.load_posts().unwrap_err();
        assert!(format!("{:#}", err).contains("bad.md"));
    }

    #[test]
    fn test_missing_source_dir_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let stanza = Stanza::new(tmp.path()).unwrap();

        let loader = ContentLoader::new(&stanza);
        assert!(loader.load_posts().is_err());
    }
}
