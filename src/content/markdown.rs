//! Markdown rendering with heading anchors and syntax highlighting

use anyhow::Result;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use std::collections::HashMap;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer with default settings
    pub fn new() -> Self {
        Self::with_options("base16-ocean.dark", false)
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, line_numbers: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            line_numbers,
        }
    }

    /// Render markdown to HTML
    ///
    /// Headings get a slugified `id` attribute so they are
    /// anchor-linkable; duplicate heading text gets a numeric suffix.
    /// Fenced code blocks are highlighted by declared language.
    pub fn render(&self, markdown: &str) -> Result<String> {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();

        // Fenced code block state
        let mut in_code_block = false;
        let mut code_lang: Option<String> = None;
        let mut code_buf = String::new();

        // Heading state: level, buffered inline events, plain text
        let mut heading: Option<(usize, Vec<Event>, String)> = None;
        let mut used_ids: HashMap<String, usize> = HashMap::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code_block = true;
                    code_buf.clear();
                    code_lang = match kind {
                        CodeBlockKind::Fenced(lang) => {
                            let lang = lang
                                .split_whitespace()
                                .next()
                                .unwrap_or_default()
                                .to_string();
                            if lang.is_empty() {
                                None
                            } else {
                                Some(lang)
                            }
                        }
                        CodeBlockKind::Indented => None,
                    };
                }
                Event::End(TagEnd::CodeBlock) => {
                    in_code_block = false;
                    let highlighted = self.highlight_code(&code_buf, code_lang.as_deref());
                    events.push(Event::Html(CowStr::from(highlighted)));
                    code_lang = None;
                }
                Event::Text(text) if in_code_block => {
                    code_buf.push_str(&text);
                }
                Event::Start(Tag::Heading { level, .. }) => {
                    heading = Some((level as usize, Vec::new(), String::new()));
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some((level, inner, text)) = heading.take() {
                        let id = unique_heading_id(&text, &mut used_ids);
                        events.push(Event::Html(CowStr::from(format!(
                            r#"<h{} id="{}">"#,
                            level, id
                        ))));
                        events.extend(inner);
                        events.push(Event::Html(CowStr::from(format!("</h{}>", level))));
                    }
                }
                other => {
                    if let Some((_, inner, text)) = heading.as_mut() {
                        match &other {
                            Event::Text(t) => text.push_str(t),
                            Event::Code(t) => text.push_str(t),
                            _ => {}
                        }
                        inner.push(other);
                    } else {
                        events.push(other);
                    }
                }
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(html_output)
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = match self.theme_set.themes.get(&self.theme_name) {
            Some(theme) => theme,
            None => match self.theme_set.themes.values().next() {
                Some(theme) => theme,
                None => {
                    let escaped = html_escape(code);
                    return format!(
                        r#"<pre><code class="language-{}">{}</code></pre>"#,
                        lang, escaped
                    );
                }
            },
        };

        match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
            Ok(highlighted) => {
                if self.line_numbers {
                    self.add_line_numbers(&highlighted, lang)
                } else {
                    format!(r#"<div class="highlight {}">{}</div>"#, lang, highlighted)
                }
            }
            Err(_) => {
                // Fallback to plain code block
                let escaped = html_escape(code);
                format!(
                    r#"<pre><code class="language-{}">{}</code></pre>"#,
                    lang, escaped
                )
            }
        }
    }

    /// Add line numbers to highlighted code
    fn add_line_numbers(&self, code: &str, lang: &str) -> String {
        let lines: Vec<&str> = code.lines().collect();
        let line_count = lines.len();

        let mut gutter = String::new();
        let mut code_lines = String::new();

        for (i, line) in lines.iter().enumerate() {
            gutter.push_str(&format!(r#"<span class="line-number">{}</span>"#, i + 1));
            if i < line_count - 1 {
                gutter.push('\n');
            }

            code_lines.push_str(line);
            if i < line_count - 1 {
                code_lines.push('\n');
            }
        }

        format!(
            r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code"><pre>{}</pre></td></tr></table></figure>"#,
            lang, gutter, code_lines
        )
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive a unique, URL-safe id for a heading.
///
/// `used` maps each issued id to the next suffix to try for it. A
/// suffixed candidate can itself collide with a later heading whose
/// own slug carries the suffix (headings "A", "A 1", "A"), so keep
/// bumping until the candidate is genuinely unissued.
fn unique_heading_id(text: &str, used: &mut HashMap<String, usize>) -> String {
    let base = slug::slugify(text);
    let base = if base.is_empty() {
        "section".to_string()
    } else {
        base
    };

    let mut n = used.get(&base).copied().unwrap_or(0);
    let mut candidate = if n == 0 {
        base.clone()
    } else {
        format!("{}-{}", base, n)
    };
    while used.contains_key(&candidate) {
        n += 1;
        candidate = format!("{}-{}", base, n);
    }

    used.insert(base, n + 1);
    used.entry(candidate.clone()).or_insert(0);
    candidate
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hello World\n\nThis is a test.").unwrap();
        assert!(html.contains(r#"<h1 id="hello-world">Hello World</h1>"#));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_heading_keeps_inline_markup() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("## Using `cargo`").unwrap();
        assert!(html.contains(r#"<h2 id="using-cargo">"#));
        assert!(html.contains("<code>cargo</code>"));
    }

    #[test]
    fn test_duplicate_heading_ids() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("## Notes\n\ntext\n\n## Notes\n").unwrap();
        assert!(html.contains(r#"<h2 id="notes">"#));
        assert!(html.contains(r#"<h2 id="notes-1">"#));
    }

    #[test]
    fn test_heading_id_does_not_collide_with_suffixed_slug() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("## A\n\ntext\n\n## A 1\n\ntext\n\n## A\n").unwrap();
        assert!(html.contains(r#"<h2 id="a">"#));
        assert!(html.contains(r#"<h2 id="a-1">"#));
        assert!(html.contains(r#"<h2 id="a-2">"#));
    }

    #[test]
    fn test_render_code_block() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nfn main() {}\n```").unwrap();
        assert!(html.contains("highlight"));
        assert!(html.contains("rust"));
    }

    #[test]
    fn test_render_code_block_with_line_numbers() {
        let renderer = MarkdownRenderer::with_options("base16-ocean.dark", true);
        let html = renderer
            .render("```rust\nfn main() {\n    println!(\"hi\");\n}\n```")
            .unwrap();
        assert!(html.contains(r#"<figure class="highlight rust">"#));
        assert!(html.contains(r#"<td class="gutter">"#));
        assert!(html.contains(r#"<span class="line-number">1</span>"#));
        assert!(html.contains(r#"<span class="line-number">2</span>"#));
    }

    #[test]
    fn test_render_code_block_unknown_language() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```nosuchlang\nhello\n```").unwrap();
        assert!(html.contains("hello"));
    }

    #[test]
    fn test_render_table() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("| a | b |\n|---|---|\n| 1 | 2 |\n").unwrap();
        assert!(html.contains("<table>"));
    }
}
