//! Markdown to sanitized HTML.

use std::{collections::HashSet, sync::Arc};

use ammonia::Builder as AmmoniaBuilder;
use comrak::{Arena, format_html, options::Options, parse_document};
use once_cell::sync::Lazy;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("markdown rendering failed: {message}")]
    Markdown { message: String },
}

/// HTML that has already been through the sanitizer and is safe to embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedHtml(String);

impl RenderedHtml {
    pub fn into_string(self) -> String {
        self.0
    }
}

pub trait RenderService: Send + Sync {
    fn render(&self, markdown: &str) -> Result<RenderedHtml, RenderError>;
}

/// GitHub-flavoured markdown with hard line breaks, cleaned by ammonia.
pub struct ComrakRenderService {
    options: Options<'static>,
    sanitizer: AmmoniaBuilder<'static>,
}

impl ComrakRenderService {
    fn new() -> Self {
        Self {
            options: default_options(),
            sanitizer: build_sanitizer(),
        }
    }
}

impl Default for ComrakRenderService {
    fn default() -> Self {
        Self::new()
    }
}

static RENDER_SERVICE: Lazy<Arc<ComrakRenderService>> =
    Lazy::new(|| Arc::new(ComrakRenderService::new()));

/// Access the shared render service instance, initialised on first use.
pub fn render_service() -> Arc<ComrakRenderService> {
    Arc::clone(&RENDER_SERVICE)
}

impl RenderService for ComrakRenderService {
    fn render(&self, markdown: &str) -> Result<RenderedHtml, RenderError> {
        let arena = Arena::new();
        let root = parse_document(&arena, markdown, &self.options);

        let mut html = String::new();
        format_html(root, &self.options, &mut html).map_err(|err| RenderError::Markdown {
            message: err.to_string(),
        })?;

        Ok(RenderedHtml(self.sanitizer.clean(&html).to_string()))
    }
}

fn default_options() -> Options<'static> {
    let mut options = Options::default();

    let ext = &mut options.extension;
    ext.strikethrough = true;
    ext.tagfilter = false;
    ext.table = true;
    ext.autolink = true;
    ext.tasklist = true;
    ext.footnotes = true;
    ext.header_ids = Some(String::new());

    let render = &mut options.render;
    render.hardbreaks = true;
    render.github_pre_lang = true;
    render.tasklist_classes = true;
    // Raw HTML is let through here and cleaned by the sanitizer afterwards.
    render.r#unsafe = true;

    options
}

fn build_sanitizer() -> AmmoniaBuilder<'static> {
    let mut builder = AmmoniaBuilder::default();

    let tags: HashSet<&'static str> = HashSet::from([
        "a",
        "abbr",
        "blockquote",
        "br",
        "code",
        "del",
        "div",
        "em",
        "h1",
        "h2",
        "h3",
        "h4",
        "h5",
        "h6",
        "hr",
        "img",
        "input",
        "kbd",
        "li",
        "ol",
        "p",
        "pre",
        "section",
        "span",
        "strong",
        "sup",
        "table",
        "tbody",
        "td",
        "th",
        "thead",
        "tr",
        "ul",
    ]);
    builder.tags(tags);

    let generic: HashSet<&'static str> = HashSet::from([
        "class",
        "id",
        "title",
        "data-footnotes",
        "data-footnote-ref",
        "data-footnote-backref",
    ]);
    builder.generic_attributes(generic);

    builder.add_tag_attributes("img", &["alt", "width", "height", "loading"]);
    builder.add_tag_attributes("th", &["align"]);
    builder.add_tag_attributes("td", &["align"]);
    builder.add_tag_attributes("input", &["type", "checked", "disabled"]);
    builder.add_tag_attributes("pre", &["lang"]);
    builder.add_url_schemes(["http", "https", "mailto"].iter().copied());

    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(markdown: &str) -> String {
        render_service()
            .render(markdown)
            .expect("markdown renders")
            .into_string()
    }

    #[test]
    fn single_newlines_become_line_breaks() {
        let html = render("first\nsecond");
        assert!(html.contains("first<br"), "{html}");
    }

    #[test]
    fn gfm_tables_and_strikethrough_render() {
        let html = render("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~");
        assert!(html.contains("<table>"), "{html}");
        assert!(html.contains("<del>gone</del>"), "{html}");
    }

    #[test]
    fn headings_get_ids() {
        let html = render("## Getting Started");
        assert!(html.contains("id=\"getting-started\""), "{html}");
    }

    #[test]
    fn scripts_are_stripped() {
        let html = render("hello <script>alert(1)</script> <a href=\"javascript:x()\">x</a>");
        assert!(!html.contains("<script"), "{html}");
        assert!(!html.contains("javascript:"), "{html}");
        assert!(html.contains("hello"), "{html}");
    }

    #[test]
    fn rendering_is_deterministic() {
        let markdown = "# Title\n\n- [x] done\n- [ ] todo\n\nSee https://example.com";
        assert_eq!(render(markdown), render(markdown));
    }
}
