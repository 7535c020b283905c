//! Markdown rendering with syntax highlighting

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use serde::Serialize;
use std::collections::HashMap;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::HighlightConfig;
use crate::error::{Error, Result};
use crate::helpers::html_escape;

/// A heading found while rendering, used for in-page navigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    /// Nesting level, 1 for `#`
    pub depth: u8,
    /// Anchor id assigned to the heading element
    pub slug: String,
    pub text: String,
}

/// Output of a markdown render
#[derive(Debug, Clone)]
pub struct RenderedMarkdown {
    pub html: String,
    pub headings: Vec<Heading>,
}

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme: Theme,
    line_numbers: bool,
}

impl MarkdownRenderer {
    /// Create a renderer with the default highlight settings
    pub fn new() -> Result<Self> {
        Self::from_config(&HighlightConfig::default())
    }

    pub fn from_config(config: &HighlightConfig) -> Result<Self> {
        Self::with_options(&config.theme, config.line_number)
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, line_numbers: bool) -> Result<Self> {
        let mut theme_set = ThemeSet::load_defaults();
        let theme = theme_set
            .themes
            .remove(theme)
            .ok_or_else(|| Error::UnknownTheme(theme.to_string()))?;

        Ok(Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
            line_numbers,
        })
    }

    /// Render markdown to HTML, collecting headings on the way
    pub fn render(&self, markdown: &str) -> Result<RenderedMarkdown> {
        // Front-matter is stripped before the body gets here
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut headings = Vec::new();
        let mut anchors = AnchorSet::default();
        let mut code_block: Option<CodeBlock> = None;
        // (index of the start event, collected text)
        let mut heading: Option<(usize, String)> = None;

        for event in parser {
            if let Some((_, text)) = heading.as_mut() {
                if let Event::Text(t) | Event::Code(t) = &event {
                    text.push_str(t);
                }
            }

            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    code_block = Some(CodeBlock {
                        lang: fence_lang(&kind),
                        code: String::new(),
                    });
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some(block) = code_block.take() {
                        let highlighted = self.highlight_code(&block.code, block.lang.as_deref());
                        events.push(Event::Html(CowStr::from(highlighted)));
                    }
                }
                Event::Text(text) if code_block.is_some() => {
                    if let Some(block) = code_block.as_mut() {
                        block.code.push_str(&text);
                    }
                }
                Event::Start(Tag::Heading { .. }) => {
                    heading = Some((events.len(), String::new()));
                    events.push(event);
                }
                Event::End(TagEnd::Heading(level)) => {
                    if let Some((start, text)) = heading.take() {
                        let slot = match &mut events[start] {
                            Event::Start(Tag::Heading { id, .. }) => Some(id),
                            _ => None,
                        };
                        if let Some(slot) = slot {
                            let wanted = match slot.as_deref() {
                                Some(explicit) => explicit.to_string(),
                                None => slug::slugify(&text),
                            };
                            let anchor = anchors.claim(&wanted);
                            *slot = Some(CowStr::from(anchor.clone()));
                            headings.push(Heading {
                                depth: level as u8,
                                slug: anchor,
                                text: text.trim().to_string(),
                            });
                        }
                    }
                    events.push(Event::End(TagEnd::Heading(level)));
                }
                _ => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(RenderedMarkdown {
            html: html_output,
            headings,
        })
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");
        let class = html_escape(lang);

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        match highlighted_html_for_string(code, &self.syntax_set, syntax, &self.theme) {
            Ok(highlighted) => {
                if self.line_numbers {
                    add_line_numbers(&highlighted, code, &class)
                } else {
                    format!(
                        r#"<figure class="highlight {}">{}</figure>"#,
                        class, highlighted
                    )
                }
            }
            Err(e) => {
                tracing::debug!("Highlighting {} failed, emitting plain code: {}", lang, e);
                format!(
                    r#"<pre><code class="language-{}">{}</code></pre>"#,
                    class,
                    html_escape(code)
                )
            }
        }
    }
}

struct CodeBlock {
    lang: Option<String>,
    code: String,
}

/// Language token of a fenced block (`rust,ignore` and `rust title=x` give `rust`)
fn fence_lang(kind: &CodeBlockKind) -> Option<String> {
    match kind {
        CodeBlockKind::Fenced(info) => info
            .split(|c: char| c == ',' || c.is_whitespace())
            .next()
            .filter(|lang| !lang.is_empty())
            .map(str::to_string),
        CodeBlockKind::Indented => None,
    }
}

/// Wrap highlighted code in a table with a line-number gutter
fn add_line_numbers(highlighted: &str, code: &str, class: &str) -> String {
    let line_count = code.lines().count().max(1);
    let gutter = (1..=line_count)
        .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
        class, gutter, highlighted
    )
}

/// Hands out unique heading anchors (`intro`, `intro-1`, ...)
#[derive(Default)]
struct AnchorSet {
    seen: HashMap<String, usize>,
}

impl AnchorSet {
    fn claim(&mut self, wanted: &str) -> String {
        let base = if wanted.is_empty() { "section" } else { wanted };
        let mut candidate = base.to_string();
        while let Some(count) = self.seen.get_mut(&candidate) {
            *count += 1;
            candidate = format!("{}-{}", base, count);
        }
        self.seen.insert(candidate.clone(), 0);
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> MarkdownRenderer {
        MarkdownRenderer::with_options("InspiredGitHub", false).unwrap()
    }

    #[test]
    fn test_render_basic_markdown() {
        let out = renderer()
            .render("Hello *world*.\n\nThis is a test.")
            .unwrap();
        assert!(out.html.contains("<p>Hello <em>world</em>.</p>"));
        assert!(out.html.contains("<p>This is a test.</p>"));
        assert!(out.headings.is_empty());
    }

    #[test]
    fn test_headings_get_ids() {
        let out = renderer()
            .render("# Hello World\n\n## Getting `cargo` set up\n\ntext\n\n### Deep")
            .unwrap();
        assert!(out.html.contains(r#"<h1 id="hello-world">Hello World</h1>"#));
        assert_eq!(
            out.headings,
            vec![
                Heading {
                    depth: 1,
                    slug: "hello-world".into(),
                    text: "Hello World".into()
                },
                Heading {
                    depth: 2,
                    slug: "getting-cargo-set-up".into(),
                    text: "Getting cargo set up".into()
                },
                Heading {
                    depth: 3,
                    slug: "deep".into(),
                    text: "Deep".into()
                },
            ]
        );
    }

    #[test]
    fn test_duplicate_headings_are_unique() {
        let out = renderer()
            .render("## Notes\n\n## Notes\n\n## Notes")
            .unwrap();
        let slugs: Vec<_> = out.headings.iter().map(|h| h.slug.as_str()).collect();
        assert_eq!(slugs, vec!["notes", "notes-1", "notes-2"]);
    }

    #[test]
    fn test_explicit_heading_id() {
        let out = renderer().render("## Setup {#install}").unwrap();
        assert_eq!(out.headings[0].slug, "install");
        assert_eq!(out.headings[0].text, "Setup");
        assert!(out.html.contains(r#"id="install""#));
    }

    #[test]
    fn test_render_code_block() {
        let out = renderer()
            .render("```rust\nfn main() {}\n```")
            .unwrap();
        assert!(out.html.contains(r#"<figure class="highlight rust">"#));
        assert!(out.html.contains("<pre style="));
        assert!(out.html.contains("main"));
    }

    #[test]
    fn test_code_block_info_string() {
        assert_eq!(
            fence_lang(&CodeBlockKind::Fenced("rust,ignore".into())),
            Some("rust".to_string())
        );
        assert_eq!(fence_lang(&CodeBlockKind::Fenced("".into())), None);
        assert_eq!(fence_lang(&CodeBlockKind::Indented), None);
    }

    #[test]
    fn test_unknown_language_falls_back_to_plain_text() {
        let out = renderer()
            .render("```nosuchlang\n<tag> & stuff\n```")
            .unwrap();
        assert!(out.html.contains("highlight nosuchlang"));
        assert!(out.html.contains("&lt;tag&gt;"));
    }

    #[test]
    fn test_line_numbers() {
        let renderer = MarkdownRenderer::with_options("InspiredGitHub", true).unwrap();
        let out = renderer.render("```js\nlet a = 1;\nlet b = 2;\n```").unwrap();
        assert!(out.html.contains(r#"<span class="line-number">2</span>"#));
        assert!(!out.html.contains(r#"<span class="line-number">3</span>"#));
    }

    #[test]
    fn test_fence_language_is_escaped() {
        let source = "```x\"><script>alert(1)</script>\nbody\n```";
        let out = renderer().render(source).unwrap();
        assert!(!out.html.contains("<script>"));
        assert!(out.html.contains(r#"class="highlight x&quot;&gt;&lt;script&gt;"#));

        let numbered = MarkdownRenderer::with_options("InspiredGitHub", true).unwrap();
        let out = numbered.render(source).unwrap();
        assert!(!out.html.contains("<script>"));
    }

    #[test]
    fn test_unknown_theme() {
        match MarkdownRenderer::with_options("no-such-theme", false) {
            Err(Error::UnknownTheme(name)) => assert_eq!(name, "no-such-theme"),
            Err(e) => panic!("unexpected error {}", e),
            Ok(_) => panic!("expected UnknownTheme"),
        }
    }
}
