use pulldown_cmark::{html, CowStr, Event, Options, Parser};

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_MATH);
    options
}

/// Converts an article body to an HTML fragment. Math written as `$..$`,
/// `$$..$$`, `\(..\)` or `\[..\]` is rendered with KaTeX.
pub fn to_html(markdown: &str) -> String {
    let source = normalize_math_delimiters(markdown);
    let events = Parser::new_ext(&source, markdown_options()).map(|event| match event {
        Event::InlineMath(math) => math_event(&math, false),
        Event::DisplayMath(math) => math_event(&math, true),
        other => other,
    });

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

fn math_event(source: &str, display_mode: bool) -> Event<'static> {
    Event::Html(CowStr::Boxed(render_math(source, display_mode).into_boxed_str()))
}

/// Rewrites LaTeX-style `\(..\)` and `\[..\]` into the dollar forms
/// pulldown-cmark understands. Inline math spanning lines becomes display
/// math. An opener without a closer is left untouched.
fn normalize_math_delimiters(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(at) = rest.find('\\') {
        let (before, tail) = rest.split_at(at);
        out.push_str(before);

        let delimiters = if tail.starts_with("\\(") {
            Some(("\\)", false))
        } else if tail.starts_with("\\[") {
            Some(("\\]", true))
        } else {
            None
        };

        let Some((close, display)) = delimiters else {
            out.push('\\');
            rest = &tail[1..];
            continue;
        };

        let content_and_rest = &tail[2..];
        match content_and_rest.find(close) {
            Some(end) => {
                let content = &content_and_rest[..end];
                let fence = if display || content.contains('\n') { "$$" } else { "$" };
                out.push_str(fence);
                out.push_str(content);
                out.push_str(fence);
                rest = &content_and_rest[end + close.len()..];
            }
            None => {
                out.push_str(&tail[..2]);
                rest = content_and_rest;
            }
        }
    }

    out.push_str(rest);
    out
}

fn render_math(source: &str, display_mode: bool) -> String {
    let rendered = katex::Opts::builder()
        .display_mode(display_mode)
        .build()
        .ok()
        .and_then(|opts| katex::render_with_opts(source, opts).ok());

    match rendered {
        Some(html) => html,
        None => {
            tracing::debug!(%source, "KaTeX could not render math, emitting source");
            fallback_math_html(source, display_mode)
        }
    }
}

fn fallback_math_html(source: &str, display_mode: bool) -> String {
    let class_name = if display_mode { "math math-display" } else { "math math-inline" };
    format!(
        "<span class=\"{class_name}\">{}</span>",
        htmlescape::encode_minimal(source)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_paragraphs_and_emphasis() {
        let html = to_html("Body text with *emphasis*.");
        assert_eq!(html, "<p>Body text with <em>emphasis</em>.</p>\n");
    }

    #[test]
    fn renders_tables_and_strikethrough() {
        let html = to_html("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~");
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
    }

    #[test]
    fn normalizes_latex_delimiters() {
        assert_eq!(normalize_math_delimiters(r"a \(x^2\) b"), "a $x^2$ b");
        assert_eq!(normalize_math_delimiters(r"\[y^2\]"), "$$y^2$$");
        assert_eq!(normalize_math_delimiters("\\(a\nb\\)"), "$$a\nb$$");
    }

    #[test]
    fn leaves_other_backslashes_and_unclosed_openers_alone() {
        assert_eq!(normalize_math_delimiters(r"C:\path \* x"), r"C:\path \* x");
        assert_eq!(normalize_math_delimiters(r"open \( never closed"), r"open \( never closed");
        assert_eq!(normalize_math_delimiters("trailing \\"), "trailing \\");
    }

    #[test]
    fn renders_math_with_katex() {
        let html = to_html(r"\(x^2\) and \[y^2\]");
        assert!(html.contains("katex"));
    }

    #[test]
    fn fallback_escapes_source() {
        let html = fallback_math_html("a < b", false);
        assert_eq!(html, "<span class=\"math math-inline\">a &lt; b</span>");
    }
}
