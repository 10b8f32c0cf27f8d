//! The page shell every generated document is wrapped in.

use chrono::Datelike;

use crate::models::SiteConfig;

const LAYOUT: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>{{ title }}</title>{{ stylesheet }}
  </head>
  <body>
    <header>
      <a href="index.html">{{ site_title }}</a>
    </header>
    <main>
      {{ content }}
    </main>
    <footer>
      <p>&copy; {{ year }} {{ owner }}</p>
    </footer>
  </body>
</html>
"#;

/// Depth of `{{ content }}` inside [`LAYOUT`], in two-space steps.
const CONTENT_DEPTH: usize = 3;

/// Site-level values substituted into every page.
#[derive(Debug, Clone)]
pub struct PageShell {
    site_title: String,
    owner: String,
    stylesheet: Option<String>,
    year: i32,
}

impl PageShell {
    pub fn new(config: &SiteConfig, year: i32) -> Self {
        Self {
            site_title: config.title.clone(),
            owner: config.author.clone().unwrap_or_else(|| config.title.clone()),
            stylesheet: config.stylesheet.clone(),
            year,
        }
    }

    /// Shell stamped with the current local year for the copyright line.
    pub fn current(config: &SiteConfig) -> Self {
        Self::new(config, chrono::Local::now().year())
    }

    pub fn site_title(&self) -> &str {
        &self.site_title
    }

    /// Wraps `content` in the full document. `page_title` is prefixed to the
    /// site title in `<title>`; `None` uses the site title alone.
    pub fn render(&self, page_title: Option<&str>, content: &str) -> String {
        let title = match page_title {
            Some(page) => format!("{} | {}", escape(page), escape(&self.site_title)),
            None => escape(&self.site_title),
        };
        let stylesheet = self
            .stylesheet
            .as_deref()
            .map(|href| {
                format!("\n    <link rel=\"stylesheet\" href=\"{}\" />", escape(href))
            })
            .unwrap_or_default();

        let site_title = escape(&self.site_title);
        let content = indent(content, CONTENT_DEPTH);
        let year = self.year.to_string();
        let owner = escape(&self.owner);

        fill(
            LAYOUT,
            &[
                ("title", title.as_str()),
                ("stylesheet", stylesheet.as_str()),
                ("site_title", site_title.as_str()),
                ("content", content.as_str()),
                ("year", year.as_str()),
                ("owner", owner.as_str()),
            ],
        )
    }
}

/// Escapes text for element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    htmlescape::encode_minimal(text)
}

/// Substitutes each `{{ key }}` in a single pass, so values are never
/// scanned for further placeholders. Unknown keys are kept verbatim.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{ ") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 3..];
        let Some(end) = after_open.find(" }}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let key = &after_open[..end];
        match values.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 3 + end + 3]),
        }
        rest = &after_open[end + 3..];
    }

    out.push_str(rest);
    out
}

/// Re-indents an HTML fragment that is placed at `depth` inside an already
/// indented line: the first line is left as is, every following non-empty
/// line gets `depth` two-space steps. Lines inside a `<pre>` block keep their
/// exact text. Trailing whitespace is dropped.
pub fn indent(fragment: &str, depth: usize) -> String {
    let pad = "  ".repeat(depth);
    let mut lines = Vec::new();
    let mut in_pre = false;

    for (i, line) in fragment.trim_end().lines().enumerate() {
        if i == 0 || in_pre || line.is_empty() {
            lines.push(line.to_string());
        } else {
            lines.push(format!("{pad}{line}"));
        }

        if line.contains("<pre") {
            in_pre = true;
        }
        if line.contains("</pre>") {
            in_pre = false;
        }
    }

    lines.join("\n")
}
