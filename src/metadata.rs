//! Header parsing for article sources.
//!
//! An article starts with a single `# Title` line, then a blank line, then
//! the markdown body. The file name supplies everything else: the slug used
//! for the output file and, when the stem starts with `YYYY-MM-DD`, the
//! creation date.

use std::path::Path;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::{BuildError, Result};
use crate::models::Article;

static TITLE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[ \t]+(.+?)(?:[ \t]+#+)?[ \t]*$").unwrap());

/// Parses `raw` (the contents of the file at `path`) into an [`Article`].
pub fn parse_article(path: &Path, raw: &str, author: Option<&str>) -> Result<Article> {
    let (title, body) = split_header(path, raw)?;
    let slug = slug_for(path)?;

    Ok(Article {
        title,
        author: author.map(str::to_string),
        created: created_from_slug(&slug),
        filename: format!("{slug}.html"),
        slug,
        body,
    })
}

/// Splits the title line off the body.
fn split_header(path: &Path, raw: &str) -> Result<(String, String)> {
    let text = raw.trim_start_matches('\u{feff}').replace("\r\n", "\n");
    let mut lines = text.lines().skip_while(|line| line.trim().is_empty());

    let header: Vec<&str> = lines
        .by_ref()
        .take_while(|line| !line.trim().is_empty())
        .collect();

    let title = header
        .first()
        .and_then(|line| TITLE_LINE.captures(line))
        .map(|caps| caps[1].trim().to_string())
        // `#   ` and `# ##` are empty headings
        .filter(|title| !title.is_empty() && !title.chars().all(|c| c == '#'))
        .ok_or_else(|| BuildError::MissingTitle {
            path: path.to_path_buf(),
        })?;

    if header.len() > 1 {
        return Err(BuildError::MalformedHeader {
            path: path.to_path_buf(),
            lines: header.len(),
        });
    }

    let body = lines.collect::<Vec<_>>().join("\n");
    Ok((title, body))
}

/// Derives the output slug from a file stem: lowercase, runs of anything
/// outside `[a-z0-9_-]` collapsed to one `-`.
pub fn slugify(stem: &str) -> String {
    let mut slug = String::with_capacity(stem.len());
    let mut pending_dash = false;

    for ch in stem.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }

    slug.trim_matches('-').to_string()
}

fn slug_for(path: &Path) -> Result<String> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let slug = slugify(&stem);

    // index.html belongs to the listing page
    if slug.is_empty() || slug == "index" {
        return Err(BuildError::InvalidSlug {
            path: path.to_path_buf(),
            slug,
        });
    }
    Ok(slug)
}

fn created_from_slug(slug: &str) -> Option<NaiveDate> {
    let prefix = slug.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}
