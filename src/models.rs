use chrono::NaiveDate;
use serde::Deserialize;

/// Site-wide settings, read from `blog.toml` when present.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub title: String,
    pub author: Option<String>,
    pub stylesheet: Option<String>,
    pub article_dir: String,
    pub output_dir: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Blog".to_string(),
            author: None,
            stylesheet: None,
            article_dir: "article".to_string(),
            output_dir: "dist".to_string(),
        }
    }
}

/// One parsed markdown source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub title: String,
    pub author: Option<String>,
    pub created: Option<NaiveDate>,
    pub slug: String,
    pub filename: String,
    pub body: String,
}
