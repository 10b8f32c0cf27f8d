use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use crate::error::{BuildError, Result};
use crate::models::SiteConfig;

const DEFAULT_CONFIG_PATH: &str = "blog.toml";

/// Loads the site configuration. `BLOG_CONFIG` names the file explicitly and
/// must exist; otherwise `blog.toml` is used when present and the built-in
/// defaults when not.
pub async fn load_config() -> Result<SiteConfig> {
    match std::env::var_os("BLOG_CONFIG") {
        Some(path) => read_config(Path::new(&path)).await,
        None => Ok(read_optional_config(Path::new(DEFAULT_CONFIG_PATH))
            .await?
            .unwrap_or_default()),
    }
}

async fn read_optional_config(path: &Path) -> Result<Option<SiteConfig>> {
    match read_config(path).await {
        Ok(config) => Ok(Some(config)),
        Err(BuildError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "No config file, using defaults");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

async fn read_config(path: &Path) -> Result<SiteConfig> {
    let raw = fs::read_to_string(path).await.map_err(BuildError::io(path))?;
    let config = parse_config(path, &raw)?;
    info!(path = %path.display(), "Loaded site config");
    Ok(config)
}

fn parse_config(path: &Path, raw: &str) -> Result<SiteConfig> {
    toml::from_str(raw).map_err(|source| BuildError::Config {
        path: PathBuf::from(path),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse_config(Path::new("blog.toml"), "").unwrap();
        assert_eq!(config, SiteConfig::default());
        assert_eq!(config.article_dir, "article");
        assert_eq!(config.output_dir, "dist");
        assert_eq!(config.title, "Blog");
    }

    #[test]
    fn partial_config_overrides_only_given_keys() {
        let raw = r#"
            title = "Field Notes"
            author = "Ada"
            stylesheet = "style.css"
        "#;
        let config = parse_config(Path::new("blog.toml"), raw).unwrap();

        assert_eq!(config.title, "Field Notes");
        assert_eq!(config.author.as_deref(), Some("Ada"));
        assert_eq!(config.stylesheet.as_deref(), Some("style.css"));
        assert_eq!(config.output_dir, "dist");
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = parse_config(Path::new("blog.toml"), "titel = \"typo\"").unwrap_err();
        assert!(matches!(err, BuildError::Config { .. }));
        assert!(err.to_string().contains("blog.toml"));
    }

    #[tokio::test]
    async fn missing_optional_config_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let config = read_optional_config(&dir.path().join("blog.toml")).await.unwrap();
        assert!(config.is_none());
    }

    #[tokio::test]
    async fn reads_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blog.toml");
        std::fs::write(&path, "output_dir = \"public\"\n").unwrap();

        let config = read_optional_config(&path).await.unwrap().unwrap();
        assert_eq!(config.output_dir, "public");
    }

    #[tokio::test]
    async fn explicit_missing_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = read_config(&dir.path().join("nope.toml")).await.unwrap_err();
        assert!(matches!(err, BuildError::Io { .. }));
    }
}
