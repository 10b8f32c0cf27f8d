use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tracing::{debug, info, instrument};

use crate::error::{BuildError, Result};
use crate::html::PageShell;
use crate::metadata::parse_article;
use crate::models::{Article, SiteConfig};
use crate::pages::{render_article, render_index};

/// What a finished build produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub articles: usize,
    pub output_dir: PathBuf,
}

/// Runs the whole pipeline: prepare the output directory, write one page per
/// article, then write the index. Any failure aborts the build.
#[instrument(level = "info", skip_all, fields(articles = %config.article_dir, output = %config.output_dir))]
pub async fn build_site(config: &SiteConfig, shell: &PageShell) -> Result<BuildSummary> {
    let article_dir = Path::new(&config.article_dir);
    let output_dir = Path::new(&config.output_dir);

    check_disjoint(article_dir, output_dir)?;
    prepare_output(output_dir).await?;
    let articles =
        build_article_pages(article_dir, output_dir, shell, config.author.as_deref()).await?;
    build_index_page(output_dir, shell, &articles).await?;

    info!(count = articles.len(), "Site built");
    Ok(BuildSummary {
        articles: articles.len(),
        output_dir: output_dir.to_path_buf(),
    })
}

/// Fails when `output_dir` equals, contains or sits inside `article_dir`.
/// Paths are compared lexically since the output may not exist yet.
fn check_disjoint(article_dir: &Path, output_dir: &Path) -> Result<()> {
    let articles = lexical_absolute(article_dir)?;
    let output = lexical_absolute(output_dir)?;

    if articles.starts_with(&output) || output.starts_with(&articles) {
        return Err(BuildError::OverlappingDirs {
            article_dir: article_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
        });
    }
    Ok(())
}

/// Joins relative paths onto the working directory and resolves `.`/`..`
/// without touching the filesystem.
fn lexical_absolute(path: &Path) -> Result<PathBuf> {
    let mut resolved = if path.is_absolute() {
        PathBuf::new()
    } else {
        std::env::current_dir().map_err(BuildError::io(path))?
    };

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }
    Ok(resolved)
}

/// Removes `output_dir` and everything in it, then recreates it empty.
pub async fn prepare_output(output_dir: &Path) -> Result<()> {
    match fs::remove_dir_all(output_dir).await {
        Ok(()) => debug!(path = %output_dir.display(), "Cleared output directory"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(BuildError::io(output_dir)(e)),
    }
    fs::create_dir_all(output_dir)
        .await
        .map_err(BuildError::io(output_dir))
}

/// Converts every `*.md` file in `article_dir` into `{slug}.html` under
/// `output_dir` and returns the parsed articles for the index.
pub async fn build_article_pages(
    article_dir: &Path,
    output_dir: &Path,
    shell: &PageShell,
    author: Option<&str>,
) -> Result<Vec<Article>> {
    let sources = markdown_sources(article_dir).await?;
    let mut articles = Vec::with_capacity(sources.len());
    let mut seen: HashMap<String, PathBuf> = HashMap::new();

    for path in sources {
        let raw = fs::read_to_string(&path)
            .await
            .map_err(BuildError::io(&path))?;
        let article = parse_article(&path, &raw, author)?;

        if let Some(first) = seen.insert(article.slug.clone(), path.clone()) {
            return Err(BuildError::DuplicateSlug {
                slug: article.slug,
                first,
                second: path,
            });
        }

        let target = output_dir.join(&article.filename);
        fs::write(&target, render_article(shell, &article))
            .await
            .map_err(BuildError::io(&target))?;
        info!(source = %path.display(), page = %target.display(), "Wrote article page");

        articles.push(article);
    }

    Ok(articles)
}

/// Writes `index.html` listing `articles`.
pub async fn build_index_page(
    output_dir: &Path,
    shell: &PageShell,
    articles: &[Article],
) -> Result<()> {
    let target = output_dir.join("index.html");
    fs::write(&target, render_index(shell, articles))
        .await
        .map_err(BuildError::io(&target))?;
    info!(page = %target.display(), articles = articles.len(), "Wrote index page");
    Ok(())
}

/// Markdown files directly inside `dir`, sorted by path.
async fn markdown_sources(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir).await.map_err(BuildError::io(dir))?;
    let mut sources = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(BuildError::io(dir))? {
        let path = entry.path();
        let is_file = entry
            .file_type()
            .await
            .map_err(BuildError::io(&path))?
            .is_file();

        if is_file && path.extension().is_some_and(|ext| ext == "md") {
            sources.push(path);
        } else {
            debug!(path = %path.display(), "Skipping non-article entry");
        }
    }

    sources.sort();
    Ok(sources)
}
