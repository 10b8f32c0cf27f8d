use std::path::PathBuf;

/// Everything that can abort a site build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The first header line is not a `# Title` heading
    #[error("{}: no `# Title` line at the top of the article", .path.display())]
    MissingTitle { path: PathBuf },

    /// The header block holds more than the title line
    #[error("{}: header must be a single `# Title` line followed by a blank line, found {lines} lines", .path.display())]
    MalformedHeader { path: PathBuf, lines: usize },

    #[error("{}: file name does not yield a usable slug (got {slug:?})", .path.display())]
    InvalidSlug { path: PathBuf, slug: String },

    #[error("{} and {} both map to slug {slug:?}", .first.display(), .second.display())]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// Clearing the output directory would delete articles
    #[error("output directory {} overlaps article directory {}", .output_dir.display(), .article_dir.display())]
    OverlappingDirs {
        article_dir: PathBuf,
        output_dir: PathBuf,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot watch {}: {source}", .path.display())]
    Watch {
        path: PathBuf,
        #[source]
        source: notify_debouncer_full::notify::Error,
    },
}

impl BuildError {
    /// Wraps an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| BuildError::Io { path, source }
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;
