/// Errors raised while loading evidence or resolving scaffolds.
#[derive(thiserror::Error, Debug)]
pub enum ScaffoldError {
    #[error("Malformed link record at line {line}: {reason}")]
    MalformedLink { line: usize, reason: String },
    #[error("Malformed size record at line {line}: {reason}")]
    MalformedSizes { line: usize, reason: String },
    #[error(
        "No distance evidence survives orientation filtering for component [{}]",
        .contigs.join(", ")
    )]
    UnresolvableComponent { contigs: Vec<String> },
    #[error("Contig {0} is linked but has no size entry")]
    UnknownContig(String),
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScaffoldError {
    pub(crate) fn malformed_link(line: usize, reason: impl Into<String>) -> Self {
        ScaffoldError::MalformedLink {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_sizes(line: usize, reason: impl Into<String>) -> Self {
        ScaffoldError::MalformedSizes {
            line,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScaffoldError>;
