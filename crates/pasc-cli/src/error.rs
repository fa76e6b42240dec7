//! Error type for the `pasc` CLI binary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("could not read '{path}': {source}")]
    ReadSource {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Lex(#[from] pasc_lex::LexError),

    #[error("{0}")]
    Parse(#[from] pasc_par::ParseError),

    #[error("{0}")]
    Semantic(#[from] pasc_sem::SemError),

    #[error("{0}")]
    Runtime(#[from] pasc_eval::RuntimeError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;

impl CliError {
    /// Renders the error the way spec.md's CLI surface describes it:
    /// `<ErrorKind> at line L[, column C]: <message>` for errors that
    /// carry a source location, a plain message otherwise.
    pub fn render(&self) -> String {
        match self {
            CliError::Lex(e) => pasc_util::format_located(e),
            CliError::Parse(e) => pasc_util::format_located(e),
            CliError::Semantic(e) => pasc_util::format_located(e),
            CliError::Runtime(e) => pasc_util::format_located(e),
            CliError::ReadSource { .. } | CliError::Config(_) | CliError::Io(_) => {
                self.to_string()
            }
        }
    }
}
