use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CodeError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to open outline file {path}: {source}", path = path.display())]
    OutlineOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read outline: {0}")]
    OutlineRead(std::io::Error),
    #[error("line {line_number}: malformed entry {line:?}")]
    MalformedLine {
        line_number: usize,
        depth: usize,
        line: String,
    },
    #[error("line {line_number}: no parent at depth {parent_depth} for {code}")]
    MissingParent {
        line_number: usize,
        parent_depth: usize,
        code: String,
    },
    #[error("line {line_number}: {code} is already an ancestor of this line")]
    AncestorCycle { line_number: usize, code: String },

    #[error("failed to create database directory: {0}")]
    DatabaseDirCreation(std::io::Error),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("stored node id is not canonical: {0}")]
    CorruptNodeId(String),
    #[error("code store lock poisoned")]
    StorePoisoned,
}

pub type CodeResult<T> = std::result::Result<T, CodeError>;
