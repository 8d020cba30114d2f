use thiserror::Error;

/// Domain index error types
#[derive(Error, Debug)]
pub enum TrieError {
    #[error("domain name is empty")]
    EmptyName,

    #[error("domain name too long ({length} bytes)")]
    NameTooLong { length: usize },

    #[error("whitelist parse error at line {line}: {message}")]
    WhitelistParse { line: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TrieError>;
