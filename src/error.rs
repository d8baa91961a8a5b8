use miette::Diagnostic;
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

/// Location of a field inside the payments file, rendered the way JSON schema
/// validators report it: `['Donations', 0, 'Percent']`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldPath(Vec<PathSegment>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn key(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.to_string()));
        Self(segments)
    }

    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match segment {
                PathSegment::Key(key) => write!(f, "'{}'", key)?,
                PathSegment::Index(index) => write!(f, "{}", index)?,
            }
        }
        write!(f, "]")
    }
}

/// Problems found while validating the payments and secrets files.
///
/// Any of these aborts the whole run: a partially valid configuration could
/// authorize the wrong transfers.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Payments file is not valid: {0}")]
    #[diagnostic(code(payouts::config::structure))]
    Structure(String),

    #[error("Error given: {message}\nFor attribute in: {path}")]
    #[diagnostic(code(payouts::config::semantic))]
    Semantic { message: String, path: FieldPath },

    #[error("Account '{scholar}' is not present in secret file, please add it.")]
    #[diagnostic(code(payouts::secrets::missing))]
    SecretMissing { scholar: String },

    #[error("Private key for account {account} is not valid, please review it!")]
    #[diagnostic(
        code(payouts::secrets::malformed),
        help(
            "There is a problem with your secrets.json, delete it and re-generate the file starting with an empty secrets file.Or open it and see what is wrong with the keys of the accounts reported above."
        )
    )]
    SecretMalformed { account: String },
}

impl ConfigError {
    pub(crate) fn semantic(message: impl Into<String>, path: FieldPath) -> Self {
        Self::Semantic {
            message: message.into(),
            path,
        }
    }
}

/// Reasons a scholar is skipped for the current run. Never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InsufficientBalance {
    #[error("a {percent}% scholar share rounds below 1 SLP on a balance of {balance} SLP")]
    BelowScholarFloor { balance: u64, percent: Decimal },
    #[error("payments add up to {total} SLP but the balance is only {balance} SLP")]
    PaymentsExceedBalance { balance: u64, total: u64 },
}

#[derive(Error, Diagnostic, Debug)]
pub enum PayoutError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error("Signing error: {0}")]
    Signing(String),
    #[error("Contract ABI error: {0}")]
    Abi(String),
}

pub type Result<T> = std::result::Result<T, PayoutError>;
