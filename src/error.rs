use crate::util::Position;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// An error raised while scanning the grammar file's character stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanError {
    pub position: Position,
    pub message: String,
}

impl ScanError {
    pub fn new(position: Position, message: String) -> Self {
        Self { position, message }
    }
}

impl Display for ScanError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ScanError: {} at {}", self.message, self.position)
    }
}

impl std::error::Error for ScanError {}

/// An error raised while parsing the token stream into a grammar AST.
///
/// Carries the offending token's kind, a message, and the set of expected
/// token kinds, per the surface-parser contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub position: Position,
    pub message: String,
    pub found: String,
    pub expected: BTreeSet<String>,
}

impl SyntaxError {
    pub fn new(position: Position, message: String, found: String, expected: BTreeSet<String>) -> Self {
        Self { position, message, found, expected }
    }
}

impl Display for SyntaxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SyntaxError: {} at {}: found {:?}, expected one of {:?}",
            self.message, self.position, self.found, self.expected
        )
    }
}

impl std::error::Error for SyntaxError {}

/// An error raised by the target-inference pass over structural violations,
/// e.g. a `break`/`continue` with no enclosing loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceError {
    pub message: String,
}

impl InferenceError {
    pub fn new(message: String) -> Self {
        Self { message }
    }
}

impl Display for InferenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "InferenceError: {}", self.message)
    }
}

impl std::error::Error for InferenceError {}

/// Top level error unifying every stage, for the CLI's `main` to match on.
#[derive(Debug)]
pub enum CliError {
    Io(std::io::Error),
    Scan(ScanError),
    Syntax(SyntaxError),
    Inference(InferenceError),
    Pragma(toml::de::Error),
    Json(serde_json::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::Scan(e) => write!(f, "{}", e),
            CliError::Syntax(e) => write!(f, "{}", e),
            CliError::Inference(e) => write!(f, "{}", e),
            CliError::Pragma(e) => write!(f, "PragmaError: {}", e),
            CliError::Json(e) => write!(f, "JsonError: {}", e),
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        CliError::Io(value)
    }
}
impl From<ScanError> for CliError {
    fn from(value: ScanError) -> Self {
        CliError::Scan(value)
    }
}
impl From<SyntaxError> for CliError {
    fn from(value: SyntaxError) -> Self {
        CliError::Syntax(value)
    }
}
impl From<InferenceError> for CliError {
    fn from(value: InferenceError) -> Self {
        CliError::Inference(value)
    }
}
impl From<toml::de::Error> for CliError {
    fn from(value: toml::de::Error) -> Self {
        CliError::Pragma(value)
    }
}
impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        CliError::Json(value)
    }
}
