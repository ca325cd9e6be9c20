use std::fmt;

use serde::Serialize;

/// Location of a declaration in MetaEd source, used for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct SourceMap {
    /// Source file the token came from
    pub file: String,
    /// 1-based line number
    pub line: usize,
    /// 0-based column
    pub column: usize,
    /// The token text at this location
    pub token: String,
}

impl SourceMap {
    pub fn new(file: impl Into<String>, line: usize, column: usize, token: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            token: token.into(),
        }
    }
}

impl fmt::Display for SourceMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
