//! Validation failures.

use std::fmt;

use metaed_model::SourceMap;
use serde::Serialize;

/// Severity of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Blocks artifact generation by convention of the caller.
    Error,
    Warning,
}

impl Category {
    pub fn is_error(&self) -> bool {
        matches!(self, Category::Error)
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Category::Warning)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Error => write!(f, "error"),
            Category::Warning => write!(f, "warning"),
        }
    }
}

/// File location of a failure as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMap {
    pub full_path: String,
    pub line_number: usize,
}

impl From<&SourceMap> for FileMap {
    fn from(source_map: &SourceMap) -> Self {
        Self {
            full_path: source_map.file.clone(),
            line_number: source_map.line,
        }
    }
}

/// A per-item problem found in the model.
///
/// Failures are plain values collected in validator run order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFailure {
    pub validator_name: String,
    pub category: Category,
    pub message: String,
    pub source_map: Option<SourceMap>,
    pub file_map: Option<FileMap>,
}

impl ValidationFailure {
    pub fn error(
        validator_name: impl Into<String>,
        message: impl Into<String>,
        source_map: Option<&SourceMap>,
    ) -> Self {
        Self::new(Category::Error, validator_name, message, source_map)
    }

    pub fn warning(
        validator_name: impl Into<String>,
        message: impl Into<String>,
        source_map: Option<&SourceMap>,
    ) -> Self {
        Self::new(Category::Warning, validator_name, message, source_map)
    }

    fn new(
        category: Category,
        validator_name: impl Into<String>,
        message: impl Into<String>,
        source_map: Option<&SourceMap>,
    ) -> Self {
        Self {
            validator_name: validator_name.into(),
            category,
            message: message.into(),
            source_map: source_map.cloned(),
            file_map: source_map.map(FileMap::from),
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.category, self.validator_name, self.message)?;
        if let Some(source_map) = &self.source_map {
            write!(f, " (at {})", source_map)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_display() {
        let source_map = SourceMap::new("EdFi.metaed", 3, 4, "School");
        let failure = ValidationFailure::error("SomeValidator", "bad reference", Some(&source_map));
        assert_eq!(
            failure.to_string(),
            "error[SomeValidator]: bad reference (at EdFi.metaed:3:4)"
        );
        assert_eq!(
            failure.file_map,
            Some(FileMap {
                full_path: "EdFi.metaed".into(),
                line_number: 3
            })
        );
    }

    #[test]
    fn test_failure_serializes_camel_case() {
        let failure = ValidationFailure::warning("W", "careful", None);
        let json = serde_json::to_string(&failure).unwrap();
        assert_eq!(
            json,
            r#"{"validatorName":"W","category":"warning","message":"careful","sourceMap":null,"fileMap":null}"#
        );
    }
}
