use serde::Serialize;

/// A single artifact produced by a generator.
///
/// Generators hand these records back to the caller; writing them to disk
/// is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedOutput {
    /// Human readable name of the artifact (e.g., "ODS Tables")
    pub name: String,
    /// Namespace the artifact was generated for
    pub namespace: String,
    /// Folder the artifact belongs in, relative to the output root
    pub folder_name: String,
    /// File name within the folder
    pub file_name: String,
    /// The rendered artifact
    pub result_string: String,
}

impl GeneratedOutput {
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        folder_name: impl Into<String>,
        file_name: impl Into<String>,
        result_string: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            folder_name: folder_name.into(),
            file_name: file_name.into(),
            result_string: result_string.into(),
        }
    }

    /// Path of the artifact relative to the output root.
    pub fn relative_path(&self) -> String {
        if self.folder_name.is_empty() {
            self.file_name.clone()
        } else {
            format!("{}/{}", self.folder_name, self.file_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path() {
        let output = GeneratedOutput::new("Tables", "EdFi", "Database/Structure", "0020-Tables.sql", "");
        assert_eq!(output.relative_path(), "Database/Structure/0020-Tables.sql");

        let output = GeneratedOutput::new("Schema", "EdFi", "", "ApiSchema.json", "");
        assert_eq!(output.relative_path(), "ApiSchema.json");
    }

    #[test]
    fn test_serialize_camel_case() {
        let output = GeneratedOutput::new("Schema", "EdFi", "ApiSchema", "ApiSchema.json", "{}");
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["folderName"], "ApiSchema");
        assert_eq!(json["fileName"], "ApiSchema.json");
        assert_eq!(json["resultString"], "{}");
    }
}
