use std::path::PathBuf;

use metaed_model::PluginId;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for configuration loading (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Source text and file name of a configuration being loaded.
#[derive(Debug, Clone)]
pub struct SourceContext {
    src: String,
    filename: String,
}

impl SourceContext {
    pub fn new(src: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            filename: filename.into(),
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.filename, self.src.clone())
    }

    pub fn parse_error(&self, source: toml::de::Error) -> Box<Error> {
        let span = source.span().map(SourceSpan::from);
        Box::new(Error::Parse {
            src: self.named_source(),
            span,
            source,
        })
    }

    pub fn unknown_plugin_error(&self, name: &str, span: impl Into<SourceSpan>) -> Box<Error> {
        Box::new(Error::UnknownPlugin {
            src: self.named_source(),
            span: span.into(),
            name: name.to_string(),
        })
    }

    pub fn duplicate_plugin_error(
        &self,
        plugin: PluginId,
        first_span: impl Into<SourceSpan>,
        second_span: impl Into<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::DuplicatePlugin {
            src: self.named_source(),
            first_span: first_span.into(),
            second_span: second_span.into(),
            plugin,
        })
    }

    pub fn invalid_version_error(
        &self,
        version: &str,
        span: impl Into<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::InvalidVersion {
            src: self.named_source(),
            span: span.into(),
            version: version.to_string(),
        })
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    #[diagnostic(code(metaed::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration")]
    #[diagnostic(code(metaed::parse_error))]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown plugin '{name}'")]
    #[diagnostic(
        code(metaed::unknown_plugin),
        help(
            "known plugins are unified, edfiOdsRelational, edfiOdsPostgresql, edfiOdsSqlServer, edfiApiSchema"
        )
    )]
    UnknownPlugin {
        #[source_code]
        src: NamedSource<String>,
        #[label("not a known plugin")]
        span: SourceSpan,
        name: String,
    },

    #[error("plugin '{plugin}' is listed more than once")]
    #[diagnostic(
        code(metaed::duplicate_plugin),
        help("each plugin runs exactly once; remove the second entry")
    )]
    DuplicatePlugin {
        #[source_code]
        src: NamedSource<String>,
        #[label("first listed here")]
        first_span: SourceSpan,
        #[label("listed again here")]
        second_span: SourceSpan,
        plugin: PluginId,
    },

    #[error("invalid version '{version}'")]
    #[diagnostic(
        code(metaed::invalid_version),
        help("versions are written as 'major.minor.patch', e.g. \"5.0.0\"")
    )]
    InvalidVersion {
        #[source_code]
        src: NamedSource<String>,
        #[label("expected X.Y.Z")]
        span: SourceSpan,
        version: String,
    },
}
