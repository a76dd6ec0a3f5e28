//! Parse, optionally transform, serialize

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use ftl_core::FtlConfig;
use ftl_core::syntax::{
    Junk, Parser, ParserConfig, SerializeError, Serializer, SerializerOptions, TransformError,
    transform_resource,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::diff::FormatDiff;
use crate::strip::StripComments;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatMode {
    /// Format and return the result
    Format,
    /// Report whether formatting would change anything; content is untouched
    Check,
    /// Format and compute a line diff
    Diff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    pub parser: ParserConfig,
    pub serializer: SerializerOptions,
    pub strip_comments: bool,
}

impl Default for FormatOptions {
    /// Junk is written back verbatim so formatting never loses text.
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            serializer: SerializerOptions {
                with_junk: true,
                ..SerializerOptions::default()
            },
            strip_comments: false,
        }
    }
}

impl FormatOptions {
    pub fn from_config(config: &FtlConfig) -> Self {
        Self {
            parser: config.parser_config(),
            serializer: config.serializer_options(),
            strip_comments: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error(transparent)]
    Serialize(#[from] SerializeError),
    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Result of a formatting operation
#[derive(Debug, Clone)]
pub struct FormatResult {
    /// Set for results of file operations.
    pub path: Option<PathBuf>,
    pub original: String,
    /// Formatted text; the original in [`FormatMode::Check`].
    pub content: String,
    pub changed: bool,
    /// Entries the parser could not read.
    pub junk: Vec<Junk>,
    /// Present in [`FormatMode::Diff`].
    pub diff: Option<FormatDiff>,
}

impl FormatResult {
    pub fn has_changes(&self) -> bool {
        self.changed
    }

    pub fn has_junk(&self) -> bool {
        !self.junk.is_empty()
    }
}

/// Aggregate over a batch, for machine-readable reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatSummary {
    pub files: usize,
    pub changed: Vec<PathBuf>,
    pub with_junk: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

impl FormatSummary {
    pub fn from_results<'a>(
        results: impl IntoIterator<Item = (&'a Path, &'a anyhow::Result<FormatResult>)>,
    ) -> Self {
        let mut summary = Self::default();
        for (path, result) in results {
            summary.files += 1;
            match result {
                Ok(result) => {
                    if result.changed {
                        summary.changed.push(path.to_path_buf());
                    }
                    if result.has_junk() {
                        summary.with_junk.push(path.to_path_buf());
                    }
                }
                Err(_) => summary.failed.push(path.to_path_buf()),
            }
        }
        summary
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Formatter {
    options: FormatOptions,
}

impl Formatter {
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    pub fn from_config(config: &FtlConfig) -> Self {
        Self::new(FormatOptions::from_config(config))
    }

    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    pub fn format_str(&self, source: &str) -> Result<FormatResult, FormatError> {
        self.format_with_mode(source, FormatMode::Format)
    }

    pub fn format_with_mode(&self, source: &str, mode: FormatMode) -> Result<FormatResult, FormatError> {
        let mut resource = Parser::new(self.options.parser).parse(source);
        let junk: Vec<Junk> = resource.junk().cloned().collect();
        if !junk.is_empty() && !self.options.serializer.with_junk {
            warn!("Dropping {} unparsable entries from the output", junk.len());
        }

        if self.options.strip_comments {
            let mut strip = StripComments::new();
            resource = transform_resource(&mut strip, &resource, self.options.parser.max_depth)?;
            debug!("Stripped {} comments", strip.removed());
        }

        let formatted = Serializer::new(self.options.serializer).serialize(&resource)?;
        let changed = formatted != source;
        debug!("Formatted {} bytes, changed: {}", source.len(), changed);

        Ok(match mode {
            FormatMode::Format => FormatResult {
                path: None,
                original: source.to_string(),
                content: formatted,
                changed,
                junk,
                diff: None,
            },
            FormatMode::Check => FormatResult {
                path: None,
                original: source.to_string(),
                content: source.to_string(),
                changed,
                junk,
                diff: None,
            },
            FormatMode::Diff => FormatResult {
                path: None,
                original: source.to_string(),
                diff: Some(FormatDiff::new(source, formatted.as_str())),
                content: formatted,
                changed,
                junk,
            },
        })
    }

    pub fn check(&self, source: &str) -> Result<bool, FormatError> {
        Ok(self.format_with_mode(source, FormatMode::Check)?.changed)
    }

    pub fn diff(&self, source: &str) -> Result<FormatDiff, FormatError> {
        let result = self.format_str(source)?;
        Ok(FormatDiff::new(result.original, result.content))
    }

    pub fn format_file(&self, path: &Path, mode: FormatMode) -> anyhow::Result<FormatResult> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut result = self
            .format_with_mode(&source, mode)
            .with_context(|| format!("Failed to format {}", path.display()))?;
        result.path = Some(path.to_path_buf());
        Ok(result)
    }

    /// Format a file in place. Returns whether it was rewritten.
    pub fn write_file(&self, path: &Path) -> anyhow::Result<bool> {
        let result = self.format_file(path, FormatMode::Format)?;
        if result.changed {
            fs::write(path, &result.content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        Ok(result.changed)
    }

    /// Format many files in parallel; results keep the input order.
    pub fn format_files<P>(&self, paths: &[P], mode: FormatMode) -> Vec<anyhow::Result<FormatResult>>
    where
        P: AsRef<Path> + Sync,
    {
        paths
            .par_iter()
            .map(|path| self.format_file(path.as_ref(), mode))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn test_normalizes_spacing() {
        let result = Formatter::default()
            .format_str("hello   =   Hello\n\n\nbye = Bye\n")
            .unwrap();
        assert!(result.changed);
        assert_eq!(result.content, "hello = Hello\nbye = Bye\n");
    }

    #[test]
    fn test_formatted_source_is_unchanged() {
        let source = "# Note\nhello = Hello, { $name }!\n";
        let formatter = Formatter::default();
        assert!(!formatter.check(source).unwrap());
        assert!(!formatter.diff(source).unwrap().has_changes());
    }

    #[test]
    fn test_check_mode_keeps_content() {
        let result = Formatter::default()
            .format_with_mode("a=1\n", FormatMode::Check)
            .unwrap();
        assert!(result.changed);
        assert_eq!(result.content, "a=1\n");
        assert!(result.diff.is_none());
    }

    #[test]
    fn test_diff_mode() {
        let result = Formatter::default()
            .format_with_mode("a=1\nb = 2\n", FormatMode::Diff)
            .unwrap();
        let diff = result.diff.unwrap();
        assert_eq!(diff.change_count(), 2);
        assert_snapshot!(diff.unified("main.ftl"), @r"
        --- a/main.ftl
        +++ b/main.ftl
        @@ -1,2 +1,2 @@
        -a=1
        +a = 1
         b = 2
        ");
    }

    #[test]
    fn test_junk_is_kept_by_default() {
        let result = Formatter::default().format_str("a = 1\n@@@\nb=2\n").unwrap();
        assert_eq!(result.junk.len(), 1);
        assert_eq!(result.content, "a = 1\n@@@\nb = 2\n");
    }

    #[test]
    fn test_junk_dropped_when_configured() {
        let formatter = Formatter::from_config(&FtlConfig::default());
        let result = formatter.format_str("a = 1\n@@@\n").unwrap();
        assert!(result.has_junk());
        assert_eq!(result.content, "a = 1\n");
    }

    #[test]
    fn test_strip_comments() {
        let formatter = Formatter::new(FormatOptions {
            strip_comments: true,
            ..FormatOptions::default()
        });
        let result = formatter
            .format_str("### Resource\n\n# Attached\nhello = Hello\n\n# Standalone\n\nbye = Bye\n")
            .unwrap();
        assert_eq!(result.content, "hello = Hello\nbye = Bye\n");
    }

    #[test]
    fn test_options_from_json() {
        let options: FormatOptions =
            serde_json::from_str(r#"{ "strip_comments": true, "serializer": { "with_junk": false } }"#)
                .unwrap();
        assert!(options.strip_comments);
        assert!(!options.serializer.with_junk);
        assert!(options.serializer.validate);
    }
}
