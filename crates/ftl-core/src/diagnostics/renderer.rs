//! Diagnostic rendering: annotated source snippets or JSON

use std::ops::Range;

use ariadne::{Config, IndexType, Label, Report, ReportKind, Source};

use super::{Diagnostic, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text with source snippets
    #[default]
    Text,
    Json,
    JsonPretty,
}

#[derive(Debug, Clone, Default)]
pub struct DiagnosticRenderer {
    format: OutputFormat,
    colors: bool,
}

impl DiagnosticRenderer {
    /// Plain text, no colors.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(format: OutputFormat) -> Self {
        Self {
            format,
            colors: false,
        }
    }

    pub fn with_colors(mut self, colors: bool) -> Self {
        self.colors = colors;
        self
    }

    /// Render `diagnostics` against the source they refer to. `name` labels
    /// the source in text output.
    pub fn render(&self, diagnostics: &[Diagnostic], name: &str, source: &str) -> String {
        match self.format {
            OutputFormat::Text => diagnostics
                .iter()
                .map(|diagnostic| self.render_text(diagnostic, name, source))
                .collect(),
            OutputFormat::Json => serde_json::to_string(diagnostics)
                .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize: {e}\"}}")),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(diagnostics)
                .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize: {e}\"}}")),
        }
    }

    fn render_text(&self, diagnostic: &Diagnostic, name: &str, source: &str) -> String {
        let Some(location) = diagnostic.location else {
            return render_plain(diagnostic);
        };
        let start = location.offset.min(source.len());
        let span: Range<usize> = start..(start + location.length.max(1)).min(source.len()).max(start);

        let kind = match diagnostic.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
            Severity::Info | Severity::Hint => ReportKind::Advice,
        };
        let mut report = Report::build(kind, (name, span.clone()))
            .with_config(
                Config::default()
                    .with_color(self.colors)
                    .with_index_type(IndexType::Byte),
            )
            .with_code(&diagnostic.code)
            .with_message(&diagnostic.message)
            .with_label(Label::new((name, span)).with_message(&diagnostic.message));
        if let Some(hint) = &diagnostic.hint {
            report = report.with_help(hint);
        }
        if let Some(url) = &diagnostic.doc_url {
            report = report.with_note(format!("see {url}"));
        }

        let mut buffer = Vec::new();
        match report
            .finish()
            .write((name, Source::from(source)), &mut buffer)
        {
            Ok(()) => String::from_utf8_lossy(&buffer).into_owned(),
            Err(_) => render_plain(diagnostic),
        }
    }
}

/// Text form without a source snippet.
fn render_plain(diagnostic: &Diagnostic) -> String {
    let severity = match diagnostic.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "info",
        Severity::Hint => "hint",
    };
    let mut out = format!("{severity}[{}]: {}\n", diagnostic.code, diagnostic.message);
    if let Some(location) = diagnostic.location.filter(|location| location.line > 0) {
        out.push_str(&format!("  --> {}:{}\n", location.line, location.column));
    }
    if let Some(hint) = &diagnostic.hint {
        out.push_str(&format!("  = help: {hint}\n"));
    }
    if let Some(url) = &diagnostic.doc_url {
        out.push_str(&format!("  = note: see {url}\n"));
    }
    out
}
