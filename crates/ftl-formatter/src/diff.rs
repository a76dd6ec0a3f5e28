//! Line diffs between a source and its formatted form

use similar::{ChangeTag, TextDiff};

/// Diff information for formatting changes
#[derive(Debug, Clone)]
pub struct FormatDiff {
    pub original: String,
    pub formatted: String,
    /// Every line of both sides, in diff order.
    pub changes: Vec<DiffChange>,
}

/// One line of a [`FormatDiff`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffChange {
    /// 1-based line in the original, 0 for added lines.
    pub original_line: usize,
    /// 1-based line in the formatted output, 0 for removed lines.
    pub formatted_line: usize,
    pub change_type: DiffChangeType,
    /// Line content without its terminator.
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffChangeType {
    Added,
    Removed,
    Unchanged,
}

impl FormatDiff {
    pub fn new(original: impl Into<String>, formatted: impl Into<String>) -> Self {
        let original = original.into();
        let formatted = formatted.into();
        let changes = TextDiff::from_lines(&original, &formatted)
            .iter_all_changes()
            .map(|change| {
                let change_type = match change.tag() {
                    ChangeTag::Delete => DiffChangeType::Removed,
                    ChangeTag::Insert => DiffChangeType::Added,
                    ChangeTag::Equal => DiffChangeType::Unchanged,
                };
                DiffChange {
                    original_line: change.old_index().map_or(0, |idx| idx + 1),
                    formatted_line: change.new_index().map_or(0, |idx| idx + 1),
                    change_type,
                    content: change.value().trim_end_matches(['\n', '\r']).to_string(),
                }
            })
            .collect();

        Self {
            original,
            formatted,
            changes,
        }
    }

    /// Number of added and removed lines
    pub fn change_count(&self) -> usize {
        self.changes
            .iter()
            .filter(|change| change.change_type != DiffChangeType::Unchanged)
            .count()
    }

    pub fn has_changes(&self) -> bool {
        self.change_count() > 0
    }

    pub fn changes_of_type(&self, change_type: DiffChangeType) -> Vec<&DiffChange> {
        self.changes
            .iter()
            .filter(|change| change.change_type == change_type)
            .collect()
    }

    /// Render as a unified diff with three lines of context.
    ///
    /// Returns an empty string when nothing changed.
    pub fn unified(&self, name: &str) -> String {
        if !self.has_changes() {
            return String::new();
        }
        TextDiff::from_lines(&self.original, &self.formatted)
            .unified_diff()
            .context_radius(3)
            .header(&format!("a/{name}"), &format!("b/{name}"))
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_numbers() {
        let diff = FormatDiff::new("a = 1\nb=2\nc = 3\n", "a = 1\nb = 2\nc = 3\n");

        assert_eq!(diff.change_count(), 2);
        assert_eq!(
            diff.changes_of_type(DiffChangeType::Removed),
            vec![&DiffChange {
                original_line: 2,
                formatted_line: 0,
                change_type: DiffChangeType::Removed,
                content: "b=2".into(),
            }]
        );
        assert_eq!(
            diff.changes_of_type(DiffChangeType::Added),
            vec![&DiffChange {
                original_line: 0,
                formatted_line: 2,
                change_type: DiffChangeType::Added,
                content: "b = 2".into(),
            }]
        );
    }

    #[test]
    fn test_unchanged() {
        let diff = FormatDiff::new("a = 1\n", "a = 1\n");
        assert!(!diff.has_changes());
        assert_eq!(diff.unified("main.ftl"), "");
    }

    #[test]
    fn test_unified_header() {
        let diff = FormatDiff::new("a=1\n", "a = 1\n");
        let unified = diff.unified("main.ftl");
        assert!(unified.starts_with("--- a/main.ftl\n+++ b/main.ftl\n"));
        assert!(unified.contains("-a=1\n"));
        assert!(unified.contains("+a = 1\n"));
    }
}
