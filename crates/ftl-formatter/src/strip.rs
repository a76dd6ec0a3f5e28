//! Comment removal

use ftl_core::syntax::{Comment, Entry, Transform, Transformer};

/// Drops standalone comments and the comments attached to messages and
/// terms. Junk is left alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct StripComments {
    removed: usize,
}

impl StripComments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Comments removed so far.
    pub fn removed(&self) -> usize {
        self.removed
    }
}

impl Transformer for StripComments {
    fn transform_entry(&mut self, entry: &Entry) -> Transform<Entry> {
        match entry {
            Entry::Comment(_) => {
                self.removed += 1;
                Transform::Remove
            }
            _ => Transform::Keep,
        }
    }

    fn transform_comment(&mut self, _comment: &Comment) -> Transform<Comment> {
        self.removed += 1;
        Transform::Remove
    }
}
