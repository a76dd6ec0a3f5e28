//! Per-call resolution state

use tracing::debug;

use super::errors::ResolverError;
use crate::syntax::depth::DepthGuard;

/// State of a single `resolve` call: the keys being resolved, innermost
/// last, and the errors collected so far. Owned by one call stack.
#[derive(Debug, Default)]
pub(crate) struct ResolutionContext {
    stack: Vec<String>,
    errors: Vec<ResolverError>,
}

impl ResolutionContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn report(&mut self, error: ResolverError) {
        debug!("Resolution error: {}", error);
        self.errors.push(error);
    }

    pub(crate) fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub(crate) fn into_errors(self) -> Vec<ResolverError> {
        self.errors
    }

    /// Run `resolve` with `key` on the stack. Returns `None` after reporting
    /// when `key` is already being resolved or the depth limit is reached.
    pub(crate) fn with_frame<R>(
        &mut self,
        key: String,
        guard: DepthGuard,
        resolve: impl FnOnce(&mut Self, DepthGuard) -> R,
    ) -> Option<R> {
        if self.stack.contains(&key) {
            let mut chain = self.stack.clone();
            chain.push(key.clone());
            self.report(ResolverError::Cyclic { key, chain });
            return None;
        }
        let guard = match guard.enter() {
            Ok(guard) => guard,
            Err(err) => {
                self.report(ResolverError::DepthExceeded {
                    key,
                    max_depth: err.max_depth,
                });
                return None;
            }
        };

        self.stack.push(key);
        let result = resolve(self, guard);
        self.stack.pop();
        Some(result)
    }

    /// Innermost key, for depth errors raised below a reference.
    pub(crate) fn current_key(&self) -> &str {
        self.stack.last().map(String::as_str).unwrap_or("")
    }

    #[cfg(test)]
    fn depth(&self) -> usize {
        self.stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_is_popped() {
        let mut ctx = ResolutionContext::new();
        let inner = ctx.with_frame("a".into(), DepthGuard::new(10), |ctx, _| ctx.depth());
        assert_eq!(inner, Some(1));
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn test_cycle_reports_chain() {
        let mut ctx = ResolutionContext::new();
        let result = ctx.with_frame("a".into(), DepthGuard::new(10), |ctx, guard| {
            ctx.with_frame("b".into(), guard, |ctx, guard| {
                ctx.with_frame("a".into(), guard, |_, _| ())
            })
        });
        assert_eq!(result, Some(Some(None)));
        assert_eq!(
            ctx.into_errors(),
            vec![ResolverError::Cyclic {
                key: "a".into(),
                chain: vec!["a".into(), "b".into(), "a".into()]
            }]
        );
    }

    #[test]
    fn test_depth_limit() {
        let mut ctx = ResolutionContext::new();
        let result = ctx.with_frame("a".into(), DepthGuard::new(1), |ctx, guard| {
            ctx.with_frame("b".into(), guard, |_, _| ())
        });
        assert_eq!(result, Some(None));
        assert!(matches!(
            ctx.into_errors().as_slice(),
            [ResolverError::DepthExceeded { max_depth: 1, .. }]
        ));
    }
}
