use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::types::Resource;
use crate::error::TesterError;

/// Hands out resources round-robin across concurrent callers.
#[derive(Debug)]
pub struct ResourceFeeder {
    resources: Vec<Arc<Resource>>,
    cursor: AtomicUsize,
}

impl ResourceFeeder {
    #[must_use]
    pub const fn new(resources: Vec<Arc<Resource>>) -> Self {
        Self {
            resources,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Returns the resource at the cursor and advances it, wrapping at the end.
    ///
    /// # Errors
    ///
    /// Returns [`TesterError::EmptyResourceSet`] when there is nothing to hand out.
    pub fn next(&self) -> Result<Arc<Resource>, TesterError> {
        let len = self.resources.len();
        let index = match len {
            0 => return Err(TesterError::EmptyResourceSet),
            1 => 0,
            _ => self
                .cursor
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                    current.saturating_add(1).checked_rem(len)
                })
                .unwrap_or_else(|current| current),
        };

        self.resources
            .get(index)
            .cloned()
            .ok_or(TesterError::EmptyResourceSet)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
