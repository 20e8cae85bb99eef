//! Declaration-order sequence generator.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::column::ColumnDecl;

/// Monotonic counter handing out ordering keys to column declarations.
///
/// Clones share the same counter, so one sequence can be handed to several
/// shape builders that are assembled concurrently.
#[derive(Debug, Clone, Default)]
pub struct DeclarationSequence {
    next: Arc<AtomicU64>,
}

impl DeclarationSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next ordering key.
    pub fn next_key(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Stamp `column` with the next key, keeping any key it already has.
    pub fn stamp(&self, mut column: ColumnDecl) -> ColumnDecl {
        if column.ordering_key.is_none() {
            column.ordering_key = Some(self.next_key());
        }
        column
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::SemanticType;

    #[test]
    fn test_keys_are_monotonic_across_clones() {
        let seq = DeclarationSequence::new();
        let other = seq.clone();
        assert_eq!(seq.next_key(), 0);
        assert_eq!(other.next_key(), 1);
        assert_eq!(seq.next_key(), 2);
    }

    #[test]
    fn test_stamp_keeps_existing_key() {
        let seq = DeclarationSequence::new();
        let c = seq.stamp(ColumnDecl::new("a", SemanticType::Integer).ordering_key(42));
        assert_eq!(c.ordering_key, Some(42));
        let c = seq.stamp(ColumnDecl::new("b", SemanticType::Integer));
        assert_eq!(c.ordering_key, Some(0));
    }
}
