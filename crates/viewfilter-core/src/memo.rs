//! Per-call identity memo
//!
//! Maps each source reference already visited in the current projection to
//! its projection. Keys are allocation addresses, never structural equality,
//! so two equal but distinct sources get two distinct projections. The memo
//! keeps the source alive while it holds the entry, which keeps the address
//! from being reused within the call.

use std::collections::HashMap;

use crate::model::Value;

#[derive(Default)]
pub struct IdentityMemo {
    entries: HashMap<usize, (Value, Value)>,
}

impl IdentityMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Projection recorded for `original`, if it was already visited
    pub fn lookup(&self, original: &Value) -> Option<Value> {
        let key = original.identity()?;
        self.entries
            .get(&key)
            .map(|(_, projection)| projection.clone())
    }

    /// Record `projection` for `original`
    ///
    /// Must be called with the freshly allocated shell before visiting the
    /// original's children. Values without identity are ignored.
    pub fn record(&mut self, original: &Value, projection: Value) {
        if let Some(key) = original.identity() {
            self.entries.insert(key, (original.clone(), projection));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ElementType, ObjectArray};

    #[test]
    fn test_lookup_by_identity() {
        let mut memo = IdentityMemo::new();
        let a = Value::array(ObjectArray::with_len(ElementType::Any, 1));
        let equal_but_distinct = Value::array(ObjectArray::with_len(ElementType::Any, 1));
        let shell = Value::array(ObjectArray::with_len(ElementType::Any, 1));

        memo.record(&a, shell.clone());

        assert!(memo.lookup(&a).unwrap().same_ref(&shell));
        assert!(memo.lookup(&a.clone()).unwrap().same_ref(&shell));
        assert!(memo.lookup(&equal_but_distinct).is_none());
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn test_scalars_are_not_recorded() {
        let mut memo = IdentityMemo::new();
        memo.record(&Value::Int(1), Value::Int(1));
        memo.record(&Value::Null, Value::Null);
        assert!(memo.is_empty());
        assert!(memo.lookup(&Value::Int(1)).is_none());
    }
}
