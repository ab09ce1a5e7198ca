use serde::Serialize;
use std::collections::HashSet;

/// A resolved control-flow edge between two primitive execution units.
///
/// Units are task identifiers, not node names: a node that expands into
/// several chained sub-steps contributes its last sub-step as `from` and
/// its first sub-step as `to`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Relation {
    pub from_task_id: String,
    pub to_task_id: String,
}

impl Relation {
    pub fn new(from_task_id: impl Into<String>, to_task_id: impl Into<String>) -> Self {
        Self {
            from_task_id: from_task_id.into(),
            to_task_id: to_task_id.into(),
        }
    }

    /// Connect consecutive task ids into a linear chain of relations.
    pub fn chain(task_ids: &[String]) -> Vec<Relation> {
        task_ids
            .windows(2)
            .map(|pair| Relation::new(pair[0].clone(), pair[1].clone()))
            .collect()
    }
}

/// Deduplicating edge sequence.
///
/// Set semantics with first-insertion iteration order, so relation
/// statements are emitted deterministically for identical input.
#[derive(Debug, Default)]
pub struct RelationSet {
    order: Vec<Relation>,
    seen: HashSet<Relation>,
}

impl RelationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a relation; returns false if it was already present.
    pub fn insert(&mut self, relation: Relation) -> bool {
        if self.seen.contains(&relation) {
            return false;
        }
        self.seen.insert(relation.clone());
        self.order.push(relation);
        true
    }

    pub fn contains(&self, relation: &Relation) -> bool {
        self.seen.contains(relation)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relation> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_of_less_than_two_is_empty() {
        assert!(Relation::chain(&[]).is_empty());
        assert!(Relation::chain(&["a".to_string()]).is_empty());
    }

    #[test]
    fn chain_connects_consecutive_tasks() {
        let ids = vec!["t1".to_string(), "t2".to_string(), "t3".to_string()];
        assert_eq!(
            Relation::chain(&ids),
            vec![Relation::new("t1", "t2"), Relation::new("t2", "t3")]
        );
    }

    #[test]
    fn relation_set_deduplicates_and_keeps_order() {
        let mut set = RelationSet::new();
        assert!(set.insert(Relation::new("a", "b")));
        assert!(set.insert(Relation::new("b", "c")));
        assert!(!set.insert(Relation::new("a", "b")));

        let collected: Vec<_> = set.iter().cloned().collect();
        assert_eq!(collected, vec![Relation::new("a", "b"), Relation::new("b", "c")]);
        assert_eq!(set.len(), 2);
    }
}
