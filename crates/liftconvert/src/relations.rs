use liftcore::{NodeMap, Relation, RelationSet};
use tracing::debug;

/// Produce the full relation set for a completed node graph.
///
/// For each node, one relation per downstream name plus one for the
/// error target if set. Endpoints are primitive execution units, so a
/// node backed by a multi-step mapper contributes its boundary sub-steps
/// rather than its own name. The set is recomputed from scratch on every
/// call, which keeps rebuilding idempotent.
pub fn build_relations(nodes: &NodeMap) -> RelationSet {
    let mut relations = RelationSet::new();
    for node in nodes.iter() {
        for downstream in node.downstream_names() {
            if let Some(target) = nodes.get(downstream) {
                relations.insert(Relation::new(node.last_task_id(), target.first_task_id()));
            }
        }
        if let Some(error_name) = node.error_name() {
            if let Some(target) = nodes.get(error_name) {
                relations.insert(Relation::new(node.last_task_id(), target.first_task_id()));
            }
        }
    }
    debug!(count = relations.len(), "built relations");
    relations
}
