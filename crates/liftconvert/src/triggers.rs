use liftcore::{NodeMap, TriggerRule};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Classify every node's activation policy from the complete edge set.
///
/// A node is reachable-on-success if any node lists it as a downstream,
/// and reachable-on-error if any node names it as an error target; the
/// pair picks the trigger rule. Must run only after parsing has
/// finished, since a node's classification depends on every edge
/// pointing at it, including ones discovered late in traversal order.
/// Returns an annotation map keyed by node name; the graph itself is
/// left untouched, and the result depends only on the final edge set.
pub fn resolve_trigger_rules(nodes: &NodeMap) -> BTreeMap<String, TriggerRule> {
    let mut on_success: HashSet<&str> = HashSet::new();
    let mut on_error: HashSet<&str> = HashSet::new();

    for node in nodes.iter() {
        for downstream in node.downstream_names() {
            on_success.insert(downstream);
        }
        if let Some(error_name) = node.error_name() {
            on_error.insert(error_name);
        }
    }

    let rules: BTreeMap<String, TriggerRule> = nodes
        .iter()
        .map(|node| {
            let name = node.name();
            let rule = TriggerRule::from_reachability(
                on_success.contains(name),
                on_error.contains(name),
            );
            (name.to_string(), rule)
        })
        .collect();

    debug!(count = rules.len(), "resolved trigger rules");
    rules
}
