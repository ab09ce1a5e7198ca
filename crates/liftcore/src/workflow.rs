use crate::node::NodeMap;
use std::collections::BTreeSet;

/// The fully parsed workflow graph.
///
/// Owned by the parser while it is being built and handed off read-only
/// afterwards; the relation and trigger-rule passes are pure consumers
/// that return their results separately.
#[derive(Debug)]
pub struct ParsedWorkflow {
    pub dag_name: String,
    pub nodes: NodeMap,
    /// Import declarations the generated program requires. Accumulated
    /// additively from every node's mapper; sorted for emission.
    pub dependencies: BTreeSet<String>,
}

impl ParsedWorkflow {
    pub fn new(dag_name: impl Into<String>) -> Self {
        // Every generated program needs these regardless of which
        // mappers end up being used.
        let dependencies = BTreeSet::from(
            [
                "import datetime",
                "from airflow import models",
                "from airflow.utils import dates",
                "from airflow.utils.trigger_rule import TriggerRule",
            ]
            .map(String::from),
        );
        Self {
            dag_name: dag_name.into(),
            nodes: NodeMap::new(),
            dependencies,
        }
    }
}
