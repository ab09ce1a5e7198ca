//! Standard mapper library
//!
//! One module per supported node type: fixed control mappers (start,
//! end, kill, fork, join, decision) and the built-in action mappers,
//! plus the mandatory fallback for unrecognized action types.

mod decision;
mod dummy;
mod fs;
mod kill;
mod mapreduce;
mod pig;
mod prepare;
mod shell;
mod spark;
mod ssh;
mod subworkflow;
mod unknown;

pub use decision::{DecisionMapper, DecisionMapperFactory};
pub use dummy::{DummyMapper, DummyMapperFactory};
pub use fs::{FsMapper, FsMapperFactory};
pub use kill::{KillMapper, KillMapperFactory};
pub use mapreduce::{MapReduceMapper, MapReduceMapperFactory};
pub use pig::{PigMapper, PigMapperFactory};
pub use prepare::PrepareMapper;
pub use shell::{ShellMapper, ShellMapperFactory};
pub use spark::{SparkMapper, SparkMapperFactory};
pub use ssh::{SshMapper, SshMapperFactory};
pub use subworkflow::{SubworkflowMapper, SubworkflowMapperFactory};
pub use unknown::{UnknownMapper, UnknownMapperFactory};

use liftconvert::MapperRegistry;
use std::sync::Arc;

/// Register every standard mapper with a registry
pub fn register_all(registry: &mut MapperRegistry) {
    registry.register_control("start", Arc::new(DummyMapperFactory));
    registry.register_control("end", Arc::new(DummyMapperFactory));
    registry.register_control("fork", Arc::new(DummyMapperFactory));
    registry.register_control("join", Arc::new(DummyMapperFactory));
    registry.register_control("kill", Arc::new(KillMapperFactory));
    registry.register_control("decision", Arc::new(DecisionMapperFactory));

    registry.register_action(Arc::new(UnknownMapperFactory));
    registry.register_action(Arc::new(SshMapperFactory));
    registry.register_action(Arc::new(ShellMapperFactory));
    registry.register_action(Arc::new(PigMapperFactory));
    registry.register_action(Arc::new(SparkMapperFactory));
    registry.register_action(Arc::new(MapReduceMapperFactory));
    registry.register_action(Arc::new(SubworkflowMapperFactory));
    registry.register_action(Arc::new(FsMapperFactory));
}
