use crate::error::ConvertError;
use crate::trigger::TriggerRule;
use std::collections::BTreeSet;
use std::path::Path;

/// Translation strategy bound to one workflow node.
///
/// A mapper owns all target-language knowledge for its node type: the
/// fragment it renders, the imports that fragment relies on, and the
/// decomposition into primitive execution units. The conversion engine
/// only ever talks to this trait; optional capabilities are reached
/// through the explicit casts below, never through downcasting.
pub trait Mapper {
    /// Source tag this mapper translates (e.g. "ssh", "fork").
    fn mapper_type(&self) -> &str;

    /// Task name this mapper was bound to at parse time.
    fn name(&self) -> &str;

    /// Render the ready-to-embed target-language fragment.
    ///
    /// The trigger rule is the node's final classification from the
    /// trigger-rule pass; it is handed in at emission time since it is
    /// not known while the graph is still being parsed.
    fn convert_to_text(&self, trigger_rule: TriggerRule) -> Result<String, ConvertError>;

    /// Import statements the rendered fragment relies on.
    fn required_imports(&self) -> BTreeSet<String>;

    /// First primitive execution unit; inbound edges attach here.
    fn first_task_id(&self) -> String {
        self.name().to_string()
    }

    /// Last primitive execution unit; outbound edges leave from here.
    fn last_task_id(&self) -> String {
        self.name().to_string()
    }

    /// Copy auxiliary files (scripts, helper modules) next to the
    /// generated program. Called once per node during emission.
    fn copy_extra_assets(
        &self,
        _input_directory: &Path,
        _output_directory: &Path,
    ) -> Result<(), ConvertError> {
        Ok(())
    }

    /// Capability cast for mappers that accept file references.
    fn as_file_collector(&mut self) -> Option<&mut dyn FileCollector> {
        None
    }

    /// Capability cast for mappers that accept archive references.
    fn as_archive_collector(&mut self) -> Option<&mut dyn ArchiveCollector> {
        None
    }
}

/// Capability: the mapper attaches `<file>` references to its job.
pub trait FileCollector {
    fn add_file(&mut self, path: String);
}

/// Capability: the mapper attaches `<archive>` references to its job.
pub trait ArchiveCollector {
    fn add_archive(&mut self, path: String);
}
