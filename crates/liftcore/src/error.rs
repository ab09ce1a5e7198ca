use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Node '{node}' is missing required child element <{child}>")]
    MissingChild { node: String, child: String },

    #[error("Element <{element}> is missing required attribute '{attribute}'")]
    MissingAttribute { element: String, attribute: String },

    #[error("Node '{node}' references unknown node '{target}'")]
    DanglingReference { node: String, target: String },

    #[error("Duplicate node name: {0}")]
    DuplicateName(String),

    #[error("Node '{node}' does not accept {capability} references")]
    UnsupportedCapability { node: String, capability: String },

    #[error("Unknown fs operation '{op}' in node '{node}'")]
    UnknownFsOperation { node: String, op: String },

    #[error("Unknown control node type: {0}")]
    UnknownControlType(String),

    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
