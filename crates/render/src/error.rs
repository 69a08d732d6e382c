use orrery_common::NodeHandle;

/// Errors from building renderer-side scene state.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("parent node {0} does not exist")]
    UnknownParent(NodeHandle),
    #[error("unknown material {material:?} referenced by {referrer}")]
    UnknownMaterial { material: String, referrer: String },
}
