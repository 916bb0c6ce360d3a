use super::block::BlockHandle;
use thiserror::Error;

/// Failures surfaced by the block collection manager.
///
/// Hitting the one-block floor is not an error; see [`super::RemoveStatus::AtFloor`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormsetError {
    /// The page description handed to the manager is missing something or is inconsistent.
    #[error("formset configuration error: {0}")]
    Configuration(String),

    /// A delete trigger id broke the `{namespace}-delete-{index}` contract.
    #[error("invariant violation on '{id}': {reason}")]
    InvariantViolation { id: String, reason: String },

    #[error("no live block with handle {0}")]
    UnknownHandle(BlockHandle),

    #[error("block has no field with role '{0}'")]
    UnknownField(String),
}
