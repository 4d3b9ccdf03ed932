use crate::types::{InstanceId, SurfaceId};

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("surface '{surface}' unavailable: {reason}")]
    SurfaceUnavailable { surface: SurfaceId, reason: String },
    #[error("instance '{0}' already exists")]
    DuplicateInstance(InstanceId),
}

/// Failures reported by a graphics backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("graphics context unavailable: {0}")]
    ContextUnavailable(String),
    #[error("failed to allocate render bundle: {0}")]
    Allocation(String),
    #[error("graphics context lost")]
    Lost,
    #[error(transparent)]
    Gpu(#[from] anyhow::Error),
}
