use thiserror::Error;

/// Failures surfaced to the host.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// GPU context could not be acquired (or re-acquired); show a fallback.
    #[error("engine unavailable: {0}")]
    Unavailable(String),
    #[error("engine already disposed")]
    Disposed,
}

/// Failures reported by a [`crate::FrameRenderer`] for one frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The device or surface was evicted; resources must be re-acquired.
    #[error("graphics context lost")]
    ContextLost,
    /// The surface needs reconfiguring; skip this frame.
    #[error("surface outdated")]
    Outdated,
    #[error("render failed: {0}")]
    Fatal(String),
}
