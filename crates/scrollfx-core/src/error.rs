use thiserror::Error;

/// Construction and configuration errors.
///
/// Per-frame conditions (an element not laid out yet, a cable collapsed to a
/// point) are not errors; those surface as [`SkipReason`] in frame reports.
#[derive(Debug, Error)]
pub enum FxError {
    #[error("invalid timeline segment #{index}: {reason}")]
    InvalidSegment { index: usize, reason: String },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("unknown component `{0}`")]
    UnknownComponent(String),

    #[error("duplicate component id `{0}`")]
    DuplicateComponent(String),

    #[error("outline `{0}` has no points")]
    EmptyOutline(String),

    #[error("scene description parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl FxError {
    pub fn invalid_segment(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidSegment {
            index,
            reason: reason.into(),
        }
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn unknown(id: impl Into<String>) -> Self {
        Self::UnknownComponent(id.into())
    }
}

pub type FxResult<T> = Result<T, FxError>;

/// Why a component did no work this frame. The component keeps its last good
/// state and recovers on its own once inputs are valid again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MeasurementNotReady,
    MissingReference,
    DegenerateGeometry,
    ReentrantTrigger,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::MeasurementNotReady => "measurement not ready",
            SkipReason::MissingReference => "missing reference",
            SkipReason::DegenerateGeometry => "degenerate geometry",
            SkipReason::ReentrantTrigger => "re-entrant trigger",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
