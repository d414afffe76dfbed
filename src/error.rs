use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum GestureError {
    #[error("invalid input: {0}")]
    InvalidInput(InputFault),
    #[error("configuration error: {field} {reason}")]
    Configuration { field: &'static str, reason: String },
}

/// What was wrong with a hand frame handed over by the tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum InputFault {
    #[error("expected 21 landmarks, got {0}")]
    LandmarkCount(usize),
    #[error("landmark {0} is missing")]
    MissingLandmark(usize),
    #[error("landmark {0} has non-finite coordinates")]
    NonFinite(usize),
}

impl From<InputFault> for GestureError {
    fn from(fault: InputFault) -> Self {
        GestureError::InvalidInput(fault)
    }
}

impl GestureError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        GestureError::Configuration {
            field,
            reason: reason.into(),
        }
    }
}
