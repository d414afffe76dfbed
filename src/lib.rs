//! Hand-gesture recognition for video calls.
//!
//! Landmark frames from an external hand tracker flow through
//! [`gesture::GestureClassifier`] and [`debounce::Debouncer`]; confirmed
//! gestures go to a [`pipeline::sink::GestureSink`] for the remote peer.

pub mod config;
pub mod debounce;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod pipeline;
pub mod types;

pub use config::GestureConfig;
pub use debounce::{DebouncePhase, Debouncer};
pub use error::{GestureError, InputFault};
pub use gesture::GestureClassifier;
pub use pipeline::{GestureSession, start_session};
pub use types::{FingerStates, GestureEvent, GestureKind, HandFrame, Landmark, TrackerFrame};
