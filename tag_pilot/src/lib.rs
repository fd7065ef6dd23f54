// THEORY:
// This file is the main entry point for the `tag_pilot` library crate.
// It exposes the public API consumed by the HTTP server and the live capture
// tool: the `SteeringPipeline` and the data structures that flow through it
// (`Action`, `LastCommand`, `MarkerDetection`, `FrameGeometry`, ...).
//
// The decision logic and the shared last-command store live in `core_modules`.
// The pipeline wires them together with an injected detector so that neither
// the server nor the tracker owns any process-wide state.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod pipeline;

pub use config::{PilotConfig, TagFamily};
pub use core_modules::action::{Action, LastCommand};
pub use core_modules::decision::{DecisionEngine, classify, decide, normalized_offset};
pub use core_modules::detector::{FixedDetector, MarkerDetector};
pub use core_modules::frame::{Frame, decode_frame};
pub use core_modules::geometry::FrameGeometry;
pub use core_modules::marker::MarkerDetection;
pub use core_modules::store::{CommandStore, FileStore, MemoryStore};
pub use error::{ConfigError, DetectorError, FrameError, StoreError, SubmitError};
pub use pipeline::{SteeringPipeline, SteeringReport};

#[cfg(feature = "opencv")]
pub use core_modules::detector::aruco::ArucoTagDetector;
