// THEORY:
// The `pipeline` module is the top-level API of the steering core. It owns a
// `DecisionEngine` and is handed its detector and store, so there is no hidden
// global state: a server, a capture loop and a test can each build their own
// pipeline, or share one store between several of them.
//
// A submission runs four stages:
// 1.  **Ingestion**: bytes become a `Frame`. No payload is `MissingInput`, a
//     bad payload is `DecodeFailure`; the store is not touched in either case.
// 2.  **Detection**: the injected detector lists the markers in the frame.
// 3.  **Decision**: the engine reduces the markers to one `Action`.
// 4.  **Persistence**: the action is written to the store. Computing and
//     persisting are independent, so a store failure is logged and flagged on
//     the report while the computed action is still returned.

use crate::core_modules::action::{Action, LastCommand};
use crate::core_modules::decision::{DecisionEngine, normalized_offset};
use crate::core_modules::detector::MarkerDetector;
use crate::core_modules::frame::Frame;
use crate::core_modules::marker::MarkerDetection;
use crate::core_modules::store::CommandStore;
use crate::error::SubmitError;
use std::sync::Arc;
use tracing::{debug, warn};

/// The outcome of steering on a single frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SteeringReport {
    pub action: Action,
    /// Normalized offset of the marker that drove the decision, if any.
    pub offset: Option<f64>,
    /// The marker that drove the decision, if any.
    pub marker: Option<MarkerDetection>,
    /// How many markers the detector reported.
    pub marker_count: usize,
    /// Whether the action reached the store.
    pub persisted: bool,
}

/// Detector, decision engine and store, wired together.
#[derive(Clone)]
pub struct SteeringPipeline {
    engine: DecisionEngine,
    detector: Arc<dyn MarkerDetector>,
    store: Arc<dyn CommandStore>,
}

impl SteeringPipeline {
    pub fn new(
        engine: DecisionEngine,
        detector: Arc<dyn MarkerDetector>,
        store: Arc<dyn CommandStore>,
    ) -> Self {
        Self {
            engine,
            detector,
            store,
        }
    }

    pub fn engine(&self) -> DecisionEngine {
        self.engine
    }

    pub fn store(&self) -> &Arc<dyn CommandStore> {
        &self.store
    }

    /// Runs a submitted image payload through the full pipeline.
    pub fn submit(&self, payload: Option<&[u8]>) -> Result<SteeringReport, SubmitError> {
        let bytes = payload.ok_or(SubmitError::MissingInput)?;
        let frame = Frame::from_bytes(bytes)?;
        self.process_frame(&frame)
    }

    /// Detects, decides and persists for an already decoded frame.
    pub fn process_frame(&self, frame: &Frame) -> Result<SteeringReport, SubmitError> {
        let markers = self.detector.detect(frame.gray())?;
        let geometry = frame.geometry();
        let action = self.engine.decide(&markers, geometry);
        let marker = markers.first().copied();
        let offset = marker
            .map(|m| normalized_offset(m.center.0, geometry))
            .filter(|dx| dx.is_finite());

        debug!(
            %action,
            markers = markers.len(),
            offset = ?offset,
            width = geometry.width(),
            height = geometry.height(),
            "frame decided"
        );

        let persisted = match self.store.write(action) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, %action, "failed to persist steering action");
                false
            }
        };

        Ok(SteeringReport {
            action,
            offset,
            marker,
            marker_count: markers.len(),
            persisted,
        })
    }

    /// The most recently stored command, initializing the store if needed.
    pub fn current(&self) -> Result<LastCommand, SubmitError> {
        Ok(self.store.read()?)
    }
}
