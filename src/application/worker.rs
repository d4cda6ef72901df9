//! Background prediction worker.
//!
//! Runs an assessment on its own thread so a presentation layer can keep
//! drawing a "working" indicator while the model computes. There is no
//! cancellation: inference is short-lived and runs to completion.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::application::PredictionService;
use crate::domain::{Assessment, RawInputRecord};
use crate::ports::InferenceModel;

/// Progress updates from the prediction worker.
#[derive(Debug, Clone)]
pub enum PredictionProgress {
    /// Assembling the feature vector
    Building,
    /// Vector accepted, model is running
    Predicting,
    /// Prediction complete
    Complete(Assessment),
    /// Error occurred during prediction
    Failed(String),
}

impl PredictionProgress {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete(_) | Self::Failed(_))
    }
}

/// Handle to a running prediction.
pub struct PredictionHandle {
    progress_rx: Receiver<PredictionProgress>,
    handle: JoinHandle<()>,
}

impl PredictionHandle {
    /// Try to receive the next progress update (non-blocking).
    #[must_use]
    pub fn try_recv(&self) -> Option<PredictionProgress> {
        self.progress_rx.try_recv().ok()
    }

    /// Block until the next update; `None` once the worker has finished.
    #[must_use]
    pub fn recv(&self) -> Option<PredictionProgress> {
        self.progress_rx.recv().ok()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Worker that runs predictions in the background.
pub struct PredictionWorker;

impl PredictionWorker {
    /// Spawn a background assessment.
    ///
    /// Returns a handle to receive progress updates.
    pub fn spawn<M>(service: Arc<PredictionService<M>>, raw: RawInputRecord) -> PredictionHandle
    where
        M: InferenceModel + 'static,
    {
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            Self::run_with_progress(&service, &raw, &tx);
        });

        PredictionHandle {
            progress_rx: rx,
            handle,
        }
    }

    fn run_with_progress<M>(
        service: &PredictionService<M>,
        raw: &RawInputRecord,
        tx: &Sender<PredictionProgress>,
    ) where
        M: InferenceModel,
    {
        // Receiver may already be gone; nothing to report to in that case.
        let _ = tx.send(PredictionProgress::Building);

        let update = match service.prepare(raw) {
            Ok(vector) => {
                let _ = tx.send(PredictionProgress::Predicting);
                match service.assess_vector(&vector) {
                    Ok(assessment) => PredictionProgress::Complete(assessment),
                    Err(e) => PredictionProgress::Failed(e.to_string()),
                }
            }
            Err(e) => PredictionProgress::Failed(e.to_string()),
        };

        let _ = tx.send(update);
    }
}
