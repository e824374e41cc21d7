use std::path::Path;
use std::sync::Arc;

use log::{error, info};
use tract_onnx::prelude::*;

use crate::classifier::preprocess::{INPUT_HEIGHT, INPUT_WIDTH};
use crate::error::ClassifyError;

type Plan = TypedRunnableModel<TypedModel>;

/// Adapter over the pre-trained model. The plan is loaded once at startup
/// and shared read-only across requests; a missing plan means the process is
/// running in degraded mode and every classify request is refused.
#[derive(Clone)]
pub struct Classifier {
    plan: Option<Arc<Plan>>,
}

impl Classifier {
    pub fn load(model_path: &Path) -> TractResult<Self> {
        let plan = tract_onnx::onnx()
            .model_for_path(model_path)?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(
                    f32::datum_type(),
                    tvec!(1, INPUT_HEIGHT as usize, INPUT_WIDTH as usize, 3),
                ),
            )?
            .into_optimized()?
            .into_runnable()?;
        Ok(Self {
            plan: Some(Arc::new(plan)),
        })
    }

    /// Load-failure at startup degrades the process instead of aborting it.
    pub fn load_or_disabled(model_path: &Path) -> Self {
        match Self::load(model_path) {
            Ok(classifier) => {
                info!("Model loaded from {}", model_path.display());
                classifier
            }
            Err(e) => {
                error!(
                    "Failed to load model from {}: {e}; classification is disabled",
                    model_path.display()
                );
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self { plan: None }
    }

    pub fn is_available(&self) -> bool {
        self.plan.is_some()
    }

    /// Single pass-through run returning the class probability vector. No
    /// batching, no retry, no timeout.
    pub fn predict(&self, input: Tensor) -> Result<Vec<f32>, ClassifyError> {
        let plan = self.plan.as_ref().ok_or(ClassifyError::ModelUnavailable)?;
        let outputs = plan
            .run(tvec!(input.into()))
            .map_err(|e| ClassifyError::Inference(e.to_string()))?;
        let probabilities = outputs
            .first()
            .ok_or_else(|| ClassifyError::Inference("model produced no outputs".to_string()))?
            .to_array_view::<f32>()
            .map_err(|e| ClassifyError::Inference(e.to_string()))?;
        Ok(probabilities.iter().copied().collect())
    }
}
