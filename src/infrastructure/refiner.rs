use crate::config::TranscribeConfig;
use crate::services::refiner::{OpenAiRefiner, TextRefiner};
use std::sync::Arc;
use tracing::{error, info, warn};

pub fn setup_refiner(config: &TranscribeConfig) -> Option<Arc<dyn TextRefiner>> {
    if !config.refinement_enabled() {
        warn!("⚠️  OPENAI_API_KEY not found in environment. Text refinement will be disabled.");
        return None;
    }

    match OpenAiRefiner::from_config(config) {
        Ok(Some(refiner)) => {
            info!(
                "✨ Text refinement enabled (model={}, endpoint={})",
                config.refine_model, config.openai_base_url
            );
            Some(Arc::new(refiner))
        }
        Ok(None) => None,
        Err(e) => {
            error!("❌ Failed to initialize text refiner: {}. Text refinement will be disabled.", e);
            None
        }
    }
}
