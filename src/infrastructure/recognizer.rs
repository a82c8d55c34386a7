use crate::config::TranscribeConfig;
use crate::services::recognizer::{SpeechRecognizer, create_recognizer};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Builds the configured recognizer. A misconfigured recognizer is logged and
/// left out so the server still starts and answers with a clear error.
pub async fn setup_recognizer(config: &TranscribeConfig) -> Option<Arc<dyn SpeechRecognizer>> {
    let recognizer = match create_recognizer(config) {
        Ok(Some(recognizer)) => recognizer,
        Ok(None) => {
            warn!("⚠️  Speech recognition disabled (RECOGNIZER_TYPE={})", config.recognizer_type);
            return None;
        }
        Err(e) => {
            error!("❌ Failed to load speech recognizer: {}", e);
            return None;
        }
    };

    // Warm up the backend connection
    if recognizer.health_check().await {
        info!(
            "🎙️  Speech recognizer '{}' connected (model={}, language={})",
            recognizer.name(),
            config.recognizer_model,
            config.recognizer_language
        );
    } else {
        warn!(
            "⚠️  Speech recognizer unreachable at {}! Transcriptions will fail until it comes up.",
            config.recognizer_url
        );
    }

    Some(recognizer.into())
}
