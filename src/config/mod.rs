use crate::utils::validation::MAX_FILE_SIZE;
use secrecy::SecretString;
use std::env;
use std::path::PathBuf;

/// Runtime configuration for the transcription service
#[derive(Debug, Clone)]
pub struct TranscribeConfig {
    /// Maximum upload size in bytes (default: 50 MB)
    pub max_file_size: usize,

    /// Scratch directory for staged uploads (default: "temp_uploads")
    pub upload_dir: PathBuf,

    /// Recognizer backend: "whisper" or "disabled" (default: "whisper")
    pub recognizer_type: String,

    /// Base URL of an OpenAI-compatible transcription server
    pub recognizer_url: String,

    /// Model name sent to the recognizer (default: "small")
    pub recognizer_model: String,

    /// Optional bearer token for the recognizer
    pub recognizer_api_key: Option<SecretString>,

    /// Language hint for recognition (default: "bn")
    pub recognizer_language: String,

    /// Recognition timeout in seconds (default: 300)
    pub recognize_timeout_secs: u64,

    /// Refinement API key. Refinement is disabled when absent.
    pub openai_api_key: Option<SecretString>,

    /// Refinement API base URL
    pub openai_base_url: String,

    /// Chat model used for refinement (default: "gpt-4o-mini")
    pub refine_model: String,

    pub refine_temperature: f32,

    pub refine_max_tokens: u32,

    /// Refinement timeout in seconds (default: 60)
    pub refine_timeout_secs: u64,

    /// Allowed CORS Origins (comma separated, "*" for any)
    pub allowed_origins: Vec<String>,
}

impl Default for TranscribeConfig {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            upload_dir: PathBuf::from("temp_uploads"),
            recognizer_type: "whisper".to_string(),
            recognizer_url: "http://127.0.0.1:8000/v1".to_string(),
            recognizer_model: "small".to_string(),
            recognizer_api_key: None,
            recognizer_language: "bn".to_string(),
            recognize_timeout_secs: 300,
            openai_api_key: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            refine_model: "gpt-4o-mini".to_string(),
            refine_temperature: 0.3,
            refine_max_tokens: 1000,
            refine_timeout_secs: 60,
            allowed_origins: vec!["*".to_string()],
        }
    }
}

impl TranscribeConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            upload_dir: env::var("UPLOAD_FOLDER")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            recognizer_type: env::var("RECOGNIZER_TYPE").unwrap_or(default.recognizer_type),

            recognizer_url: env::var("RECOGNIZER_URL").unwrap_or(default.recognizer_url),

            recognizer_model: env::var("RECOGNIZER_MODEL").unwrap_or(default.recognizer_model),

            recognizer_api_key: secret_var("RECOGNIZER_API_KEY"),

            recognizer_language: env::var("RECOGNIZER_LANGUAGE")
                .unwrap_or(default.recognizer_language),

            recognize_timeout_secs: env::var("RECOGNIZE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.recognize_timeout_secs),

            openai_api_key: secret_var("OPENAI_API_KEY"),

            openai_base_url: env::var("OPENAI_BASE_URL").unwrap_or(default.openai_base_url),

            refine_model: env::var("REFINE_MODEL").unwrap_or(default.refine_model),

            refine_temperature: env::var("REFINE_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.refine_temperature),

            refine_max_tokens: env::var("REFINE_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.refine_max_tokens),

            refine_timeout_secs: env::var("REFINE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.refine_timeout_secs),

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(default.allowed_origins),
        }
    }

    /// Create config for development (no refinement, short timeouts)
    pub fn development() -> Self {
        Self {
            upload_dir: env::temp_dir().join("bangla-transcribe-dev"),
            recognize_timeout_secs: 30,
            openai_api_key: None,
            refine_timeout_secs: 10,
            ..Self::default()
        }
    }

    pub fn refinement_enabled(&self) -> bool {
        self.openai_api_key.is_some()
    }
}

/// Empty values count as unset so `OPENAI_API_KEY=` in a .env file disables refinement.
fn secret_var(key: &str) -> Option<SecretString> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_default_config() {
        let config = TranscribeConfig::default();
        assert_eq!(config.max_file_size, 50 * 1024 * 1024);
        assert_eq!(config.upload_dir, PathBuf::from("temp_uploads"));
        assert_eq!(config.recognizer_type, "whisper");
        assert_eq!(config.refine_model, "gpt-4o-mini");
        assert_eq!(config.refine_max_tokens, 1000);
        assert!(!config.refinement_enabled());
    }

    #[test]
    fn test_development_config() {
        let config = TranscribeConfig::development();
        assert!(!config.refinement_enabled());
        assert_eq!(config.recognize_timeout_secs, 30);
        assert_eq!(config.max_file_size, 50 * 1024 * 1024);
    }

    #[test]
    fn test_from_env_reads_overrides() {
        temp_env::with_vars(
            [
                ("MAX_FILE_SIZE", Some("1024")),
                ("UPLOAD_FOLDER", Some("/tmp/scratch")),
                ("OPENAI_API_KEY", Some("sk-test")),
                ("REFINE_TEMPERATURE", Some("0.7")),
                ("ALLOWED_ORIGINS", Some("http://a.test, http://b.test")),
            ],
            || {
                let config = TranscribeConfig::from_env();
                assert_eq!(config.max_file_size, 1024);
                assert_eq!(config.upload_dir, PathBuf::from("/tmp/scratch"));
                assert!(config.refinement_enabled());
                assert_eq!(
                    config.openai_api_key.as_ref().unwrap().expose_secret(),
                    "sk-test"
                );
                assert!((config.refine_temperature - 0.7).abs() < f32::EPSILON);
                assert_eq!(config.allowed_origins, vec!["http://a.test", "http://b.test"]);
            },
        );
    }

    #[test]
    fn test_empty_api_key_disables_refinement() {
        temp_env::with_var("OPENAI_API_KEY", Some("  "), || {
            assert!(!TranscribeConfig::from_env().refinement_enabled());
        });
    }

    #[test]
    fn test_invalid_numbers_fall_back_to_defaults() {
        temp_env::with_vars(
            [
                ("MAX_FILE_SIZE", Some("lots")),
                ("RECOGNIZE_TIMEOUT_SECS", Some("-1")),
            ],
            || {
                let config = TranscribeConfig::from_env();
                assert_eq!(config.max_file_size, 50 * 1024 * 1024);
                assert_eq!(config.recognize_timeout_secs, 300);
            },
        );
    }
}
