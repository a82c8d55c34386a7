#![allow(dead_code)]

use async_trait::async_trait;
use axum::{Router, body::Body, http::Request, response::Response};
use bangla_transcribe::config::TranscribeConfig;
use bangla_transcribe::services::recognizer::{RecognitionError, SpeechRecognizer};
use bangla_transcribe::services::refiner::{RefineError, TextRefiner};
use bangla_transcribe::services::transcription_service::TranscriptionService;
use bangla_transcribe::{AppState, create_app};
use http_body_util::BodyExt;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const BOUNDARY: &str = "----bangla-transcribe-test-boundary";

/// Canned outcome for [`MockRecognizer`]
pub enum Recognition {
    Text(&'static str),
    NoSpeech,
    Fail,
}

pub struct MockRecognizer {
    outcome: Recognition,
    /// Staged paths and whether each existed when recognition ran
    pub seen: Mutex<Vec<(PathBuf, bool)>>,
}

impl MockRecognizer {
    pub fn new(outcome: Recognition) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl SpeechRecognizer for MockRecognizer {
    async fn recognize(&self, audio_path: &Path) -> Result<String, RecognitionError> {
        self.seen
            .lock()
            .unwrap()
            .push((audio_path.to_path_buf(), audio_path.exists()));

        match self.outcome {
            Recognition::Text(text) => Ok(text.to_string()),
            Recognition::NoSpeech => Err(RecognitionError::NoSpeech),
            Recognition::Fail => Err(RecognitionError::Api {
                status: 500,
                message: "decoder crashed".to_string(),
            }),
        }
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "mock"
    }
}

pub fn recognizer(mock: &Arc<MockRecognizer>) -> Option<Arc<dyn SpeechRecognizer>> {
    Some(mock.clone())
}

pub fn refiner<R: TextRefiner + 'static>(refiner: R) -> Option<Arc<dyn TextRefiner>> {
    Some(Arc::new(refiner))
}

/// Appends a full stop, the way the refinement model fixes punctuation
pub struct PunctuatingRefiner;

#[async_trait]
impl TextRefiner for PunctuatingRefiner {
    async fn refine(&self, text: &str) -> Result<String, RefineError> {
        Ok(format!("{}।", text))
    }

    fn name(&self) -> &str {
        "punctuating"
    }
}

pub struct EchoRefiner;

#[async_trait]
impl TextRefiner for EchoRefiner {
    async fn refine(&self, text: &str) -> Result<String, RefineError> {
        Ok(text.to_string())
    }

    fn name(&self) -> &str {
        "echo"
    }
}

pub struct FailingRefiner;

#[async_trait]
impl TextRefiner for FailingRefiner {
    async fn refine(&self, _text: &str) -> Result<String, RefineError> {
        Err(RefineError::Api {
            status: 429,
            message: "rate limited".to_string(),
        })
    }

    fn name(&self) -> &str {
        "failing"
    }
}

pub struct TestApp {
    pub router: Router,
    pub upload_dir: TempDir,
}

impl TestApp {
    pub fn new(
        recognizer: Option<Arc<dyn SpeechRecognizer>>,
        refiner: Option<Arc<dyn TextRefiner>>,
    ) -> Self {
        Self::with_config(recognizer, refiner, |_| {})
    }

    pub fn with_config(
        recognizer: Option<Arc<dyn SpeechRecognizer>>,
        refiner: Option<Arc<dyn TextRefiner>>,
        customize: impl FnOnce(&mut TranscribeConfig),
    ) -> Self {
        let upload_dir = tempfile::tempdir().unwrap();
        let mut config = TranscribeConfig::development();
        config.upload_dir = upload_dir.path().to_path_buf();
        customize(&mut config);

        let service = Arc::new(TranscriptionService::new(recognizer, refiner, &config));
        let router = create_app(AppState {
            transcription_service: service,
            config,
        });

        Self { router, upload_dir }
    }

    /// Files left in the staging directory
    pub fn staged_files(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.upload_dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect()
    }
}

/// One part of a multipart body. `filename: None` makes it a plain form value.
pub struct Part<'a> {
    pub name: &'a str,
    pub filename: Option<&'a str>,
    pub data: &'a [u8],
}

pub fn audio_part<'a>(filename: &'a str, data: &'a [u8]) -> Part<'a> {
    Part {
        name: "audio",
        filename: Some(filename),
        data,
    }
}

pub fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part.filename {
            Some(filename) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        part.name, filename
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                        part.name
                    )
                    .as_bytes(),
                );
            }
        }
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn upload_request(uri: &str, parts: &[Part]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

/// Bytes that look enough like a WAV file for the staging checks
pub fn wav_bytes() -> Vec<u8> {
    let mut data = b"RIFF\x24\x08\x00\x00WAVEfmt ".to_vec();
    data.extend(std::iter::repeat_n(0u8, 2048));
    data
}

pub async fn json_body(response: Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

pub async fn text_body(response: Response) -> String {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(body.to_vec()).unwrap()
}
