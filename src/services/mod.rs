pub mod recognizer;
pub mod refiner;
pub mod staging;
pub mod transcription_service;
