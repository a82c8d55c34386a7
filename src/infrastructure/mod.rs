pub mod recognizer;
pub mod refiner;
pub mod upload_dir;
