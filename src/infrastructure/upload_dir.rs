use crate::services::staging::sweep_stale_uploads;
use std::path::Path;
use tracing::{info, warn};

/// Creates the staging directory and clears uploads left over from an earlier run
pub async fn setup_upload_dir(upload_dir: &Path) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(upload_dir).await?;

    match sweep_stale_uploads(upload_dir) {
        Ok(removed) if !removed.is_empty() => {
            info!("🧹 Removed {} stale staged upload(s)", removed.len());
        }
        Ok(_) => {}
        Err(e) => warn!("⚠️  Could not sweep {}: {}", upload_dir.display(), e),
    }

    info!("📂 Staging uploads in {}", upload_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_missing_directory_and_sweeps() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("nested").join("temp_uploads");

        setup_upload_dir(&dir).await.unwrap();
        assert!(dir.is_dir());

        std::fs::write(dir.join("upload_abc_hello.wav"), b"stale").unwrap();
        std::fs::write(dir.join("keep.txt"), b"keep").unwrap();
        setup_upload_dir(&dir).await.unwrap();

        assert!(!dir.join("upload_abc_hello.wav").exists());
        assert!(dir.join("keep.txt").exists());
    }
}
