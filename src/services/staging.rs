use crate::utils::validation::{
    MAX_FILENAME_LEN, is_executable_content, sanitize_filename, truncate_filename,
};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

/// Every staged upload's file name starts with this prefix
pub const STAGED_PREFIX: &str = "upload_";

/// Random characters between the prefix and the client's filename
const STAGED_TOKEN_LEN: usize = 6;

/// Room left for the client's filename once prefix, token and `_` are added
const STAGED_NAME_BUDGET: usize = MAX_FILENAME_LEN - STAGED_PREFIX.len() - STAGED_TOKEN_LEN - 1;

/// Bytes needed before executable magic numbers can be recognized
const SNIFF_LEN: usize = 4;

const READ_BUFFER_SIZE: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("upload exceeds the {limit} byte limit")]
    TooLarge { limit: usize },

    #[error("upload content is executable")]
    ExecutableContent,

    /// Reading the client body failed (disconnect, malformed multipart, body limit)
    #[error("failed to read upload: {0}")]
    Read(io::Error),

    #[error("failed to write staged file: {0}")]
    Write(io::Error),
}

/// An upload written to the scratch directory for the lifetime of one request.
///
/// The file is removed when the value is dropped, which covers early returns,
/// panics and cancelled request futures. Call [`StagedFile::remove`] to remove
/// it eagerly and observe failures.
#[derive(Debug)]
pub struct StagedFile {
    file: NamedTempFile,
    size: u64,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn remove(self) -> io::Result<()> {
        self.file.close()
    }
}

/// Streams `reader` into a uniquely named file inside `upload_dir`.
///
/// The name is `upload_<random>_<sanitized filename>`, so concurrent uploads
/// of the same filename never collide and the extension stays last. Writing
/// stops as soon as more than `max_size` bytes arrive.
pub async fn stage_upload<R>(
    upload_dir: &Path,
    filename: &str,
    mut reader: R,
    max_size: usize,
) -> Result<StagedFile, StagingError>
where
    R: AsyncRead + Unpin + Send,
{
    let sanitized = truncate_filename(&sanitize_filename(filename), STAGED_NAME_BUDGET);
    let file = tempfile::Builder::new()
        .prefix(STAGED_PREFIX)
        .rand_bytes(STAGED_TOKEN_LEN)
        .suffix(&format!("_{}", sanitized))
        .tempfile_in(upload_dir)
        .map_err(StagingError::Write)?;

    let mut writer = tokio::fs::File::from_std(file.reopen().map_err(StagingError::Write)?);
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];
    let mut total: usize = 0;
    // Leading bytes held back until there are enough to sniff
    let mut head: Option<Vec<u8>> = Some(Vec::with_capacity(SNIFF_LEN));

    loop {
        let n = reader.read(&mut buffer).await.map_err(StagingError::Read)?;
        if n == 0 {
            break;
        }

        total += n;
        if total > max_size {
            return Err(StagingError::TooLarge { limit: max_size });
        }

        if let Some(pending) = head.as_mut() {
            pending.extend_from_slice(&buffer[..n]);
            if pending.len() < SNIFF_LEN {
                continue;
            }
            if is_executable_content(pending) {
                tracing::warn!("Executable content uploaded as audio: {}", filename);
                return Err(StagingError::ExecutableContent);
            }
            writer.write_all(pending).await.map_err(StagingError::Write)?;
            head = None;
            continue;
        }

        writer
            .write_all(&buffer[..n])
            .await
            .map_err(StagingError::Write)?;
    }

    // Uploads shorter than the sniff window
    if let Some(pending) = head {
        writer
            .write_all(&pending)
            .await
            .map_err(StagingError::Write)?;
    }

    writer.flush().await.map_err(StagingError::Write)?;
    drop(writer);

    tracing::debug!("Staged {} bytes at {}", total, file.path().display());

    Ok(StagedFile {
        file,
        size: total as u64,
    })
}

/// Removes staged files left behind by a previous process that did not exit cleanly
pub fn sweep_stale_uploads(upload_dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut removed = Vec::new();

    for entry in std::fs::read_dir(upload_dir)? {
        let entry = entry?;
        let is_staged = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(STAGED_PREFIX));

        if is_staged && entry.file_type()?.is_file() {
            std::fs::remove_file(entry.path())?;
            removed.push(entry.path());
        }
    }

    Ok(removed)
}
