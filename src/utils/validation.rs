use std::path::Path;

/// Maximum upload size: 50 MB
pub const MAX_FILE_SIZE: usize = 50 * 1024 * 1024;

/// Audio container extensions the recognizer accepts
pub const ALLOWED_EXTENSIONS: &[&str] = &["wav", "mp3", "m4a"];

/// Stand-in used when sanitizing strips every character from a filename
const FALLBACK_FILENAME: &str = "upload";

/// Longest file name most filesystems accept, in bytes
pub const MAX_FILENAME_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Lowercased text after the last `.`, if there is one
pub fn file_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
}

pub fn allowed_file(filename: &str) -> bool {
    file_extension(filename).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Validates the extension against the audio allowlist
pub fn validate_extension(filename: &str) -> Result<(), ValidationError> {
    if allowed_file(filename) {
        return Ok(());
    }

    Err(ValidationError {
        code: "INVALID_FILE_TYPE",
        message: format!(
            "File '{}' is not one of: {}",
            filename,
            ALLOWED_EXTENSIONS.join(", ")
        ),
    })
}

/// Reduces a client filename to a single safe path component.
///
/// Directory parts are dropped, separators, reserved characters and
/// whitespace become `_`, leading dots are stripped so the result can never
/// be hidden or relative. Never returns an empty string.
pub fn sanitize_filename(filename: &str) -> String {
    // Normalize Windows separators so Path sees them as components too
    let normalized = filename.replace('\\', "/");
    let name = Path::new(&normalized)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        tracing::warn!("Path traversal attempt detected: {}", filename);
    }

    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_control()
                || c.is_whitespace()
                || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | ';')
            {
                '_'
            } else {
                c
            }
        })
        .collect();

    let sanitized = sanitized.trim_start_matches('.');

    let sanitized = truncate_filename(sanitized, MAX_FILENAME_LEN);

    if sanitized.is_empty() || sanitized.starts_with('.') {
        FALLBACK_FILENAME.to_string()
    } else {
        sanitized
    }
}

/// Cuts `filename` to at most `max_len` bytes on a char boundary, keeping the
/// extension when it fits
pub fn truncate_filename(filename: &str, max_len: usize) -> String {
    if filename.len() <= max_len {
        return filename.to_string();
    }

    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| format!(".{}", ext))
        .filter(|ext| ext.len() < max_len)
        .unwrap_or_default();
    let mut end = max_len - ext.len();
    while !filename.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{}", &filename[..end], ext)
}

/// Checks if file content appears to be executable
pub fn is_executable_content(header: &[u8]) -> bool {
    if header.len() < 4 {
        return false;
    }

    // ELF binary (Linux)
    if header.starts_with(&[0x7F, 0x45, 0x4C, 0x46]) {
        return true;
    }

    // PE/COFF (Windows .exe, .dll)
    if header.starts_with(&[0x4D, 0x5A]) {
        return true;
    }

    // Mach-O (macOS)
    if header.starts_with(&[0xFE, 0xED, 0xFA, 0xCE])
        || header.starts_with(&[0xFE, 0xED, 0xFA, 0xCF])
        || header.starts_with(&[0xCE, 0xFA, 0xED, 0xFE])
        || header.starts_with(&[0xCF, 0xFA, 0xED, 0xFE])
    {
        return true;
    }

    // Shebang (shell scripts)
    if header.starts_with(b"#!") {
        return true;
    }

    false
}

/// MIME type to declare when forwarding an audio file
pub fn audio_content_type(filename: &str) -> &'static str {
    match file_extension(filename).as_deref() {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("m4a") => "audio/mp4",
        _ => "application/octet-stream",
    }
}
