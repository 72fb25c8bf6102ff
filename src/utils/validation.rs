use crate::services::error::{DropError, DropResult};

/// Longest stored filename in bytes
pub const MAX_FILENAME_LEN: usize = 255;

/// Validates file size against maximum limit
pub fn validate_file_size(size: usize, max_size: usize) -> DropResult<()> {
    if size > max_size {
        return Err(DropError::PayloadTooLarge {
            size,
            max: max_size,
        });
    }
    Ok(())
}

fn is_unsafe_char(c: char) -> bool {
    c.is_control()
        || matches!(
            c,
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'
        )
}

/// Reduces an uploaded filename to a safe display name: the last path
/// component only, reserved characters replaced by `_`, no leading dots or
/// spaces. An empty result is an error.
pub fn sanitize_filename(filename: &str) -> DropResult<String> {
    // Browsers on Windows send full paths with backslashes
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    if name.len() != filename.len() {
        tracing::warn!("Path components stripped from filename: {:?}", filename);
    }

    let mut replaced: String = name
        .chars()
        .map(|c| if is_unsafe_char(c) { '_' } else { c })
        .collect();

    // Truncate first; the trim must see the final tail
    if replaced.len() > MAX_FILENAME_LEN {
        let mut cut = MAX_FILENAME_LEN;
        while !replaced.is_char_boundary(cut) {
            cut -= 1;
        }
        replaced.truncate(cut);
    }

    let sanitized = replaced
        .trim_start_matches(['.', ' '])
        .trim_end_matches([' ', '.'])
        .to_string();

    if sanitized.is_empty() || sanitized.chars().all(|c| c == '_') {
        return Err(DropError::InvalidFilename(
            "Filename cannot be empty".to_string(),
        ));
    }

    Ok(sanitized)
}
