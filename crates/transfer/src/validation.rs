use std::path::{Component, Path};

use crate::TransferError;

/// Validates a file name announced by the sending side before it is used
/// to create a destination file.
///
/// Rejects:
/// - Empty names
/// - Control characters and invisible formatting characters
/// - Absolute paths (Unix `/` or Windows `C:\`)
/// - Parent directory traversal (`..`), and `..` anywhere in the base name
/// - Windows prefix components (`C:`, `\\server`)
pub fn validate_file_name(file_name: &str) -> Result<(), TransferError> {
    if file_name.is_empty() {
        return Err(TransferError::InvalidPath("empty path".into()));
    }

    if let Some(c) = file_name.chars().find(|&c| is_invisible(c)) {
        return Err(TransferError::InvalidPath(format!(
            "non-printable character U+{:04X} in {file_name:?}",
            c as u32
        )));
    }

    let path = Path::new(file_name);

    if path.is_absolute() {
        return Err(TransferError::InvalidPath(format!(
            "absolute path not allowed: {file_name}"
        )));
    }

    for component in path.components() {
        match component {
            Component::ParentDir => {
                return Err(TransferError::InvalidPath(format!(
                    "parent directory traversal not allowed: {file_name}"
                )));
            }
            Component::Prefix(_) => {
                return Err(TransferError::InvalidPath(format!(
                    "path prefix not allowed: {file_name}"
                )));
            }
            Component::RootDir => {
                return Err(TransferError::InvalidPath(format!(
                    "absolute path not allowed: {file_name}"
                )));
            }
            Component::CurDir | Component::Normal(_) => {}
        }
    }

    if let Some(base) = path.file_name() {
        if base.to_string_lossy().contains("..") {
            return Err(TransferError::InvalidPath(format!(
                "base name cannot contain '..': {file_name}"
            )));
        }
    }

    Ok(())
}

/// Characters that would render as nothing, or move the cursor, in a
/// terminal or file browser. Plain ASCII space is allowed.
fn is_invisible(c: char) -> bool {
    c.is_control()
        || (c.is_whitespace() && c != ' ')
        || matches!(
            c,
            '\u{00AD}'
                | '\u{200B}'..='\u{200F}'
                | '\u{202A}'..='\u{202E}'
                | '\u{2060}'..='\u{2064}'
                | '\u{FEFF}'
        )
}
