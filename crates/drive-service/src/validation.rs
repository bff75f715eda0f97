//! Input checks shared by the folder and file services.

use drive_core::error::AppError;

/// Longest accepted folder or file name, in characters.
pub const MAX_NAME_LENGTH: usize = 255;

/// Validate a folder or file name and return it trimmed.
pub fn validate_name(name: &str, what: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{what} name cannot be empty")));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::validation(format!(
            "{what} name cannot exceed {MAX_NAME_LENGTH} characters"
        )));
    }
    if trimmed.contains(['/', '\\', '\0']) {
        return Err(AppError::validation(format!(
            "{what} name cannot contain '/', '\\' or NUL"
        )));
    }
    Ok(trimmed.to_string())
}

/// Extension of a file name without the dot, lowercased.
pub fn extension_of(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_trimmed() {
        assert_eq!(validate_name("  Reports ", "Folder").unwrap(), "Reports");
    }

    #[test]
    fn test_rejects_bad_names() {
        assert!(validate_name("   ", "Folder").is_err());
        assert!(validate_name("a/b", "Folder").is_err());
        assert!(validate_name(&"x".repeat(256), "File").is_err());
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("photo.JPG").as_deref(), Some("jpg"));
        assert_eq!(extension_of("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(extension_of(".bashrc"), None);
        assert_eq!(extension_of("README"), None);
    }
}
