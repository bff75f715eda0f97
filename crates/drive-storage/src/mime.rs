//! MIME types for the extensions Drive accepts.

/// Canonical MIME type for a file extension (without the dot).
pub fn mime_from_extension(extension: &str) -> Option<&'static str> {
    let mime = match extension.to_ascii_lowercase().as_str() {
        "txt" => "text/plain",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => return None,
    };
    Some(mime)
}

/// Alternative spellings clients send for the same content.
fn aliases(canonical: &str) -> &'static [&'static str] {
    match canonical {
        "image/jpeg" => &["image/jpg", "image/pjpeg"],
        "image/bmp" => &["image/x-bmp", "image/x-ms-bmp"],
        "image/png" => &["image/x-png"],
        "application/pdf" => &["application/x-pdf"],
        _ => &[],
    }
}

/// Strip parameters (`; charset=...`) and lowercase.
pub fn essence(mime: &str) -> String {
    mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase()
}

/// Return the MIME type to store for content declared as `declared` with
/// the given extension, or `None` if the two do not belong together.
///
/// `application/octet-stream` and an empty declaration are replaced by the
/// canonical type for the extension.
pub fn resolve(extension: &str, declared: &str) -> Option<&'static str> {
    let canonical = mime_from_extension(extension)?;
    let declared = essence(declared);
    if declared.is_empty()
        || declared == "application/octet-stream"
        || declared == canonical
        || aliases(canonical).contains(&declared.as_str())
    {
        Some(canonical)
    } else {
        None
    }
}
