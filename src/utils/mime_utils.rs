use crate::error::{AppError, ValidationIssue};

/// Best-effort MIME type for an audio file extension, used when building the multipart
/// request sent to the recognizer (spec.md §4.3).
pub fn get_mime_type_from_filename(filename: &str) -> Result<&'static str, AppError> {
    let extension = std::path::Path::new(filename)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "mp3" => Ok("audio/mpeg"),
        "wav" => Ok("audio/wav"),
        "m4a" => Ok("audio/x-m4a"),
        "ogg" => Ok("audio/ogg"),
        "webm" => Ok("audio/webm"),
        "flac" => Ok("audio/flac"),
        "mp4" => Ok("audio/mp4"),
        "mpeg" | "mpga" => Ok("audio/mpeg"),
        "" => Err(AppError::Validation(vec![ValidationIssue::new(
            "filename",
            "audio file has no extension",
        )])),
        _ => Err(AppError::Validation(vec![
            ValidationIssue::new("filename", "unsupported audio file extension").with_value(extension),
        ])),
    }
}
