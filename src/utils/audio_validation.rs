use crate::error::AppError;

/// Extensions accepted for a transcription submission (spec.md §4.1). Extension and
/// declared content-type are checked independently; both must be on this allow-list.
const ALLOWED_EXTENSIONS: &[&str] = &["wav", "mp3", "m4a", "ogg", "flac", "mp4", "mpeg", "mpga", "webm"];

fn extension_of(filename: &str) -> Option<String> {
    std::path::Path::new(filename)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .map(|s| s.to_lowercase())
}

fn content_type_to_extension(content_type: &str) -> Option<&'static str> {
    match content_type.to_lowercase().as_str() {
        "audio/wav" | "audio/x-wav" | "audio/wave" => Some("wav"),
        "audio/mpeg" | "audio/mp3" => Some("mp3"),
        "audio/x-m4a" | "audio/m4a" | "audio/mp4a-latm" => Some("m4a"),
        "audio/ogg" | "application/ogg" => Some("ogg"),
        "audio/flac" | "audio/x-flac" => Some("flac"),
        "audio/mp4" => Some("mp4"),
        "audio/mpg" => Some("mpeg"),
        "audio/webm" => Some("webm"),
        _ => None,
    }
}

/// Validates a submitted audio file's extension, declared content-type, and size. Both the
/// filename extension and the content-type must independently map onto the allowed set.
/// Format/content-type violations are 400s and an oversized file is a 413 (spec.md §4.1,
/// §8 scenarios 2-3); `AppError::Validation`'s 422 is reserved for lexicon term validation.
pub fn validate_audio_submission(
    filename: &str,
    content_type: Option<&str>,
    size_bytes: usize,
    max_bytes: usize,
) -> Result<String, AppError> {
    let extension = extension_of(filename);
    let extension_ok = extension
        .as_deref()
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext))
        .unwrap_or(false);

    let content_type_ok = match content_type {
        Some(ct) => content_type_to_extension(ct).is_some(),
        None => false,
    };

    if !extension_ok || !content_type_ok {
        return Err(AppError::BadRequest(format!(
            "unsupported audio submission: filename={}, content_type={}",
            filename,
            content_type.unwrap_or("<none>"),
        )));
    }

    if size_bytes == 0 {
        return Err(AppError::BadRequest("audio file is empty".to_string()));
    }
    if size_bytes > max_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "audio file is {} bytes, exceeds the maximum of {} bytes",
            size_bytes, max_bytes,
        )));
    }

    Ok(extension.expect("extension_ok implies extension is Some"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_submission() {
        let result = validate_audio_submission("call.wav", Some("audio/wav"), 1024, 10_000_000);
        assert_eq!(result.unwrap(), "wav");
    }

    #[test]
    fn rejects_mismatched_extension() {
        let err = validate_audio_submission("call.exe", Some("audio/wav"), 1024, 10_000_000);
        assert!(matches!(err, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn rejects_missing_content_type() {
        let err = validate_audio_submission("call.wav", None, 1024, 10_000_000);
        assert!(err.is_err());
    }

    #[test]
    fn rejects_oversized_file() {
        let err = validate_audio_submission("call.wav", Some("audio/wav"), 20_000_000, 10_000_000);
        assert!(matches!(err, Err(AppError::PayloadTooLarge(_))));
    }

    #[test]
    fn rejects_empty_file() {
        let err = validate_audio_submission("call.wav", Some("audio/wav"), 0, 10_000_000);
        assert!(err.is_err());
    }

    #[test]
    fn accepts_mpeg_and_mpga() {
        assert!(validate_audio_submission("a.mpeg", Some("audio/mpeg"), 10, 100).is_ok());
        assert!(validate_audio_submission("a.mpga", Some("audio/mpeg"), 10, 100).is_ok());
    }
}
