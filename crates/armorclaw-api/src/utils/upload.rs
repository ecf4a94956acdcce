//! Multipart upload helpers.

use armorclaw_core::AppError;
use armorclaw_services::UploadCandidate;
use axum::extract::Multipart;

const MAX_FILENAME_LENGTH: usize = 255;

/// Read the single `file` field of a multipart form.
///
/// A second `file` field is rejected. Missing filename and content type default to
/// `unknown` and an empty type, which leaves the validator to decide on the extension.
pub async fn extract_multipart_file(mut multipart: Multipart) -> Result<UploadCandidate, AppError> {
    let mut candidate: Option<UploadCandidate> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        if candidate.is_some() {
            return Err(AppError::InvalidInput(
                "Multiple file fields are not allowed; send exactly one field named 'file'"
                    .to_string(),
            ));
        }

        let file_name = display_file_name(field.file_name().unwrap_or("unknown"));
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?;

        candidate = Some(UploadCandidate {
            file_name,
            content_type,
            data: data.to_vec(),
        });
    }

    candidate.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))
}

/// Last path segment of a client-supplied filename, without control characters or quotes.
pub fn display_file_name(raw: &str) -> String {
    let last = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned: String = last
        .chars()
        .filter(|c| !c.is_control() && *c != '"')
        .take(MAX_FILENAME_LENGTH)
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

/// `Content-Disposition` value for downloading a stored submission.
pub fn attachment_disposition(file_name: &str) -> String {
    format!("attachment; filename=\"{}\"", display_file_name(file_name))
}

/// Download content type: zip archives as such, everything else as UTF-8 text.
pub fn download_content_type(file_name: &str) -> &'static str {
    if file_name.to_lowercase().ends_with(".zip") {
        "application/zip"
    } else {
        "text/plain; charset=utf-8"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_file_name_strips_paths() {
        assert_eq!(display_file_name("../../etc/passwd"), "passwd");
        assert_eq!(display_file_name("C:\\Users\\me\\tracer.c"), "tracer.c");
        assert_eq!(display_file_name("tracer.bpf.o"), "tracer.bpf.o");
    }

    #[test]
    fn test_display_file_name_rejects_empty_and_dots() {
        assert_eq!(display_file_name(""), "file");
        assert_eq!(display_file_name("dir/.."), "file");
        assert_eq!(display_file_name("a\"b\r\n.c"), "ab.c");
    }

    #[test]
    fn test_download_headers() {
        assert_eq!(
            attachment_disposition("skill.zip"),
            "attachment; filename=\"skill.zip\""
        );
        assert_eq!(download_content_type("Skill.ZIP"), "application/zip");
        assert_eq!(download_content_type("main.c"), "text/plain; charset=utf-8");
    }
}
