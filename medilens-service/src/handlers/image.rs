use crate::dtos::ImageAnalysisResponse;
use crate::startup::AppState;
use axum::{
    extract::{Multipart, State},
    Json,
};
use service_core::error::AppError;

const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// Accepted upload extensions and the MIME type forwarded upstream.
const ALLOWED_IMAGE_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
];

const ANALYSIS_PREAMBLE: &str = "Analyze the condition shown in this image.";

const ANALYSIS_INSTRUCTIONS: &str = "Based on the image and any provided text, describe the \
    likely condition in simple terms. Then, provide general, non-medical first aid steps or \
    immediate actions someone could take. IMPORTANT: State clearly that this is for \
    informational purposes only and NOT a substitute for professional medical advice, \
    diagnosis, or treatment. Always consult a qualified healthcare professional.";

/// Relay an uploaded image (plus optional text prompt) to the vision model.
///
/// The upload is rejected on extension grounds before anything is sent
/// upstream.
pub async fn analyze_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImageAnalysisResponse>, AppError> {
    let mut text_prompt = String::new();
    let mut image: Option<(&'static str, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {}", e))
    })? {
        // Field name must be copied out before the field is consumed below.
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("text_prompt") => {
                text_prompt = field.text().await.map_err(|e| {
                    AppError::BadRequest(anyhow::anyhow!("Failed to read text prompt: {}", e))
                })?;
            }
            Some("image") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let mime_type = mime_for_extension(&file_name).ok_or_else(|| {
                    AppError::BadRequest(anyhow::anyhow!(
                        "Invalid image format. Please upload PNG, JPG, JPEG, GIF, or WEBP."
                    ))
                })?;

                let data = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(anyhow::anyhow!("Failed to read image bytes: {}", e))
                })?;

                if data.len() > MAX_IMAGE_BYTES {
                    return Err(AppError::BadRequest(anyhow::anyhow!(
                        "Image too large (max 20MB)"
                    )));
                }

                image = Some((mime_type, data.to_vec()));
            }
            _ => {}
        }
    }

    let (mime_type, data) =
        image.ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("No image file provided")))?;

    let text_prompt = text_prompt.trim();
    let prompt = if text_prompt.is_empty() {
        format!("{}\n\n{}", ANALYSIS_PREAMBLE, ANALYSIS_INSTRUCTIONS)
    } else {
        format!(
            "{} {}\n\n{}",
            ANALYSIS_PREAMBLE, text_prompt, ANALYSIS_INSTRUCTIONS
        )
    };

    tracing::info!(mime_type = %mime_type, size = data.len(), "Image analysis started");

    let response = state
        .generative
        .analyze_image(&prompt, mime_type, &data)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Image analysis failed");
            AppError::Upstream(format!("Failed to analyze image: {}", e))
        })?;

    Ok(Json(ImageAnalysisResponse { response }))
}

/// MIME type for an allowed upload file name, or `None` if the extension is
/// not in the whitelist.
fn mime_for_extension(file_name: &str) -> Option<&'static str> {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())?
        .to_ascii_lowercase();

    ALLOWED_IMAGE_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_whitelisted_extensions() {
        assert_eq!(mime_for_extension("wound.png"), Some("image/png"));
        assert_eq!(mime_for_extension("scan.jpg"), Some("image/jpeg"));
        assert_eq!(mime_for_extension("scan.jpeg"), Some("image/jpeg"));
        assert_eq!(mime_for_extension("clip.gif"), Some("image/gif"));
        assert_eq!(mime_for_extension("photo.webp"), Some("image/webp"));
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert_eq!(mime_for_extension("SCAN.JPG"), Some("image/jpeg"));
        assert_eq!(mime_for_extension("photo.WebP"), Some("image/webp"));
    }

    #[test]
    fn rejects_other_extensions() {
        assert_eq!(mime_for_extension("notes.txt"), None);
        assert_eq!(mime_for_extension("archive.png.zip"), None);
        assert_eq!(mime_for_extension("no_extension"), None);
        assert_eq!(mime_for_extension(""), None);
    }
}
