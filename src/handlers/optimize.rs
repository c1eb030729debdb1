use crate::AppState;
use crate::error::AppError;
use crate::services::{resize, staging::StagedImage};
use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use tracing::info;

#[derive(Serialize)]
pub struct OptimizeResponse {
    /// Optimized image bytes, base64-encoded
    pub base64: String,
    /// HTML-escaped path of the staged file
    pub file_path: String,
    /// Decimal byte length of the optimized image
    pub file_size: String,
}

/// CORS preflight. The surrounding `CorsLayer` fills in the headers.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// `POST /upload`: stage the uploaded image, resize it in place to fit the
/// requested maxima, run the external compressor and hand back the result.
///
/// The quality value travels through the pipeline as an argument; nothing
/// about a request outlives it.
pub async fn optimize_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<OptimizeResponse>, AppError> {
    let mut quality: Option<String> = None;
    let mut max_width: u32 = 0;
    let mut max_height: u32 = 0;
    let mut upload: Option<(String, axum::body::Bytes)> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "imageQuality" => quality = Some(field.text().await?),
            "maxWidth" => max_width = parse_dimension(field.text().await.ok()),
            "maxHeight" => max_height = parse_dimension(field.text().await.ok()),
            "image" => {
                let filename = field.file_name().unwrap_or("unnamed").to_string();
                upload = Some((filename, field.bytes().await?));
            }
            _ => {}
        }
    }

    let quality = quality
        .as_deref()
        .and_then(parse_quality)
        .ok_or_else(|| {
            AppError::BadRequest("Invalid quality value. It should be between 0 and 100".to_string())
        })?;

    let (filename, bytes) = upload
        .ok_or_else(|| AppError::BadRequest("Missing image file".to_string()))?;

    // Nothing touches the disk until the form has fully validated.
    let staged = StagedImage::create(
        &state.config.upload_dir,
        &filename,
        &bytes,
        state.config.keep_files,
    )
    .await?;

    resize::resize_to_fit(
        staged.staged_path(),
        staged.staged_path(),
        max_width,
        max_height,
    )
    .await?;

    state
        .compressor
        .compress(staged.staged_path(), staged.optimized_path(), quality)
        .await?;

    let optimized = tokio::fs::read(staged.optimized_path()).await?;
    info!(
        "optimized {} -> {} bytes (quality {})",
        filename,
        optimized.len(),
        quality
    );

    Ok(Json(OptimizeResponse {
        base64: STANDARD.encode(&optimized),
        file_path: escape_html(&staged.staged_path().to_string_lossy()),
        file_size: optimized.len().to_string(),
    }))
}

fn parse_quality(raw: &str) -> Option<u8> {
    raw.trim().parse::<u8>().ok().filter(|q| *q <= 100)
}

/// Absent or unparseable dimensions fall back to 0, i.e. unconstrained.
fn parse_dimension(raw: Option<String>) -> u32 {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
