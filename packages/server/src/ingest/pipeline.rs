use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sea_orm::Set;
use uuid::Uuid;

use super::imaging::{self, DerivedAssets, ImagingOptions};
use super::metadata::{self, ExifSummary};
use crate::entity::photo;
use crate::error::AppError;
use crate::principal::{Principal, PrincipalKind};
use crate::services::photos::{PhotoService, remove_assets};
use crate::state::AppState;
use crate::utils::filename::{generate_stored_filename, sanitize_original_name};

/// Uploader recorded when a photo arrives without an authenticated principal.
pub const ANONYMOUS_UPLOADER: &str = "anonymous";

/// The `photo` part of an upload.
#[derive(Debug)]
pub struct UploadFile {
    pub original_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Free-text form fields sent alongside the file. Blank values count as absent.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ClientMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub camera: Option<String>,
    pub lens: Option<String>,
    pub shot_at: Option<String>,
    pub location: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub dominant_color: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub taken_at: Option<String>,
    pub modified_at: Option<String>,
    pub exposure_time: Option<String>,
    pub aperture: Option<String>,
    pub iso: Option<String>,
    pub focal_length: Option<String>,
    pub rating: Option<String>,
}

impl ClientMetadata {
    /// Record a form field by its multipart name. Returns `false` for unknown names.
    pub fn set(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "title" => &mut self.title,
            "description" => &mut self.description,
            "camera" => &mut self.camera,
            "lens" => &mut self.lens,
            "shotAt" => &mut self.shot_at,
            "location" => &mut self.location,
            "width" => &mut self.width,
            "height" => &mut self.height,
            "dominantColor" => &mut self.dominant_color,
            "manufacturer" => &mut self.manufacturer,
            "model" => &mut self.model,
            "takenAt" => &mut self.taken_at,
            "modifiedAt" => &mut self.modified_at,
            "exposureTime" => &mut self.exposure_time,
            "aperture" => &mut self.aperture,
            "iso" => &mut self.iso,
            "focalLength" => &mut self.focal_length,
            "rating" => &mut self.rating,
            _ => return false,
        };
        let value = value.trim();
        *slot = (!value.is_empty()).then(|| value.to_string());
        true
    }
}

/// Client fields after boundary validation.
#[derive(Debug)]
struct ParsedMetadata {
    shot_at: Option<DateTime<Utc>>,
    taken_at: Option<DateTime<Utc>>,
    modified_at: Option<DateTime<Utc>>,
    width: Option<i32>,
    height: Option<i32>,
    rating: i16,
}

impl ParsedMetadata {
    fn parse(meta: &ClientMetadata) -> Result<Self, AppError> {
        Ok(Self {
            shot_at: parse_timestamp("shotAt", meta.shot_at.as_deref())?,
            taken_at: parse_timestamp("takenAt", meta.taken_at.as_deref())?,
            modified_at: parse_timestamp("modifiedAt", meta.modified_at.as_deref())?,
            width: parse_dimension("width", meta.width.as_deref())?,
            height: parse_dimension("height", meta.height.as_deref())?,
            rating: clamp_rating(meta.rating.as_deref()),
        })
    }
}

/// Round to the nearest integer and clamp to 0..=7. Missing or non-numeric input gives 0.
pub fn clamp_rating(value: Option<&str>) -> i16 {
    let Some(n) = value.and_then(|v| v.trim().parse::<f64>().ok()) else {
        return 0;
    };
    if n.is_nan() {
        return 0;
    }
    n.round().clamp(0.0, 7.0) as i16
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS]`, `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DD`.
/// Zoneless values are read as UTC.
pub fn parse_timestamp(field: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>, AppError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(Some(naive.and_utc()));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        && let Some(naive) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(Some(naive.and_utc()));
    }

    Err(AppError::Validation(format!("Invalid {field} timestamp")))
}

fn parse_dimension(field: &str, value: Option<&str>) -> Result<Option<i32>, AppError> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value.trim().parse::<i32>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(AppError::Validation(format!(
            "{field} must be a positive integer"
        ))),
    }
}

/// Reject anything that is not `image/*`, guessing from the file name when
/// the part carries no usable content type.
pub fn check_image_type(file: &UploadFile) -> Result<(), AppError> {
    let declared = file
        .content_type
        .as_deref()
        .filter(|ct| !ct.is_empty() && *ct != "application/octet-stream")
        .map(str::to_ascii_lowercase);

    let mime = declared.or_else(|| {
        file.original_name
            .as_deref()
            .and_then(|name| mime_guess::from_path(name).first())
            .map(|m| m.essence_str().to_string())
    });

    match mime {
        Some(m) if m.starts_with("image/") => Ok(()),
        _ => Err(AppError::Validation("Only image files are accepted".into())),
    }
}

/// Store an upload, derive its metadata and assets, and insert the photo row.
#[tracing::instrument(skip_all, fields(original_name = ?file.original_name, size = file.bytes.len()))]
pub async fn ingest(
    state: &AppState,
    uploader: Option<&Principal>,
    file: UploadFile,
    meta: ClientMetadata,
) -> Result<photo::Model, AppError> {
    check_image_type(&file)?;
    let parsed = ParsedMetadata::parse(&meta)?;

    let original_name = match file.original_name.as_deref() {
        Some(name) => {
            sanitize_original_name(name).map_err(|e| AppError::Validation(e.message().into()))?
        }
        None => String::new(),
    };

    let stored = generate_stored_filename(&original_name);
    let receipt = state.assets.put(&stored, &file.bytes).await?;

    let options = ImagingOptions::from(&state.config.storage);
    let bytes = file.bytes;
    let (exif, derived) = tokio::task::spawn_blocking(move || {
        let exif = match metadata::extract(&bytes) {
            Ok(summary) => summary,
            Err(exif::Error::NotFound(_)) => ExifSummary::default(),
            Err(e) => {
                tracing::warn!("EXIF parse failed: {}", e);
                ExifSummary::default()
            }
        };
        (exif, imaging::derive(&bytes, options))
    })
    .await
    .unwrap_or_else(|e| {
        tracing::warn!("Image processing task failed: {}", e);
        (ExifSummary::default(), DerivedAssets::default())
    });

    let has_thumbnail = store_variant(state, &photo::thumbnail_name(&stored), derived.thumbnail).await;
    let has_compressed =
        store_variant(state, &photo::compressed_name(&stored), derived.compressed).await;

    let (width, height) = match derived.dimensions {
        Some((w, h)) => (i32::try_from(w).ok(), i32::try_from(h).ok()),
        None => (parsed.width, parsed.height),
    };

    let (created_by, uploader_type) = match uploader {
        Some(p) => (p.username.clone(), p.kind),
        None => (ANONYMOUS_UPLOADER.to_string(), PrincipalKind::Admin),
    };

    let or_default = |value: Option<String>| value.unwrap_or_default();
    let model = photo::ActiveModel {
        id: Set(Uuid::now_v7()),
        filename: Set(stored.clone()),
        original_name: Set(original_name),
        title: Set(or_default(meta.title)),
        description: Set(or_default(meta.description)),
        camera: Set(or_default(meta.camera)),
        lens: Set(or_default(meta.lens)),
        shot_at: Set(parsed.shot_at),
        location: Set(or_default(meta.location)),
        width: Set(width),
        height: Set(height),
        dominant_color: Set(or_default(meta.dominant_color.or(derived.dominant_color))),
        file_size: Set(i64::try_from(receipt.size).unwrap_or(i64::MAX)),
        content_hash: Set(receipt.sha256),
        created_by: Set(created_by),
        uploader_type: Set(uploader_type),
        manufacturer: Set(prefer(meta.manufacturer, exif.manufacturer)),
        camera_model: Set(prefer(meta.model, exif.model)),
        taken_at: Set(parsed.taken_at.or(exif.taken_at)),
        modified_at: Set(parsed.modified_at.or(exif.modified_at)),
        exposure_time: Set(prefer(meta.exposure_time, exif.exposure_time)),
        aperture: Set(prefer(meta.aperture, exif.aperture)),
        iso: Set(prefer(meta.iso, exif.iso)),
        focal_length: Set(prefer(meta.focal_length, exif.focal_length)),
        rating: Set(parsed.rating),
        has_thumbnail: Set(has_thumbnail),
        has_compressed: Set(has_compressed),
        created_at: Set(Utc::now()),
    };

    match PhotoService::new(&state.db).insert(model).await {
        Ok(model) => {
            tracing::info!(photo_id = %model.id, filename = %model.filename, "Stored photo");
            Ok(model)
        }
        Err(e) => {
            remove_assets(state.assets.as_ref(), &stored).await;
            Err(e.into())
        }
    }
}

/// Client value wins; otherwise the EXIF-derived one (possibly empty).
fn prefer(client: Option<String>, derived: String) -> String {
    client.unwrap_or(derived)
}

async fn store_variant(state: &AppState, name: &str, bytes: Option<Vec<u8>>) -> bool {
    let Some(bytes) = bytes else {
        return false;
    };
    match state.assets.put(name, &bytes).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!("Failed to store derived asset {}: {}", name, e);
            false
        }
    }
}
