use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::photo;
use crate::models::shared::Pagination;
use crate::principal::PrincipalKind;

/// URL prefix under which the uploads directory is served.
pub const UPLOADS_PREFIX: &str = "/uploads";

/// API representation of a stored photo.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhotoResponse {
    pub id: Uuid,
    #[schema(example = "1718000000000-123456789.jpg")]
    pub filename: String,
    #[schema(example = "IMG_0420.JPG")]
    pub original_name: String,
    pub title: String,
    pub description: String,
    pub camera: String,
    pub lens: String,
    pub shot_at: Option<DateTime<Utc>>,
    pub location: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    #[schema(example = "#3a5f7d")]
    pub dominant_color: String,
    /// Size of the original in bytes.
    pub file_size: i64,
    pub created_by: String,
    pub uploader_type: PrincipalKind,
    pub created_at: DateTime<Utc>,

    pub manufacturer: String,
    pub model: String,
    pub taken_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
    #[schema(example = "1/250s")]
    pub exposure_time: String,
    #[schema(example = "f/2.8")]
    pub aperture: String,
    #[schema(example = "200")]
    pub iso: String,
    #[schema(example = "35mm")]
    pub focal_length: String,
    /// 0-7.
    pub rating: i16,

    /// Original file.
    #[schema(example = "/uploads/1718000000000-123456789.jpg")]
    pub url: String,
    /// `null` when no thumbnail could be generated.
    pub thumbnail_url: Option<String>,
    /// `null` when no compressed variant could be generated.
    pub compressed_url: Option<String>,
    pub has_thumbnail: bool,
    pub has_compressed: bool,
}

fn upload_url(name: &str) -> String {
    format!("{UPLOADS_PREFIX}/{name}")
}

impl From<photo::Model> for PhotoResponse {
    fn from(m: photo::Model) -> Self {
        let thumbnail_url = m
            .has_thumbnail
            .then(|| upload_url(&photo::thumbnail_name(&m.filename)));
        let compressed_url = m
            .has_compressed
            .then(|| upload_url(&photo::compressed_name(&m.filename)));

        Self {
            id: m.id,
            url: upload_url(&m.filename),
            thumbnail_url,
            compressed_url,
            filename: m.filename,
            original_name: m.original_name,
            title: m.title,
            description: m.description,
            camera: m.camera,
            lens: m.lens,
            shot_at: m.shot_at,
            location: m.location,
            width: m.width,
            height: m.height,
            dominant_color: m.dominant_color,
            file_size: m.file_size,
            created_by: m.created_by,
            uploader_type: m.uploader_type,
            created_at: m.created_at,
            manufacturer: m.manufacturer,
            model: m.camera_model,
            taken_at: m.taken_at,
            modified_at: m.modified_at,
            exposure_time: m.exposure_time,
            aperture: m.aperture,
            iso: m.iso,
            focal_length: m.focal_length,
            rating: m.rating,
            has_thumbnail: m.has_thumbnail,
            has_compressed: m.has_compressed,
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PhotoListQuery {
    /// 1-based page number. Defaults to 1.
    pub page: Option<u64>,
    /// Items per page, 1-100. Defaults to 20.
    pub page_size: Option<u64>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PhotoListResponse {
    pub data: Vec<PhotoResponse>,
    pub pagination: Pagination,
}

/// Single-photo envelope.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PhotoEnvelope {
    pub data: PhotoResponse,
}

/// Multipart form accepted by the upload endpoint (documentation only).
#[allow(dead_code)]
#[derive(utoipa::ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct PhotoUploadForm {
    /// Image file (`image/*`).
    #[schema(value_type = String, format = Binary)]
    pub photo: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub camera: Option<String>,
    pub lens: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`.
    pub shot_at: Option<String>,
    pub location: Option<String>,
    /// Used only when the image dimensions cannot be read.
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub dominant_color: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub taken_at: Option<String>,
    pub modified_at: Option<String>,
    pub exposure_time: Option<String>,
    pub aperture: Option<String>,
    pub iso: Option<String>,
    pub focal_length: Option<String>,
    /// Rounded and clamped to 0-7.
    pub rating: Option<String>,
}
