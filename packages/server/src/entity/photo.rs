use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::principal::PrincipalKind;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "photo")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Generated name of the original under the uploads directory.
    /// Derived assets are named `thumb-{filename}` and `compressed-{filename}`.
    #[sea_orm(unique)]
    pub filename: String,
    pub original_name: String,

    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub camera: String,
    pub lens: String,
    pub shot_at: Option<DateTimeUtc>,
    pub location: String,

    pub width: Option<i32>,
    pub height: Option<i32>,
    /// Hex color, e.g. `#3a5f7d`.
    pub dominant_color: String,
    pub file_size: i64,
    /// SHA-256 of the original bytes.
    pub content_hash: String,

    pub created_by: String,
    pub uploader_type: PrincipalKind,

    pub manufacturer: String,
    #[sea_orm(column_name = "model")]
    pub camera_model: String,
    pub taken_at: Option<DateTimeUtc>,
    pub modified_at: Option<DateTimeUtc>,
    pub exposure_time: String,
    pub aperture: String,
    pub iso: String,
    pub focal_length: String,

    /// Always within 0..=7.
    #[sea_orm(default_value = 0)]
    pub rating: i16,

    #[sea_orm(default_value = false)]
    pub has_thumbnail: bool,
    #[sea_orm(default_value = false)]
    pub has_compressed: bool,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

pub const THUMBNAIL_PREFIX: &str = "thumb-";
pub const COMPRESSED_PREFIX: &str = "compressed-";

/// Name of the thumbnail derived from a stored original.
pub fn thumbnail_name(filename: &str) -> String {
    format!("{THUMBNAIL_PREFIX}{filename}")
}

/// Name of the compressed display variant derived from a stored original.
pub fn compressed_name(filename: &str) -> String {
    format!("{COMPRESSED_PREFIX}{filename}")
}

/// Derived variants hold JPEG bytes whatever extension the original had.
/// Generated original names start with a timestamp, so they never match.
pub fn is_derived_name(name: &str) -> bool {
    name.starts_with(THUMBNAIL_PREFIX) || name.starts_with(COMPRESSED_PREFIX)
}
