use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthPrincipal;
use crate::extractors::validated::AppQuery;
use crate::ingest::{self, ClientMetadata, UploadFile};
use crate::models::photo::{
    PhotoEnvelope, PhotoListQuery, PhotoListResponse, PhotoResponse, PhotoUploadForm,
};
use crate::models::shared::{Pagination, normalize_paging};
use crate::services::photos::{PhotoService, remove_assets};
use crate::state::AppState;

/// Multipart overhead allowed on top of the file size ceiling.
const FORM_OVERHEAD: usize = 1024 * 1024;

/// Request body limit for the upload route.
pub fn upload_body_limit(max_upload_size: u64) -> DefaultBodyLimit {
    let max = usize::try_from(max_upload_size).unwrap_or(usize::MAX);
    DefaultBodyLimit::max(max.saturating_add(FORM_OVERHEAD))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Photos",
    operation_id = "listPhotos",
    summary = "List photos",
    description = "Newest first. A page past the end returns an empty list with the true totals.",
    params(PhotoListQuery),
    responses(
        (status = 200, description = "One page of photos", body = PhotoListResponse),
        (status = 400, description = "Malformed query (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_photos(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PhotoListQuery>,
) -> Result<Json<PhotoListResponse>, AppError> {
    let (page, page_size) = normalize_paging(query.page, query.page_size);
    let result = PhotoService::new(&state.db).list(page, page_size).await?;

    Ok(Json(PhotoListResponse {
        data: result.items.into_iter().map(PhotoResponse::from).collect(),
        pagination: Pagination::new(page, page_size, result.total),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Photos",
    operation_id = "getPhoto",
    summary = "Get a photo by ID",
    params(("id" = Uuid, Path, description = "Photo ID")),
    responses(
        (status = 200, description = "Photo found", body = PhotoEnvelope),
        (status = 404, description = "Photo not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PhotoEnvelope>, AppError> {
    let id = parse_photo_id(&id)?;
    let model = PhotoService::new(&state.db)
        .get(id)
        .await?
        .ok_or_else(photo_not_found)?;

    Ok(Json(PhotoEnvelope { data: model.into() }))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Photos",
    operation_id = "uploadPhoto",
    summary = "Upload a photo",
    description = "Multipart upload with the image in the `photo` field. EXIF metadata, pixel dimensions, \
        a thumbnail and a compressed variant are derived from the file. Form fields override EXIF values.",
    request_body(content = PhotoUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Photo stored", body = PhotoEnvelope),
        (status = 400, description = "Bad upload (MISSING_FILE, VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, TOKEN_EXPIRED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth, state, multipart), fields(by = %auth.0.username))]
pub async fn upload_photo(
    auth: AuthPrincipal,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (file, meta) = read_upload_form(multipart, state.config.storage.max_upload_size).await?;
    let file = file.ok_or(AppError::MissingFile)?;

    let model = ingest::ingest(&state, Some(&auth.0), file, meta).await?;

    Ok((
        StatusCode::CREATED,
        Json(PhotoEnvelope { data: model.into() }),
    ))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Photos",
    operation_id = "deletePhoto",
    summary = "Delete a photo",
    description = "Removes the record, then the original, thumbnail and compressed files. Requires an admin token.",
    params(("id" = Uuid, Path, description = "Photo ID")),
    responses(
        (status = 204, description = "Photo deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, TOKEN_EXPIRED)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Photo not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth, state), fields(by = %auth.0.username))]
pub async fn delete_photo(
    auth: AuthPrincipal,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    auth.require_admin()?;
    let id = parse_photo_id(&id)?;

    let deleted = PhotoService::new(&state.db)
        .delete(id)
        .await?
        .ok_or_else(photo_not_found)?;
    remove_assets(state.assets.as_ref(), &deleted.filename).await;

    Ok(StatusCode::NO_CONTENT)
}

fn photo_not_found() -> AppError {
    AppError::NotFound("Photo not found".into())
}

/// Ids that are not UUIDs cannot name a photo.
fn parse_photo_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| photo_not_found())
}

/// Collect the `photo` file part and the text fields of an upload form.
///
/// The file is buffered chunk by chunk so oversize uploads fail before
/// they are fully read.
async fn read_upload_form(
    mut multipart: Multipart,
    max_size: u64,
) -> Result<(Option<UploadFile>, ClientMetadata), AppError> {
    let mut file: Option<UploadFile> = None;
    let mut meta = ClientMetadata::default();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name != "photo" {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read field '{name}': {e}")))?;
            meta.set(&name, value);
            continue;
        }

        if file.is_some() {
            return Err(AppError::Validation(
                "Only one photo may be uploaded per request".into(),
            ));
        }

        let mut upload = UploadFile {
            original_name: field.file_name().map(str::to_string),
            content_type: field.content_type().map(str::to_string),
            bytes: Vec::new(),
        };
        ingest::pipeline::check_image_type(&upload)?;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?
        {
            if (upload.bytes.len() + chunk.len()) as u64 > max_size {
                return Err(AppError::Validation(format!(
                    "File exceeds maximum size of {max_size} bytes"
                )));
            }
            upload.bytes.extend_from_slice(&chunk);
        }
        file = Some(upload);
    }

    Ok((file, meta))
}
