//! Handles POST /upload and the /image/{id} resources

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use minijinja::context;

use crate::{
    errors::ImageError,
    http::{context::AppState, errors::ApiError, middleware_auth::Authenticated, views},
    storage::{files::is_jpeg, traits::Image},
};

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge("Uploaded file is too large.".to_string())
    } else {
        ApiError::BadRequest(format!("Invalid multipart body: {}", err.body_text()))
    }
}

async fn find_image(state: &AppState, image_id: i64) -> Result<Image, ApiError> {
    state
        .storage
        .get_image(image_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Image"))
}

pub async fn upload_image_handler(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut file: Option<Bytes> = None;
    let mut title = String::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => file = Some(field.bytes().await.map_err(multipart_error)?),
            Some("title") => title = field.text().await.map_err(multipart_error)?,
            _ => {}
        }
    }

    let file = file
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| ApiError::missing_parameter("file"))?;
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::missing_parameter("title"));
    }
    if !is_jpeg(&file) {
        return Err(ImageError::UnsupportedFileType.into());
    }

    let owner_id = principal.acting_id();
    let image = state.storage.insert_image(title, owner_id).await?;

    if let Err(err) = state.image_files.save(owner_id, image.id, &file).await {
        state.storage.delete_image(image.id).await?;
        return Err(err.into());
    }
    tracing::info!(image_id = image.id, %owner_id, size = file.len(), "stored image");

    let mut response = views::render(
        &state,
        StatusCode::OK,
        "image.xml",
        context! { image => &image },
    )?;
    let location = format!(
        "{}/image/{}",
        state.config.external_base.as_ref(),
        image.id
    );
    if let Ok(location) = header::HeaderValue::from_str(&location) {
        response.headers_mut().insert(header::LOCATION, location);
    }
    Ok(response)
}

pub async fn get_image_handler(
    State(state): State<AppState>,
    Path(image_id): Path<i64>,
    Authenticated(principal): Authenticated,
) -> Result<Response, ApiError> {
    let image = find_image(&state, image_id).await?;
    principal.ensure_session_owner(&image.owner_id)?;
    views::render(&state, StatusCode::OK, "image.xml", context! { image })
}

pub async fn delete_image_handler(
    State(state): State<AppState>,
    Path(image_id): Path<i64>,
    Authenticated(principal): Authenticated,
) -> Result<Response, ApiError> {
    let image = find_image(&state, image_id).await?;
    principal.ensure_owner(&image.owner_id)?;

    state.storage.delete_image(image.id).await?;
    state.image_files.delete(&image.owner_id, image.id).await?;
    tracing::info!(image_id, "deleted image");

    views::success(&state, StatusCode::OK, "Image successfully deleted.")
}

pub async fn download_image_handler(
    State(state): State<AppState>,
    Path(image_id): Path<i64>,
    Authenticated(principal): Authenticated,
) -> Result<Response, ApiError> {
    let image = find_image(&state, image_id).await?;
    principal.ensure_session_owner(&image.owner_id)?;

    let bytes = state
        .image_files
        .load(&image.owner_id, image.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Image file"))?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/jpeg".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}.jpg\"", image.id),
            ),
        ],
        bytes,
    )
        .into_response())
}
