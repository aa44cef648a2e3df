//! Upload Routes
//!
//! 图片上传到 blob 存储，返回可公开访问的 URL。
//! 菜品封面/图集、加料封面和头像都先经由此处上传，再把 URL 写入实体。

mod handler;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart},
    middleware,
    routing::post,
};

use crate::auth::{Action, Resource, require_permission};
use crate::core::ServerState;
use crate::services::ImageFile;
use crate::services::image::MAX_FILE_SIZE;
use crate::utils::{AppError, AppResult};

/// Multipart overhead allowed on top of the file itself
const FORM_OVERHEAD: usize = 64 * 1024;

/// Body limit for routes that accept one image
pub(crate) fn image_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(MAX_FILE_SIZE + FORM_OVERHEAD)
}

pub fn router() -> Router<ServerState> {
    Router::new().route(
        "/api/uploads",
        post(handler::upload)
            .layer(image_body_limit())
            .layer(middleware::from_fn(require_permission(
                Resource::Upload,
                Action::Write,
            ))),
    )
}

/// Parsed image form: the `file` part plus an optional `folder` text part
#[derive(Debug)]
pub(crate) struct ImageForm {
    pub image: ImageFile,
    pub folder: Option<String>,
}

/// Read a multipart image form and validate the file
pub(crate) async fn read_image_form(mut multipart: Multipart) -> AppResult<ImageForm> {
    let mut file: Option<(Option<String>, Vec<u8>)> = None;
    let mut folder = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::invalid_request(format!("Invalid multipart request: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::invalid_request(format!("Multipart error: {e}")))?;
                file = Some((name, bytes.to_vec()));
            }
            Some("folder") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::invalid_request(format!("Multipart error: {e}")))?;
                folder = Some(text.trim().to_string());
            }
            _ => {}
        }
    }

    let (name, bytes) = file.ok_or_else(|| {
        AppError::validation("No 'file' field found").with_detail("field", "file")
    })?;
    Ok(ImageForm {
        image: ImageFile::validate(name, bytes)?,
        folder,
    })
}
