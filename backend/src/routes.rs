use actix_files::Files;
use actix_multipart::{Multipart, MultipartError};
use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError, web};
use futures::{StreamExt, TryStreamExt};
use log::{error, info};
use shared::ClassificationResult;

use crate::inference::model::{InferenceError, Model};
use crate::render;
use crate::storage::upload_store::{StorageError, UploadStore};

const IMAGE_FIELD: &str = "image";

/// Everything a request needs, built once in `main`.
pub struct AppState {
    pub store: UploadStore,
    pub model: Model,
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("Upload stream error: {0}")]
    Multipart(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error("Classification task failed: {0}")]
    Blocking(#[from] BlockingError),
}

impl ResponseError for ClassifyError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        error!("Classification request failed: {}", self);
        HttpResponse::build(self.status_code())
            .content_type(ContentType::html())
            .body(render::render_error_page())
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, store: &UploadStore) {
    cfg.service(
        web::resource("/")
            .route(web::get().to(index))
            .route(web::post().to(classify)),
    )
    .service(Files::new(store.url_prefix(), store.dir().to_path_buf()));
}

async fn index() -> HttpResponse {
    page(None)
}

async fn classify(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, ClassifyError> {
    if !is_multipart_form(&req) {
        return Ok(page(None));
    }

    let image_data = read_image_field(payload)
        .await
        .map_err(|e| ClassifyError::Multipart(e.to_string()))?;
    let Some(image_data) = image_data else {
        return Ok(page(None));
    };

    let result = web::block(move || store_and_classify(&state, &image_data)).await??;
    Ok(page(Some(&result)))
}

/// Any other body carries no file map, so it reads as "no upload".
fn is_multipart_form(req: &HttpRequest) -> bool {
    req.content_type().eq_ignore_ascii_case("multipart/form-data")
}

/// Returns the first `image` file field, or `None` when it is absent, has an
/// empty file name or an empty body.
async fn read_image_field(mut payload: Multipart) -> Result<Option<Vec<u8>>, MultipartError> {
    let mut image: Option<Vec<u8>> = None;
    let mut seen_image_field = false;

    while let Some(mut field) = payload.try_next().await? {
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_owned);
        let is_image = !seen_image_field
            && field.name() == Some(IMAGE_FIELD)
            && file_name.is_some();

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            if is_image {
                data.extend_from_slice(&chunk);
            }
        }

        if is_image {
            seen_image_field = true;
            if file_name.is_some_and(|name| !name.is_empty()) && !data.is_empty() {
                image = Some(data);
            }
        }
    }

    Ok(image)
}

fn store_and_classify(
    state: &AppState,
    image_data: &[u8],
) -> Result<ClassificationResult, ClassifyError> {
    let stored = state.store.save(image_data)?;
    info!("Stored upload {} ({} bytes)", stored.file_name, image_data.len());

    let verdict = state.model.classify_file(&stored.path)?;
    info!("Classified {} as {}", stored.file_name, verdict);

    Ok(ClassificationResult::new(verdict, stored.url))
}

fn page(result: Option<&ClassificationResult>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(render::render_page(result))
}
