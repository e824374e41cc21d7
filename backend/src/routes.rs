use std::fs;
use std::path::PathBuf;

use actix_files::Files;
use actix_multipart::Multipart;
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::http::header::{self, ContentType};
use actix_web::middleware::{ErrorHandlerResponse, ErrorHandlers};
use actix_web::{HttpResponse, web};
use futures_util::{StreamExt, TryStreamExt};
use log::{error, info};
use serde::Deserialize;
use serde_json::json;
use shared::{CellClass, ClassInfo, Classification, ClassifyResponse, ModelCard};

use crate::classifier::model::Classifier;
use crate::classifier::preprocess::{self, INPUT_HEIGHT, INPUT_WIDTH};
use crate::config::{AppConfig, MAX_UPLOAD_BYTES};
use crate::error::ClassifyError;
use crate::pages;

pub fn configure_routes(cfg: &mut web::ServiceConfig, static_dir: PathBuf) {
    cfg.service(web::resource("/").route(web::get().to(home)))
        .service(web::resource("/classify").route(web::post().to(classify)))
        .service(web::resource("/api/classify").route(web::post().to(api_classify)))
        .service(web::resource("/api/model").route(web::get().to(model_card)))
        .service(Files::new("/static", static_dir))
        .default_service(web::route().to(not_found));
}

/// Middleware that rewrites any 500 the framework itself produces on the
/// HTML surface into the home redirect with a generic retry message. JSON
/// API paths keep their status and body.
pub fn error_handlers<B: 'static>() -> ErrorHandlers<B> {
    ErrorHandlers::new().handler(StatusCode::INTERNAL_SERVER_ERROR, render_500)
}

fn render_500<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    if res.request().path().starts_with("/api") {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }
    let (request, _) = res.into_parts();
    let redirect = redirect_home("Internal server error. Please try again.");
    Ok(ErrorHandlerResponse::Response(
        ServiceResponse::new(request, redirect).map_into_right_body(),
    ))
}

#[derive(Deserialize)]
struct HomeQuery {
    message: Option<String>,
}

async fn home(query: web::Query<HomeQuery>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(pages::home_page(query.message.as_deref()))
}

/// Unknown paths get the home page body with a 404 status.
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound()
        .content_type(ContentType::html())
        .body(pages::home_page(None))
}

async fn classify(
    config: web::Data<AppConfig>,
    classifier: web::Data<Classifier>,
    mut payload: Multipart,
) -> HttpResponse {
    let outcome = match read_upload(&mut payload).await {
        Ok(upload) => run_pipeline(&config, &classifier, upload),
        Err(e) => Err(e),
    };
    match outcome {
        Ok((response, image_url)) => {
            info!(
                "classified {} as {} ({:.1}%)",
                image_url, response.prediction, response.confidence
            );
            HttpResponse::Ok()
                .content_type(ContentType::html())
                .body(pages::result_page(&response, &image_url))
        }
        Err(e) => {
            error!("classification request failed: {e}");
            redirect_home(e.user_message())
        }
    }
}

async fn api_classify(
    config: web::Data<AppConfig>,
    classifier: web::Data<Classifier>,
    mut payload: Multipart,
) -> HttpResponse {
    let outcome = match read_upload(&mut payload).await {
        Ok(upload) => run_pipeline(&config, &classifier, upload),
        Err(e) => Err(e),
    };
    match outcome {
        Ok((response, image_url)) => HttpResponse::Ok().json(json!({
            "result": response,
            "image_url": image_url,
        })),
        Err(e) => {
            error!("api classification failed: {e}");
            HttpResponse::build(e.status_code()).json(json!({ "error": e.user_message() }))
        }
    }
}

async fn model_card(classifier: web::Data<Classifier>) -> HttpResponse {
    let card = ModelCard {
        available: classifier.is_available(),
        input_width: INPUT_WIDTH,
        input_height: INPUT_HEIGHT,
        classes: CellClass::ALL
            .iter()
            .map(|class| ClassInfo {
                label: class.label().to_string(),
                description: class.description().to_string(),
            })
            .collect(),
    };
    HttpResponse::Ok().json(card)
}

struct Upload {
    filename: String,
    bytes: Vec<u8>,
}

/// Drains the `file` field of the multipart stream into memory, enforcing
/// the upload size cap along the way.
async fn read_upload(payload: &mut Multipart) -> Result<Upload, ClassifyError> {
    loop {
        let mut field = match payload.try_next().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(ClassifyError::MissingUpload),
            // A malformed or truncated body is a processing failure, not a
            // missing upload.
            Err(e) => return Err(ClassifyError::ImageProcessing(e.to_string())),
        };
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or_default()
            .to_owned();
        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk.map_err(|e| ClassifyError::ImageProcessing(e.to_string()))?;
            if bytes.len() + data.len() > MAX_UPLOAD_BYTES {
                return Err(ClassifyError::ImageProcessing(format!(
                    "upload exceeds the {} byte limit",
                    MAX_UPLOAD_BYTES
                )));
            }
            bytes.extend_from_slice(&data);
        }
        if filename.is_empty() || bytes.is_empty() {
            return Err(ClassifyError::MissingUpload);
        }
        return Ok(Upload { filename, bytes });
    }
}

/// The sequential pipeline of one request: validate, save, check the model,
/// preprocess, predict, format. Stops at the first failure; nothing partial
/// is ever rendered.
fn run_pipeline(
    config: &AppConfig,
    classifier: &Classifier,
    upload: Upload,
) -> Result<(ClassifyResponse, String), ClassifyError> {
    if !preprocess::allowed_file(&upload.filename) {
        return Err(ClassifyError::InvalidFileType(upload.filename));
    }

    let stored_name = preprocess::sanitize_filename(&upload.filename);
    let path = config.upload_dir.join(&stored_name);
    fs::write(&path, &upload.bytes).map_err(|e| ClassifyError::ImageProcessing(e.to_string()))?;

    // The model check comes before preprocessing: a degraded process must
    // not spend time decoding images it cannot classify.
    if !classifier.is_available() {
        return Err(ClassifyError::ModelUnavailable);
    }

    let tensor = preprocess::preprocess_image(&path, (INPUT_HEIGHT, INPUT_WIDTH))?;
    let predictions = classifier.predict(tensor)?;
    let classification = Classification::from_probabilities(&predictions).ok_or_else(|| {
        ClassifyError::Inference(format!(
            "model returned {} probabilities instead of 4",
            predictions.len()
        ))
    })?;

    let response = ClassifyResponse::new(classification, predictions);
    let image_url = format!("/static/uploads/{}", stored_name);
    Ok((response, image_url))
}

fn redirect_home(message: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((
            header::LOCATION,
            format!("/?message={}", urlencoding::encode(message)),
        ))
        .finish()
}
