use std::sync::Arc;

use axum::{
    extract::{Extension, Multipart, Path, multipart::MultipartRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::app::dto::{self, ProductSubmission};
use crate::app::errors;
use crate::app::services::AppServices;

/// Turn the multipart extractor result into a submission, or a failure
/// envelope carrying `failure_message`.
async fn submission(
    multipart: Result<Multipart, MultipartRejection>,
    failure_message: &'static str,
) -> Result<ProductSubmission, Response> {
    let multipart = multipart.map_err(|rejection| {
        tracing::warn!(error = %rejection, "product request is not multipart");
        errors::operation_failure(failure_message, rejection.body_text())
    })?;

    dto::read_product_submission(multipart).await.map_err(|e| {
        tracing::warn!(error = %e, "malformed multipart body");
        errors::operation_failure(failure_message, e.body_text())
    })
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let submission = match submission(multipart, errors::CREATE_FAILED).await {
        Ok(s) => s,
        Err(response) => return response,
    };

    match services
        .products
        .create(&submission.form, submission.photo)
        .await
    {
        Ok(product) => (
            StatusCode::CREATED,
            axum::Json(json!({
                "success": true,
                "message": "Product Created Successfully",
                "products": dto::product_to_json(&product),
            })),
        )
            .into_response(),
        Err(e) => errors::product_failure(errors::CREATE_FAILED, &e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(pid): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    update(&services, &pid, multipart).await
}

pub async fn update_product_without_id(
    Extension(services): Extension<Arc<AppServices>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    update(&services, "", multipart).await
}

async fn update(
    services: &AppServices,
    pid: &str,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let submission = match submission(multipart, errors::UPDATE_FAILED).await {
        Ok(s) => s,
        Err(response) => return response,
    };

    match services
        .products
        .update(pid, &submission.form, submission.photo)
        .await
    {
        Ok(product) => (
            StatusCode::CREATED,
            axum::Json(json!({
                "success": true,
                "message": "Product Updated Successfully",
                "products": dto::product_to_json(&product),
            })),
        )
            .into_response(),
        Err(e) => errors::product_failure(errors::UPDATE_FAILED, &e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(pid): Path<String>,
) -> Response {
    remove(&services, &pid).await
}

pub async fn delete_product_without_id(
    Extension(services): Extension<Arc<AppServices>>,
) -> Response {
    remove(&services, "").await
}

async fn remove(services: &AppServices, pid: &str) -> Response {
    match services.products.remove(pid).await {
        Ok(()) => errors::json_response(
            StatusCode::OK,
            json!({ "success": true, "message": "Product Deleted successfully" }),
        ),
        Err(e) => errors::product_failure(errors::DELETE_FAILED, &e),
    }
}

pub async fn list_products(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.products.list().await {
        Ok(products) => errors::json_response(
            StatusCode::OK,
            json!({
                "success": true,
                "counTotal": products.len(),
                "message": "ALlProducts ",
                "products": products.iter().map(dto::product_to_json).collect::<Vec<_>>(),
            }),
        ),
        Err(e) => errors::product_failure(errors::LIST_FAILED, &e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(slug): Path<String>,
) -> Response {
    match services.products.find_by_slug(&slug).await {
        Ok(product) => errors::json_response(
            StatusCode::OK,
            json!({
                "success": true,
                "message": "Single Product Fetched",
                "product": dto::product_to_json(&product),
            }),
        ),
        Err(e) => errors::product_failure(errors::SINGLE_FETCH_FAILED, &e),
    }
}

pub async fn product_photo(
    Extension(services): Extension<Arc<AppServices>>,
    Path(pid): Path<String>,
) -> Response {
    match services.products.photo(&pid).await {
        Ok(photo) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, photo.content_type)],
            photo.data,
        )
            .into_response(),
        Err(e) => errors::product_failure(errors::PHOTO_FETCH_FAILED, &e),
    }
}
