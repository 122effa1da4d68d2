use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
};

use crate::middleware::{self, AuthState};

pub mod payments;
pub mod products;
pub mod system;

/// Catalog and checkout routes, mounted under `/api/v1/product`.
pub fn router(auth_state: AuthState) -> Router {
    let admin = Router::new()
        .route("/create-product", post(products::create_product))
        .route("/update-product/", put(products::update_product_without_id))
        .route("/update-product/:pid", put(products::update_product))
        .route("/delete-product/", delete(products::delete_product_without_id))
        .route("/delete-product/:pid", delete(products::delete_product))
        .route_layer(from_fn(middleware::require_admin))
        .route_layer(from_fn_with_state(auth_state.clone(), middleware::require_sign_in));

    let signed_in = Router::new()
        .route("/braintree/payment", post(payments::checkout))
        .route_layer(from_fn_with_state(auth_state, middleware::require_sign_in));

    Router::new()
        .route("/get-product", get(products::list_products))
        .route("/get-product/:slug", get(products::get_product))
        .route("/product-photo/:pid", get(products::product_photo))
        .route("/braintree/token", get(payments::client_token))
        .merge(admin)
        .merge(signed_in)
}
