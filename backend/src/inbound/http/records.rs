//! Record creation handlers.
//!
//! ```text
//! POST /users    {"name":"A","email":"a@x.com","password":"p"}
//! POST /products {"name":"Lamp","price":19.5,"description":"Warm light"}
//! ```
//!
//! Both endpoints write through the [`crate::domain::ports::RecordWriter`]
//! port. A store failure becomes a 500 `store_write_failed` body naming the
//! stage that failed.

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ApiResult, Error, Product, RecordKind, User};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::validation_error;

/// Request body for `POST /users`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateUserRequest {
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    /// Stored as received, without hashing.
    #[schema(example = "correct horse battery staple")]
    pub password: String,
}

impl TryFrom<CreateUserRequest> for User {
    type Error = Error;

    fn try_from(value: CreateUserRequest) -> Result<Self, Self::Error> {
        User::try_new(value.name, value.email, value.password).map_err(validation_error)
    }
}

/// Request body for `POST /products`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateProductRequest {
    #[schema(example = "Desk lamp")]
    pub name: String,
    #[schema(example = 19.5)]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Warm light, brass finish")]
    pub description: Option<String>,
}

impl TryFrom<CreateProductRequest> for Product {
    type Error = Error;

    fn try_from(value: CreateProductRequest) -> Result<Self, Self::Error> {
        Product::try_new(value.name, value.price, value.description).map_err(validation_error)
    }
}

/// Success body returned once a record is in both stores.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreatedResponse {
    #[schema(example = "User created successfully in MongoDB and PostgreSQL!")]
    pub message: String,
}

impl CreatedResponse {
    fn for_kind(kind: RecordKind) -> Self {
        let label = match kind {
            RecordKind::User => "User",
            RecordKind::Product => "Product",
        };
        Self {
            message: format!("{label} created successfully in MongoDB and PostgreSQL!"),
        }
    }
}

/// Create a user in the document store, then the relational store.
#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User written to both stores", body = CreatedResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 500, description = "A store rejected the write", body = ErrorSchema)
    ),
    tags = ["records"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<web::Json<CreatedResponse>> {
    let user = User::try_from(payload.into_inner())?;
    let outcome = state.writer.write_user(user).await?;
    Ok(web::Json(CreatedResponse::for_kind(outcome.kind())))
}

/// Create a product in the document store, then the relational store.
#[utoipa::path(
    post,
    path = "/products",
    request_body = CreateProductRequest,
    responses(
        (status = 200, description = "Product written to both stores", body = CreatedResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 500, description = "A store rejected the write", body = ErrorSchema)
    ),
    tags = ["records"],
    operation_id = "createProduct"
)]
#[post("/products")]
pub async fn create_product(
    state: web::Data<HttpState>,
    payload: web::Json<CreateProductRequest>,
) -> ApiResult<web::Json<CreatedResponse>> {
    let product = Product::try_from(payload.into_inner())?;
    let outcome = state.writer.write_product(product).await?;
    Ok(web::Json(CreatedResponse::for_kind(outcome.kind())))
}

#[cfg(test)]
mod tests;
