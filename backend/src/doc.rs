//! OpenAPI documentation configuration.
//!
//! Registers the record endpoints, their request and response bodies, and
//! the schema wrappers for the domain error. The server does not serve this
//! document; `cargo run --bin openapi-dump` prints it for tooling.

use crate::inbound::http::records::{CreateProductRequest, CreateUserRequest, CreatedResponse};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Dual-write record API",
        description = "Creates users and products in MongoDB and then PostgreSQL."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::records::create_user,
        crate::inbound::http::records::create_product,
    ),
    components(schemas(
        CreateUserRequest,
        CreateProductRequest,
        CreatedResponse,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "records", description = "Record creation in both stores")
    )
)]
pub struct ApiDoc;
