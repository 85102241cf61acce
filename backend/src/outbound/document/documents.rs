//! BSON shapes of the stored records.
//!
//! Field names are `name`, `email`, `password`, `price` and `description`.
//! The driver-assigned `_id` is ignored on read.

use mongodb::bson::{self, Document};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::ports::DocumentStoreError;
use crate::domain::{Product, User};

/// User document as written.
#[derive(Debug, Serialize)]
pub(crate) struct NewUserDocument<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

impl<'a> From<&'a User> for NewUserDocument<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            name: user.name(),
            email: user.email(),
            password: user.password().expose(),
        }
    }
}

/// Product document as written. A missing description is omitted.
#[derive(Debug, Serialize)]
pub(crate) struct NewProductDocument<'a> {
    pub name: &'a str,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
}

impl<'a> From<&'a Product> for NewProductDocument<'a> {
    fn from(product: &'a Product) -> Self {
        Self {
            name: product.name(),
            price: product.price(),
            description: product.description(),
        }
    }
}

/// Stored documents predate validation. Absent fields read as empty text or
/// a zero price; only a field of the wrong BSON type is rejected.
#[derive(Deserialize)]
struct UserDocument {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Deserialize)]
struct ProductDocument {
    #[serde(default)]
    name: String,
    #[serde(default)]
    price: f64,
    #[serde(default)]
    description: Option<String>,
}

/// Serialize a record shape into a BSON document.
pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Document, DocumentStoreError> {
    bson::to_document(value).map_err(|err| DocumentStoreError::query(err.to_string()))
}

fn from_document<T: DeserializeOwned>(document: Document) -> Result<T, DocumentStoreError> {
    bson::from_document(document).map_err(|err| DocumentStoreError::decode(err.to_string()))
}

/// Decode a stored user without API validation.
pub(crate) fn decode_user(document: Document) -> Result<User, DocumentStoreError> {
    let raw: UserDocument = from_document(document)?;
    Ok(User::from_stored(raw.name, raw.email, raw.password))
}

/// Decode a stored product without API validation.
pub(crate) fn decode_product(document: Document) -> Result<Product, DocumentStoreError> {
    let raw: ProductDocument = from_document(document)?;
    Ok(Product::from_stored(raw.name, raw.price, raw.description))
}
