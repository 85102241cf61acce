//! Internal Diesel row structs.
//!
//! Rows borrow from the domain records so inserts never copy the password.

use diesel::prelude::*;

use crate::domain::{Product, User};

use super::schema::{products, users};

/// Insertable user row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

impl<'a> From<&'a User> for NewUserRow<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            name: user.name(),
            email: user.email(),
            password: user.password().expose(),
        }
    }
}

/// Insertable product row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = products)]
pub(crate) struct NewProductRow<'a> {
    pub name: &'a str,
    pub price: f64,
    pub description: Option<&'a str>,
}

impl<'a> From<&'a Product> for NewProductRow<'a> {
    fn from(product: &'a Product) -> Self {
        Self {
            name: product.name(),
            price: product.price(),
            description: product.description(),
        }
    }
}
