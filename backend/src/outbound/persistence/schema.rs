//! Diesel table definitions for the relational store.
//!
//! These must match the DDL in [`super::diesel_relational_store`] exactly.

diesel::table! {
    /// User rows. `email` carries a unique constraint.
    users (id) {
        /// Serial primary key assigned by PostgreSQL.
        id -> Int4,
        name -> Text,
        email -> Text,
        /// Stored as received; see `domain::records`.
        password -> Text,
    }
}

diesel::table! {
    /// Product rows. No uniqueness beyond the serial key.
    products (id) {
        id -> Int4,
        name -> Text,
        price -> Float8,
        description -> Nullable<Text>,
    }
}
