//! Records written to both stores.
//!
//! `User` and `Product` carry the same logical schema in the document store
//! and the relational store. Records share no identifier across stores; users
//! correlate by email, products do not correlate at all.
//!
//! # Plaintext passwords
//!
//! **Unsafe:** passwords are persisted to both stores exactly as received,
//! without hashing, because existing documents hold plaintext values and the
//! relational copy must match them. [`Password`] keeps the value out of
//! `Debug` output and logs and wipes its buffer on drop, but this does not
//! make storage safe. Hashing on both sides needs a one-off rewrite of the
//! existing documents first.

use std::fmt;

use zeroize::Zeroize;

/// Record kinds handled by the dual-write and migration paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// A [`User`] record.
    User,
    /// A [`Product`] record.
    Product,
}

impl RecordKind {
    /// Stable lowercase label used in logs and error details.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Product => "product",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation errors returned by the record constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordValidationError {
    /// A required text field was empty once trimmed.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Name of the offending field.
        field: &'static str,
    },
    /// The email address has no `local@domain` shape.
    #[error("email must contain a local part and a domain separated by '@'")]
    InvalidEmail,
    /// The price is NaN or infinite.
    #[error("price must be a finite number")]
    NonFinitePrice,
}

impl RecordValidationError {
    /// Field name the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyField { field } => field,
            Self::InvalidEmail => "email",
            Self::NonFinitePrice => "price",
        }
    }

    /// Stable machine-readable code for error details.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyField { .. } => "empty_field",
            Self::InvalidEmail => "invalid_email",
            Self::NonFinitePrice => "non_finite_price",
        }
    }
}

fn require_text(field: &'static str, value: String) -> Result<String, RecordValidationError> {
    if value.trim().is_empty() {
        return Err(RecordValidationError::EmptyField { field });
    }
    Ok(value)
}

/// Plaintext password stored alongside a user.
///
/// See the module documentation: the value is not hashed.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Validate and wrap a password.
    pub fn new(value: impl Into<String>) -> Result<Self, RecordValidationError> {
        require_text("password", value.into()).map(Self)
    }

    /// Wrap a stored password without validation.
    pub(crate) fn from_stored(value: String) -> Self {
        Self(value)
    }

    /// Expose the plaintext value for persistence adapters.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password([redacted])")
    }
}

impl Password {
    /// Overwrite the buffer with zeros and truncate it.
    fn wipe(&mut self) {
        self.0.zeroize();
    }
}

impl Drop for Password {
    fn drop(&mut self) {
        self.wipe();
    }
}

/// Application user.
///
/// ## Invariants
/// - `name` and `password` are non-empty once trimmed.
/// - `email` has a non-empty local part and domain around an `@`.
///
/// # Examples
/// ```
/// use dualwrite::domain::User;
///
/// let user = User::try_new("Ada", "ada@example.com", "secret").expect("valid user");
/// assert_eq!(user.email(), "ada@example.com");
/// assert!(!format!("{user:?}").contains("secret"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    name: String,
    email: String,
    password: Password,
}

impl User {
    /// Validate and construct a user.
    pub fn try_new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, RecordValidationError> {
        let name = require_text("name", name.into())?;
        let email = require_text("email", email.into())?;
        let well_formed = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
        if !well_formed {
            return Err(RecordValidationError::InvalidEmail);
        }
        let password = Password::new(password)?;
        Ok(Self {
            name,
            email,
            password,
        })
    }

    /// Rebuild a user read back from the document store.
    ///
    /// Stored documents predate validation, so no field is checked; the
    /// relational store only requires the text to be present.
    pub(crate) fn from_stored(name: String, email: String, password: String) -> Self {
        Self {
            name,
            email,
            password: Password::from_stored(password),
        }
    }

    /// Display name of the user.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Email address; unique in the relational store only.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Stored password.
    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Catalogue product.
///
/// ## Invariants
/// - `name` is non-empty once trimmed.
/// - `price` is finite.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    name: String,
    price: f64,
    description: Option<String>,
}

impl Product {
    /// Validate and construct a product.
    ///
    /// # Examples
    /// ```
    /// use dualwrite::domain::Product;
    ///
    /// let product = Product::try_new("Lamp", 19.5, None).expect("valid product");
    /// assert!(product.description().is_none());
    /// assert!(Product::try_new("Lamp", f64::NAN, None).is_err());
    /// ```
    pub fn try_new(
        name: impl Into<String>,
        price: f64,
        description: Option<String>,
    ) -> Result<Self, RecordValidationError> {
        let name = require_text("name", name.into())?;
        if !price.is_finite() {
            return Err(RecordValidationError::NonFinitePrice);
        }
        Ok(Self {
            name,
            price,
            description,
        })
    }

    /// Rebuild a product read back from the document store, unchecked.
    pub(crate) fn from_stored(name: String, price: f64, description: Option<String>) -> Self {
        Self {
            name,
            price,
            description,
        }
    }

    /// Product name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Unit price.
    pub fn price(&self) -> f64 {
        self.price
    }

    /// Optional free-form description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}
