//! Order form validation.
//!
//! Validation never fails fast: every check runs and each failing field gets
//! its own message, so the form can show all problems at once. Field errors
//! are plain data handed back to the view, never an `Err`.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::types::{Pin, PhoneNumber};

/// Message shown when the customer name is missing.
pub const CUSTOMER_REQUIRED: &str = "Please tell us your name";
/// Message shown when the phone number is missing or malformed.
pub const PHONE_INVALID: &str = "Please provide a valid phone number";
/// Message shown when the delivery address is missing.
pub const ADDRESS_REQUIRED: &str = "Please provide a delivery address";
/// Message shown when the PIN is not four digits.
pub const PIN_INVALID: &str = "Please provide a pin of 4 digits";

/// An order form field that can carry a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Customer,
    Phone,
    Address,
    Pin,
}

impl Field {
    /// Form field name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Phone => "phone",
            Self::Address => "address",
            Self::Pin => "pin",
        }
    }
}

/// Field name to error message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    /// No errors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for a field, replacing any earlier one.
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Error message for a field, if any.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Errors in field order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self
            .0
            .keys()
            .map(|field| field.name())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "invalid fields: {names}")
    }
}

/// Check the user-entered order fields.
///
/// The phone and PIN checks run independently of each other, so a submission
/// can come back with both errors together.
#[must_use]
pub fn check_order_fields(customer: &str, phone: &str, address: &str, pin: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if customer.trim().is_empty() {
        errors.insert(Field::Customer, CUSTOMER_REQUIRED);
    }
    if PhoneNumber::parse(phone).is_err() {
        errors.insert(Field::Phone, PHONE_INVALID);
    }
    if address.trim().is_empty() {
        errors.insert(Field::Address, ADDRESS_REQUIRED);
    }
    if Pin::parse(pin).is_err() {
        errors.insert(Field::Pin, PIN_INVALID);
    }

    errors
}
