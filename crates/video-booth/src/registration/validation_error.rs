use std::fmt;

use error_location::ErrorLocation;
use serde::Serialize;
use thiserror::Error;

/// A registration field that failed its rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidField {
    /// Name of three characters or fewer.
    Name,
    /// Email not shaped like `local@domain.tld`.
    Email,
    /// Phone with fewer than nine digits.
    Phone,
}

impl InvalidField {
    /// Message shown next to the field.
    pub fn message(&self) -> &'static str {
        match self {
            InvalidField::Name => "Name must be longer than 3 characters",
            InvalidField::Email => "Enter a valid email address",
            InvalidField::Phone => "Phone number must have at least 9 digits",
        }
    }
}

impl fmt::Display for InvalidField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Registration rejected; lists every failing field.
#[derive(Error, Debug)]
#[error("{} {location}", display_fields(.fields))]
pub struct ValidationError {
    /// Fields in form order.
    pub fields: Vec<InvalidField>,
    /// Location where this error was created.
    pub location: ErrorLocation,
}

fn display_fields(fields: &[InvalidField]) -> String {
    fields
        .iter()
        .map(InvalidField::message)
        .collect::<Vec<_>>()
        .join("; ")
}
