use crate::{
    AppError, AppResult,
    registration::{InvalidField, ValidationError},
};

use std::panic::Location;

use error_location::ErrorLocation;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

const EMAIL_PATTERN: &str = r"^[A-Z0-9a-z._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,64}$";
const MIN_NAME_CHARS: usize = 4;
const MIN_PHONE_DIGITS: usize = 9;

/// A validated registrant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    /// Trimmed name.
    pub name: String,
    /// Trimmed email.
    pub email: String,
    /// Trimmed phone, as typed.
    pub phone: String,
}

/// Checks the registration form.
#[derive(Debug, Clone)]
pub struct RegistrationValidator {
    email: Regex,
}

impl RegistrationValidator {
    /// Compile the email pattern.
    #[track_caller]
    pub fn new() -> AppResult<Self> {
        let email = Regex::new(EMAIL_PATTERN).map_err(|e| AppError::ConfigError {
            reason: format!("Invalid email pattern: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(Self { email })
    }

    /// Validate all three fields at once.
    ///
    /// # Errors
    ///
    /// `ValidationError` naming every field that failed.
    #[track_caller]
    pub fn validate(
        &self,
        name: &str,
        email: &str,
        phone: &str,
    ) -> Result<Registration, ValidationError> {
        let name = name.trim();
        let email = email.trim();
        let phone = phone.trim();

        let mut fields = Vec::new();

        if name.chars().count() < MIN_NAME_CHARS {
            fields.push(InvalidField::Name);
        }

        if !self.email.is_match(email) {
            fields.push(InvalidField::Email);
        }

        if phone.chars().filter(char::is_ascii_digit).count() < MIN_PHONE_DIGITS {
            fields.push(InvalidField::Phone);
        }

        if !fields.is_empty() {
            debug!(fields = ?fields, "Registration rejected");
            return Err(ValidationError {
                fields,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(Registration {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        })
    }
}
