mod registration_log;
mod validation_error;
mod validator;

pub(crate) use {
    registration_log::RegistrationLog,
    validation_error::{InvalidField, ValidationError},
    validator::{Registration, RegistrationValidator},
};
