//! Field rules shared by every storage backend.
//!
//! Rules run in a fixed order (first name, last name, phone presence, phone
//! length, email, address) and the first violation wins.

use crate::students::types::{
    NewStudent, StudentField, StudentInput, StudentPatch, ValidationError, ValidationReason,
};
use std::ops::RangeInclusive;

/// Accepted phone number length, in characters.
pub const PHONE_NUMBER_LENGTH: RangeInclusive<usize> = 10..=15;

/// Validate a create request. All five fields are required.
pub fn validate_new(input: StudentInput) -> Result<NewStudent, ValidationError> {
    let StudentInput {
        first_name,
        last_name,
        phone_number,
        email,
        address,
    } = input;

    let first_name = require(StudentField::FirstName, first_name)?;
    let last_name = require(StudentField::LastName, last_name)?;
    let phone_number = require(StudentField::PhoneNumber, phone_number)?;
    check_phone_length(&phone_number)?;
    let email = require(StudentField::Email, email)?;
    let address = require(StudentField::Address, address)?;

    Ok(NewStudent {
        first_name,
        last_name,
        phone_number,
        email,
        address,
    })
}

/// Validate a partial update.
///
/// Absent and empty fields are both treated as "leave unchanged", so a patch
/// cannot clear a field.
pub fn validate_patch(input: StudentInput) -> Result<StudentPatch, ValidationError> {
    let StudentInput {
        first_name,
        last_name,
        phone_number,
        email,
        address,
    } = input;

    let phone_number = supplied(phone_number);
    if let Some(phone) = phone_number.as_deref() {
        check_phone_length(phone)?;
    }

    Ok(StudentPatch {
        first_name: supplied(first_name),
        last_name: supplied(last_name),
        phone_number,
        email: supplied(email),
        address: supplied(address),
    })
}

fn supplied(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

fn require(field: StudentField, value: Option<String>) -> Result<String, ValidationError> {
    supplied(value).ok_or(ValidationError {
        field,
        reason: ValidationReason::Missing,
    })
}

fn check_phone_length(phone: &str) -> Result<(), ValidationError> {
    let actual = phone.chars().count();
    if PHONE_NUMBER_LENGTH.contains(&actual) {
        Ok(())
    } else {
        Err(ValidationError {
            field: StudentField::PhoneNumber,
            reason: ValidationReason::Length { actual },
        })
    }
}
