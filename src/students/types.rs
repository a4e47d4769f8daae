//! Core data types and error definitions for student records.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Identifier assigned to a stored student by its backend.
///
/// The in-memory store hands out sequential integers; MongoDB assigns an
/// `ObjectId`. Both serialize untagged, so JSON carries either a number or a
/// 24-character hex string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum StudentId {
    /// Sequential id from the in-memory store.
    Sequential(u64),
    /// Database-assigned object id.
    Object(#[serde(serialize_with = "serialize_object_id")] ObjectId),
}

fn serialize_object_id<S>(id: &ObjectId, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&id.to_hex())
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential(id) => write!(f, "{id}"),
            Self::Object(id) => write!(f, "{}", id.to_hex()),
        }
    }
}

/// A stored student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// Backend-assigned identifier.
    pub id: StudentId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact number, 10 to 15 characters.
    pub phone_number: String,
    /// Contact email address.
    pub email: String,
    /// Postal address.
    pub address: String,
}

impl Student {
    /// Attach an id to a validated record.
    pub fn from_new(id: StudentId, student: NewStudent) -> Self {
        let NewStudent {
            first_name,
            last_name,
            phone_number,
            email,
            address,
        } = student;
        Self {
            id,
            first_name,
            last_name,
            phone_number,
            email,
            address,
        }
    }

    /// Overwrite the fields supplied by `patch`, leaving the rest untouched.
    pub fn apply(&mut self, patch: StudentPatch) {
        let StudentPatch {
            first_name,
            last_name,
            phone_number,
            email,
            address,
        } = patch;
        if let Some(value) = first_name {
            self.first_name = value;
        }
        if let Some(value) = last_name {
            self.last_name = value;
        }
        if let Some(value) = phone_number {
            self.phone_number = value;
        }
        if let Some(value) = email {
            self.email = value;
        }
        if let Some(value) = address {
            self.address = value;
        }
    }
}

/// Raw request body for create and patch.
///
/// Every field is optional at this stage; the validator decides what is
/// required. Unknown fields (including a client-supplied `id`) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInput {
    /// Candidate given name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Candidate family name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Candidate phone number.
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Candidate email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Candidate postal address.
    #[serde(default)]
    pub address: Option<String>,
}

/// A fully validated record that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact number.
    pub phone_number: String,
    /// Contact email address.
    pub email: String,
    /// Postal address.
    pub address: String,
}

/// Validated partial update. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentPatch {
    /// Replacement given name.
    pub first_name: Option<String>,
    /// Replacement family name.
    pub last_name: Option<String>,
    /// Replacement phone number.
    pub phone_number: Option<String>,
    /// Replacement email address.
    pub email: Option<String>,
    /// Replacement postal address.
    pub address: Option<String>,
}

impl StudentPatch {
    /// True when the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone_number.is_none()
            && self.email.is_none()
            && self.address.is_none()
    }
}

/// Student fields subject to validation, in rule order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentField {
    /// `firstName`
    FirstName,
    /// `lastName`
    LastName,
    /// `phoneNumber`
    PhoneNumber,
    /// `email`
    Email,
    /// `address`
    Address,
}

impl StudentField {
    /// JSON name of the field.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::PhoneNumber => "phoneNumber",
            Self::Email => "email",
            Self::Address => "address",
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::FirstName => "First Name",
            Self::LastName => "Last Name",
            Self::PhoneNumber => "Phone Number",
            Self::Email => "Email",
            Self::Address => "Address",
        }
    }
}

/// Why a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationReason {
    /// Required value was absent or empty.
    Missing,
    /// Value length fell outside the accepted range.
    Length {
        /// Observed length in characters.
        actual: usize,
    },
}

/// First rule violated by a candidate record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{}", self.message())]
pub struct ValidationError {
    /// Offending field.
    pub field: StudentField,
    /// Violated rule.
    pub reason: ValidationReason,
}

impl ValidationError {
    /// Client-facing message for this violation.
    pub fn message(&self) -> String {
        match self.reason {
            ValidationReason::Missing => format!("Student {} is required", self.field.label()),
            ValidationReason::Length { .. } => "Invalid phone number format".to_string(),
        }
    }
}

/// Errors returned by persistence adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Caller-supplied id does not match the backend's id format.
    #[error("Invalid student id: {0}")]
    InvalidId(String),
    /// No record exists with the given id.
    #[error("Student not found")]
    NotFound,
    /// Backend did not answer within the configured bound.
    #[error("Database request timed out after {0:?}")]
    Timeout(Duration),
    /// Backend failed or was unreachable.
    #[error("Database request failed: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(error: mongodb::error::Error) -> Self {
        Self::Backend(Box::new(error))
    }
}
