//! Mapping between student records and their MongoDB documents.

use crate::students::{NewStudent, StoreError, Student, StudentId, StudentPatch};
use mongodb::bson::{Document, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// Shape of a student inside the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDocument {
    /// Database-assigned id; omitted on insert so the server generates one.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
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

impl From<NewStudent> for StudentDocument {
    fn from(student: NewStudent) -> Self {
        Self {
            id: None,
            first_name: student.first_name,
            last_name: student.last_name,
            phone_number: student.phone_number,
            email: student.email,
            address: student.address,
        }
    }
}

impl TryFrom<StudentDocument> for Student {
    type Error = StoreError;

    fn try_from(document: StudentDocument) -> Result<Self, Self::Error> {
        let id = document
            .id
            .ok_or_else(|| StoreError::Backend("student document has no _id".into()))?;
        Ok(Self {
            id: StudentId::Object(id),
            first_name: document.first_name,
            last_name: document.last_name,
            phone_number: document.phone_number,
            email: document.email,
            address: document.address,
        })
    }
}

/// Build the `$set` body for a partial update. Only supplied fields appear.
pub fn set_fields(patch: StudentPatch) -> Document {
    let StudentPatch {
        first_name,
        last_name,
        phone_number,
        email,
        address,
    } = patch;

    let mut fields = Document::new();
    let supplied = [
        ("firstName", first_name),
        ("lastName", last_name),
        ("phoneNumber", phone_number),
        ("email", email),
        ("address", address),
    ];
    for (key, value) in supplied {
        if let Some(value) = value {
            fields.insert(key, value);
        }
    }
    fields
}
