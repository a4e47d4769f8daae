//! Student records: schema, validation, and the storage seam.

pub mod memory;
pub mod store;
pub mod types;
pub mod validate;

pub use memory::InMemoryStudentStore;
pub use store::StudentStore;
pub use types::{
    NewStudent, StoreError, Student, StudentField, StudentId, StudentInput, StudentPatch,
    ValidationError, ValidationReason,
};
pub use validate::{PHONE_NUMBER_LENGTH, validate_new, validate_patch};
