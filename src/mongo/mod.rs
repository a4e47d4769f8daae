//! MongoDB integration.

pub mod client;
pub mod document;
pub mod store;

pub use document::StudentDocument;
pub use store::MongoStudentStore;
