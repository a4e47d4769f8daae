//! Persistence seam shared by the HTTP surface and every backend.

use crate::students::types::{NewStudent, StoreError, Student, StudentId, StudentPatch};
use async_trait::async_trait;

/// Abstraction over student storage used by the HTTP handlers.
///
/// Implementations are shared through an `Arc` and must tolerate concurrent
/// calls. Updates to the same id are last-writer-wins; updates to different
/// ids never interfere.
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Short backend name used in logs and health output.
    fn backend(&self) -> &'static str;

    /// Parse a caller-supplied id without touching storage.
    fn parse_id(&self, raw: &str) -> Result<StudentId, StoreError>;

    /// Snapshot every stored record.
    async fn list(&self) -> Result<Vec<Student>, StoreError>;

    /// Fetch a single record.
    async fn find(&self, id: &StudentId) -> Result<Student, StoreError>;

    /// Store a validated record under a fresh id and return it.
    async fn insert(&self, student: NewStudent) -> Result<Student, StoreError>;

    /// Apply the supplied fields to an existing record and return the result.
    async fn find_and_update(
        &self,
        id: &StudentId,
        patch: StudentPatch,
    ) -> Result<Student, StoreError>;

    /// Remove a record.
    async fn delete(&self, id: &StudentId) -> Result<(), StoreError>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Release backend resources once the server has stopped.
    async fn shutdown(&self) {}
}
