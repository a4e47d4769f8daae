//! Process-local student storage.

use crate::students::{
    store::StudentStore,
    types::{NewStudent, StoreError, Student, StudentId, StudentPatch},
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

/// In-memory store keyed by sequential ids.
///
/// Ids are monotonic and never reused, so iterating the map yields records in
/// insertion order. Every operation holds the lock for its whole
/// read-modify-write.
#[derive(Default)]
pub struct InMemoryStudentStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    students: BTreeMap<u64, Student>,
    last_id: u64,
}

impl InMemoryStudentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn sequential(id: &StudentId) -> Result<u64, StoreError> {
    match id {
        StudentId::Sequential(id) => Ok(*id),
        StudentId::Object(_) => Err(StoreError::NotFound),
    }
}

#[async_trait]
impl StudentStore for InMemoryStudentStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn parse_id(&self, raw: &str) -> Result<StudentId, StoreError> {
        raw.parse::<u64>()
            .map(StudentId::Sequential)
            .map_err(|_| StoreError::InvalidId(raw.to_string()))
    }

    async fn list(&self) -> Result<Vec<Student>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.students.values().cloned().collect())
    }

    async fn find(&self, id: &StudentId) -> Result<Student, StoreError> {
        let key = sequential(id)?;
        let inner = self.inner.lock().await;
        inner
            .students
            .get(&key)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn insert(&self, student: NewStudent) -> Result<Student, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.last_id += 1;
        let id = inner.last_id;
        let student = Student::from_new(StudentId::Sequential(id), student);
        inner.students.insert(id, student.clone());
        tracing::debug!(id, "Student stored in memory");
        Ok(student)
    }

    async fn find_and_update(
        &self,
        id: &StudentId,
        patch: StudentPatch,
    ) -> Result<Student, StoreError> {
        let key = sequential(id)?;
        let mut inner = self.inner.lock().await;
        let student = inner.students.get_mut(&key).ok_or(StoreError::NotFound)?;
        student.apply(patch);
        Ok(student.clone())
    }

    async fn delete(&self, id: &StudentId) -> Result<(), StoreError> {
        let key = sequential(id)?;
        let mut inner = self.inner.lock().await;
        inner
            .students
            .remove(&key)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_student(first_name: &str) -> NewStudent {
        NewStudent {
            first_name: first_name.into(),
            last_name: "Lovelace".into(),
            phone_number: "1234567890".into(),
            email: "a@b.com".into(),
            address: "1 Infinite Loop".into(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids_and_lists_in_order() {
        let store = InMemoryStudentStore::new();
        let first = store.insert(new_student("Ada")).await.expect("insert");
        let second = store.insert(new_student("Grace")).await.expect("insert");

        assert_eq!(first.id, StudentId::Sequential(1));
        assert_eq!(second.id, StudentId::Sequential(2));

        let listed = store.list().await.expect("list");
        assert_eq!(listed, vec![first, second]);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = InMemoryStudentStore::new();
        let first = store.insert(new_student("Ada")).await.expect("insert");
        let second = store.insert(new_student("Grace")).await.expect("insert");
        store.delete(&second.id).await.expect("delete");

        let third = store.insert(new_student("Edsger")).await.expect("insert");
        assert_eq!(third.id, StudentId::Sequential(3));
        assert_ne!(third.id, first.id);
    }

    #[tokio::test]
    async fn update_applies_only_supplied_fields() {
        let store = InMemoryStudentStore::new();
        let created = store.insert(new_student("Ada")).await.expect("insert");
        let patch = StudentPatch {
            phone_number: Some("0987654321".into()),
            ..StudentPatch::default()
        };

        let updated = store
            .find_and_update(&created.id, patch)
            .await
            .expect("update");

        assert_eq!(updated.phone_number, "0987654321");
        assert_eq!(updated.first_name, created.first_name);
        assert_eq!(updated.last_name, created.last_name);
        assert_eq!(updated.email, created.email);
        assert_eq!(updated.address, created.address);
        assert_eq!(store.find(&created.id).await.expect("find"), updated);
    }

    #[tokio::test]
    async fn missing_ids_report_not_found() {
        let store = InMemoryStudentStore::new();
        let id = StudentId::Sequential(42);

        assert!(matches!(store.find(&id).await, Err(StoreError::NotFound)));
        assert!(matches!(store.delete(&id).await, Err(StoreError::NotFound)));
        assert!(matches!(
            store.find_and_update(&id, StudentPatch::default()).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn delete_removes_record_from_list() {
        let store = InMemoryStudentStore::new();
        let created = store.insert(new_student("Ada")).await.expect("insert");
        store.delete(&created.id).await.expect("delete");
        assert!(store.list().await.expect("list").is_empty());
    }

    #[test]
    fn parse_id_rejects_non_integers() {
        let store = InMemoryStudentStore::new();
        assert_eq!(store.parse_id("12").expect("id"), StudentId::Sequential(12));
        for raw in ["abc", "-1", "1.5", ""] {
            assert!(
                matches!(store.parse_id(raw), Err(StoreError::InvalidId(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn concurrent_inserts_get_unique_ids() {
        let store = Arc::new(InMemoryStudentStore::new());
        let mut handles = Vec::new();
        for index in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .insert(new_student(&format!("Student {index}")))
                    .await
                    .expect("insert")
                    .id
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.expect("join"));
        }
        ids.sort_by_key(|id| id.to_string().parse::<u64>().expect("numeric"));
        ids.dedup();
        assert_eq!(ids.len(), 32);
        assert_eq!(store.list().await.expect("list").len(), 32);
    }
}
