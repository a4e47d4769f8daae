//! Student storage backed by a single MongoDB collection.

use crate::{
    config::MongoConfig,
    mongo::{
        client,
        document::{StudentDocument, set_fields},
    },
    students::{NewStudent, StoreError, Student, StudentId, StudentPatch, StudentStore},
};
use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Client, Collection,
    bson::{doc, oid::ObjectId},
    options::ReturnDocument,
};
use std::future::IntoFuture;
use std::time::Duration;

/// MongoDB-backed [`StudentStore`].
///
/// Holds no in-process lock: each operation is one round trip and relies on
/// the server's per-document atomicity.
pub struct MongoStudentStore {
    client: Client,
    collection: Collection<StudentDocument>,
    timeout: Duration,
}

impl MongoStudentStore {
    /// Connect, verify the deployment with a `ping`, and bind the collection.
    pub async fn connect(config: &MongoConfig) -> Result<Self, StoreError> {
        let client = client::connect(&config.uri, config.timeout).await?;
        tracing::debug!(
            database = %config.database,
            collection = %config.collection,
            timeout = ?config.timeout,
            "Bound student collection"
        );
        Ok(Self::with_client(
            client,
            &config.database,
            &config.collection,
            config.timeout,
        ))
    }

    /// Wrap an existing client.
    pub fn with_client(
        client: Client,
        database: &str,
        collection: &str,
        timeout: Duration,
    ) -> Self {
        let collection = client.database(database).collection(collection);
        Self {
            client,
            collection,
            timeout,
        }
    }

    async fn bounded<T, F>(&self, operation: F) -> Result<T, StoreError>
    where
        F: IntoFuture<Output = mongodb::error::Result<T>>,
    {
        match tokio::time::timeout(self.timeout, operation.into_future()).await {
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => {
                tracing::warn!(timeout = ?self.timeout, "MongoDB request timed out");
                Err(StoreError::Timeout(self.timeout))
            }
        }
    }
}

fn object_id(id: &StudentId) -> Result<ObjectId, StoreError> {
    match id {
        StudentId::Object(id) => Ok(*id),
        StudentId::Sequential(_) => Err(StoreError::NotFound),
    }
}

#[async_trait]
impl StudentStore for MongoStudentStore {
    fn backend(&self) -> &'static str {
        "mongo"
    }

    fn parse_id(&self, raw: &str) -> Result<StudentId, StoreError> {
        ObjectId::parse_str(raw)
            .map(StudentId::Object)
            .map_err(|_| StoreError::InvalidId(raw.to_string()))
    }

    async fn list(&self) -> Result<Vec<Student>, StoreError> {
        let documents: Vec<StudentDocument> = self
            .bounded(async {
                let cursor = self.collection.find(doc! {}).await?;
                cursor.try_collect::<Vec<_>>().await
            })
            .await?;
        documents.into_iter().map(Student::try_from).collect()
    }

    async fn find(&self, id: &StudentId) -> Result<Student, StoreError> {
        let oid = object_id(id)?;
        self.bounded(self.collection.find_one(doc! { "_id": oid }))
            .await?
            .ok_or(StoreError::NotFound)
            .and_then(Student::try_from)
    }

    async fn insert(&self, student: NewStudent) -> Result<Student, StoreError> {
        let document = StudentDocument::from(student);
        let result = self.bounded(self.collection.insert_one(&document)).await?;
        let oid = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| StoreError::Backend("inserted id is not an ObjectId".into()))?;
        tracing::debug!(id = %oid, "Student inserted");
        Student::try_from(StudentDocument {
            id: Some(oid),
            ..document
        })
    }

    async fn find_and_update(
        &self,
        id: &StudentId,
        patch: StudentPatch,
    ) -> Result<Student, StoreError> {
        let fields = set_fields(patch);
        if fields.is_empty() {
            // `$set` rejects an empty document
            return self.find(id).await;
        }

        let oid = object_id(id)?;
        self.bounded(
            self.collection
                .find_one_and_update(doc! { "_id": oid }, doc! { "$set": fields })
                .return_document(ReturnDocument::After),
        )
        .await?
        .ok_or(StoreError::NotFound)
        .and_then(Student::try_from)
    }

    async fn delete(&self, id: &StudentId) -> Result<(), StoreError> {
        let oid = object_id(id)?;
        let result = self
            .bounded(self.collection.delete_one(doc! { "_id": oid }))
            .await?;
        if result.deleted_count == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.bounded(client::ping(&self.client)).await
    }

    async fn shutdown(&self) {
        client::disconnect(self.client.clone()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::create_router;
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{HeaderValue, Method, Request, StatusCode, header},
    };
    use mongodb::options::ClientOptions;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    const WELL_FORMED_ID: &str = "507f1f77bcf86cd799439011";

    /// Store pointed at a port nothing listens on. The client connects lazily.
    async fn unreachable_store(selection: Duration, timeout: Duration) -> MongoStudentStore {
        let mut options = ClientOptions::parse("mongodb://127.0.0.1:1")
            .await
            .expect("connection string");
        options.server_selection_timeout = Some(selection);
        options.connect_timeout = Some(selection);
        let client = Client::with_options(options).expect("client");
        MongoStudentStore::with_client(client, "studentdb", "students", timeout)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(payload) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(payload.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("router response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn parse_id_accepts_only_24_hex_characters() {
        let store = unreachable_store(Duration::from_millis(300), Duration::from_secs(2)).await;

        let id = store.parse_id(WELL_FORMED_ID).expect("well-formed id");
        assert_eq!(id.to_string(), WELL_FORMED_ID);

        for raw in [
            "xyz",
            "",
            "507f1f77bcf86cd79943901",
            "507f1f77bcf86cd7994390111",
            "507f1f77bcf86cd79943901z",
            "42",
        ] {
            assert!(
                matches!(store.parse_id(raw), Err(StoreError::InvalidId(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn sequential_ids_are_never_found() {
        let store = unreachable_store(Duration::from_millis(300), Duration::from_secs(2)).await;
        let id = StudentId::Sequential(1);

        assert!(matches!(store.find(&id).await, Err(StoreError::NotFound)));
        assert!(matches!(store.delete(&id).await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn slow_server_selection_reports_timeout() {
        let store = unreachable_store(Duration::from_secs(30), Duration::from_millis(100)).await;

        let error = store.list().await.expect_err("nothing listens on port 1");
        assert!(matches!(error, StoreError::Timeout(_)), "{error:?}");
    }

    #[tokio::test]
    async fn unreachable_server_maps_to_server_errors() {
        let store = unreachable_store(Duration::from_millis(300), Duration::from_secs(2)).await;
        let app = create_router(
            Arc::new(store),
            HeaderValue::from_static("http://localhost:5173"),
        );
        let patch = json!({ "address": "2 Infinite Loop" });

        let (status, body) = send(
            &app,
            Method::PATCH,
            "/api/students/xyz",
            Some(patch.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Invalid student ID" }));

        let uri = format!("/api/students/{WELL_FORMED_ID}");
        let (status, body) = send(&app, Method::PATCH, &uri, Some(patch)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Update student failed" }));

        let (status, body) = send(&app, Method::GET, "/api/students", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "List students failed" }));

        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            body,
            json!({ "status": "unavailable", "backend": "mongo" })
        );
    }
}
