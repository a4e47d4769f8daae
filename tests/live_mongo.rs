use std::{env, time::Duration};

use studentdb::{
    config::MongoConfig,
    mongo::MongoStudentStore,
    students::{NewStudent, StoreError, StudentPatch, StudentStore},
};

fn live_config() -> MongoConfig {
    let uri = env::var("MONGODB_URI")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| "mongodb://127.0.0.1:27017".to_string());
    MongoConfig {
        uri,
        database: "studentdb_live_test".into(),
        collection: "students".into(),
        timeout: Duration::from_secs(5),
    }
}

fn grace() -> NewStudent {
    NewStudent {
        first_name: "Grace".into(),
        last_name: "Hopper".into(),
        phone_number: "1234567890".into(),
        email: "grace@example.com".into(),
        address: "1 Navy Way".into(),
    }
}

#[tokio::test]
#[ignore = "Requires live MongoDB"]
async fn live_mongo_crud_roundtrip() {
    let store = MongoStudentStore::connect(&live_config())
        .await
        .expect("MongoDB should be reachable");
    store.ping().await.expect("ping");

    let created = store.insert(grace()).await.expect("insert");
    let listed = store.list().await.expect("list");
    assert_eq!(
        listed
            .iter()
            .filter(|student| student.id == created.id)
            .count(),
        1
    );

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
    assert_eq!(updated.address, created.address);

    let unchanged = store
        .find_and_update(&created.id, StudentPatch::default())
        .await
        .expect("empty patch");
    assert_eq!(unchanged, updated);

    store.delete(&created.id).await.expect("delete");
    assert!(matches!(
        store.delete(&created.id).await,
        Err(StoreError::NotFound)
    ));

    store.shutdown().await;
}

#[tokio::test]
#[ignore = "Requires live MongoDB"]
async fn live_mongo_rejects_malformed_ids() {
    let store = MongoStudentStore::connect(&live_config())
        .await
        .expect("MongoDB should be reachable");

    assert!(matches!(
        store.parse_id("not-an-object-id"),
        Err(StoreError::InvalidId(_))
    ));
    let missing = store
        .parse_id("000000000000000000000000")
        .expect("well-formed id");
    assert!(matches!(
        store.find(&missing).await,
        Err(StoreError::NotFound)
    ));

    store.shutdown().await;
}
