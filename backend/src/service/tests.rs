use std::sync::Arc;

use chrono::{Duration, NaiveDate, TimeZone, Utc};

use super::*;
use crate::clock::ManualClock;
use crate::storage::{FilesystemBlobStore, MemoryBlobStore};

fn fixture() -> (StatusService, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap(),
    ));
    let service = StatusService::new(Arc::new(MemoryBlobStore::new()), clock.clone());
    (service, clock)
}

fn create(entity_type: &str, name: &str, status: &str) -> CreateEntityRequest {
    CreateEntityRequest {
        entity_type: Some(entity_type.to_string()),
        name: Some(name.to_string()),
        status: Some(status.to_string()),
        update_note: Some(format!("{} created", name)),
    }
}

fn update(entity_type: &str, entity_id: &str, status: &str, note: &str) -> UpdateStatusRequest {
    UpdateStatusRequest {
        entity_type: Some(entity_type.to_string()),
        entity_id: Some(entity_id.to_string()),
        name: None,
        status: Some(status.to_string()),
        update_note: Some(note.to_string()),
    }
}

fn delete(entity_type: &str, entity_id: &str) -> DeleteEntityRequest {
    DeleteEntityRequest {
        entity_type: Some(entity_type.to_string()),
        entity_id: Some(entity_id.to_string()),
    }
}

#[tokio::test]
async fn test_update_existing_records_previous_status() {
    let (service, clock) = fixture();
    service
        .create_entity(create("department", "IT", "On Track"))
        .await
        .unwrap();

    clock.advance(Duration::minutes(10));
    let timestamp = service
        .update_status(update("department", "it", "Delayed", "Switch outage"))
        .await
        .unwrap();

    let doc = service.get_status().await.unwrap();
    let entity = doc.find_entity(EntityType::Department, "it").unwrap();
    assert_eq!(entity.last_update, timestamp);
    assert_eq!(entity.status, Status::Delayed);
    assert_eq!(entity.update_note, "Switch outage");

    let history = service.get_history("it", 50).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].timestamp, timestamp);
    assert_eq!(history[0].previous_status, Some(Status::OnTrack));
    assert_eq!(history[0].entity_name, "IT");
    assert_eq!(history[1].previous_status, None);
}

#[tokio::test]
async fn test_update_unknown_entity_creates_it() {
    let (service, _clock) = fixture();

    let mut request = update("cell", "project_delta", "At Risk", "");
    request.name = Some("Project Delta".to_string());
    service.update_status(request).await.unwrap();

    service
        .update_status(update("cell", "nameless", "Emergency", "no name given"))
        .await
        .unwrap();

    let doc = service.get_status().await.unwrap();
    assert_eq!(
        doc.find_entity(EntityType::Cell, "project_delta")
            .map(|e| e.name.as_str()),
        Some("Project Delta")
    );
    assert_eq!(
        doc.find_entity(EntityType::Cell, "nameless")
            .map(|e| e.name.as_str()),
        Some("nameless")
    );

    let history = service.get_history("project_delta", 50).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].previous_status, None);
    assert_eq!(history[0].entity_type, EntityType::Cell);
}

#[tokio::test]
async fn test_update_ignores_name_for_existing_entity() {
    let (service, _clock) = fixture();
    service
        .create_entity(create("department", "Credit", "On Track"))
        .await
        .unwrap();

    let mut request = update("department", "credit", "At Risk", "");
    request.name = Some("Renamed".to_string());
    service.update_status(request).await.unwrap();

    let doc = service.get_status().await.unwrap();
    assert_eq!(doc.departments[0].name, "Credit");
}

#[tokio::test]
async fn test_update_validation() {
    let (service, _clock) = fixture();

    let mut missing_type = update("department", "it", "Delayed", "");
    missing_type.entity_type = None;
    let mut blank_id = update("department", "it", "Delayed", "");
    blank_id.entity_id = Some("   ".to_string());
    let mut missing_status = update("department", "it", "Delayed", "");
    missing_status.status = None;

    for request in [
        missing_type,
        blank_id,
        missing_status,
        update("team", "it", "Delayed", ""),
        update("department", "it", "Fine", ""),
    ] {
        let err = service.update_status(request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "got {:?}", err);
    }

    assert!(!service.entity_store().exists().await.unwrap());
}

#[tokio::test]
async fn test_last_update_never_backdated() {
    let (service, clock) = fixture();
    let created = service
        .create_entity(create("cell", "Project Alpha", "On Track"))
        .await
        .unwrap();

    clock.advance(Duration::hours(-2));
    let timestamp = service
        .update_status(update("cell", "project_alpha", "At Risk", "clock skew"))
        .await
        .unwrap();

    assert_eq!(timestamp, created.timestamp);
    let doc = service.get_status().await.unwrap();
    assert_eq!(doc.cells[0].last_update, created.timestamp);
    assert_eq!(doc.cells[0].status, Status::AtRisk);
}

#[tokio::test]
async fn test_create_derives_id_and_rejects_duplicates() {
    let (service, _clock) = fixture();

    let created = service
        .create_entity(create("department", "My Dept!", "On Track"))
        .await
        .unwrap();
    assert_eq!(created.entity_id, "my_dept_");

    let err = service
        .create_entity(create("department", "my dept?", "Delayed"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // same id in the other collection is fine
    service
        .create_entity(create("cell", "My Dept!", "On Track"))
        .await
        .unwrap();

    let doc = service.get_status().await.unwrap();
    assert_eq!(doc.departments.len(), 1);
    assert_eq!(doc.departments[0].status, Status::OnTrack);
    assert_eq!(doc.cells.len(), 1);
}

#[tokio::test]
async fn test_create_validation() {
    let (service, _clock) = fixture();

    let mut missing_name = create("department", "x", "On Track");
    missing_name.name = None;

    for request in [
        missing_name,
        create("department", "", "On Track"),
        create("", "Ops", "On Track"),
        create("department", "Ops", "Great"),
    ] {
        let err = service.create_entity(request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "got {:?}", err);
    }
}

#[tokio::test]
async fn test_delete_unknown_leaves_document_unchanged() {
    let (service, _clock) = fixture();
    service
        .create_entity(create("department", "Export", "On Track"))
        .await
        .unwrap();
    let before = service.get_status().await.unwrap();

    let err = service
        .delete_entity(delete("department", "import"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // wrong collection is also not found
    let err = service
        .delete_entity(delete("cell", "export"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    assert_eq!(service.get_status().await.unwrap(), before);
}

#[tokio::test]
async fn test_history_survives_delete_without_delete_event() {
    let (service, clock) = fixture();
    service
        .create_entity(create("cell", "Project Beta", "At Risk"))
        .await
        .unwrap();
    clock.advance(Duration::minutes(1));
    service
        .update_status(update("cell", "project_beta", "Delayed", "waiting on parts"))
        .await
        .unwrap();

    service
        .delete_entity(delete("cell", "project_beta"))
        .await
        .unwrap();

    let doc = service.get_status().await.unwrap();
    assert!(doc.find_entity(EntityType::Cell, "project_beta").is_none());

    let history = service.get_history("project_beta", 50).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].status, Status::Delayed);
}

#[tokio::test]
async fn test_recreate_after_delete() {
    let (service, clock) = fixture();
    service
        .create_entity(create("department", "Ecom", "On Track"))
        .await
        .unwrap();
    service
        .delete_entity(delete("department", "ecom"))
        .await
        .unwrap();

    clock.advance(Duration::minutes(5));
    let created = service
        .create_entity(create("department", "Ecom", "Emergency"))
        .await
        .unwrap();
    assert_eq!(created.entity_id, "ecom");

    let history = service.get_history("ecom", 50).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|e| e.previous_status.is_none()));
}

#[tokio::test]
async fn test_history_limit_across_day_partitions() {
    let blobs = Arc::new(MemoryBlobStore::new());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap(),
    ));
    let service = StatusService::new(blobs.clone(), clock.clone());
    service
        .create_entity(create("department", "Accounting", "On Track"))
        .await
        .unwrap();

    for (days, status) in [(1, "At Risk"), (2, "Delayed"), (3, "Emergency")] {
        clock.set(Utc.with_ymd_and_hms(2026, 10, 17 + days, 8, 0, 0).unwrap());
        service
            .update_status(update("department", "accounting", status, ""))
            .await
            .unwrap();
    }

    let history = service.get_history("accounting", 2).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].status, Status::Emergency);
    assert_eq!(history[1].status, Status::Delayed);
    assert!(history[0].timestamp > history[1].timestamp);

    // each day got its own partition
    let log = HistoryLog::new(blobs);
    for day in 17..=20 {
        let partition = log
            .read_partition(NaiveDate::from_ymd_opt(2026, 10, day).unwrap())
            .await
            .unwrap();
        assert_eq!(partition.len(), 1);
    }
}

#[tokio::test]
async fn test_status_reflects_latest_update_not_creation() {
    let (service, clock) = fixture();
    let created = service
        .create_entity(create("cell", "Project Gamma", "Emergency"))
        .await
        .unwrap();

    clock.advance(Duration::seconds(30));
    let updated = service
        .update_status(update("cell", "project_gamma", "On Track", "resolved"))
        .await
        .unwrap();

    let doc = service.get_status().await.unwrap();
    let entity = doc.find_entity(EntityType::Cell, "project_gamma").unwrap();
    assert_eq!(entity.status, Status::OnTrack);
    assert_eq!(entity.update_note, "resolved");
    assert_eq!(entity.last_update, updated);
    assert!(updated > created.timestamp);
}

#[tokio::test]
async fn test_concurrent_updates_in_process_are_serialized() {
    let (service, _clock) = fixture();
    let service = Arc::new(service);

    let mut tasks = Vec::new();
    for i in 0..8 {
        let service = service.clone();
        tasks.push(tokio::spawn(async move {
            service
                .update_status(update(
                    "cell",
                    &format!("cell_{}", i),
                    "On Track",
                    "parallel",
                ))
                .await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let doc = service.get_status().await.unwrap();
    assert_eq!(doc.cells.len(), 8);
    for i in 0..8 {
        assert_eq!(service.get_history(&format!("cell_{}", i), 50).await.unwrap().len(), 1);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_status_polls_during_updates_on_filesystem() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let blobs = Arc::new(FilesystemBlobStore::open(temp_dir.path()).await.unwrap());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap(),
    ));
    let service = Arc::new(StatusService::new(blobs, clock));

    for i in 0..200 {
        service
            .update_status(update("cell", &format!("cell_{}", i), "On Track", "seed"))
            .await
            .unwrap();
    }

    let writer = {
        let service = service.clone();
        tokio::spawn(async move {
            for i in 0..100 {
                service
                    .update_status(update("cell", &format!("cell_{}", i), "Delayed", "poll"))
                    .await
                    .unwrap();
            }
        })
    };

    loop {
        let done = writer.is_finished();
        let doc = service.get_status().await.unwrap();
        assert_eq!(doc.cells.len(), 200);
        if done {
            break;
        }
    }
    writer.await.unwrap();
}
