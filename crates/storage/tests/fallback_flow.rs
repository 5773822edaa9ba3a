use std::sync::Arc;
use std::time::Duration;

use career_core::model::{
    CareerTitle, CompletedStep, Email, Grade, NewUser, SessionId, SessionUser, StepIndex, UserId,
    UserName,
};
use career_core::time::fixed_now;
use storage::mysql::{DbConfig, MySqlRepository};
use storage::probe::{ConnectionProber, HealthCheck};
use storage::repository::{
    InMemoryRepository, MEMORY_USER_ID_BASE, SessionRecord, SessionRepository, StepRepository,
    UserInsert, UserRepository,
};
use storage::{Availability, Storage, StoreAvailability, StoreKind};

fn unreachable_config() -> DbConfig {
    DbConfig {
        host: "127.0.0.1".into(),
        // Nothing listens on the discard port in the test environment.
        port: 9,
        connect_timeout: Duration::from_millis(500),
        ..DbConfig::default()
    }
}

#[tokio::test]
async fn unreachable_database_serves_everything_from_memory() {
    let repo = MySqlRepository::lazy(&unreachable_config());
    let availability = StoreAvailability::default();
    let prober = ConnectionProber::new(
        Arc::new(repo.clone()) as Arc<dyn HealthCheck>,
        Duration::from_secs(1),
        availability.clone(),
    );
    assert_eq!(prober.probe().await, Availability::Unavailable);

    let storage = Storage::mysql_with_fallback(repo, InMemoryRepository::new(), availability);
    assert_eq!(storage.mode(), "in-memory");

    let inserted = storage
        .users
        .insert_user(NewUser {
            name: UserName::new("A").unwrap(),
            email: Email::parse("a@x.com").unwrap(),
            password_hash: "hash".into(),
            grade: Grade::Tenth,
            created_at: fixed_now(),
        })
        .await
        .unwrap();
    let UserInsert::Created(user) = inserted else {
        panic!("expected a new row");
    };

    let career = CareerTitle::new("Nurse").unwrap();
    storage
        .steps
        .mark_completed(&CompletedStep {
            user_id: user.id(),
            career_title: career.clone(),
            step_index: StepIndex::new(2),
            completed_at: fixed_now(),
        })
        .await
        .unwrap();
    assert_eq!(
        storage.steps.completed_steps(user.id(), &career).await.unwrap(),
        vec![StepIndex::new(2)]
    );
}

#[tokio::test]
async fn database_dropping_mid_flight_flips_to_memory() {
    // Pretend the probe succeeded, then let the first real query fail.
    let availability = StoreAvailability::new(Availability::Available);
    let storage = Storage::mysql_with_fallback(
        MySqlRepository::lazy(&unreachable_config()),
        InMemoryRepository::new(),
        availability.clone(),
    );
    assert_eq!(storage.mode(), "database");

    let found = storage
        .users
        .find_by_email(&Email::parse("nobody@x.com").unwrap())
        .await
        .unwrap();
    assert!(found.is_none());
    assert_eq!(storage.mode(), "in-memory");
}

#[tokio::test]
async fn sessions_follow_the_database_switch() {
    let availability = StoreAvailability::new(Availability::Available);
    let storage = Storage::mysql_with_fallback(
        MySqlRepository::lazy(&unreachable_config()),
        InMemoryRepository::new(),
        availability.clone(),
    );
    let record = SessionRecord {
        id: SessionId::new("after-switch"),
        user: SessionUser {
            id: UserId::new(MEMORY_USER_ID_BASE),
            name: UserName::new("A").unwrap(),
            email: Email::parse("a@x.com").unwrap(),
            grade: Grade::Tenth,
        },
        expires_at: fixed_now() + chrono::Duration::hours(1),
        store: StoreKind::InMemory,
    };

    // The write hits the dead server, flips the flag and lands in memory.
    storage.sessions.store_session(&record).await.unwrap();
    assert_eq!(storage.mode(), "in-memory");
    assert_eq!(
        storage.sessions.load_session(&record.id, fixed_now()).await.unwrap(),
        Some(record)
    );
}
