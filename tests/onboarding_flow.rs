//! End-to-end onboarding scenarios over the public API.
//!
//! Each test wires an [`OnboardingSession`] to the in-memory backend and
//! stub collaborators, then exercises the real contract: cascading
//! lookups, validation, idempotent commit, and failure recovery.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use uuid::Uuid;

use agrilink::auth::StaticAccount;
use agrilink::directory::Level;
use agrilink::error::{Error, SecureStoreError, ValidationError};
use agrilink::onboarding::{LookupOutcome, OnboardingSession, Step};
use agrilink::roles::{Field, Role};
use agrilink::secure::{MemorySecureStore, SecureStorage, ROLE_HINT_KEY};
use agrilink::store::{catalog, MemoryBackend};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

struct Harness {
    backend: Arc<MemoryBackend>,
    secure: Arc<MemorySecureStore>,
    session: OnboardingSession,
}

async fn harness(account_id: Uuid, email: &str) -> Harness {
    harness_with_backend(
        Arc::new(MemoryBackend::with_units(catalog::demo_units()).await),
        account_id,
        email,
    )
    .await
}

async fn harness_with_backend(
    backend: Arc<MemoryBackend>,
    account_id: Uuid,
    email: &str,
) -> Harness {
    let secure = Arc::new(MemorySecureStore::new());
    let session = OnboardingSession::start(
        backend.clone(),
        backend.clone(),
        Arc::new(StaticAccount::new(account_id, email)),
        secure.clone(),
    )
    .await
    .expect("session start");
    Harness {
        backend,
        secure,
        session,
    }
}

/// Walk the full producer flow up to (not including) submit.
async fn fill_producer(session: &OnboardingSession) {
    session.set_role(Role::Producer).await.unwrap();
    session.set_location(Level::Region, "Central").await.unwrap();
    session.set_location(Level::SubRegion, "East").await.unwrap();
    session.set_location(Level::Lga, "Kup").await.unwrap();
    session.set_location(Level::Ward, "Ward3").await.unwrap();
    session.set_detail(Field::FullName, "Jane").await.unwrap();
}

#[tokio::test]
async fn producer_happy_path() {
    let h = harness(Uuid::new_v4(), "a@x.com").await;
    fill_producer(&h.session).await;

    let record = timeout(TEST_TIMEOUT, h.session.submit())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(record.email, "a@x.com");
    assert_eq!(record.full_name, "Jane");
    assert_eq!(record.role, Role::Producer);
    assert!(record.location_ids().iter().all(Option::is_some));
    assert_eq!(record.registration_number, None);
    assert_eq!(record.organization_name, None);
    assert!(matches!(h.session.step().await, Step::Committed));

    // Role hint cached best-effort after the write.
    assert_eq!(
        h.secure.get(ROLE_HINT_KEY).await.unwrap().as_deref(),
        Some("producer")
    );
}

#[tokio::test]
async fn organization_needs_no_location() {
    let h = harness(Uuid::new_v4(), "b@y.com").await;
    h.session.set_role(Role::Organization).await.unwrap();
    h.session
        .set_detail(Field::OrganizationName, "CoopX")
        .await
        .unwrap();

    let record = h.session.submit().await.unwrap();
    assert_eq!(record.organization_name.as_deref(), Some("CoopX"));
    assert_eq!(record.location_ids(), [None, None, None, None]);
}

#[tokio::test]
async fn processing_site_owner_missing_registration_number() {
    let h = harness(Uuid::new_v4(), "c@z.com").await;
    h.session.set_role(Role::ProcessingSiteOwner).await.unwrap();
    h.session.set_location(Level::Region, "Central").await.unwrap();
    h.session.set_location(Level::SubRegion, "East").await.unwrap();
    h.session.set_location(Level::Lga, "Kup").await.unwrap();
    h.session.set_location(Level::Ward, "Ward1").await.unwrap();
    h.session.set_detail(Field::FullName, "Sam").await.unwrap();

    let err = h.session.submit().await.unwrap_err();
    match err {
        Error::Validation(ValidationError::MissingFields(fields)) => {
            assert_eq!(fields, vec![Field::RegistrationNumber]);
        }
        other => panic!("expected validation error, got {other}"),
    }

    // Nothing was written, the draft survived, and a corrected resubmit works.
    assert_eq!(h.backend.upsert_count(), 0);
    assert!(matches!(h.session.step().await, Step::Failed(_)));
    assert_eq!(h.session.draft().await.full_name.as_deref(), Some("Sam"));

    h.session
        .set_detail(Field::RegistrationNumber, "RC-1234")
        .await
        .unwrap();
    let record = h.session.submit().await.unwrap();
    assert_eq!(record.registration_number.as_deref(), Some("RC-1234"));
}

#[tokio::test]
async fn commit_is_idempotent_per_account() {
    let account_id = Uuid::new_v4();
    let backend = Arc::new(MemoryBackend::with_units(catalog::demo_units()).await);

    let first = {
        let h = harness_with_backend(backend.clone(), account_id, "a@x.com").await;
        fill_producer(&h.session).await;
        h.session.submit().await.unwrap()
    };

    // A second onboarding attempt for the same account overwrites, never
    // duplicates.
    let h = harness_with_backend(backend.clone(), account_id, "a@x.com").await;
    fill_producer(&h.session).await;
    h.session.set_detail(Field::FullName, "Janet").await.unwrap();
    let second = h.session.submit().await.unwrap();

    assert_eq!(second.account_id, first.account_id);
    assert_eq!(second.full_name, "Janet");
    assert_eq!(second.created_at, first.created_at);
}

#[tokio::test]
async fn concurrent_submit_is_rejected() {
    let backend = Arc::new(
        MemoryBackend::with_units(catalog::demo_units())
            .await
            .with_upsert_delay(Duration::from_millis(200)),
    );
    let h = harness_with_backend(backend.clone(), Uuid::new_v4(), "a@x.com").await;
    fill_producer(&h.session).await;

    let session = Arc::new(h.session);
    let first = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.submit().await }
    });
    // Give the first submission time to reach the store.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = session.submit().await;
    assert!(matches!(second, Err(Error::SubmissionInFlight)));

    let first = timeout(TEST_TIMEOUT, first).await.unwrap().unwrap();
    assert!(first.is_ok());
    assert_eq!(backend.upsert_count(), 1, "no duplicate network calls");
}

#[tokio::test]
async fn unresolvable_ward_aborts_before_any_write() {
    let h = harness(Uuid::new_v4(), "a@x.com").await;
    fill_producer(&h.session).await;
    h.session.set_location(Level::Ward, "Nowhere").await.unwrap();

    let err = h.session.submit().await.unwrap_err();
    assert!(matches!(err, Error::Commit(_)), "got {err}");
    assert_eq!(h.backend.upsert_count(), 0, "all-or-nothing resolution");
    assert!(matches!(h.session.step().await, Step::Failed(_)));

    // Draft retained: fix the ward and resubmit.
    h.session.set_location(Level::Ward, "Ward3").await.unwrap();
    assert!(h.session.submit().await.is_ok());
}

#[tokio::test]
async fn role_change_leaves_no_stale_fields() {
    let h = harness(Uuid::new_v4(), "a@x.com").await;
    fill_producer(&h.session).await;

    // Switch to a no-location role; prior selections must not leak into
    // the committed record.
    h.session.set_role(Role::Organization).await.unwrap();
    h.session
        .set_detail(Field::OrganizationName, "CoopY")
        .await
        .unwrap();
    let record = h.session.submit().await.unwrap();

    assert_eq!(record.location_ids(), [None, None, None, None]);
    assert_eq!(record.full_name, "");
    assert_eq!(record.organization_name.as_deref(), Some("CoopY"));
}

#[tokio::test]
async fn cascading_options_follow_the_selected_parent() {
    let h = harness(Uuid::new_v4(), "a@x.com").await;
    h.session.set_role(Role::Producer).await.unwrap();

    let regions = match h.session.load_options(Level::Region).await.unwrap() {
        LookupOutcome::Options(units) => units,
        LookupOutcome::Superseded => panic!("nothing changed"),
    };
    assert!(regions.iter().any(|u| u.name == "Central"));

    h.session.set_location(Level::Region, "Highlands").await.unwrap();
    let subs = match h.session.load_options(Level::SubRegion).await.unwrap() {
        LookupOutcome::Options(units) => units,
        LookupOutcome::Superseded => panic!("nothing changed"),
    };
    // "East" under Highlands, not the Central one.
    let names: Vec<_> = subs.iter().map(|u| u.name.as_str()).collect();
    assert!(names.contains(&"East") && names.contains(&"North"));
    assert!(!names.contains(&"West"));
}

/// Secure store that always fails, to prove the role-hint cache is
/// best-effort.
struct BrokenSecureStore;

#[async_trait]
impl SecureStorage for BrokenSecureStore {
    async fn set(&self, _key: &str, _value: &str) -> Result<(), SecureStoreError> {
        Err(SecureStoreError::Write("keychain unavailable".into()))
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, SecureStoreError> {
        Err(SecureStoreError::Read("keychain unavailable".into()))
    }
}

#[tokio::test]
async fn secure_store_failure_does_not_fail_commit() {
    let backend = Arc::new(MemoryBackend::with_units(catalog::demo_units()).await);
    let session = OnboardingSession::start(
        backend.clone(),
        backend.clone(),
        Arc::new(StaticAccount::new(Uuid::new_v4(), "a@x.com")),
        Arc::new(BrokenSecureStore),
    )
    .await
    .unwrap();

    fill_producer(&session).await;
    let record = session.submit().await.unwrap();
    assert_eq!(record.role, Role::Producer);
    assert!(matches!(session.step().await, Step::Committed));
}

/// Directory adapter that delays every call, so a selection can change
/// while a lookup is in flight.
struct SlowDirectory {
    inner: Arc<MemoryBackend>,
    delay: Duration,
}

#[async_trait]
impl agrilink::directory::LocationDirectory for SlowDirectory {
    async fn list_children(
        &self,
        parent_id: Option<Uuid>,
        level: Level,
    ) -> Result<Vec<agrilink::directory::AdministrativeUnit>, agrilink::error::DirectoryError>
    {
        tokio::time::sleep(self.delay).await;
        self.inner.list_children(parent_id, level).await
    }

    async fn resolve_id(
        &self,
        name: &str,
        level: Level,
        parent_id: Option<Uuid>,
    ) -> Result<Uuid, agrilink::error::DirectoryError> {
        self.inner.resolve_id(name, level, parent_id).await
    }
}

#[tokio::test]
async fn stale_lookup_is_discarded() {
    let backend = Arc::new(MemoryBackend::with_units(catalog::demo_units()).await);
    let directory = Arc::new(SlowDirectory {
        inner: backend.clone(),
        delay: Duration::from_millis(200),
    });
    let secure = Arc::new(MemorySecureStore::new());
    let session = Arc::new(
        OnboardingSession::start(
            directory,
            backend,
            Arc::new(StaticAccount::new(Uuid::new_v4(), "a@x.com")),
            secure,
        )
        .await
        .unwrap(),
    );

    session.set_role(Role::Producer).await.unwrap();
    session.set_location(Level::Region, "Central").await.unwrap();

    // Kick off a sub-region lookup, then change the region while it is
    // still in flight.
    let lookup = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.load_options(Level::SubRegion).await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    session.set_location(Level::Region, "Highlands").await.unwrap();

    let outcome = timeout(TEST_TIMEOUT, lookup).await.unwrap().unwrap().unwrap();
    assert_eq!(outcome, LookupOutcome::Superseded);
}
