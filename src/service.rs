use crate::aggregator::{build_snapshot_with, CollectionBag, HealthThresholds};
use crate::db::Database;
use crate::domain_rules::{self, CapacityViolation};
use crate::errors::{AppError, AppResult};
use crate::hierarchy::{DeletionOutcome, OrphanReport, RequirementHierarchy};
use crate::models::{
    Booking, BusinessProject, BusinessScenario, DashboardSettings, DashboardSnapshot, DeletePolicy, Domain,
    Environment, Release, SnapshotSource, Squad, TechStackComponent, TestCase, UserJourney,
};
use crate::overview::{unavailable_overview, OverviewClient};
use crate::store::{CollectionStore, DecodedCollection, DomainRecord, Repository, SqliteCollectionStore};
use std::path::Path;
use std::sync::Arc;

/// Entry point for UI code: collection CRUD, hierarchy edits and snapshots.
#[derive(Clone)]
pub struct DashboardService {
    db: Arc<Database>,
    store: Arc<dyn CollectionStore>,
}

macro_rules! collection_accessors {
    ($($list:ident, $save:ident => $record:ty;)+) => {
        $(
            pub fn $list(&self) -> AppResult<Vec<$record>> {
                Ok(self.repository::<$record>().read()?)
            }

            /// Replaces the whole collection.
            pub fn $save(&self, records: Vec<$record>) -> AppResult<Vec<$record>> {
                self.repository::<$record>().write(records)
            }
        )+
    };
}

impl DashboardService {
    pub fn new(app_data_dir: &Path) -> AppResult<Self> {
        let db = Arc::new(Database::new(&app_data_dir.join("dashboard.sqlite"))?);
        let store: Arc<dyn CollectionStore> = Arc::new(SqliteCollectionStore::new(db.clone()));
        Ok(Self { db, store })
    }

    /// Settings stay in `db`; collections go through `store`.
    pub fn with_store(db: Arc<Database>, store: Arc<dyn CollectionStore>) -> Self {
        Self { db, store }
    }

    fn repository<T: DomainRecord>(&self) -> Repository<T> {
        Repository::new(self.store.clone())
    }

    collection_accessors! {
        list_business_projects, save_business_projects => BusinessProject;
        list_tech_stack, save_tech_stack => TechStackComponent;
        list_squads, save_squads => Squad;
        list_environments, save_environments => Environment;
        list_releases, save_releases => Release;
        list_user_journeys, save_user_journeys => UserJourney;
        list_business_scenarios, save_business_scenarios => BusinessScenario;
        list_test_cases, save_test_cases => TestCase;
    }

    pub fn create_scenario(&self, scenario: BusinessScenario) -> AppResult<BusinessScenario> {
        let mut stored = self.load_hierarchy()?;
        let created = stored.hierarchy.add_scenario(scenario)?;
        self.store_hierarchy(stored)?;
        tracing::info!(scenario_id = %created.id, journey_id = %created.user_journey_id, "business scenario created");
        Ok(created)
    }

    pub fn create_test_case(&self, test_case: TestCase) -> AppResult<TestCase> {
        let mut stored = self.load_hierarchy()?;
        let created = stored.hierarchy.add_test_case(test_case)?;
        self.store_hierarchy(stored)?;
        tracing::info!(test_case_id = %created.id, scenario_id = %created.business_scenario_id, "test case created");
        Ok(created)
    }

    pub fn reparent_scenario(&self, scenario_id: &str, journey_id: &str) -> AppResult<()> {
        let mut stored = self.load_hierarchy()?;
        stored.hierarchy.reparent_scenario(scenario_id, journey_id)?;
        self.store_hierarchy(stored)
    }

    pub fn reparent_test_case(&self, test_case_id: &str, scenario_id: &str) -> AppResult<()> {
        let mut stored = self.load_hierarchy()?;
        stored.hierarchy.reparent_test_case(test_case_id, scenario_id)?;
        self.store_hierarchy(stored)
    }

    /// `policy` falls back to the configured delete policy.
    pub fn delete_journey(&self, journey_id: &str, policy: Option<DeletePolicy>) -> AppResult<DeletionOutcome> {
        let policy = self.resolve_delete_policy(policy)?;
        let mut stored = self.load_hierarchy()?;
        let outcome = stored.hierarchy.delete_journey(journey_id, policy)?;
        self.store_hierarchy(stored)?;
        Ok(outcome)
    }

    pub fn delete_scenario(&self, scenario_id: &str, policy: Option<DeletePolicy>) -> AppResult<DeletionOutcome> {
        let policy = self.resolve_delete_policy(policy)?;
        let mut stored = self.load_hierarchy()?;
        let outcome = stored.hierarchy.delete_scenario(scenario_id, policy)?;
        self.store_hierarchy(stored)?;
        Ok(outcome)
    }

    pub fn delete_test_case(&self, test_case_id: &str) -> AppResult<DeletionOutcome> {
        let mut stored = self.load_hierarchy()?;
        let outcome = stored.hierarchy.delete_test_case(test_case_id)?;
        self.store_hierarchy(stored)?;
        Ok(outcome)
    }

    pub fn validate_hierarchy(&self) -> AppResult<OrphanReport> {
        let stored = self.load_hierarchy()?;
        let report = stored.hierarchy.validate();
        if !report.is_consistent() {
            tracing::debug!(
                orphaned_scenarios = report.orphaned_scenarios.len(),
                orphaned_test_cases = report.orphaned_test_cases.len(),
                "requirement hierarchy has orphans"
            );
        }
        Ok(report.orphans())
    }

    /// Returns the booking that was replaced, if any.
    pub fn book_environment(&self, environment_id: &str, booking: Booking) -> AppResult<Option<Booking>> {
        self.repository::<Environment>().update(|environments| {
            domain_rules::book_environment(find_environment(environments, environment_id)?, booking)
        })
    }

    pub fn release_booking(&self, environment_id: &str) -> AppResult<Option<Booking>> {
        self.repository::<Environment>().update(|environments| {
            Ok(domain_rules::release_booking(find_environment(environments, environment_id)?))
        })
    }

    pub fn capacity_violations(&self) -> AppResult<Vec<CapacityViolation>> {
        Ok(domain_rules::capacity_violations(&self.list_environments()?))
    }

    pub fn set_component_parent(&self, component_id: &str, parent_id: Option<&str>) -> AppResult<()> {
        self.repository::<TechStackComponent>().update(|components| {
            domain_rules::set_component_parent(components, component_id, parent_id)
        })
    }

    /// Local snapshot from the stored collections. Blocking.
    pub fn build_snapshot(&self) -> DashboardSnapshot {
        let thresholds = match self.db.get_settings() {
            Ok(settings) => HealthThresholds::from(&settings),
            Err(error) => {
                tracing::warn!(error = %error, "settings unreadable, using default health thresholds");
                HealthThresholds::default()
            }
        };
        build_snapshot_with(&CollectionBag::load(&self.store), thresholds)
    }

    pub async fn overview_snapshot(&self) -> DashboardSnapshot {
        let settings = match self.db.get_settings() {
            Ok(settings) => settings,
            Err(error) => {
                tracing::warn!(error = %error, "settings unreadable, overview disabled");
                return unavailable_overview();
            }
        };

        match OverviewClient::from_settings(&settings) {
            Ok(Some(client)) => client.snapshot().await,
            Ok(None) => {
                tracing::warn!("overview source selected but no overviewUrl configured");
                unavailable_overview()
            }
            Err(error) => {
                tracing::warn!(error = %error, "failed to build overview client");
                unavailable_overview()
            }
        }
    }

    /// Snapshot from the configured source. Never fails.
    pub async fn snapshot(&self) -> DashboardSnapshot {
        let source = self
            .db
            .get_settings()
            .map(|settings| settings.snapshot_source)
            .unwrap_or_default();

        match source {
            SnapshotSource::Overview => self.overview_snapshot().await,
            SnapshotSource::Local => {
                let service = self.clone();
                match tokio::task::spawn_blocking(move || service.build_snapshot()).await {
                    Ok(snapshot) => snapshot,
                    Err(error) => {
                        tracing::warn!(error = %error, "snapshot build task failed");
                        let mut snapshot = DashboardSnapshot::zeroed(SnapshotSource::Local);
                        snapshot.unavailable_sources = Domain::COLLECTIONS.to_vec();
                        snapshot
                    }
                }
            }
        }
    }

    pub fn get_settings(&self) -> AppResult<DashboardSettings> {
        self.db.get_settings()
    }

    pub fn update_settings(&self, settings: serde_json::Value) -> AppResult<DashboardSettings> {
        let updated = self.db.update_settings(settings)?;
        tracing::info!(
            source = ?updated.snapshot_source,
            refresh_interval_seconds = updated.refresh_interval_seconds,
            "dashboard settings updated"
        );
        Ok(updated)
    }

    fn resolve_delete_policy(&self, policy: Option<DeletePolicy>) -> AppResult<DeletePolicy> {
        match policy {
            Some(policy) => Ok(policy),
            None => Ok(self.db.get_settings()?.delete_policy),
        }
    }

    fn load_hierarchy(&self) -> AppResult<StoredHierarchy> {
        let mut journeys = self.repository::<UserJourney>().load()?;
        let mut scenarios = self.repository::<BusinessScenario>().load()?;
        let mut test_cases = self.repository::<TestCase>().load()?;
        let hierarchy = RequirementHierarchy::new(
            std::mem::take(&mut journeys.records),
            std::mem::take(&mut scenarios.records),
            std::mem::take(&mut test_cases.records),
        );
        Ok(StoredHierarchy {
            hierarchy,
            journeys,
            scenarios,
            test_cases,
        })
    }

    /// Children first, so a reader never sees a parent listing a child that
    /// is not stored yet.
    fn store_hierarchy(&self, stored: StoredHierarchy) -> AppResult<()> {
        let StoredHierarchy {
            hierarchy,
            mut journeys,
            mut scenarios,
            mut test_cases,
        } = stored;
        test_cases.records = hierarchy.test_cases;
        scenarios.records = hierarchy.scenarios;
        journeys.records = hierarchy.journeys;
        self.repository::<TestCase>().store(test_cases)?;
        self.repository::<BusinessScenario>().store(scenarios)?;
        self.repository::<UserJourney>().store(journeys)?;
        Ok(())
    }
}

/// The hierarchy being edited, plus the stored items of each collection that
/// did not decode. Those are written back unchanged.
struct StoredHierarchy {
    hierarchy: RequirementHierarchy,
    journeys: DecodedCollection<UserJourney>,
    scenarios: DecodedCollection<BusinessScenario>,
    test_cases: DecodedCollection<TestCase>,
}

fn find_environment<'a>(environments: &'a mut [Environment], environment_id: &str) -> AppResult<&'a mut Environment> {
    environments
        .iter_mut()
        .find(|environment| environment.id == environment_id)
        .ok_or_else(|| AppError::NotFound(format!("environment '{environment_id}' not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EnvironmentStatus, JourneyStatus};
    use crate::store::InMemoryCollectionStore;
    use chrono::NaiveDate;

    fn service(dir: &tempfile::TempDir) -> DashboardService {
        let db = Arc::new(Database::new(&dir.path().join("test.db")).expect("db"));
        DashboardService::with_store(db, Arc::new(InMemoryCollectionStore::new()))
    }

    fn seed_journey(service: &DashboardService) {
        service
            .save_user_journeys(vec![UserJourney {
                id: "j1".to_string(),
                title: "Onboarding".to_string(),
                status: JourneyStatus::Approved,
                ..UserJourney::default()
            }])
            .expect("journeys");
    }

    #[test]
    fn created_scenario_is_linked_from_its_journey() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = service(&dir);
        seed_journey(&service);

        let scenario = service
            .create_scenario(BusinessScenario {
                title: "Sign up".to_string(),
                user_journey_id: "j1".to_string(),
                ..BusinessScenario::default()
            })
            .expect("create");
        assert!(!scenario.id.is_empty());

        let journeys = service.list_user_journeys().expect("journeys");
        assert_eq!(journeys[0].business_scenario_ids, vec![scenario.id.clone()]);
        assert_eq!(service.list_business_scenarios().expect("scenarios").len(), 1);
    }

    #[test]
    fn create_with_unknown_parent_writes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = service(&dir);
        seed_journey(&service);

        let error = service
            .create_test_case(TestCase {
                business_scenario_id: "missing".to_string(),
                ..TestCase::default()
            })
            .expect_err("missing parent");
        assert!(matches!(error, AppError::MissingReference(_)));
        assert!(service.list_test_cases().expect("test cases").is_empty());
    }

    #[test]
    fn delete_uses_configured_policy_unless_overridden() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = service(&dir);
        seed_journey(&service);
        let scenario = service
            .create_scenario(BusinessScenario {
                id: "s1".to_string(),
                user_journey_id: "j1".to_string(),
                ..BusinessScenario::default()
            })
            .expect("scenario");
        service
            .create_test_case(TestCase {
                id: "t1".to_string(),
                business_scenario_id: scenario.id.clone(),
                ..TestCase::default()
            })
            .expect("test case");

        let outcome = service.delete_scenario("s1", None).expect("delete");
        assert_eq!(outcome.orphaned_test_cases, vec!["t1"]);
        assert_eq!(service.validate_hierarchy().expect("validate").orphaned_test_case_ids, vec!["t1"]);

        service.delete_test_case("t1").expect("delete test case");
        assert!(service.list_test_cases().expect("test cases").is_empty());
    }

    #[test]
    fn hierarchy_edits_keep_undecodable_stored_records() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = Arc::new(Database::new(&dir.path().join("test.db")).expect("db"));
        let store = Arc::new(InMemoryCollectionStore::new());
        let service = DashboardService::with_store(db, store.clone());
        seed_journey(&service);
        service
            .create_scenario(BusinessScenario {
                id: "s1".to_string(),
                user_journey_id: "j1".to_string(),
                ..BusinessScenario::default()
            })
            .expect("scenario");

        let draft = serde_json::json!({ "title": "draft without id", "businessScenarioId": "s1" });
        let numeric_id = serde_json::json!({ "id": 7, "businessScenarioId": "s1" });
        store
            .insert_raw(
                Domain::TestCases,
                serde_json::json!([
                    { "id": "t9", "businessScenarioId": "s1", "defects": null },
                    draft.clone(),
                    numeric_id.clone()
                ]),
            )
            .expect("insert");

        service
            .create_test_case(TestCase {
                id: "t10".to_string(),
                business_scenario_id: "s1".to_string(),
                ..TestCase::default()
            })
            .expect("create");
        service.delete_test_case("t10").expect("delete");

        let raw = store.read_raw(Domain::TestCases).expect("raw").expect("present");
        let items = raw.as_array().expect("list");
        assert!(items.contains(&draft));
        assert!(items.contains(&numeric_id));
        let ids: Vec<String> = service
            .list_test_cases()
            .expect("test cases")
            .into_iter()
            .map(|test_case| test_case.id)
            .collect();
        assert_eq!(ids, vec!["t9".to_string()]);
    }

    #[test]
    fn booking_keeps_undecodable_environments() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = Arc::new(Database::new(&dir.path().join("test.db")).expect("db"));
        let store = Arc::new(InMemoryCollectionStore::new());
        let service = DashboardService::with_store(db, store.clone());
        store
            .insert_raw(
                Domain::Environments,
                serde_json::json!([{ "id": "env-1", "status": "Available" }, "legacy row"]),
            )
            .expect("insert");

        let day = |d| NaiveDate::from_ymd_opt(2025, 7, d).expect("date");
        service
            .book_environment(
                "env-1",
                Booking {
                    booked_by: "team-a".to_string(),
                    purpose: None,
                    start_date: day(1),
                    end_date: day(2),
                },
            )
            .expect("book");

        let raw = store.read_raw(Domain::Environments).expect("raw").expect("present");
        assert!(raw.as_array().expect("list").contains(&serde_json::json!("legacy row")));
    }

    #[test]
    fn booking_replaces_and_release_frees() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = service(&dir);
        service
            .save_environments(vec![Environment {
                id: "env-1".to_string(),
                status: EnvironmentStatus::Available,
                ..Environment::default()
            }])
            .expect("environments");

        let day = |d| NaiveDate::from_ymd_opt(2025, 6, d).expect("date");
        let first = Booking {
            booked_by: "team-a".to_string(),
            purpose: None,
            start_date: day(1),
            end_date: day(10),
        };
        let second = Booking {
            booked_by: "team-b".to_string(),
            purpose: Some("perf run".to_string()),
            start_date: day(5),
            end_date: day(6),
        };

        assert_eq!(service.book_environment("env-1", first.clone()).expect("first"), None);
        assert_eq!(service.book_environment("env-1", second.clone()).expect("second"), Some(first));
        assert_eq!(service.list_environments().expect("list")[0].booking, Some(second.clone()));

        assert_eq!(service.release_booking("env-1").expect("release"), Some(second));
        let environments = service.list_environments().expect("list");
        assert_eq!(environments[0].status, EnvironmentStatus::Available);

        let error = service.release_booking("env-9").expect_err("unknown");
        assert!(matches!(error, AppError::NotFound(_)));
    }

    #[test]
    fn component_parent_is_persisted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = service(&dir);
        service
            .save_tech_stack(vec![
                TechStackComponent {
                    id: "db".to_string(),
                    ..TechStackComponent::default()
                },
                TechStackComponent {
                    id: "pool".to_string(),
                    ..TechStackComponent::default()
                },
            ])
            .expect("components");

        service.set_component_parent("pool", Some("db")).expect("parent");
        let error = service.set_component_parent("db", Some("pool")).expect_err("cycle");
        assert!(matches!(error, AppError::Validation(_)));

        let components = service.list_tech_stack().expect("list");
        assert_eq!(components[1].parent_id.as_deref(), Some("db"));
        assert!(components[0].parent_id.is_none());
    }

    #[tokio::test]
    async fn overview_without_url_is_unavailable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = service(&dir);
        service
            .update_settings(serde_json::json!({ "snapshotSource": "overview" }))
            .expect("settings");

        let snapshot = service.snapshot().await;
        assert_eq!(snapshot.source, SnapshotSource::Overview);
        assert_eq!(snapshot.unavailable_sources, vec![Domain::Overview]);
    }

    #[tokio::test]
    async fn local_snapshot_runs_off_the_async_thread() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = service(&dir);
        seed_journey(&service);

        let snapshot = service.snapshot().await;
        assert_eq!(snapshot.source, SnapshotSource::Local);
        assert_eq!(snapshot.coverage.total_journeys, 1);
        assert_eq!(snapshot.coverage.approved_journeys, 1);
    }
}
