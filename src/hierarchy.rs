//! Requirement hierarchy: User Journey → Business Scenario → Test Case.
//!
//! Collections are flat and reference their parent by id only. Links are
//! resolved here, at read time, before any metric is derived; nothing is
//! enforced by the storage layer.

use crate::errors::{AppError, AppResult};
use crate::models::{BusinessScenario, DeletePolicy, TestCase, UserJourney};
use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

/// Result of one validation pass. Orphans are reported, never removed.
#[derive(Debug, Clone, Default)]
pub struct HierarchyReport<'a> {
    pub valid_scenarios: Vec<&'a BusinessScenario>,
    pub valid_test_cases: Vec<&'a TestCase>,
    pub orphaned_scenarios: Vec<&'a BusinessScenario>,
    pub orphaned_test_cases: Vec<&'a TestCase>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrphanReport {
    pub orphaned_scenario_ids: Vec<String>,
    pub orphaned_test_case_ids: Vec<String>,
}

impl HierarchyReport<'_> {
    pub fn is_consistent(&self) -> bool {
        self.orphaned_scenarios.is_empty() && self.orphaned_test_cases.is_empty()
    }

    pub fn orphans(&self) -> OrphanReport {
        OrphanReport {
            orphaned_scenario_ids: self.orphaned_scenarios.iter().map(|s| s.id.clone()).collect(),
            orphaned_test_case_ids: self.orphaned_test_cases.iter().map(|t| t.id.clone()).collect(),
        }
    }
}

/// A scenario is valid when its journey exists; a test case is valid when
/// its scenario is valid, so children of orphaned scenarios are orphans too.
pub fn validate_hierarchy<'a>(
    journeys: &[UserJourney],
    scenarios: &'a [BusinessScenario],
    test_cases: &'a [TestCase],
) -> HierarchyReport<'a> {
    let journey_ids: HashSet<&str> = journeys
        .iter()
        .map(|journey| journey.id.as_str())
        .filter(|id| !id.is_empty())
        .collect();

    let mut report = HierarchyReport::default();
    let mut valid_scenario_ids = HashSet::new();
    for scenario in scenarios {
        if journey_ids.contains(scenario.user_journey_id.as_str()) {
            valid_scenario_ids.insert(scenario.id.as_str());
            report.valid_scenarios.push(scenario);
        } else {
            report.orphaned_scenarios.push(scenario);
        }
    }

    for test_case in test_cases {
        if valid_scenario_ids.contains(test_case.business_scenario_id.as_str()) {
            report.valid_test_cases.push(test_case);
        } else {
            report.orphaned_test_cases.push(test_case);
        }
    }

    if !report.is_consistent() {
        tracing::debug!(
            orphaned_scenarios = report.orphaned_scenarios.len(),
            orphaned_test_cases = report.orphaned_test_cases.len(),
            "requirement hierarchy has orphans"
        );
    }

    report
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionOutcome {
    pub removed_journeys: Vec<String>,
    pub removed_scenarios: Vec<String>,
    pub removed_test_cases: Vec<String>,
    pub orphaned_scenarios: Vec<String>,
    pub orphaned_test_cases: Vec<String>,
}

/// The three hierarchy collections, edited together and written back whole.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequirementHierarchy {
    pub journeys: Vec<UserJourney>,
    pub scenarios: Vec<BusinessScenario>,
    pub test_cases: Vec<TestCase>,
}

impl RequirementHierarchy {
    pub fn new(journeys: Vec<UserJourney>, scenarios: Vec<BusinessScenario>, test_cases: Vec<TestCase>) -> Self {
        Self {
            journeys,
            scenarios,
            test_cases,
        }
    }

    pub fn validate(&self) -> HierarchyReport<'_> {
        validate_hierarchy(&self.journeys, &self.scenarios, &self.test_cases)
    }

    pub fn add_journey(&mut self, mut journey: UserJourney) -> AppResult<UserJourney> {
        assign_id(&mut journey.id);
        if self.journeys.iter().any(|existing| existing.id == journey.id) {
            return Err(AppError::Conflict(format!("user journey '{}' already exists", journey.id)));
        }
        self.journeys.push(journey.clone());
        Ok(journey)
    }

    pub fn add_scenario(&mut self, mut scenario: BusinessScenario) -> AppResult<BusinessScenario> {
        assign_id(&mut scenario.id);
        if self.scenarios.iter().any(|existing| existing.id == scenario.id) {
            return Err(AppError::Conflict(format!("business scenario '{}' already exists", scenario.id)));
        }
        let journey = self
            .journeys
            .iter_mut()
            .find(|journey| journey.id == scenario.user_journey_id)
            .ok_or_else(|| {
                AppError::MissingReference(format!(
                    "business scenario '{}' references unknown user journey '{}'",
                    scenario.id, scenario.user_journey_id
                ))
            })?;
        push_unique(&mut journey.business_scenario_ids, &scenario.id);
        self.scenarios.push(scenario.clone());
        Ok(scenario)
    }

    pub fn add_test_case(&mut self, mut test_case: TestCase) -> AppResult<TestCase> {
        assign_id(&mut test_case.id);
        if self.test_cases.iter().any(|existing| existing.id == test_case.id) {
            return Err(AppError::Conflict(format!("test case '{}' already exists", test_case.id)));
        }
        let scenario = self
            .scenarios
            .iter_mut()
            .find(|scenario| scenario.id == test_case.business_scenario_id)
            .ok_or_else(|| {
                AppError::MissingReference(format!(
                    "test case '{}' references unknown business scenario '{}'",
                    test_case.id, test_case.business_scenario_id
                ))
            })?;
        push_unique(&mut scenario.test_case_ids, &test_case.id);
        self.test_cases.push(test_case.clone());
        Ok(test_case)
    }

    pub fn delete_journey(&mut self, journey_id: &str, policy: DeletePolicy) -> AppResult<DeletionOutcome> {
        let before = self.journeys.len();
        self.journeys.retain(|journey| journey.id != journey_id);
        if self.journeys.len() == before {
            return Err(AppError::NotFound(format!("user journey '{journey_id}' not found")));
        }

        let mut outcome = DeletionOutcome {
            removed_journeys: vec![journey_id.to_string()],
            ..DeletionOutcome::default()
        };
        let children: Vec<String> = self
            .scenarios
            .iter()
            .filter(|scenario| scenario.user_journey_id == journey_id)
            .map(|scenario| scenario.id.clone())
            .collect();

        match policy {
            DeletePolicy::Orphan => outcome.orphaned_scenarios = children,
            DeletePolicy::Cascade => {
                for scenario_id in children {
                    let nested = self.remove_scenario(&scenario_id, DeletePolicy::Cascade);
                    outcome.removed_scenarios.push(scenario_id);
                    outcome.removed_test_cases.extend(nested.removed_test_cases);
                }
            }
        }

        tracing::info!(journey_id, ?policy, "user journey deleted");
        Ok(outcome)
    }

    pub fn delete_scenario(&mut self, scenario_id: &str, policy: DeletePolicy) -> AppResult<DeletionOutcome> {
        let Some(parent) = self
            .scenarios
            .iter()
            .find(|scenario| scenario.id == scenario_id)
            .map(|scenario| scenario.user_journey_id.clone())
        else {
            return Err(AppError::NotFound(format!("business scenario '{scenario_id}' not found")));
        };

        if let Some(journey) = self.journeys.iter_mut().find(|journey| journey.id == parent) {
            journey.business_scenario_ids.retain(|id| id != scenario_id);
        }
        let mut outcome = self.remove_scenario(scenario_id, policy);
        outcome.removed_scenarios.push(scenario_id.to_string());

        tracing::info!(scenario_id, ?policy, "business scenario deleted");
        Ok(outcome)
    }

    pub fn delete_test_case(&mut self, test_case_id: &str) -> AppResult<DeletionOutcome> {
        let Some(parent) = self
            .test_cases
            .iter()
            .find(|test_case| test_case.id == test_case_id)
            .map(|test_case| test_case.business_scenario_id.clone())
        else {
            return Err(AppError::NotFound(format!("test case '{test_case_id}' not found")));
        };

        self.test_cases.retain(|test_case| test_case.id != test_case_id);
        if let Some(scenario) = self.scenarios.iter_mut().find(|scenario| scenario.id == parent) {
            scenario.test_case_ids.retain(|id| id != test_case_id);
        }

        Ok(DeletionOutcome {
            removed_test_cases: vec![test_case_id.to_string()],
            ..DeletionOutcome::default()
        })
    }

    pub fn reparent_scenario(&mut self, scenario_id: &str, journey_id: &str) -> AppResult<()> {
        if !self.journeys.iter().any(|journey| journey.id == journey_id) {
            return Err(AppError::MissingReference(format!("user journey '{journey_id}' not found")));
        }
        let scenario = self
            .scenarios
            .iter_mut()
            .find(|scenario| scenario.id == scenario_id)
            .ok_or_else(|| AppError::NotFound(format!("business scenario '{scenario_id}' not found")))?;
        scenario.user_journey_id = journey_id.to_string();

        for journey in &mut self.journeys {
            if journey.id == journey_id {
                push_unique(&mut journey.business_scenario_ids, scenario_id);
            } else {
                journey.business_scenario_ids.retain(|id| id != scenario_id);
            }
        }
        Ok(())
    }

    pub fn reparent_test_case(&mut self, test_case_id: &str, scenario_id: &str) -> AppResult<()> {
        if !self.scenarios.iter().any(|scenario| scenario.id == scenario_id) {
            return Err(AppError::MissingReference(format!("business scenario '{scenario_id}' not found")));
        }
        let test_case = self
            .test_cases
            .iter_mut()
            .find(|test_case| test_case.id == test_case_id)
            .ok_or_else(|| AppError::NotFound(format!("test case '{test_case_id}' not found")))?;
        test_case.business_scenario_id = scenario_id.to_string();

        for scenario in &mut self.scenarios {
            if scenario.id == scenario_id {
                push_unique(&mut scenario.test_case_ids, test_case_id);
            } else {
                scenario.test_case_ids.retain(|id| id != test_case_id);
            }
        }
        Ok(())
    }

    fn remove_scenario(&mut self, scenario_id: &str, policy: DeletePolicy) -> DeletionOutcome {
        self.scenarios.retain(|scenario| scenario.id != scenario_id);
        let children: Vec<String> = self
            .test_cases
            .iter()
            .filter(|test_case| test_case.business_scenario_id == scenario_id)
            .map(|test_case| test_case.id.clone())
            .collect();

        let mut outcome = DeletionOutcome::default();
        match policy {
            DeletePolicy::Orphan => outcome.orphaned_test_cases = children,
            DeletePolicy::Cascade => {
                self.test_cases
                    .retain(|test_case| test_case.business_scenario_id != scenario_id);
                outcome.removed_test_cases = children;
            }
        }
        outcome
    }
}

fn assign_id(id: &mut String) {
    if id.trim().is_empty() {
        *id = Uuid::new_v4().to_string();
    }
}

fn push_unique(ids: &mut Vec<String>, id: &str) {
    if !ids.iter().any(|existing| existing == id) {
        ids.push(id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn journey(id: &str) -> UserJourney {
        UserJourney {
            id: id.to_string(),
            ..UserJourney::default()
        }
    }

    fn scenario(id: &str, journey_id: &str) -> BusinessScenario {
        BusinessScenario {
            id: id.to_string(),
            user_journey_id: journey_id.to_string(),
            ..BusinessScenario::default()
        }
    }

    fn test_case(id: &str, scenario_id: &str) -> TestCase {
        TestCase {
            id: id.to_string(),
            business_scenario_id: scenario_id.to_string(),
            ..TestCase::default()
        }
    }

    fn sample() -> RequirementHierarchy {
        let mut hierarchy = RequirementHierarchy::default();
        hierarchy.add_journey(journey("j1")).expect("journey");
        hierarchy.add_scenario(scenario("s1", "j1")).expect("s1");
        hierarchy.add_scenario(scenario("s2", "j1")).expect("s2");
        hierarchy.add_test_case(test_case("t1", "s1")).expect("t1");
        hierarchy.add_test_case(test_case("t2", "s2")).expect("t2");
        hierarchy
    }

    #[test]
    fn orphans_are_reported_transitively() {
        let journeys = vec![journey("j1")];
        let scenarios = vec![scenario("s1", "j1"), scenario("s2", "missing")];
        let test_cases = vec![test_case("t1", "s1"), test_case("t2", "s2"), test_case("t3", "")];

        let report = validate_hierarchy(&journeys, &scenarios, &test_cases);
        assert_eq!(report.valid_scenarios.len(), 1);
        assert_eq!(report.valid_test_cases.len(), 1);
        assert!(!report.is_consistent());
        assert_eq!(
            report.orphans(),
            OrphanReport {
                orphaned_scenario_ids: vec!["s2".to_string()],
                orphaned_test_case_ids: vec!["t2".to_string(), "t3".to_string()],
            }
        );
    }

    #[test]
    fn empty_collections_are_consistent() {
        let report = validate_hierarchy(&[], &[], &[]);
        assert!(report.is_consistent());
        assert!(report.valid_scenarios.is_empty());
    }

    #[test]
    fn adding_under_unknown_parent_is_rejected() {
        let mut hierarchy = sample();
        let error = hierarchy
            .add_scenario(scenario("s3", "nope"))
            .expect_err("missing journey");
        assert!(matches!(error, AppError::MissingReference(_)));

        let error = hierarchy
            .add_test_case(test_case("t9", "nope"))
            .expect_err("missing scenario");
        assert!(matches!(error, AppError::MissingReference(_)));
        assert_eq!(hierarchy.scenarios.len(), 2);
        assert_eq!(hierarchy.test_cases.len(), 2);
    }

    #[test]
    fn adding_links_child_into_parent_ids() {
        let hierarchy = sample();
        assert_eq!(hierarchy.journeys[0].business_scenario_ids, vec!["s1", "s2"]);
        assert_eq!(hierarchy.scenarios[0].test_case_ids, vec!["t1"]);
    }

    #[test]
    fn added_records_without_id_get_one() {
        let mut hierarchy = sample();
        let created = hierarchy.add_scenario(scenario("", "j1")).expect("created");
        assert!(!created.id.is_empty());
        assert!(hierarchy.journeys[0].business_scenario_ids.contains(&created.id));
    }

    #[test]
    fn duplicate_ids_conflict() {
        let mut hierarchy = sample();
        let error = hierarchy.add_test_case(test_case("t1", "s2")).expect_err("duplicate");
        assert!(matches!(error, AppError::Conflict(_)));
    }

    #[test]
    fn deleting_journey_with_orphan_policy_keeps_children() {
        let mut hierarchy = sample();
        let outcome = hierarchy.delete_journey("j1", DeletePolicy::Orphan).expect("delete");

        assert_eq!(outcome.orphaned_scenarios, vec!["s1", "s2"]);
        assert_eq!(hierarchy.scenarios.len(), 2);
        assert_eq!(hierarchy.test_cases.len(), 2);
        let report = hierarchy.validate();
        assert_eq!(report.orphaned_scenarios.len(), 2);
        assert_eq!(report.orphaned_test_cases.len(), 2);
    }

    #[test]
    fn deleting_journey_with_cascade_removes_descendants() {
        let mut hierarchy = sample();
        let outcome = hierarchy.delete_journey("j1", DeletePolicy::Cascade).expect("delete");

        assert_eq!(outcome.removed_scenarios, vec!["s1", "s2"]);
        assert_eq!(outcome.removed_test_cases, vec!["t1", "t2"]);
        assert!(hierarchy.journeys.is_empty());
        assert!(hierarchy.scenarios.is_empty());
        assert!(hierarchy.test_cases.is_empty());
    }

    #[test]
    fn deleting_scenario_unlinks_it_from_journey() {
        let mut hierarchy = sample();
        let outcome = hierarchy.delete_scenario("s1", DeletePolicy::Orphan).expect("delete");

        assert_eq!(outcome.removed_scenarios, vec!["s1"]);
        assert_eq!(outcome.orphaned_test_cases, vec!["t1"]);
        assert_eq!(hierarchy.journeys[0].business_scenario_ids, vec!["s2"]);
        assert_eq!(hierarchy.test_cases.len(), 2);
    }

    #[test]
    fn deleting_test_case_unlinks_it_from_scenario() {
        let mut hierarchy = sample();
        hierarchy.delete_test_case("t2").expect("delete");
        assert!(hierarchy.scenarios[1].test_case_ids.is_empty());
        assert!(matches!(
            hierarchy.delete_test_case("t2"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn reparenting_moves_ids_between_parents() {
        let mut hierarchy = sample();
        hierarchy.reparent_test_case("t1", "s2").expect("reparent");
        assert!(hierarchy.scenarios[0].test_case_ids.is_empty());
        assert_eq!(hierarchy.scenarios[1].test_case_ids, vec!["t2", "t1"]);

        let error = hierarchy.reparent_scenario("s1", "ghost").expect_err("missing");
        assert!(matches!(error, AppError::MissingReference(_)));
    }
}
