use crate::hierarchy::{validate_hierarchy, HierarchyReport};
use crate::models::{
    AutomationStatus, BusinessScenario, CoverageMetrics, DefectSeverity, DefectSeverityCounts, DefectStatus,
    ExecutionResult, JourneyStatus, TestCase, UserJourney,
};
use std::collections::HashSet;

/// Rounded share of `numerator` in `denominator`, clamped to [0, 100].
/// A zero denominator yields 0.
pub fn percentage(numerator: u64, denominator: u64) -> u32 {
    if denominator == 0 {
        return 0;
    }
    let ratio = numerator as f64 / denominator as f64 * 100.0;
    ratio.round().clamp(0.0, 100.0) as u32
}

pub fn compute_coverage(
    journeys: &[UserJourney],
    scenarios: &[BusinessScenario],
    test_cases: &[TestCase],
) -> CoverageMetrics {
    let report = validate_hierarchy(journeys, scenarios, test_cases);
    coverage_from_report(journeys, test_cases, &report)
}

/// Builds coverage from an existing validation pass.
///
/// Orphaned scenarios and test cases are left out of every numerator and
/// denominator except `openDefects`, which counts defects on all test cases.
/// A test case without an execution result stays in the pass-rate
/// denominator as not passed, so untested work lowers the pass rate.
pub fn coverage_from_report(
    journeys: &[UserJourney],
    test_cases: &[TestCase],
    report: &HierarchyReport<'_>,
) -> CoverageMetrics {
    let mut metrics = CoverageMetrics {
        total_journeys: journeys.len() as u64,
        approved_journeys: journeys
            .iter()
            .filter(|journey| journey.status == JourneyStatus::Approved)
            .count() as u64,
        total_scenarios: report.valid_scenarios.len() as u64,
        orphaned_scenarios: report.orphaned_scenarios.len() as u64,
        orphaned_test_cases: report.orphaned_test_cases.len() as u64,
        ..CoverageMetrics::default()
    };

    let mut covered: HashSet<&str> = HashSet::new();
    for test_case in &report.valid_test_cases {
        if test_case.business_scenario_id.is_empty() {
            continue;
        }
        metrics.linked_test_cases += 1;
        covered.insert(test_case.business_scenario_id.as_str());

        match test_case.automation_status {
            AutomationStatus::Automated => metrics.automated_test_cases += 1,
            AutomationStatus::SemiAutomated => metrics.semi_automated_test_cases += 1,
            _ => metrics.manual_test_cases += 1,
        }

        match test_case.execution_result {
            Some(ExecutionResult::Pass) => metrics.passed += 1,
            Some(ExecutionResult::Fail) => metrics.failed += 1,
            Some(ExecutionResult::Skip) => metrics.skipped += 1,
            _ => metrics.not_executed += 1,
        }
    }
    metrics.covered_scenarios = covered.len() as u64;
    metrics.total_test_cases = metrics.linked_test_cases;

    metrics.coverage_percentage = percentage(metrics.covered_scenarios, metrics.total_scenarios);
    metrics.automation_percentage = percentage(metrics.automated_test_cases, metrics.total_test_cases);
    metrics.pass_rate = percentage(metrics.passed, metrics.total_test_cases);

    for defect in test_cases.iter().flat_map(|test_case| test_case.defects.iter()) {
        if defect.status != DefectStatus::Open {
            continue;
        }
        metrics.open_defects += 1;
        let bucket = &mut metrics.open_defects_by_severity;
        match defect.severity {
            DefectSeverity::Low => bucket.low += 1,
            DefectSeverity::Medium => bucket.medium += 1,
            DefectSeverity::High => bucket.high += 1,
            DefectSeverity::Critical => bucket.critical += 1,
            DefectSeverity::Other(_) => bucket.other += 1,
        }
    }

    metrics
}

impl DefectSeverityCounts {
    pub fn total(&self) -> u64 {
        self.low + self.medium + self.high + self.critical + self.other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Defect;
    use pretty_assertions::assert_eq;

    fn journey(id: &str, status: JourneyStatus) -> UserJourney {
        UserJourney {
            id: id.to_string(),
            status,
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

    fn test_case(id: &str, scenario_id: &str, automation: AutomationStatus, result: Option<ExecutionResult>) -> TestCase {
        TestCase {
            id: id.to_string(),
            business_scenario_id: scenario_id.to_string(),
            automation_status: automation,
            execution_result: result,
            ..TestCase::default()
        }
    }

    #[test]
    fn percentage_handles_zero_and_rounding() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(5, 0), 0);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 2), 50);
        assert_eq!(percentage(7, 5), 100);
    }

    #[test]
    fn empty_hierarchy_is_all_zero() {
        let metrics = compute_coverage(&[], &[], &[]);
        assert_eq!(metrics, CoverageMetrics::default());
    }

    #[test]
    fn fully_covered_single_chain() {
        let journeys = vec![journey("j1", JourneyStatus::Approved)];
        let scenarios = vec![scenario("s1", "j1")];
        let test_cases = vec![test_case(
            "t1",
            "s1",
            AutomationStatus::Automated,
            Some(ExecutionResult::Pass),
        )];

        let metrics = compute_coverage(&journeys, &scenarios, &test_cases);
        assert_eq!(metrics.coverage_percentage, 100);
        assert_eq!(metrics.automation_percentage, 100);
        assert_eq!(metrics.pass_rate, 100);
        assert_eq!(metrics.approved_journeys, 1);
    }

    #[test]
    fn orphaned_scenario_contributes_nothing() {
        let scenarios = vec![scenario("s1", "MISSING")];
        let test_cases = vec![test_case("t1", "s1", AutomationStatus::Manual, None)];

        let metrics = compute_coverage(&[], &scenarios, &test_cases);
        assert_eq!(metrics.total_scenarios, 0);
        assert_eq!(metrics.linked_test_cases, 0);
        assert_eq!(metrics.coverage_percentage, 0);
        assert_eq!(metrics.orphaned_scenarios, 1);
        assert_eq!(metrics.orphaned_test_cases, 1);
    }

    #[test]
    fn unexecuted_test_cases_count_as_not_passed() {
        let journeys = vec![journey("j1", JourneyStatus::Draft)];
        let scenarios = vec![scenario("s1", "j1")];
        let test_cases = vec![
            test_case("t1", "s1", AutomationStatus::Automated, Some(ExecutionResult::Pass)),
            test_case("t2", "s1", AutomationStatus::Manual, None),
            test_case("t3", "s1", AutomationStatus::SemiAutomated, Some(ExecutionResult::Fail)),
            test_case("t4", "s1", AutomationStatus::Manual, Some(ExecutionResult::Skip)),
        ];

        let metrics = compute_coverage(&journeys, &scenarios, &test_cases);
        assert_eq!(metrics.total_test_cases, 4);
        assert_eq!(metrics.pass_rate, 25);
        assert_eq!(metrics.not_executed, 1);
        assert_eq!(metrics.automation_percentage, 25);
        assert_eq!(metrics.semi_automated_test_cases, 1);
    }

    #[test]
    fn coverage_counts_scenarios_not_test_cases() {
        let journeys = vec![journey("j1", JourneyStatus::Approved)];
        let scenarios = vec![scenario("s1", "j1"), scenario("s2", "j1")];
        let test_cases = vec![
            test_case("t1", "s1", AutomationStatus::Manual, None),
            test_case("t2", "s1", AutomationStatus::Manual, None),
            test_case("t3", "s1", AutomationStatus::Manual, None),
        ];

        let metrics = compute_coverage(&journeys, &scenarios, &test_cases);
        assert_eq!(metrics.linked_test_cases, 3);
        assert_eq!(metrics.covered_scenarios, 1);
        assert_eq!(metrics.coverage_percentage, 50);
    }

    #[test]
    fn adding_test_case_to_uncovered_scenario_is_monotonic() {
        let journeys = vec![journey("j1", JourneyStatus::Approved)];
        let scenarios = vec![scenario("s1", "j1"), scenario("s2", "j1"), scenario("s3", "j1")];
        let mut test_cases = vec![test_case("t1", "s1", AutomationStatus::Manual, None)];

        let before = compute_coverage(&journeys, &scenarios, &test_cases);
        test_cases.push(test_case("t2", "s2", AutomationStatus::Manual, None));
        let after = compute_coverage(&journeys, &scenarios, &test_cases);

        assert_eq!(after.linked_test_cases, before.linked_test_cases + 1);
        assert!(after.coverage_percentage >= before.coverage_percentage);
    }

    #[test]
    fn open_defects_count_across_all_test_cases() {
        let open = |id: &str, severity: DefectSeverity| Defect {
            id: id.to_string(),
            severity,
            status: DefectStatus::Open,
            ..Defect::default()
        };
        let mut linked = test_case("t1", "s1", AutomationStatus::Manual, Some(ExecutionResult::Fail));
        linked.defects = vec![
            open("d1", DefectSeverity::High),
            Defect {
                id: "d2".to_string(),
                status: DefectStatus::Resolved,
                ..Defect::default()
            },
        ];
        let mut orphan = test_case("t2", "gone", AutomationStatus::Manual, None);
        orphan.defects = vec![open("d3", DefectSeverity::Critical)];

        let metrics = compute_coverage(
            &[journey("j1", JourneyStatus::Approved)],
            &[scenario("s1", "j1")],
            &[linked, orphan],
        );
        assert_eq!(metrics.open_defects, 2);
        assert_eq!(metrics.open_defects_by_severity.high, 1);
        assert_eq!(metrics.open_defects_by_severity.critical, 1);
        assert_eq!(metrics.open_defects_by_severity.total(), metrics.open_defects);
    }
}
