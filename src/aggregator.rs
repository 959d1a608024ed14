//! Cross-domain aggregation: one pass over every domain collection that
//! yields a complete `DashboardSnapshot`.
//!
//! Each domain arrives as its own read result. A domain that could not be
//! read contributes an empty collection and is listed in
//! `unavailableSources`; every other domain is computed as usual.

use crate::coverage::{coverage_from_report, percentage};
use crate::domain_rules::{capacity_violations, find_parent_cycles};
use crate::errors::SourceError;
use crate::hierarchy::validate_hierarchy;
use crate::models::{
    BusinessProject, BusinessProjectMetrics, BusinessScenario, CoverageMetrics, DashboardSettings, DashboardSnapshot,
    Domain, EndpointHealth, Environment, EnvironmentMetrics, EnvironmentStatus, HealthCounts, HealthLevel,
    HealthStatus, ProgramHealth, ProjectStatus, ReadinessStatus, Release, ReleaseMetrics, ReleaseStatus, RiskSeverity,
    RiskStatus, SnapshotSource, Squad, SquadMetrics, SquadStatus, TechStackComponent, TechStackMetrics, TestCase,
    UserJourney,
};
use crate::store::{CollectionStore, DomainRecord, Repository};
use chrono::Utc;
use std::sync::Arc;

pub type SourceRead<T> = Result<Vec<T>, SourceError>;

/// The independently stored collections for one snapshot, exactly as read.
#[derive(Debug, Clone)]
pub struct CollectionBag {
    pub business_projects: SourceRead<BusinessProject>,
    pub tech_stack: SourceRead<TechStackComponent>,
    pub squads: SourceRead<Squad>,
    pub environments: SourceRead<Environment>,
    pub releases: SourceRead<Release>,
    pub journeys: SourceRead<UserJourney>,
    pub scenarios: SourceRead<BusinessScenario>,
    pub test_cases: SourceRead<TestCase>,
}

impl Default for CollectionBag {
    fn default() -> Self {
        Self {
            business_projects: Ok(Vec::new()),
            tech_stack: Ok(Vec::new()),
            squads: Ok(Vec::new()),
            environments: Ok(Vec::new()),
            releases: Ok(Vec::new()),
            journeys: Ok(Vec::new()),
            scenarios: Ok(Vec::new()),
            test_cases: Ok(Vec::new()),
        }
    }
}

impl CollectionBag {
    /// Reads every domain. Failures are kept per domain, never propagated.
    pub fn load(store: &Arc<dyn CollectionStore>) -> Self {
        Self {
            business_projects: read_domain(store),
            tech_stack: read_domain(store),
            squads: read_domain(store),
            environments: read_domain(store),
            releases: read_domain(store),
            journeys: read_domain(store),
            scenarios: read_domain(store),
            test_cases: read_domain(store),
        }
    }
}

fn read_domain<T: DomainRecord>(store: &Arc<dyn CollectionStore>) -> SourceRead<T> {
    Repository::<T>::new(Arc::clone(store)).read()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthThresholds {
    pub healthy: u32,
    pub at_risk: u32,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            healthy: 80,
            at_risk: 50,
        }
    }
}

impl From<&DashboardSettings> for HealthThresholds {
    fn from(settings: &DashboardSettings) -> Self {
        Self {
            healthy: settings.healthy_threshold,
            at_risk: settings.at_risk_threshold,
        }
    }
}

pub fn build_snapshot(collections: &CollectionBag) -> DashboardSnapshot {
    build_snapshot_with(collections, HealthThresholds::default())
}

pub fn build_snapshot_with(collections: &CollectionBag, thresholds: HealthThresholds) -> DashboardSnapshot {
    let mut unavailable = Vec::new();
    let projects = available(Domain::BusinessProjects, &collections.business_projects, &mut unavailable);
    let components = available(Domain::TechStack, &collections.tech_stack, &mut unavailable);
    let squads = available(Domain::Squads, &collections.squads, &mut unavailable);
    let environments = available(Domain::Environments, &collections.environments, &mut unavailable);
    let releases = available(Domain::Releases, &collections.releases, &mut unavailable);
    let journeys = available(Domain::UserJourneys, &collections.journeys, &mut unavailable);
    let scenarios = available(Domain::BusinessScenarios, &collections.scenarios, &mut unavailable);
    let test_cases = available(Domain::TestCases, &collections.test_cases, &mut unavailable);

    let report = validate_hierarchy(journeys, scenarios, test_cases);
    let coverage = coverage_from_report(journeys, test_cases, &report);

    let mut snapshot = DashboardSnapshot {
        generated_at: Utc::now(),
        source: SnapshotSource::Local,
        business_projects: project_metrics(projects),
        tech_stack: tech_stack_metrics(components),
        releases: release_metrics(releases),
        squads: squad_metrics(squads),
        environments: environment_metrics(environments),
        coverage,
        health: ProgramHealth::default(),
        unavailable_sources: unavailable,
    };
    snapshot.health = program_health(&snapshot, releases, thresholds);

    tracing::debug!(
        coverage = snapshot.coverage.coverage_percentage,
        pass_rate = snapshot.coverage.pass_rate,
        health = snapshot.health.score,
        unavailable = snapshot.unavailable_sources.len(),
        "dashboard snapshot built"
    );
    snapshot
}

fn available<'a, T>(domain: Domain, read: &'a SourceRead<T>, unavailable: &mut Vec<Domain>) -> &'a [T] {
    match read {
        Ok(records) => records,
        Err(error) => {
            tracing::warn!(domain = %domain, error = %error, "domain source unavailable, using empty collection");
            unavailable.push(domain);
            &[]
        }
    }
}

/// Running mean; stays finite for finite inputs of any magnitude.
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut average = 0.0;
    let mut count = 0u64;
    for value in values {
        count += 1;
        average += (value - average) / count as f64;
    }
    (count > 0).then_some(average)
}

/// Sum that saturates at `f64::MAX` instead of overflowing to infinity.
fn bounded_total(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(0.0, |total: f64, value| (total + value).min(f64::MAX))
}

fn rounded_percent(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u32
}

fn project_metrics(projects: &[BusinessProject]) -> BusinessProjectMetrics {
    let mut metrics = BusinessProjectMetrics {
        total: projects.len() as u64,
        ..BusinessProjectMetrics::default()
    };

    for project in projects {
        let counts = &mut metrics.by_status;
        match project.status {
            ProjectStatus::Planning => counts.planning += 1,
            ProjectStatus::InProgress => counts.in_progress += 1,
            ProjectStatus::OnHold => counts.on_hold += 1,
            ProjectStatus::Completed => counts.completed += 1,
            ProjectStatus::Cancelled => counts.cancelled += 1,
            ProjectStatus::Other(_) => counts.other += 1,
        }
        if matches!(project.risk_level, Some(RiskSeverity::High | RiskSeverity::Critical)) {
            metrics.high_risk += 1;
        }
    }

    let budgets: Vec<f64> = projects.iter().filter_map(BusinessProject::usable_budget).collect();
    metrics.total_budget = bounded_total(budgets.iter().copied());
    metrics.average_budget = mean(budgets.iter().copied()).unwrap_or(0.0);
    metrics.average_expected_roi = mean(
        projects
            .iter()
            .filter_map(|project| project.expected_roi)
            .filter(|roi| *roi >= 0.0),
    )
    .unwrap_or(0.0);
    metrics
}

fn tech_stack_metrics(components: &[TechStackComponent]) -> TechStackMetrics {
    let mut by_health = HealthCounts::default();
    for component in components {
        match component.health_status {
            HealthStatus::Healthy => by_health.healthy += 1,
            HealthStatus::Warning => by_health.warning += 1,
            HealthStatus::Critical => by_health.critical += 1,
            HealthStatus::Unknown | HealthStatus::Other(_) => by_health.unknown += 1,
        }
    }

    TechStackMetrics {
        total: components.len() as u64,
        healthy_percentage: percentage(by_health.healthy, components.len() as u64),
        by_health,
        cyclic_components: find_parent_cycles(components),
    }
}

fn release_metrics(releases: &[Release]) -> ReleaseMetrics {
    let mut metrics = ReleaseMetrics {
        total: releases.len() as u64,
        ..ReleaseMetrics::default()
    };

    for release in releases {
        let counts = &mut metrics.by_status;
        match release.status {
            ReleaseStatus::Planning => counts.planning += 1,
            ReleaseStatus::Development => counts.development += 1,
            ReleaseStatus::Testing => counts.testing += 1,
            ReleaseStatus::Ready => counts.ready += 1,
            ReleaseStatus::Released => counts.released += 1,
            ReleaseStatus::Other(_) => counts.other += 1,
        }

        for risk in &release.risks {
            if risk.status == RiskStatus::Open {
                metrics.open_risks += 1;
                if risk.severity == RiskSeverity::Critical {
                    metrics.critical_open_risks += 1;
                }
            }
        }

        for check in &release.readiness_checks {
            metrics.readiness_checks += 1;
            match check.status {
                ReadinessStatus::Completed => metrics.completed_readiness_checks += 1,
                ReadinessStatus::Blocked => metrics.blocked_readiness_checks += 1,
                _ => {}
            }
        }
    }

    metrics.average_progress = mean(releases.iter().filter_map(Release::usable_progress))
        .map(rounded_percent)
        .unwrap_or(0);
    metrics.readiness_percentage = percentage(metrics.completed_readiness_checks, metrics.readiness_checks);
    metrics
}

fn squad_metrics(squads: &[Squad]) -> SquadMetrics {
    let mut metrics = SquadMetrics {
        total: squads.len() as u64,
        ..SquadMetrics::default()
    };

    for squad in squads {
        let members = squad.member_count();
        metrics.total_members += members;
        let counts = &mut metrics.by_status;
        match squad.status {
            SquadStatus::Active => counts.active += 1,
            SquadStatus::Inactive => counts.inactive += 1,
            SquadStatus::Planning => counts.planning += 1,
            SquadStatus::Other(_) => counts.other += 1,
        }
        // Members of squads that are not running are free for assignment.
        if squad.status != SquadStatus::Active {
            metrics.available_members += members;
        }
    }
    metrics
}

fn environment_metrics(environments: &[Environment]) -> EnvironmentMetrics {
    let mut metrics = EnvironmentMetrics {
        total: environments.len() as u64,
        ..EnvironmentMetrics::default()
    };

    let mut utilized_capacity = 0.0;
    let mut utilized_usage = 0.0;
    for environment in environments {
        let counts = &mut metrics.by_status;
        match environment.status {
            EnvironmentStatus::Available => counts.available += 1,
            EnvironmentStatus::Booked => counts.booked += 1,
            EnvironmentStatus::Maintenance => counts.maintenance += 1,
            EnvironmentStatus::Down => counts.down += 1,
            EnvironmentStatus::Other(_) => counts.other += 1,
        }

        let capacity = environment.usable_capacity();
        let usage = environment.usable_usage();
        metrics.total_capacity = bounded_total([metrics.total_capacity, capacity.unwrap_or(0.0)].into_iter());
        metrics.total_usage = bounded_total([metrics.total_usage, usage.unwrap_or(0.0)].into_iter());
        if let (Some(capacity), Some(usage)) = (capacity, usage) {
            utilized_capacity = bounded_total([utilized_capacity, capacity].into_iter());
            utilized_usage = bounded_total([utilized_usage, usage].into_iter());
        }

        if environment.booking.is_some() {
            metrics.active_bookings += 1;
        }
        for endpoint in &environment.api_endpoints {
            metrics.api_endpoints += 1;
            if endpoint.status == EndpointHealth::Healthy {
                metrics.healthy_api_endpoints += 1;
            }
        }
    }

    if utilized_capacity > 0.0 {
        metrics.utilization_percentage = rounded_percent(utilized_usage / utilized_capacity * 100.0);
    }
    metrics.over_capacity = capacity_violations(environments)
        .into_iter()
        .map(|violation| violation.environment_id)
        .collect();
    metrics.average_response_time_ms = mean(
        environments
            .iter()
            .flat_map(|environment| environment.api_endpoints.iter())
            .filter_map(|endpoint| endpoint.response_time_ms)
            .filter(|millis| *millis >= 0.0),
    )
    .unwrap_or(0.0);
    metrics
}

/// Mean of the percentages that have data behind them: coverage, pass rate,
/// release progress, healthy tech share and environment availability.
fn program_health(snapshot: &DashboardSnapshot, releases: &[Release], thresholds: HealthThresholds) -> ProgramHealth {
    let coverage: &CoverageMetrics = &snapshot.coverage;
    let environments = &snapshot.environments;
    let mut components: Vec<u32> = Vec::new();

    if coverage.total_scenarios > 0 {
        components.push(coverage.coverage_percentage);
    }
    if coverage.total_test_cases > 0 {
        components.push(coverage.pass_rate);
    }
    if releases.iter().any(|release| release.usable_progress().is_some()) {
        components.push(snapshot.releases.average_progress);
    }
    if snapshot.tech_stack.total > 0 {
        components.push(snapshot.tech_stack.healthy_percentage);
    }
    if environments.total > 0 {
        let unusable = environments.by_status.down + environments.by_status.maintenance;
        components.push(percentage(environments.total.saturating_sub(unusable), environments.total));
    }

    let Some(score) = mean(components.iter().map(|value| f64::from(*value))).map(rounded_percent) else {
        return ProgramHealth::default();
    };
    let status = if score >= thresholds.healthy {
        HealthLevel::Healthy
    } else if score >= thresholds.at_risk {
        HealthLevel::AtRisk
    } else {
        HealthLevel::Critical
    };
    ProgramHealth { score, status }
}
