use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

static NUMERIC_DECORATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s$€£,%_]").expect("valid numeric decoration regex"));

fn normalize_label(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Enumerations written by the forms. Spelling variants ("In Progress",
/// "in_progress", "InProgress") decode to the same variant; anything else
/// lands in `Other` with the raw text preserved. A missing, null or blank
/// value decodes to the enum's default: its initial lifecycle state where one
/// exists, otherwise an empty `Other`.
macro_rules! lenient_enum {
    (@define $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $label,)+
                    Self::Other(raw) => raw.as_str(),
                }
            }

            pub fn parse(raw: &str) -> Self {
                let key = normalize_label(raw);
                $(
                    if key == normalize_label($label) {
                        return Self::$variant;
                    }
                )+
                Self::Other(raw.trim().to_string())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                Ok(match serde_json::Value::deserialize(deserializer)? {
                    serde_json::Value::String(raw) if !raw.trim().is_empty() => Self::parse(&raw),
                    serde_json::Value::Null | serde_json::Value::String(_) => Self::default(),
                    other => Self::Other(other.to_string()),
                })
            }
        }
    };
    ($name:ident default $default:ident { $($body:tt)* }) => {
        lenient_enum!(@define $name { $($body)* });

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }
    };
    ($name:ident { $($body:tt)* }) => {
        lenient_enum!(@define $name { $($body)* });

        impl Default for $name {
            fn default() -> Self {
                Self::Other(String::new())
            }
        }
    };
}

lenient_enum!(ProjectStatus default Planning {
    Planning => "Planning",
    InProgress => "InProgress",
    OnHold => "OnHold",
    Completed => "Completed",
    Cancelled => "Cancelled",
});

lenient_enum!(HealthStatus default Unknown {
    Healthy => "Healthy",
    Warning => "Warning",
    Critical => "Critical",
    Unknown => "Unknown",
});

lenient_enum!(SquadStatus default Planning {
    Active => "active",
    Inactive => "inactive",
    Planning => "planning",
});

lenient_enum!(EnvironmentStatus {
    Available => "available",
    Booked => "booked",
    Maintenance => "maintenance",
    Down => "down",
});

lenient_enum!(EndpointHealth {
    Healthy => "healthy",
    Degraded => "degraded",
    Down => "down",
});

lenient_enum!(ReleaseStatus default Planning {
    Planning => "planning",
    Development => "development",
    Testing => "testing",
    Ready => "ready",
    Released => "released",
});

lenient_enum!(RiskSeverity {
    Low => "low",
    Medium => "medium",
    High => "high",
    Critical => "critical",
});

lenient_enum!(RiskStatus default Open {
    Open => "open",
    Mitigated => "mitigated",
    Closed => "closed",
});

lenient_enum!(ReadinessStatus default Pending {
    Pending => "pending",
    InProgress => "in-progress",
    Completed => "completed",
    Blocked => "blocked",
});

lenient_enum!(JourneyStatus default Draft {
    Draft => "Draft",
    Review => "Review",
    Approved => "Approved",
    Deprecated => "Deprecated",
});

lenient_enum!(AutomationStatus default Manual {
    Manual => "Manual",
    Automated => "Automated",
    SemiAutomated => "Semi-Automated",
});

lenient_enum!(ExecutionResult {
    Pass => "Pass",
    Fail => "Fail",
    Skip => "Skip",
});

lenient_enum!(DefectSeverity {
    Low => "Low",
    Medium => "Medium",
    High => "High",
    Critical => "Critical",
});

lenient_enum!(DefectStatus default Open {
    Open => "Open",
    InProgress => "InProgress",
    Resolved => "Resolved",
    Closed => "Closed",
});

/// Numbers arrive either as JSON numbers or as decorated strings
/// ("$12,500", "45%"). Unreadable or non-finite values become `None`.
pub(crate) fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    let parsed = match value {
        serde_json::Value::Number(number) => number.as_f64(),
        serde_json::Value::String(raw) => NUMERIC_DECORATION.replace_all(&raw, "").parse::<f64>().ok(),
        _ => None,
    };
    Ok(parsed.filter(|number| number.is_finite()))
}

pub(crate) fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(raw) => raw,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Lists tolerate `null` and non-array values (empty) and drop items that
/// do not decode.
pub(crate) fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let serde_json::Value::Array(items) = serde_json::Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

pub(crate) fn lenient_optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

fn lenient_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
}

pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(trimmed).ok().map(|dt| dt.date_naive()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Domain {
    BusinessProjects,
    TechStack,
    Squads,
    Environments,
    Releases,
    UserJourneys,
    BusinessScenarios,
    TestCases,
    Overview,
}

impl Domain {
    pub const COLLECTIONS: [Domain; 8] = [
        Domain::BusinessProjects,
        Domain::TechStack,
        Domain::Squads,
        Domain::Environments,
        Domain::Releases,
        Domain::UserJourneys,
        Domain::BusinessScenarios,
        Domain::TestCases,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BusinessProjects => "business-projects",
            Self::TechStack => "tech-stack",
            Self::Squads => "squads",
            Self::Environments => "environments",
            Self::Releases => "releases",
            Self::UserJourneys => "user-journeys",
            Self::BusinessScenarios => "business-scenarios",
            Self::TestCases => "test-cases",
            Self::Overview => "overview",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessProject {
    pub id: String,
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    pub status: ProjectStatus,
    #[serde(deserialize_with = "lenient_text")]
    pub priority: String,
    #[serde(deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(
        rename = "expectedROI",
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub expected_roi: Option<f64>,
    #[serde(deserialize_with = "lenient_optional", skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskSeverity>,
}

impl BusinessProject {
    /// Budget usable in arithmetic: present and non-negative.
    pub fn usable_budget(&self) -> Option<f64> {
        self.budget.filter(|budget| *budget >= 0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TechStackComponent {
    pub id: String,
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(deserialize_with = "lenient_optional", skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub status: String,
    pub health_status: HealthStatus,
    #[serde(deserialize_with = "lenient_optional", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Squad {
    pub id: String,
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    pub status: SquadStatus,
    #[serde(deserialize_with = "lenient_list")]
    pub engineers: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub testers: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub analysts: Vec<String>,
    #[serde(deserialize_with = "lenient_optional", skip_serializing_if = "Option::is_none")]
    pub journey_expert: Option<String>,
    #[serde(deserialize_with = "lenient_optional", skip_serializing_if = "Option::is_none")]
    pub product_owner: Option<String>,
    #[serde(deserialize_with = "lenient_optional", skip_serializing_if = "Option::is_none")]
    pub release_lead: Option<String>,
}

impl Squad {
    /// Every filled role slot, list roles first. Blank identities are empty slots.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.engineers
            .iter()
            .chain(self.testers.iter())
            .chain(self.analysts.iter())
            .chain(self.journey_expert.iter())
            .chain(self.product_owner.iter())
            .chain(self.release_lead.iter())
            .map(String::as_str)
            .filter(|member| !member.trim().is_empty())
    }

    pub fn member_count(&self) -> u64 {
        self.members().count() as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(default)]
    pub booked_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(deserialize_with = "lenient_date")]
    pub start_date: NaiveDate,
    #[serde(deserialize_with = "lenient_date")]
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiEndpoint {
    pub id: String,
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub url: String,
    pub status: EndpointHealth,
    #[serde(deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<f64>,
    #[serde(deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub uptime: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Environment {
    pub id: String,
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "lenient_text")]
    pub environment_type: String,
    pub status: EnvironmentStatus,
    #[serde(deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub capacity: Option<f64>,
    #[serde(deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub current_usage: Option<f64>,
    #[serde(deserialize_with = "lenient_optional", skip_serializing_if = "Option::is_none")]
    pub booking: Option<Booking>,
    #[serde(deserialize_with = "lenient_list")]
    pub api_endpoints: Vec<ApiEndpoint>,
}

impl Environment {
    pub fn usable_capacity(&self) -> Option<f64> {
        self.capacity.filter(|capacity| *capacity > 0.0)
    }

    pub fn usable_usage(&self) -> Option<f64> {
        self.current_usage.filter(|usage| *usage >= 0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Risk {
    pub id: String,
    #[serde(deserialize_with = "lenient_text")]
    pub title: String,
    pub severity: RiskSeverity,
    pub status: RiskStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReadinessCheck {
    pub id: String,
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    pub status: ReadinessStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Release {
    pub id: String,
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub version: String,
    pub status: ReleaseStatus,
    #[serde(deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(deserialize_with = "lenient_list")]
    pub risks: Vec<Risk>,
    #[serde(deserialize_with = "lenient_list")]
    pub readiness_checks: Vec<ReadinessCheck>,
}

impl Release {
    pub fn usable_progress(&self) -> Option<f64> {
        self.progress.filter(|progress| (0.0..=100.0).contains(progress))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserJourney {
    pub id: String,
    #[serde(deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(deserialize_with = "lenient_text")]
    pub persona: String,
    #[serde(deserialize_with = "lenient_text")]
    pub priority: String,
    pub status: JourneyStatus,
    #[serde(deserialize_with = "lenient_list")]
    pub business_scenario_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessScenario {
    pub id: String,
    #[serde(deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(deserialize_with = "lenient_text")]
    pub user_journey_id: String,
    #[serde(deserialize_with = "lenient_text")]
    pub status: String,
    #[serde(deserialize_with = "lenient_list")]
    pub test_case_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Defect {
    pub id: String,
    #[serde(deserialize_with = "lenient_text")]
    pub title: String,
    pub severity: DefectSeverity,
    pub status: DefectStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestCase {
    pub id: String,
    #[serde(deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(deserialize_with = "lenient_text")]
    pub business_scenario_id: String,
    pub automation_status: AutomationStatus,
    #[serde(deserialize_with = "lenient_text")]
    pub status: String,
    #[serde(deserialize_with = "lenient_optional", skip_serializing_if = "Option::is_none")]
    pub execution_result: Option<ExecutionResult>,
    #[serde(deserialize_with = "lenient_list")]
    pub defects: Vec<Defect>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SnapshotSource {
    #[default]
    Local,
    Overview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeletePolicy {
    #[default]
    Orphan,
    Cascade,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardSettings {
    pub refresh_interval_seconds: u64,
    pub snapshot_source: SnapshotSource,
    pub overview_url: Option<String>,
    pub overview_timeout_ms: u64,
    pub delete_policy: DeletePolicy,
    pub healthy_threshold: u32,
    pub at_risk_threshold: u32,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            refresh_interval_seconds: 30,
            snapshot_source: SnapshotSource::Local,
            overview_url: None,
            overview_timeout_ms: 5_000,
            delete_policy: DeletePolicy::Orphan,
            healthy_threshold: 80,
            at_risk_threshold: 50,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectStatusCounts {
    pub planning: u64,
    pub in_progress: u64,
    pub on_hold: u64,
    pub completed: u64,
    pub cancelled: u64,
    pub other: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessProjectMetrics {
    pub total: u64,
    pub by_status: ProjectStatusCounts,
    pub total_budget: f64,
    pub average_budget: f64,
    pub average_expected_roi: f64,
    pub high_risk: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthCounts {
    pub healthy: u64,
    pub warning: u64,
    pub critical: u64,
    pub unknown: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TechStackMetrics {
    pub total: u64,
    pub by_health: HealthCounts,
    pub healthy_percentage: u32,
    pub cyclic_components: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReleaseStatusCounts {
    pub planning: u64,
    pub development: u64,
    pub testing: u64,
    pub ready: u64,
    pub released: u64,
    pub other: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReleaseMetrics {
    pub total: u64,
    pub by_status: ReleaseStatusCounts,
    pub average_progress: u32,
    pub open_risks: u64,
    pub critical_open_risks: u64,
    pub readiness_checks: u64,
    pub completed_readiness_checks: u64,
    pub blocked_readiness_checks: u64,
    pub readiness_percentage: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SquadStatusCounts {
    pub active: u64,
    pub inactive: u64,
    pub planning: u64,
    pub other: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SquadMetrics {
    pub total: u64,
    pub by_status: SquadStatusCounts,
    pub total_members: u64,
    pub available_members: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnvironmentStatusCounts {
    pub available: u64,
    pub booked: u64,
    pub maintenance: u64,
    pub down: u64,
    pub other: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnvironmentMetrics {
    pub total: u64,
    pub by_status: EnvironmentStatusCounts,
    pub total_capacity: f64,
    pub total_usage: f64,
    pub utilization_percentage: u32,
    pub over_capacity: Vec<String>,
    pub active_bookings: u64,
    pub api_endpoints: u64,
    pub healthy_api_endpoints: u64,
    pub average_response_time_ms: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DefectSeverityCounts {
    pub low: u64,
    pub medium: u64,
    pub high: u64,
    pub critical: u64,
    pub other: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoverageMetrics {
    pub total_journeys: u64,
    pub approved_journeys: u64,
    pub total_scenarios: u64,
    pub covered_scenarios: u64,
    pub linked_test_cases: u64,
    pub total_test_cases: u64,
    pub coverage_percentage: u32,
    pub automated_test_cases: u64,
    pub semi_automated_test_cases: u64,
    pub manual_test_cases: u64,
    pub automation_percentage: u32,
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub not_executed: u64,
    pub pass_rate: u32,
    pub open_defects: u64,
    pub open_defects_by_severity: DefectSeverityCounts,
    pub orphaned_scenarios: u64,
    pub orphaned_test_cases: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HealthLevel {
    Healthy,
    AtRisk,
    Critical,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgramHealth {
    pub score: u32,
    pub status: HealthLevel,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub source: SnapshotSource,
    pub business_projects: BusinessProjectMetrics,
    pub tech_stack: TechStackMetrics,
    pub releases: ReleaseMetrics,
    pub squads: SquadMetrics,
    pub environments: EnvironmentMetrics,
    pub coverage: CoverageMetrics,
    pub health: ProgramHealth,
    pub unavailable_sources: Vec<Domain>,
}

impl DashboardSnapshot {
    pub fn zeroed(source: SnapshotSource) -> Self {
        Self {
            generated_at: Utc::now(),
            source,
            ..Self::default()
        }
    }
}
