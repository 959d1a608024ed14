//! Read-only network fallback. The remote endpoint answers with
//! `{ "data": { ...partial snapshot... } }`, which is merged over a zero
//! snapshot. Any failure degrades to the zero snapshot.

use crate::db::merge_json;
use crate::errors::{AppResult, SourceError};
use crate::models::{DashboardSettings, DashboardSnapshot, Domain, SnapshotSource};
use chrono::Utc;
use std::time::Duration;

pub struct OverviewClient {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl OverviewClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    /// `None` when no overview URL is configured.
    pub fn from_settings(settings: &DashboardSettings) -> AppResult<Option<Self>> {
        match settings.overview_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(Some(Self::new(
                url,
                Duration::from_millis(settings.overview_timeout_ms),
            )?)),
            _ => Ok(None),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn fetch(&self) -> Result<DashboardSnapshot, SourceError> {
        let response = self.client.get(&self.url).timeout(self.timeout).send().await?;

        if !response.status().is_success() {
            return Err(SourceError::Unavailable(format!(
                "overview endpoint returned {}",
                response.status()
            )));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|error| SourceError::Corrupt(format!("overview body is not JSON: {error}")))?;
        merge_overview(payload)
    }

    /// Never fails: an unusable endpoint yields the zero snapshot with the
    /// overview source marked unavailable.
    pub async fn snapshot(&self) -> DashboardSnapshot {
        match self.fetch().await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                tracing::warn!(url = %self.url, error = %error, "overview endpoint unusable, serving zero snapshot");
                unavailable_overview()
            }
        }
    }
}

/// Deep-merges the payload's `data` object into a zero snapshot.
pub fn merge_overview(payload: serde_json::Value) -> Result<DashboardSnapshot, SourceError> {
    let Some(data) = payload.get("data").filter(|data| data.is_object()) else {
        return Err(SourceError::Corrupt("overview payload has no data object".to_string()));
    };

    let mut merged = serde_json::to_value(DashboardSnapshot::zeroed(SnapshotSource::Overview))?;
    merge_json(&mut merged, data.clone());

    let mut snapshot: DashboardSnapshot = serde_json::from_value(merged)?;
    clamp_ranges(&mut snapshot);
    snapshot.source = SnapshotSource::Overview;
    snapshot.generated_at = Utc::now();
    Ok(snapshot)
}

/// Remote values get the same bounds as locally built ones: percentages
/// within 0-100, amounts non-negative.
fn clamp_ranges(snapshot: &mut DashboardSnapshot) {
    for percent in [
        &mut snapshot.coverage.coverage_percentage,
        &mut snapshot.coverage.automation_percentage,
        &mut snapshot.coverage.pass_rate,
        &mut snapshot.tech_stack.healthy_percentage,
        &mut snapshot.releases.average_progress,
        &mut snapshot.releases.readiness_percentage,
        &mut snapshot.environments.utilization_percentage,
        &mut snapshot.health.score,
    ] {
        *percent = (*percent).min(100);
    }

    for amount in [
        &mut snapshot.business_projects.total_budget,
        &mut snapshot.business_projects.average_budget,
        &mut snapshot.business_projects.average_expected_roi,
        &mut snapshot.environments.total_capacity,
        &mut snapshot.environments.total_usage,
        &mut snapshot.environments.average_response_time_ms,
    ] {
        if !amount.is_finite() || *amount < 0.0 {
            *amount = 0.0;
        }
    }
}

pub fn unavailable_overview() -> DashboardSnapshot {
    let mut snapshot = DashboardSnapshot::zeroed(SnapshotSource::Overview);
    snapshot.unavailable_sources.push(Domain::Overview);
    snapshot
}
