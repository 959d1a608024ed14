use crate::errors::{AppError, AppResult};
use crate::models::{Booking, Environment, EnvironmentStatus, TechStackComponent};
use serde::Serialize;
use std::collections::HashMap;

/// Ids of components that are their own ancestor, in input order.
pub fn find_parent_cycles(components: &[TechStackComponent]) -> Vec<String> {
    let parents: HashMap<&str, &str> = components
        .iter()
        .filter_map(|component| {
            component
                .parent_id
                .as_deref()
                .filter(|parent| !parent.is_empty())
                .map(|parent| (component.id.as_str(), parent))
        })
        .collect();

    components
        .iter()
        .filter(|component| is_own_ancestor(&parents, &component.id))
        .map(|component| component.id.clone())
        .collect()
}

fn is_own_ancestor(parents: &HashMap<&str, &str>, id: &str) -> bool {
    let mut current = parents.get(id).copied();
    // A walk longer than the map has entered a cycle that excludes `id`.
    for _ in 0..=parents.len() {
        match current {
            Some(ancestor) if ancestor == id => return true,
            Some(ancestor) => current = parents.get(ancestor).copied(),
            None => return false,
        }
    }
    false
}

pub fn set_component_parent(
    components: &mut [TechStackComponent],
    component_id: &str,
    parent_id: Option<&str>,
) -> AppResult<()> {
    if !components.iter().any(|component| component.id == component_id) {
        return Err(AppError::NotFound(format!("tech stack component '{component_id}' not found")));
    }

    if let Some(parent_id) = parent_id {
        if !components.iter().any(|component| component.id == parent_id) {
            return Err(AppError::MissingReference(format!(
                "tech stack component '{parent_id}' not found"
            )));
        }
        let parents: HashMap<&str, &str> = components
            .iter()
            .filter(|component| component.id != component_id)
            .filter_map(|component| component.parent_id.as_deref().map(|parent| (component.id.as_str(), parent)))
            .collect();
        let mut current = Some(parent_id);
        let mut steps = 0usize;
        while let Some(ancestor) = current {
            if ancestor == component_id {
                return Err(AppError::Validation(format!(
                    "'{parent_id}' cannot parent '{component_id}': it would become its own ancestor"
                )));
            }
            steps += 1;
            if steps > parents.len() {
                break;
            }
            current = parents.get(ancestor).copied();
        }
    }

    if let Some(component) = components.iter_mut().find(|component| component.id == component_id) {
        component.parent_id = parent_id.map(ToString::to_string);
    }
    Ok(())
}

/// Books an environment. Any existing booking is replaced without overlap
/// detection and handed back to the caller.
pub fn book_environment(environment: &mut Environment, booking: Booking) -> AppResult<Option<Booking>> {
    if booking.start_date > booking.end_date {
        return Err(AppError::Validation(format!(
            "booking for '{}' starts {} after it ends {}",
            environment.id, booking.start_date, booking.end_date
        )));
    }

    let replaced = environment.booking.replace(booking);
    environment.status = EnvironmentStatus::Booked;
    if let Some(previous) = &replaced {
        tracing::warn!(
            environment_id = %environment.id,
            replaced_booked_by = %previous.booked_by,
            replaced_start = %previous.start_date,
            replaced_end = %previous.end_date,
            "existing booking replaced"
        );
    }
    Ok(replaced)
}

pub fn release_booking(environment: &mut Environment) -> Option<Booking> {
    let released = environment.booking.take();
    if environment.status == EnvironmentStatus::Booked {
        environment.status = EnvironmentStatus::Available;
    }
    released
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityViolation {
    pub environment_id: String,
    pub capacity: f64,
    pub current_usage: f64,
}

/// Environments whose usage exceeds capacity. Capacity is advisory, so this
/// only reports.
pub fn capacity_violations(environments: &[Environment]) -> Vec<CapacityViolation> {
    environments
        .iter()
        .filter_map(|environment| {
            let capacity = environment.usable_capacity()?;
            let usage = environment.usable_usage()?;
            (usage > capacity).then(|| CapacityViolation {
                environment_id: environment.id.clone(),
                capacity,
                current_usage: usage,
            })
        })
        .collect()
}
