//! Configuration validation

use crate::schema::{RawConfig, RawGuard, RawPricing};
use parkwise_api::{validate_email, GuardStatus, Shift};
use std::collections::HashSet;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Guard '{guard_id}': {message}")]
    GuardError { guard_id: String, message: String },

    #[error("Duplicate guard ID: {0}")]
    DuplicateGuardId(String),

    #[error("Rate for {category} must not be negative (got {value})")]
    NegativeRate { category: &'static str, value: i64 },

    #[error("Unknown id_strategy '{0}' (expected \"uuid\" or \"sequential\")")]
    UnknownIdStrategy(String),

    #[error("Global config error: {0}")]
    GlobalError(String),
}

/// Validate a raw configuration, collecting every problem found
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(strategy) = &config.facility.id_strategy
        && parse_id_strategy(strategy).is_none()
    {
        errors.push(ValidationError::UnknownIdStrategy(strategy.clone()));
    }

    if let Some(name) = &config.facility.name
        && name.trim().is_empty()
    {
        errors.push(ValidationError::GlobalError(
            "facility name cannot be empty".into(),
        ));
    }

    if let Some(pricing) = &config.pricing {
        errors.extend(validate_pricing(pricing));
    }

    let mut seen_ids = HashSet::new();
    for guard in &config.guards {
        if !seen_ids.insert(&guard.id) {
            errors.push(ValidationError::DuplicateGuardId(guard.id.clone()));
        }
    }

    for guard in &config.guards {
        errors.extend(validate_guard(guard));
    }

    errors
}

fn validate_pricing(pricing: &RawPricing) -> Vec<ValidationError> {
    [
        ("two_wheeler", pricing.two_wheeler),
        ("three_wheeler", pricing.three_wheeler),
        ("four_wheeler", pricing.four_wheeler),
    ]
    .into_iter()
    .filter_map(|(category, value)| match value {
        Some(value) if value < 0 => Some(ValidationError::NegativeRate { category, value }),
        _ => None,
    })
    .collect()
}

fn validate_guard(guard: &RawGuard) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut push = |message: String| {
        errors.push(ValidationError::GuardError {
            guard_id: guard.id.clone(),
            message,
        })
    };

    if guard.id.trim().is_empty() {
        push("id cannot be empty".into());
    }

    if guard.name.trim().is_empty() {
        push("name cannot be empty".into());
    }

    if let Err(e) = validate_email(&guard.email) {
        push(e.to_string());
    }

    if let Err(e) = guard.shift.parse::<Shift>() {
        push(e.to_string());
    }

    if let Some(status) = &guard.status
        && status.parse::<GuardStatus>().is_err()
    {
        push(format!("unknown status '{status}' (expected active or inactive)"));
    }

    errors
}

/// How the service mints identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdStrategy {
    #[default]
    Uuid,
    Sequential,
}

/// Parse an `id_strategy` value
pub fn parse_id_strategy(s: &str) -> Option<IdStrategy> {
    match s.to_lowercase().as_str() {
        "uuid" => Some(IdStrategy::Uuid),
        "sequential" | "seq" => Some(IdStrategy::Sequential),
        _ => None,
    }
}
