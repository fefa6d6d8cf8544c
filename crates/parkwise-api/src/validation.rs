//! Input validation shared by the service and the config loader

use crate::{ParkingError, Result};

/// Plate numbers are 5 to 10 ASCII letters or digits
pub const VEHICLE_NUMBER_MIN_LEN: usize = 5;
pub const VEHICLE_NUMBER_MAX_LEN: usize = 10;

/// Validate a plate number and return it upper-cased.
///
/// Surrounding whitespace is ignored; anything else outside `[A-Za-z0-9]` is
/// rejected.
pub fn normalize_vehicle_number(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let len_ok = (VEHICLE_NUMBER_MIN_LEN..=VEHICLE_NUMBER_MAX_LEN).contains(&trimmed.len());

    if !len_ok || !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ParkingError::InvalidVehicleNumberFormat(raw.to_string()));
    }

    Ok(trimmed.to_ascii_uppercase())
}

/// Validate an email address of the form `local@domain.tld`.
///
/// The local part allows letters, digits and `._%+-`; the domain allows
/// letters, digits, `.` and `-`; the top-level label is at least two letters.
pub fn validate_email(email: &str) -> Result<()> {
    let invalid = || ParkingError::InvalidEmailFormat(email.to_string());

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;

    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c));
    let host_ok = !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    let tld_ok = tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic());

    if local_ok && host_ok && tld_ok {
        Ok(())
    } else {
        Err(invalid())
    }
}

/// Reject blank required text fields
pub fn require_non_blank(value: &str, field: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        Err(ParkingError::MissingField(field))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plate_numbers() {
        assert_eq!(normalize_vehicle_number("ka01ab1234").unwrap(), "KA01AB1234");
        assert_eq!(normalize_vehicle_number("  AB123 ").unwrap(), "AB123");
    }

    #[test]
    fn rejects_bad_plate_numbers() {
        for bad in ["", "AB12", "KA01AB12345", "KA-01-AB", "KA01 AB12", "ಕರ್ನಾಟಕ1"] {
            assert!(
                matches!(
                    normalize_vehicle_number(bad),
                    Err(ParkingError::InvalidVehicleNumberFormat(_))
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn accepts_emails() {
        assert!(validate_email("john@example.com").is_ok());
        assert!(validate_email("first.last+tag@mail.example.co").is_ok());
    }

    #[test]
    fn rejects_bad_emails() {
        for bad in [
            "",
            "john",
            "john@",
            "@example.com",
            "john@example",
            "john@example.c",
            "jo hn@example.com",
        ] {
            assert!(validate_email(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn blank_fields_are_missing() {
        assert!(matches!(require_non_blank("  ", "name"), Err(ParkingError::MissingField("name"))));
        assert!(require_non_blank("Jane", "name").is_ok());
    }
}
