//! Patch version handling.
//!
//! Data Dragon reports versions like `15.8.1`. Matchups are stored under the
//! short form (`15.8`) while op.gg expects a zero-padded minor (`15.08`).
//!
//! The two forms round-trip for minors 1..=9 and 10..=99. Storage form is not
//! injective: `15.09` and `15.9` both store as `15.9`, and a minor of `00`
//! stores as the meaningless `15.0`. No further special-casing is attempted.

use crate::api::models::VersionsDto;
use crate::error::AppError;

/// Reduce the newest entry of a versions.json body to `major.minor`.
pub fn parse_latest_patch(body: &str) -> Result<String, AppError> {
    let VersionsDto(versions) = serde_json::from_str(body)
        .map_err(|e| AppError::ParseError(format!("Failed to parse patch versions JSON: {}", e)))?;

    let latest = versions
        .first()
        .ok_or_else(|| AppError::ParseError("No patch versions found in the API response".to_string()))?;

    let mut parts = latest.split('.');
    match (parts.next(), parts.next()) {
        (Some(major), Some(minor)) => Ok(format!("{}.{}", major, minor)),
        _ => Err(AppError::ParseError(format!(
            "Unexpected version format received: {}",
            latest
        ))),
    }
}

/// `15.07` -> `15.7`; anything else passes through.
pub fn to_storage_form(patch: &str) -> String {
    match split_two(patch) {
        Some((major, minor)) if minor.len() == 2 && minor.starts_with('0') => {
            format!("{}.{}", major, &minor[1..])
        }
        _ => patch.to_string(),
    }
}

/// `15.7` -> `15.07`; two-or-more digit minors pass through.
pub fn to_query_form(patch: &str) -> String {
    match split_two(patch) {
        Some((major, minor)) if minor.len() == 1 => format!("{}.0{}", major, minor),
        _ => patch.to_string(),
    }
}

fn split_two(patch: &str) -> Option<(&str, &str)> {
    let (major, minor) = patch.split_once('.')?;
    if minor.contains('.') {
        return None;
    }
    Some((major, minor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_patch_is_truncated_to_major_minor() {
        let body = r#"["15.8.1", "15.7.1", "15.6.1"]"#;
        assert_eq!(parse_latest_patch(body).unwrap(), "15.8");
    }

    #[test]
    fn latest_patch_rejects_bad_payloads() {
        assert!(matches!(parse_latest_patch("not json"), Err(AppError::ParseError(_))));
        assert!(matches!(parse_latest_patch("[]"), Err(AppError::ParseError(_))));
        assert!(matches!(parse_latest_patch(r#"["15"]"#), Err(AppError::ParseError(_))));
        assert!(matches!(parse_latest_patch(r#"{"latest": "15.8.1"}"#), Err(AppError::ParseError(_))));
    }

    #[test]
    fn storage_form_drops_leading_zero_of_two_digit_minor() {
        assert_eq!(to_storage_form("15.07"), "15.7");
        assert_eq!(to_storage_form("15.10"), "15.10");
        assert_eq!(to_storage_form("15.11"), "15.11");
        assert_eq!(to_storage_form("15.7"), "15.7");
        assert_eq!(to_storage_form("15.8.1"), "15.8.1");
        assert_eq!(to_storage_form("15"), "15");
    }

    #[test]
    fn query_form_pads_single_digit_minor() {
        assert_eq!(to_query_form("15.7"), "15.07");
        assert_eq!(to_query_form("15.11"), "15.11");
        assert_eq!(to_query_form("15.07"), "15.07");
        assert_eq!(to_query_form("15"), "15");
        assert_eq!(to_query_form("15.8.1"), "15.8.1");
    }

    #[test]
    fn query_form_round_trips_through_storage_form() {
        for patch in ["15.01", "15.07", "15.09", "15.10", "15.24", "14.99"] {
            assert_eq!(to_query_form(&to_storage_form(patch)), patch);
        }
        for patch in ["15.1", "15.7", "15.10", "15.24"] {
            assert_eq!(to_storage_form(&to_query_form(patch)), patch);
        }
    }

    #[test]
    fn leading_zero_boundary_does_not_round_trip_from_storage_form() {
        // "09" and "9" share a storage form, so storage form alone cannot tell them apart.
        assert_eq!(to_storage_form("15.09"), to_storage_form("15.9"));
        assert_eq!(to_storage_form("15.00"), "15.0");
        assert_eq!(to_query_form("15.0"), "15.00");
    }
}
