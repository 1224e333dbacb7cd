//! Request field validation shared by the handlers.
//! Everything here runs before any store access.

use std::str::FromStr;

use time::{format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime};

use crate::error::{ApiError, ApiResult};

/// Trimmed value of a required field; blank counts as missing
pub fn required(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Trimmed value of an optional field; blank becomes `None`
pub fn optional(value: Option<String>) -> Option<String> {
    required(value.as_deref())
}

/// Parse a path id; anything that is not a UUID is a 400
pub fn parse_id<T: FromStr>(raw: &str, what: &str) -> ApiResult<T> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid {} id", what)))
}

/// RFC 3339 timestamp, or a plain `YYYY-MM-DD` date taken as midnight UTC
pub fn parse_date(raw: &str) -> ApiResult<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(ts);
    }
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .map(|d| d.midnight().assume_utc())
        .map_err(|_| ApiError::bad_request("Invalid date, expected YYYY-MM-DD or RFC 3339"))
}

/// Syntactic email check (RFC 5321 length limits, conservative charset)
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim().to_lowercase();

    if email.is_empty() || email.len() > 254 {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if domain.contains('@') {
        return false;
    }

    // Local part
    if local.is_empty() || local.len() > 64 {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }
    if !local
        .chars()
        .all(|c| c.is_alphanumeric() || ".+-_".contains(c))
    {
        return false;
    }

    // Domain
    if domain.is_empty() || domain.len() > 255 {
        return false;
    }
    if domain.starts_with('-') || domain.ends_with('-') {
        return false;
    }
    if domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((_, tld)) if tld.len() >= 2 && tld.chars().all(|c| c.is_alphabetic()) => {}
        _ => return false,
    }

    domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyantra_shared::EventId;

    #[test]
    fn test_required_and_optional() {
        assert_eq!(required(Some("  Arena  ")).as_deref(), Some("Arena"));
        assert_eq!(required(Some("   ")), None);
        assert_eq!(required(None), None);
        assert_eq!(optional(Some(String::new())), None);
        assert_eq!(optional(Some(" x ".to_string())).as_deref(), Some("x"));
    }

    #[test]
    fn test_parse_id() {
        let id = EventId::new();
        let parsed: EventId = parse_id(&id.to_string(), "event").unwrap();
        assert_eq!(parsed, id);

        let err = parse_id::<EventId>("64f0c2", "event").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(ref m) if m == "Invalid event id"));
    }

    #[test]
    fn test_parse_date_forms() {
        let day = parse_date("2025-03-14").unwrap();
        assert_eq!(day.unix_timestamp(), 1_741_910_400);

        let ts = parse_date("2025-03-14T10:30:00+05:30").unwrap();
        assert_eq!(ts.unix_timestamp(), 1_741_928_400);

        assert!(parse_date("14/03/2025").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("lead@lab.edu"));
        assert!(is_valid_email("first.last+robots@iitb.ac.in"));
        assert!(!is_valid_email("lead"));
        assert!(!is_valid_email("lead@"));
        assert!(!is_valid_email("@lab.edu"));
        assert!(!is_valid_email("a@@lab.edu"));
        assert!(!is_valid_email("a@lab"));
        assert!(!is_valid_email("a..b@lab.edu"));
        assert!(!is_valid_email("a@lab.c0m"));
        assert!(!is_valid_email("a b@lab.edu"));
    }
}
