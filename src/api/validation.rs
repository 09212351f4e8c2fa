use thiserror::Error;

use super::models::MashupForm;
use crate::config::FormLimits;
use crate::pipeline::Query;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormValidationError {
    #[error("Please enter a singer name.")]
    EmptyPerformer,
    #[error("Number of videos must be a whole number.")]
    InvalidVideos,
    #[error("Number of videos must be between 1 and {0}.")]
    VideosOutOfRange(u32),
    #[error("Duration must be a whole number of seconds.")]
    InvalidDuration,
    #[error("Duration must be between 1 and {0} seconds.")]
    DurationOutOfRange(u32),
    #[error("Please enter a valid email address.")]
    InvalidEmail,
}

/// Turn a submitted form into a job query, enforcing `limits`
pub fn validate_form(
    form: &MashupForm,
    limits: &FormLimits,
) -> Result<Query, FormValidationError> {
    let performer = form.singer.trim();
    if performer.is_empty() {
        return Err(FormValidationError::EmptyPerformer);
    }

    let count = parse_bounded(
        &form.videos,
        limits.max_videos,
        FormValidationError::InvalidVideos,
        FormValidationError::VideosOutOfRange(limits.max_videos),
    )?;

    let duration_secs = parse_bounded(
        &form.duration,
        limits.max_duration_secs,
        FormValidationError::InvalidDuration,
        FormValidationError::DurationOutOfRange(limits.max_duration_secs),
    )?;

    let recipient = form.email.trim();
    if !is_plausible_email(recipient) {
        return Err(FormValidationError::InvalidEmail);
    }

    Ok(Query {
        performer: performer.to_string(),
        count,
        duration_secs,
        recipient: recipient.to_string(),
    })
}

/// Whole number in `1..=max`; signs and digit overflow count as out of range
fn parse_bounded(
    raw: &str,
    max: u32,
    invalid: FormValidationError,
    out_of_range: FormValidationError,
) -> Result<u32, FormValidationError> {
    let raw = raw.trim();
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid);
    }
    if digits.len() != raw.len() {
        return Err(out_of_range);
    }

    match digits.parse::<u32>() {
        Ok(value) if (1..=max).contains(&value) => Ok(value),
        _ => Err(out_of_range),
    }
}

/// Single `@`, non-empty local part, dotted domain, no whitespace
fn is_plausible_email(address: &str) -> bool {
    if address.len() > 254 || address.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }

    let Some((local, domain)) = address.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(singer: &str, videos: &str, duration: &str, email: &str) -> MashupForm {
        MashupForm {
            singer: singer.to_string(),
            videos: videos.to_string(),
            duration: duration.to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    fn validate_form_accepts_valid_input() {
        let query = validate_form(
            &form("  Sharry Maan ", "2", " 20", "fan@example.com "),
            &FormLimits::default(),
        )
        .unwrap();

        assert_eq!(query.performer, "Sharry Maan");
        assert_eq!(query.count, 2);
        assert_eq!(query.duration_secs, 20);
        assert_eq!(query.recipient, "fan@example.com");
    }

    #[test]
    fn validate_form_rejects_empty_performer() {
        let err = validate_form(&form("   ", "2", "20", "a@b.co"), &FormLimits::default());
        assert_eq!(err, Err(FormValidationError::EmptyPerformer));
    }

    #[test]
    fn validate_form_rejects_non_numeric_values() {
        let limits = FormLimits::default();
        for videos in ["", "two", "2.5", "1e3", "+2"] {
            let err = validate_form(&form("x", videos, "20", "a@b.co"), &limits);
            assert_eq!(err, Err(FormValidationError::InvalidVideos), "videos={videos:?}");
        }

        let err = validate_form(&form("x", "2", "abc", "a@b.co"), &limits);
        assert_eq!(err, Err(FormValidationError::InvalidDuration));
    }

    #[test]
    fn validate_form_enforces_ranges() {
        let limits = FormLimits {
            max_videos: 5,
            max_duration_secs: 30,
        };

        for videos in ["0", "-1", "6", "99999999999"] {
            let err = validate_form(&form("x", videos, "20", "a@b.co"), &limits);
            assert_eq!(err, Err(FormValidationError::VideosOutOfRange(5)), "videos={videos:?}");
        }

        let err = validate_form(&form("x", "5", "31", "a@b.co"), &limits);
        assert_eq!(err, Err(FormValidationError::DurationOutOfRange(30)));

        let query = validate_form(&form("x", "5", "30", "a@b.co"), &limits).unwrap();
        assert_eq!((query.count, query.duration_secs), (5, 30));
    }

    #[test]
    fn validate_form_rejects_malformed_email() {
        let limits = FormLimits::default();
        for email in ["", "plain", "@example.com", "a@b", "a@@b.com", "a b@c.com", "a@.com", "a@b..com"] {
            let err = validate_form(&form("x", "1", "1", email), &limits);
            assert_eq!(err, Err(FormValidationError::InvalidEmail), "email={email:?}");
        }
    }
}
