use super::models::Config;
use thiserror::Error;

/// Minimum candidates requested per wanted source
pub const MIN_OVERSAMPLE: usize = 3;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("sources.oversample must be at least {MIN_OVERSAMPLE}, got {0}")]
    OversampleTooLow(usize),

    #[error("sources.fetch_concurrency must be at least 1")]
    ZeroFetchConcurrency,

    #[error("sources.ytdlp_path must not be empty")]
    EmptyYtDlpPath,

    #[error("Form limit must be positive: {field} = 0")]
    ZeroLimit { field: &'static str },

    #[error("mail.attachment_name '{0}' must be a non-empty .zip file name")]
    InvalidAttachmentName(String),

    #[error("mail.api_base '{0}' must be an http(s) URL")]
    InvalidApiBase(String),

    #[error("mail.max_attachment_bytes must be positive")]
    ZeroAttachmentLimit,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_sources(config)?;
    validate_limits(config)?;
    validate_mail(config)?;
    Ok(())
}

fn validate_sources(config: &Config) -> Result<(), ValidationError> {
    let sources = &config.sources;

    if sources.oversample < MIN_OVERSAMPLE {
        return Err(ValidationError::OversampleTooLow(sources.oversample));
    }

    if sources.fetch_concurrency == 0 {
        return Err(ValidationError::ZeroFetchConcurrency);
    }

    if sources.ytdlp_path.as_os_str().is_empty() {
        return Err(ValidationError::EmptyYtDlpPath);
    }

    Ok(())
}

fn validate_limits(config: &Config) -> Result<(), ValidationError> {
    if config.limits.max_videos == 0 {
        return Err(ValidationError::ZeroLimit {
            field: "max_videos",
        });
    }

    if config.limits.max_duration_secs == 0 {
        return Err(ValidationError::ZeroLimit {
            field: "max_duration_secs",
        });
    }

    Ok(())
}

fn validate_mail(config: &Config) -> Result<(), ValidationError> {
    let mail = &config.mail;

    let name = mail.attachment_name.as_str();
    let valid_name = name.len() > ".zip".len()
        && name.ends_with(".zip")
        && !name.contains(['/', '\\']);
    if !valid_name {
        return Err(ValidationError::InvalidAttachmentName(name.to_string()));
    }

    if !mail.api_base.starts_with("http://") && !mail.api_base.starts_with("https://") {
        return Err(ValidationError::InvalidApiBase(mail.api_base.clone()));
    }

    if mail.max_attachment_bytes.as_u64() == 0 {
        return Err(ValidationError::ZeroAttachmentLimit);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::humanize::ByteSize;

    #[test]
    fn test_valid_config() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_oversample_below_three() {
        let mut config = Config::default();
        config.sources.oversample = 2;

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::OversampleTooLow(2))));
    }

    #[test]
    fn test_zero_concurrency() {
        let mut config = Config::default();
        config.sources.fetch_concurrency = 0;

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::ZeroFetchConcurrency)));
    }

    #[test]
    fn test_zero_limits() {
        let mut config = Config::default();
        config.limits.max_duration_secs = 0;

        let result = validate(&config);
        assert!(matches!(
            result,
            Err(ValidationError::ZeroLimit {
                field: "max_duration_secs"
            })
        ));
    }

    #[test]
    fn test_attachment_name_rules() {
        for bad in ["", ".zip", "mashup.tar", "../mashup.zip"] {
            let mut config = Config::default();
            config.mail.attachment_name = bad.to_string();
            assert!(
                matches!(
                    validate(&config),
                    Err(ValidationError::InvalidAttachmentName(_))
                ),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_api_base_scheme() {
        let mut config = Config::default();
        config.mail.api_base = "ftp://sendgrid".to_string();

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::InvalidApiBase(_))));
    }

    #[test]
    fn test_zero_attachment_limit() {
        let mut config = Config::default();
        config.mail.max_attachment_bytes = ByteSize(0);

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::ZeroAttachmentLimit)));
    }
}
