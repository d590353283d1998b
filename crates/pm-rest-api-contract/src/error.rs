//! Error types for the API contract

use thiserror::Error;
use validator::ValidationErrors;

/// Errors raised while validating caller input or building a request.
///
/// Every variant is produced before any network access takes place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiContractError {
    #[error("invalid argument `{parameter}`: {reason}")]
    InvalidArgument { parameter: String, reason: String },

    #[error("invalid endpoint URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ApiContractError {
    /// Create an invalid-argument error for the named parameter.
    pub fn invalid_argument(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid-URL error.
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// First failing field of a derived validation, named `scope.field`.
    ///
    /// Fields are taken in name order so the reported parameter is stable.
    pub fn from_validation(errors: &ValidationErrors, scope: Option<&str>) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let Some((field, failures)) = fields.first() else {
            return Self::invalid_argument(scope.unwrap_or("input"), "is invalid");
        };
        let parameter = match scope {
            Some(scope) => format!("{scope}.{field}"),
            None => field.to_string(),
        };
        let reason = failures
            .first()
            .map(|failure| match &failure.message {
                Some(message) => message.to_string(),
                None => format!("failed the `{}` check", failure.code),
            })
            .unwrap_or_else(|| "is invalid".to_string());
        Self::invalid_argument(parameter, reason)
    }

    /// Name of the offending parameter, when the error is an invalid argument.
    pub fn parameter(&self) -> Option<&str> {
        match self {
            Self::InvalidArgument { parameter, .. } => Some(parameter),
            Self::InvalidUrl { .. } => None,
        }
    }
}

impl From<ValidationErrors> for ApiContractError {
    fn from(errors: ValidationErrors) -> Self {
        Self::from_validation(&errors, None)
    }
}

/// Result type alias for contract operations
pub type ApiContractResult<T> = Result<T, ApiContractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_names_parameter() {
        let err = ApiContractError::invalid_argument("host.username", "must be absent");
        assert_eq!(err.parameter(), Some("host.username"));
        assert_eq!(
            err.to_string(),
            "invalid argument `host.username`: must be absent"
        );
    }

    #[test]
    fn test_validation_errors_name_first_field() {
        let mut errors = ValidationErrors::new();
        let mut page = validator::ValidationError::new("range");
        page.message = Some("must be a positive integer".into());
        errors.add("page_num", page);
        errors.add("items_per_page", validator::ValidationError::new("range"));

        let err = ApiContractError::from(errors.clone());
        assert_eq!(err.parameter(), Some("items_per_page"));
        assert_eq!(
            err.to_string(),
            "invalid argument `items_per_page`: failed the `range` check"
        );

        let err = ApiContractError::from_validation(&errors, Some("page"));
        assert_eq!(err.parameter(), Some("page.items_per_page"));
    }

    #[test]
    fn test_invalid_url_has_no_parameter() {
        let err = ApiContractError::invalid_url("nope", "relative URL without a base");
        assert_eq!(err.parameter(), None);
    }
}
