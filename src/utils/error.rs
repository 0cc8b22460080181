use thiserror::Error;

#[derive(Error, Debug)]
pub enum FixerError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Shopify responded with HTTP {status}: {message}")]
    ShopifyStatusError { status: u16, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid request: {message}")]
    InvalidRequestError { message: String },

    #[error("Server error: {message}")]
    ServerError { message: String },
}

impl FixerError {
    /// 給使用者的一行修復建議
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            FixerError::ApiError(_) => {
                "Check network connectivity and that the store URL is reachable"
            }
            FixerError::ShopifyStatusError { status: 401, .. }
            | FixerError::ShopifyStatusError { status: 403, .. } => {
                "Verify the Admin API access token and that it has read/write_content scopes"
            }
            FixerError::ShopifyStatusError { status: 404, .. } => {
                "Verify the store URL points at a *.myshopify.com domain"
            }
            FixerError::ShopifyStatusError { status: 429, .. } => {
                "Shopify rate limit hit; raise processing.write_interval_ms and retry"
            }
            FixerError::ShopifyStatusError { .. } => "Inspect the Shopify response message above",
            FixerError::IoError(_) => "Check file paths and permissions",
            FixerError::ConfigValidationError { .. }
            | FixerError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or CLI flags and restart"
            }
            FixerError::InvalidRequestError { .. } => {
                "Send storeUrl, accessToken, mode (\"fix\" or \"dry-run\") and an optional limit"
            }
            FixerError::ServerError { .. } => "Check that the bind address is free and valid",
        }
    }
}

pub type Result<T> = std::result::Result<T, FixerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shopify_status_message() {
        let err = FixerError::ShopifyStatusError {
            status: 401,
            message: "Invalid API key or access token".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Shopify responded with HTTP 401: Invalid API key or access token"
        );
        assert!(err.recovery_suggestion().contains("access token"));
    }

    #[test]
    fn test_rate_limit_suggestion() {
        let err = FixerError::ShopifyStatusError {
            status: 429,
            message: String::new(),
        };
        assert!(err.recovery_suggestion().contains("write_interval_ms"));
    }
}
