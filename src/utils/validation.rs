use crate::utils::error::{FixerError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(FixerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(FixerError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(FixerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_socket_addr(field_name: &str, addr: &str) -> Result<()> {
    addr.parse::<std::net::SocketAddr>()
        .map(|_| ())
        .map_err(|e| FixerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: addr.to_string(),
            reason: format!("Invalid socket address: {}", e),
        })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(FixerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(FixerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Shopify API 版本格式為 `YYYY-MM`，另接受 `unstable`
pub fn validate_api_version(field_name: &str, version: &str) -> Result<()> {
    if version == "unstable" {
        return Ok(());
    }

    let bytes = version.as_bytes();
    let valid = bytes.len() == 7
        && bytes[4] == b'-'
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[5..].iter().all(u8::is_ascii_digit)
        && version[5..].parse::<u8>().is_ok_and(|m| (1..=12).contains(&m));

    if !valid {
        return Err(FixerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: version.to_string(),
            reason: "Expected an API version like 2024-01".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("store_url", "https://demo.myshopify.com").is_ok());
        assert!(validate_url("store_url", "http://127.0.0.1:8080").is_ok());
        assert!(validate_url("store_url", "").is_err());
        assert!(validate_url("store_url", "invalid-url").is_err());
        assert!(validate_url("store_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("limit", 250, 1, 250).is_ok());
        assert!(validate_range("limit", 0, 1, 250).is_err());
        assert!(validate_range("limit", 251, 1, 250).is_err());
    }

    #[test]
    fn test_validate_api_version() {
        assert!(validate_api_version("api_version", "2024-01").is_ok());
        assert!(validate_api_version("api_version", "unstable").is_ok());
        assert!(validate_api_version("api_version", "2024-13").is_err());
        assert!(validate_api_version("api_version", "v1").is_err());
    }

    #[test]
    fn test_validate_socket_addr() {
        assert!(validate_socket_addr("server.bind", "127.0.0.1:3000").is_ok());
        assert!(validate_socket_addr("server.bind", "localhost").is_err());
    }
}
