use crate::utils::error::{CrawlerError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(CrawlerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(CrawlerError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(CrawlerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(CrawlerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(CrawlerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
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
        return Err(CrawlerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// 組合 ID 只允許 ASCII 數字
pub fn validate_portfolio_id(portfolio_id: &str) -> Result<()> {
    if portfolio_id.is_empty() || !portfolio_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CrawlerError::InvalidPortfolioId(portfolio_id.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("base_url", "https://emdcspzhapi.dfcfs.cn/rtV1").is_ok());
        assert!(validate_url("base_url", "http://127.0.0.1:8080/rtV1").is_ok());
        assert!(validate_url("base_url", "").is_err());
        assert!(validate_url("base_url", "not a url").is_err());
        assert!(validate_url("base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("page_size", 20, 1, 20).is_ok());
        assert!(validate_range("page_size", 0, 1, 20).is_err());
        assert!(validate_range("page_size", 21, 1, 20).is_err());
    }

    #[test]
    fn test_validate_portfolio_id() {
        assert!(validate_portfolio_id("10053186").is_ok());
        assert!(validate_portfolio_id("").is_err());
        assert!(validate_portfolio_id("12a4").is_err());
        assert!(validate_portfolio_id("١٢٣").is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("cache_dir", "./data/cache").is_ok());
        assert!(validate_path("cache_dir", "  ").is_err());
        assert!(validate_path("cache_dir", "bad\0path").is_err());
    }
}
