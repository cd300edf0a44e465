use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;

use axum::http::Uri;
use serde::{Deserialize, Serialize};

use crate::config::PaginationConfig;
use crate::error::AppError;

/// Page-number pagination envelope used by every list endpoint.
#[derive(Serialize, utoipa::ToSchema)]
pub struct Page<T> {
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub count: u64,
    /// Link to the next page, if any.
    #[schema(example = "/api/recipes?limit=6&page=3")]
    pub next: Option<String>,
    /// Link to the previous page, if any.
    #[schema(example = "/api/recipes?limit=6")]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// `page` / `limit` query parameters shared by paginated endpoints.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct PageQuery {
    /// 1-based page number.
    pub page: Option<u64>,
    /// Page size.
    pub limit: Option<u64>,
}

/// Resolved pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn new(page: Option<u64>, limit: Option<u64>, config: &PaginationConfig) -> Self {
        Self {
            page: Ord::max(page.unwrap_or(1), 1),
            limit: limit
                .unwrap_or(config.default_limit)
                .clamp(1, config.max_limit.max(1)),
        }
    }

    /// Row offset of the page, saturating at the largest offset the database accepts.
    pub fn offset(&self) -> u64 {
        self.page
            .saturating_sub(1)
            .saturating_mul(self.limit)
            .min(i64::MAX as u64)
    }

    /// Wrap one page of results, linking neighbours relative to `uri`.
    pub fn into_page<T>(self, results: Vec<T>, count: u64, uri: &Uri) -> Page<T> {
        let total_pages = count.div_ceil(self.limit);
        let next = (self.page < total_pages).then(|| page_link(uri, self.page + 1));
        let previous = (self.page > 1).then(|| page_link(uri, self.page - 1));
        Page {
            count,
            next,
            previous,
            results,
        }
    }
}

/// Rebuild `uri` pointing at `page`, keeping every other query parameter.
/// Page 1 is addressed without a `page` parameter.
pub fn page_link(uri: &Uri, page: u64) -> String {
    let page_param = format!("page={page}");
    let mut params: Vec<&str> = uri
        .query()
        .unwrap_or("")
        .split('&')
        .filter(|p| !p.is_empty() && *p != "page" && !p.starts_with("page="))
        .collect();
    if page > 1 {
        params.push(&page_param);
    }

    if params.is_empty() {
        uri.path().to_string()
    } else {
        format!("{}?{}", uri.path(), params.join("&"))
    }
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Validate a trimmed text field length in Unicode characters.
pub fn validate_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), AppError> {
    let len = value.trim().chars().count();
    if len < min || len > max {
        let message = if min == 1 && len == 0 {
            format!("{field} must not be empty")
        } else {
            format!("{field} must be {min}-{max} characters")
        };
        return Err(AppError::field(field, message));
    }
    Ok(())
}

/// Validate an integer lies within `[min, max]`.
pub fn validate_range(field: &'static str, value: i32, min: i32, max: i32) -> Result<(), AppError> {
    if value < min || value > max {
        return Err(AppError::field(
            field,
            format!("{field} must be between {min} and {max}"),
        ));
    }
    Ok(())
}

/// Validate an ID list is non-empty and duplicate-free.
pub fn validate_unique_ids<T>(field: &'static str, ids: &[T]) -> Result<(), AppError>
where
    T: Eq + Hash + Display,
{
    if ids.is_empty() {
        return Err(AppError::field(field, format!("At least one {field} entry is required")));
    }
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(AppError::field(field, format!("Duplicate {field} entry: {id}")));
        }
    }
    Ok(())
}

/// Interpret boolean-ish filter values (`1`, `true`, `0`, `false`).
pub fn parse_flag(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}
