//! Pagination and sorting query parameters.

use serde::{Deserialize, Serialize};

use drive_core::error::AppError;
use drive_core::types::{PageRequest, SortDirection, SortField, SortKey};

/// Query parameters for paginated endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    /// Page number (1-based).
    pub page: Option<u64>,
    /// Items per page (clamped to 1..=100).
    pub limit: Option<u64>,
    /// `name`, `createdAt`, `updatedAt` or `byteSize`.
    pub sort_field: Option<String>,
    /// `asc` or `desc`; `true`/`false` are accepted too.
    pub sort_order: Option<String>,
}

impl PaginationParams {
    /// Whether the client asked for a page at all.
    pub fn is_paged(&self) -> bool {
        self.page.is_some() || self.limit.is_some()
    }

    /// Converts to a `PageRequest`.
    pub fn page_request(&self, default_limit: u64) -> PageRequest {
        PageRequest::new(self.page.unwrap_or(1), self.limit.unwrap_or(default_limit))
    }

    /// `Some` only when the client asked for a page.
    pub fn optional_page(&self, default_limit: u64) -> Option<PageRequest> {
        self.is_paged().then(|| self.page_request(default_limit))
    }

    /// Sort from the query, with `default` filling in whatever is missing.
    pub fn sort(&self, default: SortField) -> Result<SortField, AppError> {
        let key = match self.sort_field.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => raw.parse::<SortKey>()?,
            None => default.key,
        };
        let direction = match self.sort_order.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => raw.parse::<SortDirection>()?,
            None => default.direction,
        };
        Ok(SortField::new(key, direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_parts() {
        let params = PaginationParams {
            sort_order: Some("desc".into()),
            ..Default::default()
        };
        let sort = params.sort(SortField::asc(SortKey::Name)).unwrap();
        assert_eq!(sort, SortField::desc(SortKey::Name));
        assert!(!params.is_paged());
        assert_eq!(params.page_request(10), PageRequest::new(1, 10));
    }

    #[test]
    fn test_legacy_boolean_order() {
        let params = PaginationParams {
            sort_field: Some("createdAt".into()),
            sort_order: Some("false".into()),
            ..Default::default()
        };
        let sort = params.sort(SortField::default()).unwrap();
        assert_eq!(sort, SortField::desc(SortKey::CreatedAt));
    }

    #[test]
    fn test_unknown_sort_field_is_rejected() {
        let params = PaginationParams {
            sort_field: Some("color".into()),
            ..Default::default()
        };
        assert!(params.sort(SortField::default()).is_err());
    }
}
