use serde::Deserialize;
use utoipa::ToSchema;

use crate::errors::ServiceError;

pub const MAX_PAGE_SIZE: u64 = 100;

/// Mandatory pagination carried in request bodies. Both fields must be
/// present; `page_index` is 1-based.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct PaginationParams {
    pub page_index: Option<u64>,
    pub page_size: Option<u64>,
}

impl PaginationParams {
    pub fn require(self) -> Result<(u64, u64), ServiceError> {
        let (Some(page_index), Some(page_size)) = (self.page_index, self.page_size) else {
            return Err(ServiceError::MissingFields(
                "pageIndex and pageSize are required".to_string(),
            ));
        };
        if page_index < 1 {
            return Err(ServiceError::ValidationError(
                "pageIndex must be bigger than 0".to_string(),
            ));
        }
        if page_size < 1 || page_size > MAX_PAGE_SIZE {
            return Err(ServiceError::ValidationError(format!(
                "pageSize must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok((page_index, page_size))
    }
}

/// Pagination block echoed in list envelopes.
#[derive(Debug, Clone, serde::Serialize, ToSchema)]
pub struct PaginationMeta {
    pub page_index: u64,
    pub page_size: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl PaginationMeta {
    pub fn new(page_index: u64, page_size: u64, total: u64) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            (total + page_size - 1) / page_size
        };
        Self {
            page_index,
            page_size,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_paging_is_rejected() {
        let params = PaginationParams {
            page_index: Some(1),
            page_size: None,
        };
        let err = params.require().unwrap_err();
        assert_eq!(err.error_code(), "E0013");
    }

    #[test]
    fn zero_page_index_is_rejected() {
        let params = PaginationParams {
            page_index: Some(0),
            page_size: Some(10),
        };
        assert!(params.require().is_err());
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(PaginationMeta::new(1, 10, 0).total_pages, 0);
        assert_eq!(PaginationMeta::new(1, 10, 10).total_pages, 1);
        assert_eq!(PaginationMeta::new(1, 10, 11).total_pages, 2);
        assert_eq!(PaginationMeta::new(1, 3, 7).total_pages, 3);
    }
}
