use serde::Serialize;
use utoipa::ToSchema;

/// Pagination details; all fields are absent for single-item responses.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct Meta {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub total: Option<i64>,
}

impl Meta {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            total: Some(total),
        }
    }

    /// An unpaginated list of `total` items.
    pub fn single_page(total: usize) -> Self {
        let total = total as i64;
        Self::new(1, total, total)
    }

    pub fn empty() -> Self {
        Self {
            page: None,
            per_page: None,
            total: None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }

    /// Failure bodies share the envelope; `data` carries the details.
    pub fn failure(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta: Some(Meta::empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_page_meta_reports_every_item() {
        let meta = Meta::single_page(7);
        assert_eq!(meta.page, Some(1));
        assert_eq!(meta.per_page, Some(7));
        assert_eq!(meta.total, Some(7));
    }

    #[test]
    fn envelope_serializes_missing_meta_as_null() {
        let body = serde_json::to_value(ApiResponse::success("Ok", 1, None)).unwrap();
        assert_eq!(body["message"], "Ok");
        assert_eq!(body["data"], 1);
        assert!(body["meta"].is_null());
    }
}
