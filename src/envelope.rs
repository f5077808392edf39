//! Success envelope shared by every JSON endpoint.
//!
//! The UI checks `status == "success"` before reading `data`, and list
//! endpoints attach `metadata` (aggregates) and `paging` alongside.

use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub status: &'static str,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paging: Option<Paging>,
}

impl<T: Serialize> Envelope<T> {
    #[must_use]
    pub fn success(data: T) -> Self {
        Self { status: "success", data, metadata: None, paging: None }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: impl Serialize) -> Self {
        self.metadata = serde_json::to_value(metadata).ok();
        self
    }

    #[must_use]
    pub fn with_paging(mut self, paging: Paging) -> Self {
        self.paging = Some(paging);
        self
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Page information for paginated lists. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    pub current_page: i64,
    pub total_pages: i64,
    pub page_size: i64,
    pub total_records: i64,
}

impl Paging {
    #[must_use]
    pub fn new(current_page: i64, page_size: i64, total_records: i64) -> Self {
        let page_size = page_size.max(1);
        let total_pages = (total_records + page_size - 1) / page_size;
        Self { current_page: current_page.max(1), total_pages, page_size, total_records }
    }

    /// Row offset for `current_page`. Saturates for pages far past the end.
    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.current_page - 1).saturating_mul(self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_shape() {
        let env = Envelope::success(serde_json::json!({"id": 1}));
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["data"]["id"], 1);
        assert!(value.get("metadata").is_none());
        assert!(value.get("paging").is_none());
    }

    #[test]
    fn paging_rounds_pages_up() {
        let paging = Paging::new(1, 5, 11);
        assert_eq!(paging.total_pages, 3);
        assert_eq!(paging.offset(), 0);
    }

    #[test]
    fn paging_clamps_page_and_size() {
        let paging = Paging::new(0, 0, 4);
        assert_eq!(paging.current_page, 1);
        assert_eq!(paging.page_size, 1);
        assert_eq!(paging.total_pages, 4);
    }

    #[test]
    fn paging_offset_for_later_page() {
        assert_eq!(Paging::new(3, 5, 40).offset(), 10);
    }

    #[test]
    fn paging_offset_saturates_on_huge_page() {
        assert_eq!(Paging::new(i64::MAX, 5, 0).offset(), i64::MAX);
        assert_eq!(Paging::new(i64::MAX / 2, 10, 0).offset(), i64::MAX);
        assert_eq!(Paging::new(i64::MAX, 1, 3).offset(), i64::MAX - 1);
    }

    #[test]
    fn paging_serializes_camel_case() {
        let value = serde_json::to_value(Paging::new(2, 5, 7)).unwrap();
        assert_eq!(value["currentPage"], 2);
        assert_eq!(value["totalPages"], 2);
        assert_eq!(value["totalRecords"], 7);
    }
}
