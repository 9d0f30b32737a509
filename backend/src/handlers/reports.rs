//! Report index listing

use axum::{body::Bytes, extract::State, response::IntoResponse, Json};
use serde::Serialize;
use shared::ReportIndexEntry;

use crate::error::{AppError, RES_CODE_OK};
use crate::services::{ReportIndexService, ReportListQuery, ReportPage};
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportListResponse {
    pub res_code: &'static str,
    pub res_message: &'static str,
    pub reports: Vec<ReportIndexEntry>,
    pub page: u32,
    pub limit: u32,
    pub total_records: u64,
    pub total_pages: u64,
}

impl From<ReportPage> for ReportListResponse {
    fn from(page: ReportPage) -> Self {
        ReportListResponse {
            res_code: RES_CODE_OK,
            res_message: "Berhasil mengambil data laporan",
            reports: page.reports,
            page: page.page,
            limit: page.limit,
            total_records: page.total_records,
            total_pages: page.total_pages,
        }
    }
}

/// Parse the listing filters. An empty body lists the first page.
pub fn parse_list_query(body: &[u8]) -> Result<ReportListQuery, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ReportListQuery::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::ValidationError(format!("Format permintaan tidak valid: {}", e)))
}

/// List indexed reports, newest date first
pub async fn list_reports(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let query = match parse_list_query(&body) {
        Ok(query) => query,
        Err(e) => return e.into_response(),
    };
    let service = ReportIndexService::new(state.db.clone());

    match service.list(&query).await {
        Ok(page) => Json(ReportListResponse::from(page)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_envelope_uses_legacy_names() {
        let body = serde_json::to_value(ReportListResponse::from(ReportPage {
            reports: vec![],
            page: 2,
            limit: 10,
            total_records: 11,
            total_pages: 2,
        }))
        .unwrap();

        assert_eq!(body["resCode"], "00");
        assert_eq!(body["totalRecords"], 11);
        assert_eq!(body["totalPages"], 2);
        assert!(body["reports"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_empty_body_lists_first_page() {
        for body in [&b""[..], &b"  \n"[..]] {
            let query = parse_list_query(body).unwrap();
            assert_eq!(query.pagination.index, 1);
            assert_eq!(query.pagination.limit, 10);
            assert!(query.file_name.is_none());
        }
    }

    #[test]
    fn test_body_accepts_numeric_text() {
        let query =
            parse_list_query(br#"{"index": "2", "limit": "5", "file_name": "2025-04"}"#).unwrap();
        assert_eq!(query.pagination.index, 2);
        assert_eq!(query.pagination.limit, 5);
        assert_eq!(query.file_name.as_deref(), Some("2025-04"));
    }

    #[test]
    fn test_malformed_body_is_client_error() {
        let err = parse_list_query(b"{index: 2").unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
