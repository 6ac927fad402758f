//! Shared response envelope for API handlers.
//!
//! Every successful response is
//! `{ "status": "SUCCESS", "message": ..., "data": ..., "pagination"?: ... }`.
//! Errors use the same shape with `status: "ERROR"` (see [`crate::error`]).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cadre_core::pagination::Page;
use serde::Serialize;

/// Pagination block attached to list responses.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

/// The `SUCCESS` envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    pub message: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationMeta>,
    #[serde(skip)]
    status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK with `data`.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "SUCCESS",
            message: message.into(),
            data,
            pagination: None,
            status_code: StatusCode::OK,
        }
    }

    /// 201 Created with `data`.
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self {
            status_code: StatusCode::CREATED,
            ..Self::ok(message, data)
        }
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// 200 OK carrying one page of items plus its pagination block.
    pub fn page(message: impl Into<String>, page: Page<T>) -> Self {
        let pagination = PaginationMeta {
            total: page.total,
            page: page.page,
            limit: page.limit,
            total_pages: page.total_pages,
        };
        Self {
            pagination: Some(pagination),
            ..Self::ok(message, page.items)
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code;
        (status, Json(self)).into_response()
    }
}
