use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Page metadata returned alongside paginated listings.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub pages: i64,
    pub total: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let limit = limit.max(1);
        Self {
            page,
            pages: (total + limit - 1) / limit,
            total,
        }
    }
}

/// The `{"success": true, ...}` envelope every successful response uses.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: None,
        })
    }

    pub fn created(data: T) -> Response
    where
        T: 'static,
    {
        (StatusCode::CREATED, Self::data(data)).into_response()
    }

    pub fn paginated(data: T, pagination: Pagination) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: Some(pagination),
        })
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data: None,
            message: Some(message.into()),
            pagination: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_round_up() {
        assert_eq!(Pagination::new(2, 10, 25).pages, 3);
        assert_eq!(Pagination::new(1, 10, 30).pages, 3);
        assert_eq!(Pagination::new(1, 10, 0).pages, 0);
        assert_eq!(Pagination::new(1, 10, 1).pages, 1);
    }

    #[test]
    fn envelope_skips_absent_fields() {
        let json = serde_json::to_string(&ApiResponse::data(vec![1, 2]).0).unwrap();
        assert_eq!(json, r#"{"success":true,"data":[1,2]}"#);

        let json = serde_json::to_string(&ApiResponse::message("Deleted").0).unwrap();
        assert_eq!(json, r#"{"success":true,"message":"Deleted"}"#);
    }

    #[test]
    fn paginated_envelope_includes_pagination() {
        let json = serde_json::to_string(
            &ApiResponse::paginated(vec![0; 2], Pagination::new(2, 10, 25)).0,
        )
        .unwrap();
        assert!(json.contains(r#""pagination":{"page":2,"pages":3,"total":25}"#));
    }
}
