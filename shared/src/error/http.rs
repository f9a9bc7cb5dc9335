//! HTTP status code mapping for error kinds

use super::kind::ErrorKind;
use http::StatusCode;

impl ErrorKind {
    /// Get the appropriate HTTP status code for this error kind
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::InvalidInput => StatusCode::BAD_REQUEST,
            Self::InsufficientStock => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(ErrorKind::NotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorKind::Conflict.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorKind::InvalidInput.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorKind::InsufficientStock.http_status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ErrorKind::Internal.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
