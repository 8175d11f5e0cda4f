/*!
 * Tests for error types and conversions
 */

use briefgen::errors::{AppError, BriefError, ProviderError, ResponseError};

#[test]
fn test_providerError_fromStatus_shouldMapAuthAndRateLimit() {
    assert!(matches!(
        ProviderError::from_status(401, "bad key".to_string()),
        ProviderError::AuthenticationError(_)
    ));
    assert!(matches!(
        ProviderError::from_status(403, "forbidden".to_string()),
        ProviderError::AuthenticationError(_)
    ));
    assert!(matches!(
        ProviderError::from_status(429, "slow down".to_string()),
        ProviderError::RateLimitExceeded(_)
    ));
    assert!(matches!(
        ProviderError::from_status(500, "boom".to_string()),
        ProviderError::ApiError { status_code: 500, .. }
    ));
}

#[test]
fn test_providerError_display_shouldIncludeDetails() {
    let error = ProviderError::ApiError {
        status_code: 503,
        message: "overloaded".to_string(),
    };
    assert_eq!(error.to_string(), "API responded with error: 503 - overloaded");
}

#[test]
fn test_briefError_fromResponseError_shouldWrap() {
    let error: BriefError = ResponseError::IncompletePages { expected: 4, returned: 2 }.into();
    assert!(matches!(error, BriefError::Response(_)));
    assert_eq!(error.to_string(), "Response error: Response covers 2 of 4 pages");
}

#[test]
fn test_briefError_languageMismatch_shouldNameLanguage() {
    let error = BriefError::LanguageMismatch {
        expected: "Georgian".to_string(),
        pages: 3,
    };
    assert_eq!(error.to_string(), "All 3 pages were generated outside Georgian");
}

#[test]
fn test_appError_fromIoError_shouldBecomeFileError() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let error: AppError = io.into();
    assert!(matches!(error, AppError::File(_)));
    assert!(error.to_string().starts_with("File error:"));
}

#[test]
fn test_appError_fromProviderError_shouldKeepSource() {
    let error: AppError = ProviderError::ConnectionError("refused".to_string()).into();
    assert_eq!(error.to_string(), "Provider error: Connection error: refused");
}
