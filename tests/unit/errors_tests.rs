/*!
 * Tests for error types and conversions
 */

use sqlwai::errors::{AppError, NoQueryReason, ProviderError, TranslationError};

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 500,
        message: "model crashed".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("500"));
    assert!(display.contains("model crashed"));
}

#[test]
fn test_providerError_isTransient_shouldClassifyByKind() {
    assert!(ProviderError::ConnectionError("refused".into()).is_transient());
    assert!(ProviderError::RequestFailed("timeout".into()).is_transient());
    assert!(ProviderError::RateLimitExceeded("slow down".into()).is_transient());
    assert!(ProviderError::ApiError { status_code: 503, message: String::new() }.is_transient());
    assert!(ProviderError::ApiError { status_code: 408, message: String::new() }.is_transient());

    assert!(!ProviderError::AuthenticationError("bad key".into()).is_transient());
    assert!(!ProviderError::InvalidConfiguration("no url".into()).is_transient());
    assert!(!ProviderError::ApiError { status_code: 400, message: String::new() }.is_transient());
    assert!(!ProviderError::ApiError { status_code: 404, message: String::new() }.is_transient());
}

#[test]
fn test_providerError_fromStatus_shouldMapKnownCodes() {
    assert!(matches!(ProviderError::from_status(401, "x"), ProviderError::AuthenticationError(_)));
    assert!(matches!(ProviderError::from_status(403, "x"), ProviderError::AuthenticationError(_)));
    assert!(matches!(ProviderError::from_status(429, "x"), ProviderError::RateLimitExceeded(_)));
    assert_eq!(
        ProviderError::from_status(502, "bad gateway"),
        ProviderError::ApiError { status_code: 502, message: "bad gateway".to_string() }
    );
}

#[test]
fn test_translationError_fromProviderError_shouldFollowClassification() {
    let transient: TranslationError = ProviderError::ConnectionError("down".into()).into();
    assert!(matches!(transient, TranslationError::BackendTransient(_)));
    assert!(transient.is_transient());

    let permanent: TranslationError = ProviderError::AuthenticationError("bad key".into()).into();
    assert!(matches!(permanent, TranslationError::BackendPermanent(_)));
    assert!(!permanent.is_transient());
}

#[test]
fn test_translationError_terminalKinds_shouldNotBeTransient() {
    let terminal = [
        TranslationError::SchemaParse("bad".into()),
        TranslationError::NoSchemaConfigured,
        TranslationError::NotASelectStatement,
        TranslationError::NoQueryFound(NoQueryReason::MissingFence),
        TranslationError::NoQueryFound(NoQueryReason::EmptyFence),
        TranslationError::NoQueryFound(NoQueryReason::Refused),
        TranslationError::MaxRetriesExceeded { attempts: 3, last_error: "down".into() },
    ];
    for error in terminal {
        assert!(!error.is_transient(), "{:?} should be terminal", error);
    }
}

#[test]
fn test_translationError_isRefusal_shouldOnlyMatchRefusedReason() {
    assert!(TranslationError::NoQueryFound(NoQueryReason::Refused).is_refusal());
    assert!(!TranslationError::NoQueryFound(NoQueryReason::MissingFence).is_refusal());
    assert!(!TranslationError::NotASelectStatement.is_refusal());
}

#[test]
fn test_translationError_maxRetries_shouldDisplayAttemptsAndCause() {
    let error = TranslationError::MaxRetriesExceeded { attempts: 3, last_error: "Connection error: refused".into() };
    let display = error.to_string();
    assert!(display.contains("3 attempts"));
    assert!(display.contains("refused"));
}

#[test]
fn test_appError_conversions_shouldWrapSources() {
    let app: AppError = ProviderError::AuthenticationError("bad key".into()).into();
    assert!(matches!(app, AppError::Provider(_)));

    let app: AppError = TranslationError::NoSchemaConfigured.into();
    assert!(app.to_string().contains("No database schema"));

    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let app: AppError = io.into();
    assert!(matches!(app, AppError::File(_)));
}
