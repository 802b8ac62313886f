//! Standardized error types following the `error-restjpg-<domain>-<number>` format.

use http::StatusCode;
use thiserror::Error;

/// Configuration errors that occur during application startup
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Error when a required environment variable is not set
    #[error("error-restjpg-config-1 {0} must be set")]
    EnvVarRequired(String),

    /// Error when PORT cannot be parsed
    #[error("error-restjpg-config-2 Parsing PORT into u16 failed: {0:?}")]
    PortParsingFailed(std::num::ParseIntError),

    /// Error when version information is not available
    #[error("error-restjpg-config-3 One of GIT_HASH or CARGO_PKG_VERSION must be set")]
    VersionNotSet,

    /// Error when a size string cannot be parsed
    #[error("error-restjpg-config-4 Failed to parse size '{0}'")]
    SizeParsingFailed(String),

    /// Error when the external base is not an absolute URL
    #[error("error-restjpg-config-5 Invalid EXTERNAL_BASE '{0}': {1}")]
    InvalidExternalBase(String, String),
}

/// HTTP server errors
#[derive(Debug, Error)]
pub enum HttpError {
    /// Error when template rendering fails
    #[error("error-restjpg-http-1 Template rendering failed: {0}")]
    TemplateRenderingFailed(String),
}

/// Authentication and authorization errors.
///
/// The message of each variant is what callers see in the error view, so the
/// `Display` output stays human readable; the stable code is exposed through
/// [`AuthError::code`].
#[derive(Debug, Error)]
pub enum AuthError {
    /// No Authorization header, or a blank one
    #[error("Invalid or missing credentials.")]
    MissingCredentials,

    /// Authorization header without a `scheme payload` shape
    #[error("Malformed authorization header.")]
    MalformedHeader,

    /// Authorization scheme other than Basic or Bearer
    #[error("Invalid authorization type.")]
    UnsupportedScheme(String),

    /// Basic payload that is not base64 of `id:password`
    #[error("Malformed credentials.")]
    MalformedCredentials,

    /// Basic credentials that match no user or client
    #[error("Invalid credentials.")]
    InvalidCredentials,

    /// Bearer token that is not known
    #[error("Invalid token.")]
    InvalidToken,

    /// Credential kind not admitted by the endpoint
    #[error("Invalid credential type for this endpoint.")]
    WrongCredentialType,

    /// Bearer token without the scope the endpoint requires
    #[error("Insufficient token scope for this endpoint.")]
    InsufficientScope,

    /// Requested scope string outside of the scope vocabulary
    #[error("Invalid scopes.")]
    InvalidScopes,

    /// Acting principal does not own the target resource
    #[error("Cannot act on a resource owned by someone else.")]
    OwnershipViolation,

    /// Credential store failure while resolving an identity
    #[error("error-restjpg-auth-11 Storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Stable error code for logs
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "error-restjpg-auth-1",
            AuthError::MalformedHeader => "error-restjpg-auth-2",
            AuthError::UnsupportedScheme(_) => "error-restjpg-auth-3",
            AuthError::MalformedCredentials => "error-restjpg-auth-4",
            AuthError::InvalidCredentials => "error-restjpg-auth-5",
            AuthError::InvalidToken => "error-restjpg-auth-6",
            AuthError::WrongCredentialType => "error-restjpg-auth-7",
            AuthError::InsufficientScope => "error-restjpg-auth-8",
            AuthError::InvalidScopes => "error-restjpg-auth-9",
            AuthError::OwnershipViolation => "error-restjpg-auth-10",
            AuthError::Storage(_) => "error-restjpg-auth-11",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials
            | AuthError::InvalidCredentials
            | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::MalformedHeader
            | AuthError::UnsupportedScheme(_)
            | AuthError::MalformedCredentials
            | AuthError::InvalidScopes => StatusCode::BAD_REQUEST,
            AuthError::WrongCredentialType
            | AuthError::InsufficientScope
            | AuthError::OwnershipViolation => StatusCode::FORBIDDEN,
            AuthError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// User and client registration errors
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Missing required request parameter: {0}.")]
    MissingParameter(&'static str),

    #[error("Invalid user ID.")]
    InvalidUserId,

    #[error("Invalid name.")]
    InvalidUserName,

    #[error("Invalid redirect URI: {0}")]
    InvalidRedirectUri(String),

    /// Registration id already taken
    #[error("User ID already registered.")]
    Conflict,

    #[error("error-restjpg-registration-6 Storage failure: {0}")]
    Storage(StorageError),
}

impl RegistrationError {
    pub fn status(&self) -> StatusCode {
        match self {
            RegistrationError::MissingParameter(_)
            | RegistrationError::InvalidUserId
            | RegistrationError::InvalidUserName
            | RegistrationError::InvalidRedirectUri(_) => StatusCode::BAD_REQUEST,
            RegistrationError::Conflict => StatusCode::FORBIDDEN,
            RegistrationError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StorageError> for RegistrationError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::Conflict(_) => RegistrationError::Conflict,
            other => RegistrationError::Storage(other),
        }
    }
}

/// Image upload and file storage errors
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Unsupported file type, only JPEG allowed.")]
    UnsupportedFileType,

    #[error("error-restjpg-image-2 File operation failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Database/storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Error when database connection fails
    #[error("error-restjpg-storage-1 Database connection failed: {0}")]
    ConnectionFailed(String),

    /// Error when query execution fails
    #[error("error-restjpg-storage-2 Query execution failed: {0}")]
    QueryFailed(String),

    /// Error when database operation fails
    #[error("error-restjpg-storage-3 Database error: {0}")]
    DatabaseError(String),

    /// Error when data validation fails
    #[error("error-restjpg-storage-4 Invalid data: {0}")]
    InvalidData(String),

    /// Error when a uniqueness constraint rejects a write
    #[error("error-restjpg-storage-5 Conflict: {0}")]
    Conflict(String),
}

#[cfg(any(feature = "sqlite", feature = "postgres"))]
impl From<sqlx::Error> for StorageError {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StorageError::Conflict(db.message().to_string())
            }
            other => StorageError::DatabaseError(other.to_string()),
        }
    }
}
