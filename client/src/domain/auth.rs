//! Authentication primitives: login credentials and bearer tokens.
//!
//! Keep raw form parsing outside the services by exposing constructors that
//! validate string inputs before anything talks to the gateway port.

use std::fmt;

use zeroize::Zeroizing;

use super::EmailAddress;

/// Error returned when login or token values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or malformed.
    InvalidEmail,
    /// Password was blank.
    EmptyPassword,
    /// Token was blank once trimmed.
    EmptyToken,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "email must look like name@example.com"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::EmptyToken => write!(f, "access token must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` is trimmed and has the `local@domain` shape.
/// - `password` is non-empty but keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use bloodbank_client::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ali@example.com ", "pw").unwrap();
/// assert_eq!(creds.email().as_ref(), "ali@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    ///
    /// # Errors
    ///
    /// Returns [`LoginValidationError`] for malformed emails or empty
    /// passwords.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = EmailAddress::new(email).map_err(|_| LoginValidationError::InvalidEmail)?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Login email.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password string provided by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Opaque bearer token issued by the backend at login.
///
/// The value is wiped on drop and never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(Zeroizing<String>);

impl AccessToken {
    /// Wrap a token string.
    ///
    /// # Errors
    ///
    /// Returns [`LoginValidationError::EmptyToken`] for blank input.
    pub fn new(raw: impl Into<String>) -> Result<Self, LoginValidationError> {
        let raw = Zeroizing::new(raw.into());
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LoginValidationError::EmptyToken);
        }
        Ok(Self(Zeroizing::new(trimmed.to_owned())))
    }

    /// Reveal the token for the `Authorization` header or persistence.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}
