//! Session token and login credentials
//!
//! The token is a secret: formatting it never prints more than its last four
//! characters, so it is safe to pass to `tracing` fields.

use std::fmt;

/// Number of trailing characters shown when a token is formatted
const VISIBLE_SUFFIX: usize = 4;

/// Opaque session token sent as the `Authorization` header
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Wrap a raw token
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Expose the raw token for the wire
    ///
    /// Only the HTTP layer and the identify frame should call this.
    #[inline]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Check if the token is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn redacted(&self) -> String {
        let count = self.0.chars().count();
        if count <= VISIBLE_SUFFIX {
            return "****".to_string();
        }
        let suffix: String = self.0.chars().skip(count - VISIBLE_SUFFIX).collect();
        format!("****{suffix}")
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Token").field(&self.redacted()).finish()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl From<String> for Token {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for Token {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// How the client authenticates
#[derive(Clone)]
pub enum Credentials {
    /// A token obtained earlier
    Token(Token),
    /// Exchanged for a token through the login endpoint
    EmailPassword { email: String, password: String },
}

impl Credentials {
    /// Credentials from a token
    pub fn token(token: impl Into<Token>) -> Self {
        Self::Token(token.into())
    }

    /// Credentials from an email and password pair
    pub fn email_password(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self::EmailPassword {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(token) => f.debug_tuple("Token").field(token).finish(),
            Self::EmailPassword { email, .. } => f
                .debug_struct("EmailPassword")
                .field("email", email)
                .field("password", &"****")
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_redaction() {
        let token = Token::new("abcdefgh.secret.1234");
        assert_eq!(token.to_string(), "****1234");
        assert_eq!(format!("{token:?}"), "Token(\"****1234\")");
        assert_eq!(token.expose(), "abcdefgh.secret.1234");
    }

    #[test]
    fn test_short_token_fully_hidden() {
        assert_eq!(Token::new("abc").to_string(), "****");
        assert_eq!(Token::new("abcd").to_string(), "****");
    }

    #[test]
    fn test_credentials_debug_hides_secrets() {
        let creds = Credentials::email_password("a@b.c", "hunter2");
        let debug = format!("{creds:?}");
        assert!(debug.contains("a@b.c"));
        assert!(!debug.contains("hunter2"));

        let creds = Credentials::token("tok.en.value9876");
        assert!(!format!("{creds:?}").contains("tok.en"));
    }
}
