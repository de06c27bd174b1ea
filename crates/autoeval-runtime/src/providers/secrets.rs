//! Secure credential handling for provider adapters.
//!
//! Every adapter resolves its credentials through [`ApiCredential`], which
//! guarantees:
//!
//! - **No accidental logging**: Debug/Display show `[REDACTED]`
//! - **Memory safety**: values are zeroed on drop via the `secrecy` crate
//! - **Explicit exposure**: the raw value is only reachable through
//!   `.expose()` at the point of use
//! - **Fail fast**: resolution happens at adapter construction, never at
//!   first call

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

use super::ProviderError;

/// Where a credential was loaded from.
///
/// Useful when debugging configuration issues without exposing the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Passed explicitly through `EvalConfig`.
    Config,
    /// Loaded from an environment variable.
    Environment,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Config => write!(f, "config"),
            CredentialSource::Environment => write!(f, "environment"),
        }
    }
}

/// A securely-stored API credential.
pub struct ApiCredential {
    value: SecretString,
    source: CredentialSource,
    name: &'static str,
}

impl ApiCredential {
    /// Wrap a raw value. The value cannot be logged after this point.
    pub fn new(value: impl Into<String>, source: CredentialSource, name: &'static str) -> Self {
        Self {
            value: SecretString::from(value.into()),
            source,
            name,
        }
    }

    /// Resolve from an explicit config value, falling back to an
    /// environment variable. Absence of both fails fast.
    pub fn resolve(
        configured: Option<&str>,
        env_var: &str,
        name: &'static str,
    ) -> Result<Self, ProviderError> {
        if let Some(value) = configured {
            return Ok(Self::new(value, CredentialSource::Config, name));
        }

        if let Ok(value) = std::env::var(env_var) {
            return Ok(Self::new(value, CredentialSource::Environment, name));
        }

        Err(ProviderError::auth_missing(
            name,
            format!("set it in the config or via the {env_var} environment variable"),
        ))
    }

    /// Like [`resolve`](Self::resolve) but absence yields `None` instead
    /// of an error, for credentials that are genuinely optional.
    pub fn resolve_optional(
        configured: Option<&str>,
        env_var: &str,
        name: &'static str,
    ) -> Option<Self> {
        Self::resolve(configured, env_var, name).ok()
    }

    /// Expose the value for use in an API call.
    ///
    /// Only call this at the point where the credential is actually
    /// needed (an HTTP header, an SDK constructor). Never store the
    /// exposed value.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    /// Whether the stored value is empty.
    pub fn is_empty(&self) -> bool {
        self.value.expose_secret().is_empty()
    }

    /// Where this credential came from.
    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("value", &"[REDACTED]")
            .field("source", &self.source)
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {} [REDACTED]", self.name, self.source)
    }
}
