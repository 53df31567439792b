//! Basic authentication and caller identity.
//!
//! Admin and mitra routes sit behind [`require_basic_auth`], which checks the
//! `Authorization` header against an [`IdentityProvider`] and stores the
//! resulting [`Principal`] in the request extensions. Mitra and customer
//! handlers then resolve who they act for with the [`MitraContext`] and
//! [`CustomerContext`] extractors.

use std::fmt;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use common::{CustomerId, MitraId};

use crate::error::ApiError;

/// Header a mitra front end uses to say which mitra it acts for.
pub const MITRA_ID_HEADER: &str = "x-mitra-id";
/// Header identifying the customer on customer order routes.
pub const CUSTOMER_ID_HEADER: &str = "x-customer-id";

/// A user name and password pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    /// Compares without short-circuiting on the first differing byte.
    fn matches(&self, user: &str, password: &str) -> bool {
        constant_time_eq(self.user.as_bytes(), user.as_bytes())
            & constant_time_eq(self.password.as_bytes(), password.as_bytes())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user: String,
    /// The only mitra this caller may act for, if restricted.
    pub mitra_id: Option<MitraId>,
}

/// Checks Basic-Auth credentials.
pub trait IdentityProvider: Send + Sync {
    fn authenticate(&self, user: &str, password: &str) -> Option<Principal>;
}

/// A single configured account.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    credentials: Credentials,
    mitra_id: Option<MitraId>,
}

impl StaticCredentials {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            mitra_id: None,
        }
    }

    /// Restricts the account to one mitra.
    pub fn bound_to(mut self, mitra_id: Option<MitraId>) -> Self {
        self.mitra_id = mitra_id;
        self
    }
}

impl IdentityProvider for StaticCredentials {
    fn authenticate(&self, user: &str, password: &str) -> Option<Principal> {
        self.credentials.matches(user, password).then(|| Principal {
            user: user.to_string(),
            mitra_id: self.mitra_id,
        })
    }
}

/// Rejects requests without valid Basic-Auth credentials.
pub async fn require_basic_auth(
    State(provider): State<Arc<dyn IdentityProvider>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (user, password) = basic_credentials(req.headers()).ok_or(ApiError::Unauthorized)?;
    let principal = provider
        .authenticate(&user, &password)
        .ok_or(ApiError::Unauthorized)?;

    tracing::debug!(user = %principal.user, "Authenticated");
    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let (scheme, encoded) = headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .trim()
        .split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let encoded = encoded.trim();
    let decoded = String::from_utf8(STANDARD.decode(encoded).ok()?).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

/// The mitra a mitra route acts for.
///
/// Taken from the `x-mitra-id` header. A principal bound to a mitra may omit
/// the header but never name another mitra.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MitraContext(pub MitraId);

impl<S: Send + Sync> FromRequestParts<S> for MitraContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = parts
            .extensions
            .get::<Principal>()
            .ok_or(ApiError::Unauthorized)?;

        let requested = match header(&parts.headers, MITRA_ID_HEADER) {
            None => None,
            Some(raw) => Some(
                raw.parse::<i64>()
                    .map(MitraId::new)
                    .map_err(|_| ApiError::Unauthorized)?,
            ),
        };

        match (principal.mitra_id, requested) {
            (Some(bound), None) => Ok(Self(bound)),
            (Some(bound), Some(id)) if bound == id => Ok(Self(id)),
            (None, Some(id)) => Ok(Self(id)),
            _ => Err(ApiError::Unauthorized),
        }
    }
}

/// The customer a customer order route acts for, from `x-customer-id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerContext(pub CustomerId);

impl<S: Send + Sync> FromRequestParts<S> for CustomerContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        header(&parts.headers, CUSTOMER_ID_HEADER)
            .and_then(CustomerId::parse)
            .map(Self)
            .ok_or(ApiError::Unauthorized)
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
