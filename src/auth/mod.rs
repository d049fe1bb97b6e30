//! Authentication module
//!
//! Login with Amazon OAuth2 refresh-token flow.
//!
//! The `Authenticator` stamps every API request with the client id and
//! profile scope headers plus a bearer token. Tokens come from a
//! [`TokenSource`]; the refresh-token source caches the access token and
//! refreshes it shortly before it expires.

mod authenticator;
mod types;

pub use authenticator::{Authenticator, RefreshTokenSource, StaticToken, TokenSource};
pub use types::{AuthConfig, CachedToken, CLIENT_ID_HEADER, SCOPE_HEADER};
