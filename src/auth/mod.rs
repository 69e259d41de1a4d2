// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer tokens come from one of two issuers:
//!
//! 1. **Identity provider** (Auth0): RS256/ES256 tokens verified against the
//!    provider's published key set, with issuer and audience checks.
//! 2. **Demo login**: HS256 tokens this server signs with its demo secret,
//!    carrying `demo: true`.
//!
//! ## Auth Flow
//!
//! 1. The token header is decoded without verification and the algorithm
//!    decides the path (HMAC means demo, anything else means provider)
//! 2. The chosen path verifies the token; there is no fallback to the other
//! 3. The `sub` claim is resolved to a local user for handlers that need one
//!
//! ## Security
//!
//! - The key set is fetched once per process and cached
//! - The provider algorithm is pinned to the token header's `alg`
//! - Clock skew tolerance is 60 seconds

pub mod classifier;
pub mod claims;
pub mod demo;
pub mod error;
pub mod external;
pub mod extractor;
pub mod identity;
pub mod jwks;
pub mod verifier;

pub use classifier::{classify, TokenKind};
pub use claims::{Claims, DEMO_ISSUER};
pub use demo::{DemoTokenVerifier, IssuedToken};
pub use error::AuthError;
pub use external::ExternalTokenVerifier;
pub use extractor::{Auth, CurrentUser};
pub use jwks::KeySetCache;
pub use verifier::TokenVerifier;

/// Clock skew tolerance in seconds.
pub(crate) const CLOCK_SKEW_LEEWAY: u64 = 60;
