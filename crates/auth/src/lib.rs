//! `tenantry-auth` — identity claims and the per-request user session.
//!
//! This crate is intentionally decoupled from HTTP and storage. Something
//! upstream authenticates the caller and hands over a [`ClaimsPrincipal`];
//! everything here only reads it.

pub mod claims;
pub mod convert;
pub mod roles;
pub mod session;

pub use claims::{Claim, ClaimTypes, ClaimsIdentity, ClaimsPrincipal};
pub use convert::{FromClaim, convert_or_default};
pub use roles::Role;
pub use session::UserSession;
