//! Session identity for the gateway.
//!
//! This crate provides:
//! - `User`/`Role`: the identity carried by every session, plus the demo identity
//! - `TokenCodec`: HS256 session tokens with a fixed lifetime
//! - Cookie helpers that attach, clear and read the `token` session cookie

pub mod cookie;
pub mod error;
pub mod token;
pub mod user;

pub use {
    cookie::{
        SESSION_COOKIE, attach_session, clear_session, clear_session_cookie, session_cookie,
        session_token,
    },
    error::{Error, Result},
    token::{SESSION_TTL_HOURS, TokenCodec},
    user::{DEMO_USER_ID, Role, User},
};
