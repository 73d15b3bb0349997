//! Request and response bodies for the chatsheet backend.
//!
//! - `Credentials`, `LoginResponse`, `SignupResponse`, `User`: account auth
//! - `UnipileAccount`, link requests, `LinkOutcome`: LinkedIn linking

pub mod auth;
pub mod unipile;

pub use auth::{Credentials, LoginResponse, SignupResponse, User};
pub use unipile::{
    AccountsResponse, BasicLinkRequest, CheckpointRequest, CookieLinkRequest, LinkOutcome,
    LinkResponse, UnipileAccount,
};
