// handlers/protected/mod.rs - Handlers behind the JWT middleware
//
// Every handler here receives the caller as `Extension<AuthUser>`.
pub mod admin;
pub mod auth;
pub mod cards;
pub mod collections;
