//! API client core, state store and screens for the users admin.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values as plain
//! data, runs them through a pluggable `Transport`, and keeps the resulting
//! user list in a `UserStore` that the list and form views render from.
//!
//! # Design
//! - `HttpClient` holds only configuration and a transport; it carries no
//!   state between calls and makes exactly one attempt per request.
//! - `UsersClient` exposes each CRUD operation both as `build_*` / `parse_*`
//!   pairs (host-does-IO) and as async methods over the transport.
//! - `UserStore` is an explicitly owned container; views get an `Arc` handle
//!   and subscribe to a `watch` channel for re-rendering.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod route;
pub mod store;
pub mod transport;
pub mod types;
pub mod view;

#[cfg(test)]
mod testing;

pub use client::UsersClient;
pub use error::{FormError, NetworkError, ValidationError};
pub use http::{HttpClient, HttpConfig, HttpMethod, HttpRequest, HttpResponse, Transport};
pub use route::{History, Navigator, Route};
pub use store::{RequestStatus, UserStore, UsersState};
pub use transport::ReqwestTransport;
pub use types::{NewUser, User, UserChanges, UserFields, UserId};
