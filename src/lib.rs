#![doc = "The `taskhub` library crate."]
#![doc = ""]
#![doc = "Multi-tenant task/project management API. The interesting part lives in"]
#![doc = "`auth`: stateless signed access tokens, rotated refresh tokens stored as"]
#![doc = "digests, an access-token blacklist for early revocation, and the middleware"]
#![doc = "gate that ties them together. `models` and `routes` are the CRUD surface."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
