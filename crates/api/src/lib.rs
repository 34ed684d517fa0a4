//! HTTP API: the authorization check endpoint and the credential middleware
//! route handlers use to reach the engine.

pub mod app;
pub mod authz;
pub mod context;
pub mod middleware;
