//! Vanilli: an HTTP test double.
//!
//! Register stubs (criteria paired with canned responses) over HTTP, then point the
//! system under test at the server. Every request is answered by the best-matching
//! stub; matches can be captured and expectations verified afterwards.

pub mod admin_api;
pub mod config;
pub mod logging;
pub mod stub;
pub mod template;

pub use admin_api::VanilliServer;
pub use stub::StubRegistry;
