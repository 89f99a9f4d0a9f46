//! Admin API request handlers.

pub mod captures;
pub mod stubs;
pub mod system;
