//! Admin REST API and request routing.
//!
//! One listener serves both the administration endpoints under `/_vanilli` and
//! every other request, which is answered by the stub registry:
//! - Registering and clearing stubs
//! - Verifying expectations
//! - Retrieving captured requests
//!
//! The server listens on a configurable port (default: 14000).

mod handlers;
mod router;
mod server;
pub(crate) mod types;

pub use router::route_request;
pub use server::VanilliServer;
