//! Stub registry and request matching.
//!
//! This module provides:
//! - `StubRegistry`: the shared, mutable set of stubs and captured requests
//! - `Stub`: a validated rule pairing criteria with a canned response
//! - `RequestView`: the transport-free request the registry matches against
//!
//! ## Module Structure
//!
//! - `criterion`: Literal-or-pattern criteria
//! - `types`: Definitions, registered stubs, captures and errors
//! - `validation`: Definition validation and normalization
//! - `predicates`: Per-attribute matching
//! - `registry`: StubRegistry with selection, verification and captures
//! - `handler`: HTTP handling for requests answered by stubs

mod criterion;
mod handler;
mod predicates;
mod registry;
mod types;
mod validation;


pub use criterion::{Criterion, CriterionDef};
pub use handler::{build_stub_response, handle_stub_request, no_match_response, request_view};
pub use predicates::{criteria_match, stub_matches};
pub use registry::StubRegistry;
pub use types::{
    media_type, CaptureSnapshot, Criteria, CriteriaDefinition, RegistryError, RequestView,
    ResponseDefinition, Stub, StubDefinition, StubResponse,
};
