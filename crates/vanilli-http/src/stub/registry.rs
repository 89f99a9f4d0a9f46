//! StubRegistry - the mutable set of stubs and captured requests.
//!
//! All state lives behind a single mutex. `find_match_for` filters candidates, picks
//! the winner, bumps its counter and records the capture inside one critical section,
//! so concurrent requests can never both spend the last use of a `times`-limited stub.

use super::predicates::stub_matches;
use super::types::{CaptureSnapshot, RegistryError, RequestView, Stub, StubDefinition};
use super::validation::validate_stub;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct RegistryState {
    /// Registered stubs in insertion order
    stubs: Vec<Stub>,
    /// Captured requests by capture id, oldest first
    captures: HashMap<String, Vec<CaptureSnapshot>>,
}

/// In-memory stub registry shared by every request handled by one server.
#[derive(Debug, Default)]
pub struct StubRegistry {
    state: Mutex<RegistryState>,
}

impl StubRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a single stub.
    pub fn add_stub(&self, definition: StubDefinition) -> Result<Stub, RegistryError> {
        let stub = validate_stub(definition, new_stub_id()).inspect_err(|e| {
            warn!("Rejected stub: {}", e);
        })?;

        self.state.lock().stubs.push(stub.clone());
        debug!(stub_id = %stub.id, url = %stub.criteria.url, "Registered stub");
        Ok(stub)
    }

    /// Validate every definition, then register all of them or none.
    pub fn add_stubs(&self, definitions: Vec<StubDefinition>) -> Result<Vec<Stub>, RegistryError> {
        let stubs = definitions
            .into_iter()
            .enumerate()
            .map(|(index, definition)| {
                validate_stub(definition, new_stub_id()).map_err(|e| match e {
                    RegistryError::Validation(message) => {
                        RegistryError::Validation(format!("stubs[{index}]: {message}"))
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|e| warn!("Rejected stubs: {}", e))?;

        self.state.lock().stubs.extend(stubs.iter().cloned());
        debug!(count = stubs.len(), "Registered stubs");
        Ok(stubs)
    }

    /// Remove every stub and every capture.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.stubs.clear();
        state.captures.clear();
        info!("Cleared all stubs and captures");
    }

    /// Look up a stub by id
    pub fn get_by_id(&self, id: &str) -> Option<Stub> {
        self.state
            .lock()
            .stubs
            .iter()
            .find(|stub| stub.id == id)
            .cloned()
    }

    /// Find the stub that should answer the request and record the match.
    ///
    /// Among the candidates the lowest priority wins; on a tie the most recently
    /// registered stub wins. Only the winner's counter is incremented and only the
    /// winner records a capture. Returns a copy of the winner as it is after the match.
    pub fn find_match_for(&self, request: &RequestView) -> Option<Stub> {
        let mut state = self.state.lock();

        let Some(index) = select_winner(&state.stubs, request) else {
            debug!(method = %request.method, path = %request.path, "No stub matched");
            return None;
        };

        let stub = &mut state.stubs[index];
        stub.matched += 1;
        let winner = stub.clone();

        if let Some(ref capture_id) = winner.capture_id {
            state
                .captures
                .entry(capture_id.clone())
                .or_default()
                .push(CaptureSnapshot::from_request(request));
        }

        debug!(
            method = %request.method,
            path = %request.path,
            stub_id = %winner.id,
            matched = winner.matched,
            "Stub matched"
        );
        Some(winner)
    }

    /// Describe every expectation whose call count is off. Empty means all satisfied.
    pub fn verify_expectations(&self) -> Vec<String> {
        self.state
            .lock()
            .stubs
            .iter()
            .filter(|stub| stub.is_expectation && stub.matched != stub.expected_calls())
            .map(describe_mismatch)
            .collect()
    }

    /// All captures recorded under an id, oldest first
    pub fn get_captures(&self, capture_id: &str) -> Option<Vec<CaptureSnapshot>> {
        self.state.lock().captures.get(capture_id).cloned()
    }

    /// The most recent capture recorded under an id
    pub fn get_capture(&self, capture_id: &str) -> Option<CaptureSnapshot> {
        self.state
            .lock()
            .captures
            .get(capture_id)
            .and_then(|captures| captures.last().cloned())
    }

    /// Snapshot of every registered stub in insertion order
    pub fn stubs(&self) -> Vec<Stub> {
        self.state.lock().stubs.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().stubs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().stubs.is_empty()
    }
}

fn new_stub_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Walk candidates from newest to oldest, replacing the best only on a strictly
/// lower priority, so the newest stub wins ties.
fn select_winner(stubs: &[Stub], request: &RequestView) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, stub) in stubs.iter().enumerate().rev() {
        if !stub_matches(stub, request) {
            continue;
        }
        match best {
            Some(current) if stubs[current].priority <= stub.priority => {}
            _ => best = Some(index),
        }
    }
    best
}

fn describe_mismatch(stub: &Stub) -> String {
    let criteria = serde_json::to_string(&stub.criteria)
        .unwrap_or_else(|_| stub.criteria.url.to_string());
    format!(
        "Expected stub {} with criteria {} to be called {} time(s) but it was called {} time(s)",
        stub.id,
        criteria,
        stub.expected_calls(),
        stub.matched
    )
}
