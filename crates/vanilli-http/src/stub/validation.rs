//! Stub definition validation.
//!
//! Turns a [`StubDefinition`] into a registered [`Stub`] or explains why it can't be
//! registered. Everything that could fail at match time (patterns, header names,
//! status codes) is checked here so matching itself is infallible.

use super::criterion::{Criterion, CriterionDef};
use super::types::{
    Criteria, CriteriaDefinition, RegistryError, ResponseDefinition, Stub, StubDefinition,
    StubResponse,
};
use hyper::header::{HeaderName, HeaderValue};
use hyper::StatusCode;
use std::collections::HashMap;

/// Validate a definition and build the stub it describes.
pub(crate) fn validate_stub(definition: StubDefinition, id: String) -> Result<Stub, RegistryError> {
    let criteria = definition
        .criteria
        .ok_or_else(|| RegistryError::validation("criteria is required"))?;
    let response = definition
        .response
        .ok_or_else(|| RegistryError::validation("response is required"))?;

    if definition.times == Some(0) {
        return Err(RegistryError::validation(
            "times must be a positive integer when present",
        ));
    }

    Ok(Stub {
        id,
        criteria: validate_criteria(criteria)?,
        response: validate_response(response)?,
        priority: definition.priority,
        times: definition.times,
        matched: 0,
        is_expectation: definition.expect,
        capture_id: definition.capture_id,
    })
}

fn validate_criteria(criteria: CriteriaDefinition) -> Result<Criteria, RegistryError> {
    let url = criteria
        .url
        .ok_or_else(|| RegistryError::validation("criteria.url is required"))?;

    if criteria.body.is_some() && criteria.content_type.is_none() {
        return Err(RegistryError::validation(
            "criteria.contentType is required when criteria.body is set",
        ));
    }

    let url = normalize_url(&url)?;

    let query = criteria
        .query
        .iter()
        .map(|(name, def)| {
            let decoded = decode_criterion(def, &format!("criteria.query.{name}"))?;
            Ok((name.clone(), compile(&decoded, &format!("criteria.query.{name}"))?))
        })
        .collect::<Result<HashMap<_, _>, RegistryError>>()?;

    let headers = criteria
        .headers
        .iter()
        .map(|(name, def)| {
            let compiled = compile(def, &format!("criteria.headers.{name}"))?;
            Ok((name.to_ascii_lowercase(), compiled))
        })
        .collect::<Result<HashMap<_, _>, RegistryError>>()?;

    Ok(Criteria {
        url: compile(&url, "criteria.url")?,
        method: criteria.method,
        headers,
        query,
        body: criteria.body,
        content_type: criteria.content_type,
    })
}

fn validate_response(response: ResponseDefinition) -> Result<StubResponse, RegistryError> {
    let status = response
        .status
        .ok_or_else(|| RegistryError::validation("response.status is required"))?;
    if StatusCode::from_u16(status).is_err() {
        return Err(RegistryError::validation(format!(
            "response.status {status} is not a valid HTTP status"
        )));
    }

    if response.body.is_some() && response.content_type.is_none() {
        return Err(RegistryError::validation(
            "response.contentType is required when response.body is set",
        ));
    }

    if let Some(ref content_type) = response.content_type {
        if HeaderValue::from_str(content_type).is_err() {
            return Err(RegistryError::validation(format!(
                "response.contentType '{content_type}' is not a valid header value"
            )));
        }
    }

    for (name, value) in &response.headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            return Err(RegistryError::validation(format!(
                "response.headers: '{name}' is not a valid header name"
            )));
        }
        if HeaderValue::from_str(value).is_err() {
            return Err(RegistryError::validation(format!(
                "response.headers.{name}: '{value}' is not a valid header value"
            )));
        }
    }

    Ok(StubResponse {
        status,
        body: response.body,
        content_type: response.content_type,
        headers: response.headers,
        wait: response.wait,
    })
}

/// Decode the url criterion and make sure literal paths start with `/`.
fn normalize_url(url: &CriterionDef) -> Result<CriterionDef, RegistryError> {
    let decoded = decode_criterion(url, "criteria.url")?;
    match decoded {
        CriterionDef::Literal(path) if !path.starts_with('/') => {
            Ok(CriterionDef::Literal(format!("/{path}")))
        }
        other => Ok(other),
    }
}

fn decode_criterion(def: &CriterionDef, field: &str) -> Result<CriterionDef, RegistryError> {
    let decoded = urlencoding::decode(def.payload()).map_err(|e| {
        RegistryError::validation(format!("{field} is not valid percent-encoding: {e}"))
    })?;
    Ok(def.with_payload(decoded.into_owned()))
}

fn compile(def: &CriterionDef, field: &str) -> Result<Criterion, RegistryError> {
    Criterion::compile(def)
        .map_err(|e| RegistryError::validation(format!("{field} has an invalid pattern: {e}")))
}
