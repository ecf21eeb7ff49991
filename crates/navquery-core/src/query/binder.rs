//! Literal normalization and parameter binding.
//!
//! Literals never appear inline in a compiled predicate. Each one is
//! normalized to its declared type and bound under a fresh parameter name.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use navquery_proto::{EdmType, Value};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use tracing::debug;

use crate::config::CompilerConfig;
use crate::error::{Error, Result};
use crate::query::ir::Scalar;

/// Ordered parameter name to value map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterMap {
    entries: Vec<(String, Value)>,
    index: HashMap<String, usize>,
}

impl ParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Entries in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rebinding a name replaces its value and keeps its position.
    pub(crate) fn insert(&mut self, name: String, value: Value) {
        match self.index.get(&name) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, value));
            }
        }
    }
}

impl Serialize for ParameterMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Allocates parameter names and records bound values.
#[derive(Debug)]
pub struct ParameterBinder<'a> {
    config: &'a CompilerConfig,
    counter: usize,
    parameters: ParameterMap,
}

impl<'a> ParameterBinder<'a> {
    pub fn new(config: &'a CompilerConfig) -> Self {
        Self::with_parameters(config, ParameterMap::new())
    }

    /// Continue binding on top of parameters bound by an earlier pass.
    pub fn with_parameters(config: &'a CompilerConfig, parameters: ParameterMap) -> Self {
        Self {
            config,
            counter: 0,
            parameters,
        }
    }

    /// Normalize `value` to `declared` and bind it under a fresh name.
    pub fn bind(&mut self, value: Value, declared: EdmType) -> Result<Scalar> {
        let value = normalize(value, declared)?;
        Ok(self.bind_value(value))
    }

    /// Bind an already normalized value under a fresh name.
    pub fn bind_value(&mut self, value: Value) -> Scalar {
        let name = self.next_name();
        debug!(parameter = %name, value = %value, "bound parameter");
        self.parameters.insert(name.clone(), value);
        Scalar::parameter(name)
    }

    pub fn parameters(&self) -> &ParameterMap {
        &self.parameters
    }

    pub fn into_parameters(self) -> ParameterMap {
        self.parameters
    }

    fn next_name(&mut self) -> String {
        loop {
            let name = format!("{}{}", self.config.parameter_prefix, self.counter);
            self.counter += 1;
            if !self.config.reserved_parameters.contains(&name) && !self.parameters.contains(&name)
            {
                return name;
            }
        }
    }
}

/// Convert literal text to the value its declared type calls for.
///
/// Date-time text becomes a UTC timestamp, GUID and binary text is decoded.
/// Values that are already typed pass through unchanged.
pub fn normalize(value: Value, declared: EdmType) -> Result<Value> {
    let text = match value {
        Value::String(text) => text,
        other => return Ok(other),
    };
    match declared {
        EdmType::DateTime | EdmType::DateTimeOffset => parse_datetime(&text)
            .map(Value::DateTime)
            .ok_or(Error::InvalidLiteral { ty: declared, text }),
        EdmType::Guid => parse_guid(&text)
            .map(Value::Guid)
            .ok_or(Error::InvalidLiteral { ty: declared, text }),
        EdmType::Binary => match hex::decode(&text) {
            Ok(bytes) => Ok(Value::Bytes(bytes)),
            Err(_) => Err(Error::InvalidLiteral { ty: declared, text }),
        },
        _ => Ok(Value::String(text)),
    }
}

/// Parse RFC 3339 text, or naive `YYYY-MM-DDTHH:MM[:SS[.f]]` / `YYYY-MM-DD`
/// taken as UTC.
fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(text) {
        return Some(with_offset.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parse `8-4-4-4-12` hex text (or 32 bare hex digits) into 16 bytes.
fn parse_guid(text: &str) -> Option<[u8; 16]> {
    let dashed = text.len() == 36
        && text
            .char_indices()
            .all(|(i, c)| matches!(i, 8 | 13 | 18 | 23) == (c == '-'));
    let digits: String = if dashed {
        text.chars().filter(|&c| c != '-').collect()
    } else if text.len() == 32 {
        text.to_string()
    } else {
        return None;
    };
    hex::decode(digits).ok()?.try_into().ok()
}
