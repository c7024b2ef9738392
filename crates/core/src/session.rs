//! UI session persistence
//!
//! A flat key-to-scalar map that a front end can dump and restore to
//! resume a working session. Deliberately outside the engine contract:
//! the engine takes explicit arguments and returns a value; this store
//! only shuttles screen state. Values are scalars only — nested
//! structures in a loaded document are skipped, not errors.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// One scalar session value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl From<bool> for ScalarValue {
    fn from(v: bool) -> Self {
        ScalarValue::Flag(v)
    }
}

impl From<f64> for ScalarValue {
    fn from(v: f64) -> Self {
        ScalarValue::Number(v)
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        ScalarValue::Text(v.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(v: String) -> Self {
        ScalarValue::Text(v)
    }
}

/// Flat session state, serializable to a JSON document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionState {
    values: BTreeMap<String, ScalarValue>,
}

impl SessionState {
    pub fn new() -> Self {
        SessionState::default()
    }

    /// Store a scalar under `key`, replacing any previous value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ScalarValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ScalarValue> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Serialize to a JSON document
    ///
    /// # Errors
    /// Returns [`SessionError::SerializeFailed`] if serialization fails.
    pub fn to_json(&self) -> Result<String, SessionError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SessionError::SerializeFailed(e.to_string()))
    }

    /// Parse a JSON document, keeping scalar entries only
    ///
    /// Nested objects and arrays are silently skipped so documents
    /// written by other tools still load.
    ///
    /// # Errors
    /// Returns [`SessionError::ParseFailed`] if the document is not a
    /// JSON object.
    pub fn from_json(raw: &str) -> Result<Self, SessionError> {
        let doc: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| SessionError::ParseFailed(e.to_string()))?;
        let serde_json::Value::Object(entries) = doc else {
            return Err(SessionError::ParseFailed(
                "session document must be a JSON object".to_string(),
            ));
        };

        let mut state = SessionState::new();
        for (key, value) in entries {
            match value {
                serde_json::Value::Bool(b) => state.set(key, b),
                serde_json::Value::Number(n) => {
                    if let Some(f) = n.as_f64() {
                        state.set(key, f);
                    }
                }
                serde_json::Value::String(s) => state.set(key, s),
                _ => {} // Nested structures are not session scalars
            }
        }
        Ok(state)
    }

    /// Load session state from a file
    ///
    /// # Errors
    /// Returns [`SessionError::LoadFailed`] if the file cannot be read,
    /// or [`SessionError::ParseFailed`] if its contents are invalid.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SessionError> {
        let contents =
            fs::read_to_string(path).map_err(|e| SessionError::LoadFailed(e.to_string()))?;
        Self::from_json(&contents)
    }

    /// Save session state to a file
    ///
    /// # Errors
    /// Returns [`SessionError::SaveFailed`] if the file cannot be written,
    /// or [`SessionError::SerializeFailed`] if serialization fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SessionError> {
        let contents = self.to_json()?;
        fs::write(path, contents).map_err(|e| SessionError::SaveFailed(e.to_string()))?;
        Ok(())
    }
}

/// Errors that can occur with session persistence
#[derive(Debug)]
pub enum SessionError {
    /// Failed to read the session file
    LoadFailed(String),
    /// Failed to parse the document contents
    ParseFailed(String),
    /// Failed to serialize session state
    SerializeFailed(String),
    /// Failed to write the session file
    SaveFailed(String),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::LoadFailed(msg) => write!(f, "Failed to load session: {msg}"),
            SessionError::ParseFailed(msg) => write!(f, "Failed to parse session: {msg}"),
            SessionError::SerializeFailed(msg) => {
                write!(f, "Failed to serialize session: {msg}")
            }
            SessionError::SaveFailed(msg) => write!(f, "Failed to save session: {msg}"),
        }
    }
}

impl std::error::Error for SessionError {}
