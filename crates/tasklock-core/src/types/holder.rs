//! Task-class and holder identifiers.
//!
//! A holder's identity in the shared store is the string `"{prefix}:{postfix}"`.
//! The prefix followed by `:*` is the task class namespace. Both shapes are
//! part of the public contract; external tooling may inspect keys by them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::result::AppResult;

/// Separator between prefix and postfix in a holder key.
pub const KEY_SEPARATOR: char = ':';

/// A named pool of work sharing one concurrency limit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskClass(String);

impl TaskClass {
    /// Create a task class, rejecting an empty prefix.
    pub fn new(prefix: impl Into<String>) -> AppResult<Self> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(AppError::validation("task class prefix must not be empty"));
        }
        Ok(Self(prefix))
    }

    /// The raw prefix.
    pub fn prefix(&self) -> &str {
        &self.0
    }

    /// Glob pattern matching every holder key in this class.
    ///
    /// Glob metacharacters inside the prefix are escaped so that a prefix
    /// such as `jobs[1]` only matches its own holders.
    pub fn namespace_pattern(&self) -> String {
        format!("{}{KEY_SEPARATOR}*", escape_glob(&self.0))
    }

    /// Store key of the holder index used by the counter strategy.
    ///
    /// Deliberately outside the `"{prefix}:*"` namespace so enumeration
    /// never counts it as a holder.
    pub fn index_key(&self) -> String {
        format!("{}#holders", self.0)
    }
}

impl TryFrom<String> for TaskClass {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaskClass> for String {
    fn from(value: TaskClass) -> Self {
        value.0
    }
}

impl fmt::Display for TaskClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One admitted (or to-be-admitted) unit of concurrent work.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HolderKey {
    class: TaskClass,
    postfix: String,
}

impl HolderKey {
    /// Create a holder identity, rejecting an empty postfix.
    pub fn new(class: TaskClass, postfix: impl Into<String>) -> AppResult<Self> {
        let postfix = postfix.into();
        if postfix.is_empty() {
            return Err(AppError::validation("holder postfix must not be empty"));
        }
        Ok(Self { class, postfix })
    }

    /// Parse from raw prefix and postfix strings.
    pub fn parse(prefix: &str, postfix: &str) -> AppResult<Self> {
        Self::new(TaskClass::new(prefix)?, postfix)
    }

    /// The task class this holder belongs to.
    pub fn class(&self) -> &TaskClass {
        &self.class
    }

    /// The unique postfix within the class.
    pub fn postfix(&self) -> &str {
        &self.postfix
    }

    /// The store key `"{prefix}:{postfix}"`.
    pub fn store_key(&self) -> String {
        format!("{}{KEY_SEPARATOR}{}", self.class.prefix(), self.postfix)
    }
}

impl fmt::Display for HolderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{KEY_SEPARATOR}{}", self.class.prefix(), self.postfix)
    }
}

/// Escape Redis glob metacharacters.
fn escape_glob(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
