//! Behaviour shared by every master record

use erp_common::EntityId;
use regex::Regex;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;
use std::sync::OnceLock;

use crate::error::{MasterError, Result};

const MAX_NAME_LEN: usize = 120;

/// A master record: coded, named, with a lifecycle status
pub trait Master: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Input for creation, validated by [`Master::create`]
    type Draft: Send;
    /// Partial update, validated by [`Master::apply`]
    type Patch: Send;
    type Status: Copy + Debug + PartialEq + Send + Sync;

    /// Human-readable kind used in errors and logs
    const KIND: &'static str;

    fn create(draft: Self::Draft) -> Result<Self>;
    fn apply(&mut self, patch: Self::Patch) -> Result<()>;

    fn id(&self) -> &EntityId;
    fn code(&self) -> &str;
    fn name(&self) -> &str;
    fn status(&self) -> Self::Status;
}

fn code_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z0-9][A-Z0-9_-]{1,31}$").expect("static regex"))
}

/// Codes are upper-cased and must be 2-32 of `A-Z 0-9 _ -`
pub(crate) fn normalize_code(field: &'static str, code: &str) -> Result<String> {
    let code = code.trim().to_uppercase();
    if code_regex().is_match(&code) {
        Ok(code)
    } else {
        Err(MasterError::invalid(field, format!("'{}' must be 2-32 letters, digits, '-' or '_'", code)))
    }
}

pub(crate) fn normalize_name(field: &'static str, name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(MasterError::invalid(field, "must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(MasterError::invalid(field, format!("must be at most {} characters", MAX_NAME_LEN)));
    }
    Ok(name.to_string())
}

/// Blank optional text becomes `None`
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_normalization() {
        assert_eq!(normalize_code("code", " cnc-01 ").unwrap(), "CNC-01");
        assert!(normalize_code("code", "x").is_err());
        assert!(normalize_code("code", "has space").is_err());
        assert!(normalize_code("code", "-LEAD").is_err());
    }

    #[test]
    fn test_name_bounds() {
        assert_eq!(normalize_name("name", "  Lathe ").unwrap(), "Lathe");
        assert!(normalize_name("name", "   ").is_err());
        assert!(normalize_name("name", &"a".repeat(121)).is_err());
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text(Some("  ".into())), None);
        assert_eq!(optional_text(Some(" Bay 3 ".into())), Some("Bay 3".into()));
    }
}
