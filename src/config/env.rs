//! Environment variable access.

use std::collections::HashMap;

/// Source of environment-style variables.
///
/// Empty values are treated the same as unset ones by `var`.
pub trait VariableSource: Send + Sync {
    /// Raw lookup, empty values included.
    fn lookup(&self, key: &str) -> Option<String>;

    /// Lookup that treats an empty value as unset.
    fn var(&self, key: &str) -> Option<String> {
        self.lookup(key).filter(|value| !value.is_empty())
    }
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl VariableSource for ProcessEnv {
    fn lookup(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl VariableSource for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}
