//! Task configuration bundle.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use Result;

/// Key/value task parameters plus named input files.
///
/// This is the configuration interface every component reads once during
/// setup. How a context is populated is up to the surrounding application;
/// the `tpar-utils` crate lowers its TOML configuration into one.
#[derive(Clone, Debug, Default)]
pub struct TaskContext {
    params: HashMap<String, String>,
    inputs: HashMap<String, PathBuf>,
}

impl TaskContext {
    pub fn new() -> Self {
        TaskContext::default()
    }

    pub fn set_param<K, V>(&mut self, name: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.params.insert(name.into(), value.into());
    }

    pub fn set_input<K, P>(&mut self, name: K, path: P)
    where
        K: Into<String>,
        P: Into<PathBuf>,
    {
        self.inputs.insert(name.into(), path.into());
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Get a parameter, falling back to a default when it is absent.
    pub fn param_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.param(name).unwrap_or(default)
    }

    pub fn usize_param(&self, name: &str) -> Result<Option<usize>> {
        match self.param(name) {
            Some(value) => {
                let value = value
                    .parse()
                    .map_err(|_| format_err!("parameter {} is not a number: {}", name, value))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub fn bool_param(&self, name: &str) -> Result<Option<bool>> {
        match self.param(name) {
            Some(value) => {
                let value = value
                    .parse()
                    .map_err(|_| format_err!("parameter {} is not a boolean: {}", name, value))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Get the path of a named input file.
    pub fn input_path(&self, name: &str) -> Result<&Path> {
        self.inputs
            .get(name)
            .map(PathBuf::as_path)
            .ok_or_else(|| format_err!("missing input: {}", name))
    }
}

#[cfg(test)]
mod tests {
    use super::TaskContext;

    #[test]
    fn params_and_defaults() {
        let mut context = TaskContext::new();
        context.set_param("transition_system", "arc-standard");
        context.set_param("batch", "32");

        assert_eq!(context.param("transition_system"), Some("arc-standard"));
        assert_eq!(context.param_or("missing", "fallback"), "fallback");
        assert_eq!(context.usize_param("batch").unwrap(), Some(32));
        assert!(context.usize_param("transition_system").is_err());
    }

    #[test]
    fn missing_input_is_an_error() {
        let mut context = TaskContext::new();
        context.set_input("label-map", "/data/labels.txt");

        assert!(context.input_path("label-map").is_ok());
        assert!(context.input_path("word-map").is_err());
    }
}
