//! Preference-store dialect

use regex::Regex;
use serde::Serialize;

use crate::exec::{CommandOutput, Exec, StderrPolicy};
use crate::plist;
use crate::tokenize::tokenize;
use crate::{Error, Result};

/// Default location of the store's command-line tool.
pub const DEFAULT_PROGRAM: &str = "/usr/bin/defaults";

const MISSING_SIGNAL: &str = "does not exist";

/// Desired state of one preference key.
#[derive(Debug, Clone)]
pub struct PreferenceSpec {
    pattern: Option<Regex>,
    source: String,
    /// Arguments for the write primitive, e.g. `-bool true`. `None` means the
    /// key must not exist.
    pub write: Option<String>,
}

impl PreferenceSpec {
    /// `pattern` must match the current value from its first character.
    pub fn new(pattern: &str, write: Option<&str>) -> Result<Self> {
        let anchored = Regex::new(&format!("^(?:{pattern})")).map_err(|source| Error::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            pattern: Some(anchored),
            source: pattern.to_string(),
            write: write.map(str::to_string),
        })
    }

    /// A key that must not exist.
    pub fn absent() -> Self {
        Self {
            pattern: None,
            source: String::new(),
            write: None,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, current: &str) -> bool {
        self.pattern.as_ref().is_some_and(|p| p.is_match(current))
    }
}

/// Value of a key as read from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "value")]
pub enum CurrentValue {
    Missing,
    Value(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub compliant: bool,
    /// Kept for building the undo command.
    pub current: CurrentValue,
}

/// A write performed by [`PreferenceStore::apply`], with its inverse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreferenceChange {
    pub domain: String,
    pub key: String,
    pub before: CurrentValue,
    pub write: Vec<String>,
    pub undo: Vec<String>,
}

/// One preference domain, e.g. `/Library/Preferences/com.apple.loginwindow`.
pub struct PreferenceStore<E: Exec> {
    exec: E,
    program: String,
    domain: String,
    current_host: bool,
    stderr_policy: StderrPolicy,
}

impl<E: Exec> PreferenceStore<E> {
    pub fn new(exec: E, domain: impl Into<String>) -> Self {
        Self {
            exec,
            program: DEFAULT_PROGRAM.to_string(),
            domain: domain.into(),
            current_host: false,
            stderr_policy: StderrPolicy::default(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Address the per-host preferences (`-currentHost`).
    pub fn with_current_host(mut self, current_host: bool) -> Self {
        self.current_host = current_host;
        self
    }

    pub fn with_stderr_policy(mut self, policy: StderrPolicy) -> Self {
        self.stderr_policy = policy;
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    fn command(&self, verb: &str, key: &str) -> Vec<String> {
        let mut argv = vec![self.program.clone()];
        if self.current_host {
            argv.push("-currentHost".to_string());
        }
        argv.extend([verb.to_string(), self.domain.clone(), key.to_string()]);
        argv
    }

    pub fn build_read_command(&self, key: &str) -> Vec<String> {
        self.command("read", key)
    }

    /// Read the current value of `key`.
    ///
    /// A "does not exist" failure becomes [`CurrentValue::Missing`]; any other
    /// failure is an error.
    pub fn read(&self, key: &str) -> Result<CurrentValue> {
        let argv = self.build_read_command(key);
        let output = self.exec.exec(&argv)?;

        if !output.success() && output.stderr.contains(MISSING_SIGNAL) {
            return Ok(CurrentValue::Missing);
        }
        let output = self.stderr_policy.check(&argv, output)?;
        Ok(CurrentValue::Value(output.stdout.trim().to_string()))
    }

    pub fn validate(&self, key: &str, spec: &PreferenceSpec) -> Result<Validation> {
        let current = self.read(key)?;
        let compliant = match (&current, &spec.write) {
            (CurrentValue::Missing, write) => write.is_none(),
            (CurrentValue::Value(_), None) => false,
            (CurrentValue::Value(value), Some(_)) => spec.matches(value),
        };
        tracing::debug!(domain = %self.domain, key, compliant, ?current, "validated preference");
        Ok(Validation { compliant, current })
    }

    /// Command that brings `key` to `spec`.
    pub fn build_write_command(&self, key: &str, spec: &PreferenceSpec) -> Result<Vec<String>> {
        let Some(literal) = &spec.write else {
            return Ok(self.command("delete", key));
        };

        let mut argv = self.command("write", key);
        if plist::is_structured(literal) {
            argv.push(literal.trim().to_string());
        } else {
            argv.extend(tokenize(literal)?);
        }
        Ok(argv)
    }

    /// Command that restores `current`.
    pub fn build_undo_command(&self, key: &str, current: &CurrentValue) -> Vec<String> {
        match current {
            CurrentValue::Missing => self.command("delete", key),
            CurrentValue::Value(value) => {
                let mut argv = self.command("write", key);
                if plist::is_structured(value) && value.trim().lines().count() > 1 {
                    argv.push(plist::serialize_structured(value));
                } else {
                    argv.push(value.trim().to_string());
                }
                argv
            }
        }
    }

    /// Run a write or undo command built by this store.
    pub fn run(&self, argv: &[String]) -> Result<CommandOutput> {
        let output = self.exec.exec(argv)?;
        self.stderr_policy.check(argv, output)
    }

    /// Validate `key` and write it when it drifts.
    ///
    /// Returns the change made, or `None` when the key was already compliant.
    pub fn apply(&self, key: &str, spec: &PreferenceSpec) -> Result<Option<PreferenceChange>> {
        let validation = self.validate(key, spec)?;
        if validation.compliant {
            return Ok(None);
        }

        let write = self.build_write_command(key, spec)?;
        let undo = self.build_undo_command(key, &validation.current);
        self.run(&write)?;
        tracing::info!(domain = %self.domain, key, "preference written");

        Ok(Some(PreferenceChange {
            domain: self.domain.clone(),
            key: key.to_string(),
            before: validation.current,
            write,
            undo,
        }))
    }
}
