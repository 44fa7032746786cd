//! In-memory stand-in for the `defaults` tool.

use std::collections::BTreeMap;
use std::sync::Mutex;

use baseline_prefs::{CommandOutput, Exec, Result};

/// Answers `read`, `write` and `delete` the way the real tool does, closely
/// enough for reconciliation tests.
///
/// Typed writes are stored the way `defaults read` prints them back:
/// `-bool true` reads as `1`, `-array a b` as a multi-line array.
#[derive(Debug, Default)]
pub struct FakeDefaults {
    values: Mutex<BTreeMap<(String, String), String>>,
    log: Mutex<Vec<Vec<String>>>,
}

impl FakeDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(self, domain: &str, key: &str, value: &str) -> Self {
        self.values
            .lock()
            .unwrap()
            .insert((domain.to_string(), key.to_string()), value.to_string());
        self
    }

    pub fn get(&self, domain: &str, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap()
            .get(&(domain.to_string(), key.to_string()))
            .cloned()
    }

    /// Every argv seen, in order.
    pub fn commands(&self) -> Vec<Vec<String>> {
        self.log.lock().unwrap().clone()
    }

    fn missing(domain: &str, key: &str) -> CommandOutput {
        CommandOutput {
            stdout: String::new(),
            stderr: format!("\nThe domain/default pair of ({domain}, {key}) does not exist\n"),
            status: Some(1),
        }
    }

    fn stored_form(values: &[String]) -> String {
        match values {
            [kind, rest @ ..] if kind == "-bool" || kind == "-boolean" => {
                let truthy = matches!(
                    rest.first().map(String::as_str),
                    Some("true" | "yes" | "YES" | "TRUE" | "1")
                );
                let stored = if truthy { "1" } else { "0" };
                stored.to_string()
            }
            [kind, rest @ ..] if kind == "-array" => {
                let items: Vec<String> = rest.iter().map(|i| format!("    {i}")).collect();
                format!("(\n{}\n)", items.join(",\n"))
            }
            [kind, rest @ ..] if kind.starts_with('-') => rest.join(" "),
            _ => values.join(" "),
        }
    }
}

impl Exec for FakeDefaults {
    fn exec(&self, argv: &[String]) -> Result<CommandOutput> {
        self.log.lock().unwrap().push(argv.to_vec());

        let rest: Vec<String> = argv
            .iter()
            .skip(1)
            .filter(|a| a.as_str() != "-currentHost")
            .cloned()
            .collect();
        let (Some(verb), Some(domain), Some(key)) = (rest.first(), rest.get(1), rest.get(2)) else {
            return Ok(CommandOutput {
                stderr: "usage: defaults [-currentHost] <verb> <domain> <key>\n".into(),
                status: Some(1),
                ..CommandOutput::default()
            });
        };
        let slot = (domain.clone(), key.clone());
        let mut values = self.values.lock().unwrap();

        let output = match verb.as_str() {
            "read" => match values.get(&slot) {
                Some(v) => CommandOutput {
                    stdout: format!("{v}\n"),
                    status: Some(0),
                    ..CommandOutput::default()
                },
                None => Self::missing(domain, key),
            },
            "write" => {
                values.insert(slot, Self::stored_form(&rest[3..]));
                CommandOutput {
                    status: Some(0),
                    ..CommandOutput::default()
                }
            }
            "delete" => match values.remove(&slot) {
                Some(_) => CommandOutput {
                    status: Some(0),
                    ..CommandOutput::default()
                },
                None => Self::missing(domain, key),
            },
            other => CommandOutput {
                stderr: format!("unknown verb {other}\n"),
                status: Some(1),
                ..CommandOutput::default()
            },
        };
        Ok(output)
    }
}
