//! Configuration, host facts, and command runner for one invocation.

use std::path::Path;

use baseline_applicability::HostFacts;
use baseline_core::{Engine, EngineConfig, detect_facts};
use baseline_prefs::SystemExec;

use crate::error::Result;

const OS_RELEASE: &str = "/etc/os-release";

pub struct Context {
    pub config: EngineConfig,
    pub facts: HostFacts,
    pub exec: SystemExec,
}

impl Context {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::default(),
        };
        let exec = SystemExec::new(config.exec.timeout());
        let facts = detect_facts(&exec, Path::new(OS_RELEASE), &config.host);
        Ok(Self {
            config,
            facts,
            exec,
        })
    }

    pub fn engine(&self) -> Engine<&SystemExec> {
        Engine::new(self.config.clone(), self.facts.clone(), &self.exec)
    }
}
