//! Scripted stand-ins for external commands and the host environment

use crate::error::MintdevResult;
use crate::exec::{BackgroundProcess, CommandOutput, CommandRunner, ExternalCommand};
use crate::preview::probe::Environment;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

type Effect = Box<dyn Fn(&ExternalCommand) + Send + Sync>;

struct Rule {
    pattern: String,
    prefix: bool,
    output: CommandOutput,
    effect: Option<Effect>,
}

impl Rule {
    fn matches(&self, rendered: &str) -> bool {
        if self.prefix {
            rendered.starts_with(&self.pattern)
        } else {
            rendered == self.pattern
        }
    }
}

/// Records every command and answers from a script
///
/// Unscripted commands succeed with empty output.
#[derive(Default)]
pub(crate) struct FakeRunner {
    rules: Vec<Rule>,
    calls: Mutex<Vec<ExternalCommand>>,
    spawned: Mutex<Vec<ExternalCommand>>,
}

impl FakeRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Answer an exact command line with `stdout`
    pub(crate) fn on(mut self, command: &str, success: bool, stdout: &str) -> Self {
        self.rules.push(Rule {
            pattern: command.to_string(),
            prefix: false,
            output: CommandOutput {
                success,
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
            effect: None,
        });
        self
    }

    /// Run `effect` whenever a command line starting with `prefix` executes
    pub(crate) fn effect(
        mut self,
        prefix: &str,
        effect: impl Fn(&ExternalCommand) + Send + Sync + 'static,
    ) -> Self {
        self.rules.push(Rule {
            pattern: prefix.to_string(),
            prefix: true,
            output: CommandOutput {
                success: true,
                ..Default::default()
            },
            effect: Some(Box::new(effect)),
        });
        self
    }

    /// Every command line run to completion, in order
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Every command run to completion, with its working directory
    pub(crate) fn commands(&self) -> Vec<ExternalCommand> {
        self.calls.lock().unwrap().clone()
    }

    /// Every command line started in the background
    pub(crate) fn spawned(&self) -> Vec<String> {
        self.spawned
            .lock()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    pub(crate) fn ran(&self, command: &str) -> bool {
        self.calls().iter().any(|c| c == command)
    }

    fn answer(&self, command: &ExternalCommand) -> CommandOutput {
        let rendered = command.to_string();
        let mut output = None;
        for rule in self.rules.iter().filter(|r| r.matches(&rendered)) {
            if let Some(effect) = &rule.effect {
                effect(command);
            }
            if output.is_none() && rule.effect.is_none() {
                output = Some(rule.output.clone());
            }
        }
        output.unwrap_or(CommandOutput {
            success: true,
            ..Default::default()
        })
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, command: &ExternalCommand) -> MintdevResult<CommandOutput> {
        self.calls.lock().unwrap().push(command.clone());
        Ok(self.answer(command))
    }

    async fn run_streaming(
        &self,
        command: &ExternalCommand,
        on_output: &(dyn Fn(String) + Send + Sync),
    ) -> MintdevResult<CommandOutput> {
        let output = self.run(command).await?;
        for line in output.stdout.lines() {
            on_output(line.to_string());
        }
        Ok(output)
    }

    async fn spawn(&self, command: &ExternalCommand) -> MintdevResult<BackgroundProcess> {
        self.spawned.lock().unwrap().push(command.clone());
        Ok(BackgroundProcess::new(command.to_string(), None))
    }
}

/// Host environment with a fixed set of tools and network state
pub(crate) struct FakeEnvironment {
    tools: Mutex<HashSet<String>>,
    online: bool,
}

impl FakeEnvironment {
    pub(crate) fn new(tools: &[&str], online: bool) -> Self {
        Self {
            tools: Mutex::new(tools.iter().map(|t| t.to_string()).collect()),
            online,
        }
    }

    /// Everything installed, network reachable
    pub(crate) fn full() -> Self {
        Self::new(&["git", "yarn", "npm"], true)
    }

    pub(crate) fn install(&self, tool: &str) {
        self.tools.lock().unwrap().insert(tool.to_string());
    }
}

#[async_trait]
impl Environment for FakeEnvironment {
    fn has_tool(&self, name: &str) -> bool {
        self.tools.lock().unwrap().contains(name)
    }

    async fn internet_reachable(&self, _probe_url: &str, _timeout: Duration) -> bool {
        self.online
    }
}
