use std::time::Duration;

use tracing::{debug, warn};

use crate::core::errors::Result;
use crate::core::models::endpoint::Endpoint;
use crate::core::models::trace::{AttemptRecord, AttemptTrace};
use crate::core::services::command_templates::{Bindings, CommandTemplate};
use crate::core::traits::command_runner::CommandRunner;
use crate::core::traits::sleeper::Sleeper;

/// Bounds for keyserver operations.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Rounds through the whole endpoint list.
    pub tries: u32,
    /// Pause after every failed attempt except the last one.
    pub delay: Duration,
    /// Passed to the tool as its keyserver timeout.
    pub timeout_secs: u64,
}

/// Result of running a command across the retry grid.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryOutcome {
    /// The first successful attempt. Nothing ran after it.
    Succeeded(AttemptRecord),
    /// No attempt succeeded. Never confused with a tool exit code.
    Exhausted { attempts: usize },
}

/// Runs a keyserver command over `tries` rounds of the endpoint list.
///
/// Each round walks every endpoint in order before the next round starts,
/// so a single stale endpoint cannot use up the whole retry budget.
pub struct RetryExecutor<'a, R: CommandRunner, S: Sleeper> {
    runner: &'a R,
    sleeper: &'a S,
    policy: &'a RetryPolicy,
    endpoints: &'a [Endpoint],
}

impl<'a, R: CommandRunner, S: Sleeper> RetryExecutor<'a, R, S> {
    pub fn new(
        runner: &'a R,
        sleeper: &'a S,
        policy: &'a RetryPolicy,
        endpoints: &'a [Endpoint],
    ) -> Self {
        Self {
            runner,
            sleeper,
            policy,
            endpoints,
        }
    }

    /// Run `template` until an attempt exits with zero or the grid of
    /// `tries × endpoints` attempts is used up. Every attempt is recorded.
    pub fn run(&self, template: &CommandTemplate, trace: &mut AttemptTrace) -> Result<RetryOutcome> {
        let operation = template.operation();
        let grid = self.policy.tries as usize * self.endpoints.len();
        let mut attempts = 0;

        for round in 1..=self.policy.tries {
            for endpoint in self.endpoints {
                let bindings = Bindings::keyserver(endpoint, self.policy.timeout_secs);
                let command = template.resolve(&bindings)?;
                let output = self.runner.run(&command)?;
                let record = trace.record(operation, command.to_string(), output);
                attempts += 1;

                if record.succeeded() {
                    debug!(%operation, round, %endpoint, "attempt succeeded");
                    return Ok(RetryOutcome::Succeeded(record));
                }

                warn!(
                    %operation,
                    round,
                    %endpoint,
                    rc = record.rc,
                    "attempt failed"
                );
                if attempts < grid {
                    self.sleeper.sleep(self.policy.delay);
                }
            }
        }

        Ok(RetryOutcome::Exhausted { attempts })
    }
}
