use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use crate::config::app_config::ReconcileConfig;
use crate::core::errors::{ReconcileError, Result};
use crate::core::models::outcome::{Action, ProbeReport, ReconcileResult};
use crate::core::models::trace::{AttemptRecord, AttemptTrace};
use crate::core::services::command_templates::{Bindings, CommandSet, CommandTemplate, SetupParams};
use crate::core::services::decision::decide;
use crate::core::services::identity_extractor::extract_identity;
use crate::core::services::retry_executor::{RetryExecutor, RetryOutcome};
use crate::core::services::state_prober::StateProber;
use crate::core::traits::command_runner::CommandRunner;
use crate::core::traits::sleeper::Sleeper;

/// gpg's summary line when a refresh found nothing new.
static UNCHANGED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"gpg:\s+unchanged: [1-9]").expect("valid regex"));

/// Drives one run: probe, decide, act, report.
pub struct Reconciler<'a, R: CommandRunner, S: Sleeper> {
    config: &'a ReconcileConfig,
    binary: PathBuf,
    runner: &'a R,
    sleeper: &'a S,
}

impl<'a, R: CommandRunner, S: Sleeper> Reconciler<'a, R, S> {
    /// `binary` is the already located key-management executable.
    pub fn new(config: &'a ReconcileConfig, binary: PathBuf, runner: &'a R, sleeper: &'a S) -> Self {
        Self {
            config,
            binary,
            runner,
            sleeper,
        }
    }

    /// Converge the keyring to the configured state.
    ///
    /// A failed delete or import, or a keyserver operation that used up
    /// its retries, ends the run with `TerminalFailure` carrying the trace.
    pub fn run(&self) -> Result<ReconcileResult> {
        let mut trace = AttemptTrace::default();
        let (commands, present) = self.observe(&mut trace)?;
        let action = decide(present, self.config.state, self.config.key_source());
        info!(
            key = %self.config.key_label(),
            present,
            state = %self.config.state,
            %action,
            check_mode = self.config.check_mode,
            "chose action"
        );

        let Some(operation) = action.operation() else {
            return Ok(ReconcileResult {
                changed: false,
                action,
                trace,
            });
        };

        let template = commands.template(operation)?;
        let record = if operation.needs_endpoint() {
            let executor = RetryExecutor::new(
                self.runner,
                self.sleeper,
                &self.config.retry,
                &self.config.endpoints,
            );
            match executor.run(&template, &mut trace)? {
                RetryOutcome::Succeeded(record) => Some(record),
                RetryOutcome::Exhausted { attempts } => {
                    warn!(%operation, attempts, "all attempts failed");
                    None
                }
            }
        } else {
            Some(self.execute_once(&template, &mut trace)?).filter(AttemptRecord::succeeded)
        };

        match record {
            Some(record) => Ok(ReconcileResult {
                changed: changed_by(action, &record),
                action,
                trace,
            }),
            None => Err(ReconcileError::TerminalFailure {
                operation: operation.name().to_string(),
                action,
                trace,
            }),
        }
    }

    /// Report presence and the action `run` would take. Runs nothing that
    /// modifies the keyring.
    pub fn probe(&self) -> Result<ProbeReport> {
        let mut trace = AttemptTrace::default();
        let (commands, present) = self.observe(&mut trace)?;
        let planned = decide(present, self.config.state, self.config.key_source());
        Ok(ProbeReport {
            present,
            identity: commands.identity().map(String::from),
            planned,
            trace,
        })
    }

    /// Resolve the effective identity and probe for the key.
    fn observe(&self, trace: &mut AttemptTrace) -> Result<(CommandSet, bool)> {
        let mut commands = CommandSet::new(SetupParams {
            program: self.binary.clone(),
            dry_run: self.config.check_mode,
            identity: self.config.key_id.clone(),
            key_file: self.config.key_file.clone(),
            key_type: self.config.key_type,
        });

        if self.config.key_file.is_some() {
            let extracted = extract_identity(self.runner, &commands, trace)?;
            match (&extracted, &self.config.key_id) {
                (None, _) => warn!("key file holds no recognisable key, treating key as absent"),
                (Some(found), Some(declared)) if !same_key(found, declared) => {
                    warn!(%found, %declared, "key file identity differs from declared key id")
                }
                _ => {}
            }
            commands = commands.with_identity(extracted);
        }

        let present =
            StateProber::new(self.runner).probe(&commands, self.config.key_source(), trace)?;
        Ok((commands, present))
    }

    fn execute_once(&self, template: &CommandTemplate, trace: &mut AttemptTrace) -> Result<AttemptRecord> {
        let command = template.resolve(&Bindings::none())?;
        let output = self.runner.run(&command)?;
        let record = trace.record(template.operation(), command.to_string(), output);
        if !record.succeeded() {
            warn!(operation = %template.operation(), rc = record.rc, "command failed");
        }
        Ok(record)
    }
}

/// Whether a successful action modified the keyring.
///
/// A refresh only counts as a change when gpg does not report the key as
/// unchanged.
fn changed_by(action: Action, record: &AttemptRecord) -> bool {
    match action {
        Action::NoOp => false,
        Action::Refresh => !UNCHANGED.is_match(&record.stderr),
        Action::Delete | Action::Receive | Action::ImportFromFile => record.succeeded(),
    }
}

/// Compare key ids ignoring case, an `0x` prefix, and short vs long form.
fn same_key(a: &str, b: &str) -> bool {
    let norm = |s: &str| {
        s.trim_start_matches("0x")
            .trim_start_matches("0X")
            .to_ascii_uppercase()
    };
    let (a, b) = (norm(a), norm(b));
    a.ends_with(&b) || b.ends_with(&a)
}
