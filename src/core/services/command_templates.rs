use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::errors::{ReconcileError, Result};
use crate::core::models::desired_state::KeyType;
use crate::core::models::endpoint::Endpoint;
use crate::core::models::operation::Operation;

/// One argument of a command template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Literal(String),
    /// Keyserver URL, bound per attempt.
    Endpoint,
    /// Keyserver timeout, bound per attempt. Renders as `timeout=<secs>`.
    Timeout,
}

impl Arg {
    fn lit(s: impl Into<String>) -> Self {
        Self::Literal(s.into())
    }
}

/// Values bound at execution time.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bindings<'a> {
    pub endpoint: Option<&'a Endpoint>,
    pub timeout_secs: Option<u64>,
}

impl<'a> Bindings<'a> {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn keyserver(endpoint: &'a Endpoint, timeout_secs: u64) -> Self {
        Self {
            endpoint: Some(endpoint),
            timeout_secs: Some(timeout_secs),
        }
    }
}

/// A command with setup-time values filled in and per-attempt
/// placeholders still open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    operation: Operation,
    program: PathBuf,
    args: Vec<Arg>,
}

impl CommandTemplate {
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Fill every open placeholder. Fails if a placeholder has no value.
    pub fn resolve(&self, bindings: &Bindings<'_>) -> Result<ResolvedCommand> {
        let unresolved = |placeholder| ReconcileError::UnresolvedPlaceholder {
            operation: self.operation.name().to_string(),
            placeholder,
        };

        let args = self
            .args
            .iter()
            .map(|arg| match arg {
                Arg::Literal(s) => Ok(s.clone()),
                Arg::Endpoint => bindings
                    .endpoint
                    .map(|e| e.as_str().to_string())
                    .ok_or_else(|| unresolved("endpoint")),
                Arg::Timeout => bindings
                    .timeout_secs
                    .map(|t| format!("timeout={t}"))
                    .ok_or_else(|| unresolved("timeout")),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ResolvedCommand {
            operation: self.operation,
            program: self.program.clone(),
            args,
        })
    }
}

/// A command ready to hand to a `CommandRunner`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    pub operation: Operation,
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl fmt::Display for ResolvedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Values fixed once per run.
#[derive(Debug, Clone)]
pub struct SetupParams {
    pub program: PathBuf,
    pub dry_run: bool,
    pub identity: Option<String>,
    pub key_file: Option<PathBuf>,
    pub key_type: KeyType,
}

/// Builds the command template for each operation.
#[derive(Debug, Clone)]
pub struct CommandSet {
    setup: SetupParams,
}

impl CommandSet {
    pub fn new(setup: SetupParams) -> Self {
        Self { setup }
    }

    /// Replace the identity used by identity-based commands.
    pub fn with_identity(mut self, identity: Option<String>) -> Self {
        self.setup.identity = identity;
        self
    }

    pub fn identity(&self) -> Option<&str> {
        self.setup.identity.as_deref()
    }

    /// Template for `operation`.
    ///
    /// Fails when the operation needs a key identity or key file the run
    /// does not have.
    pub fn template(&self, operation: Operation) -> Result<CommandTemplate> {
        let mut args = Vec::new();
        if self.setup.dry_run && operation != Operation::Inspect {
            args.push(Arg::lit("--dry-run"));
        }

        match operation {
            Operation::Check => {
                args.push(Arg::lit("--list-keys"));
                args.push(Arg::lit(self.require_identity(operation)?));
            }
            Operation::CheckPrivate => {
                args.push(Arg::lit("--list-secret-keys"));
                args.push(Arg::lit(self.require_identity(operation)?));
            }
            Operation::CheckPublic => {
                args.push(Arg::lit("--list-public-keys"));
                args.push(Arg::lit(self.require_identity(operation)?));
            }
            Operation::Delete => {
                let flag = if self.deletes_secret_key() {
                    "--delete-secret-and-public-keys"
                } else {
                    "--delete-keys"
                };
                args.extend([Arg::lit("--batch"), Arg::lit("--yes"), Arg::lit(flag)]);
                args.push(Arg::lit(self.require_identity(operation)?));
            }
            Operation::Refresh | Operation::Receive => {
                let flag = if operation == Operation::Refresh {
                    "--refresh-keys"
                } else {
                    "--recv-keys"
                };
                args.extend([
                    Arg::lit("--keyserver"),
                    Arg::Endpoint,
                    Arg::lit("--keyserver-options"),
                    Arg::Timeout,
                    Arg::lit(flag),
                ]);
                args.push(Arg::lit(self.require_identity(operation)?));
            }
            Operation::Import => {
                args.extend([Arg::lit("--batch"), Arg::lit("--import")]);
                args.push(Arg::lit(self.require_file(operation)?));
            }
            Operation::Inspect => {
                args.extend([
                    Arg::lit("--dry-run"),
                    Arg::lit("--batch"),
                    Arg::lit("--import"),
                ]);
                args.push(Arg::lit(self.require_file(operation)?));
            }
        }

        Ok(CommandTemplate {
            operation,
            program: self.setup.program.clone(),
            args,
        })
    }

    /// A private key supplied as a file is removed together with its
    /// secret part. Identity-only keys are removed from the public ring.
    fn deletes_secret_key(&self) -> bool {
        self.setup.key_type == KeyType::Private && self.setup.key_file.is_some()
    }

    fn require_identity(&self, operation: Operation) -> Result<String> {
        self.setup
            .identity
            .clone()
            .ok_or(ReconcileError::UnresolvedPlaceholder {
                operation: operation.name().to_string(),
                placeholder: "key identity",
            })
    }

    fn require_file(&self, operation: Operation) -> Result<String> {
        self.setup
            .key_file
            .as_deref()
            .map(path_arg)
            .ok_or(ReconcileError::UnresolvedPlaceholder {
                operation: operation.name().to_string(),
                placeholder: "key file",
            })
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
