use tracing::debug;

use crate::core::errors::Result;
use crate::core::models::desired_state::{KeySource, KeyType};
use crate::core::models::operation::Operation;
use crate::core::models::trace::AttemptTrace;
use crate::core::services::command_templates::{Bindings, CommandSet};
use crate::core::traits::command_runner::CommandRunner;

/// Determines whether the target key is currently in the keyring.
pub struct StateProber<'a, R: CommandRunner> {
    runner: &'a R,
}

impl<'a, R: CommandRunner> StateProber<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }

    /// Listing command used for the given key source.
    ///
    /// Keys from a file are looked up in the keyring matching their kind,
    /// identity-only keys with a plain listing.
    pub fn check_operation(source: KeySource) -> Operation {
        match (source.from_file, source.key_type) {
            (true, KeyType::Public) => Operation::CheckPublic,
            (true, KeyType::Private) => Operation::CheckPrivate,
            (false, _) => Operation::Check,
        }
    }

    /// Run the listing command and report presence (exit code zero).
    ///
    /// Without an identity there is nothing to look up, so the key is
    /// reported absent and no command runs.
    pub fn probe(
        &self,
        commands: &CommandSet,
        source: KeySource,
        trace: &mut AttemptTrace,
    ) -> Result<bool> {
        if commands.identity().is_none() {
            debug!("no key identity known, treating key as absent");
            return Ok(false);
        }

        let operation = Self::check_operation(source);
        let command = commands.template(operation)?.resolve(&Bindings::none())?;
        let output = self.runner.run(&command)?;
        let record = trace.record(operation, command.to_string(), output);

        debug!(%operation, rc = record.rc, "probed key state");
        Ok(record.succeeded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::adapters::runner::scripted_runner::ScriptedRunner;
    use crate::core::models::trace::CommandOutput;
    use crate::core::services::command_templates::SetupParams;

    fn commands(identity: Option<&str>, key_file: Option<&str>, key_type: KeyType) -> CommandSet {
        CommandSet::new(SetupParams {
            program: PathBuf::from("gpg"),
            dry_run: false,
            identity: identity.map(String::from),
            key_file: key_file.map(PathBuf::from),
            key_type,
        })
    }

    #[test]
    fn identity_only_uses_plain_check() {
        let source = KeySource {
            key_type: KeyType::Private,
            from_file: false,
        };
        assert_eq!(StateProber::<ScriptedRunner>::check_operation(source), Operation::Check);
    }

    #[test]
    fn file_sources_use_kind_specific_check() {
        let public = KeySource {
            key_type: KeyType::Public,
            from_file: true,
        };
        let private = KeySource {
            key_type: KeyType::Private,
            from_file: true,
        };
        assert_eq!(
            StateProber::<ScriptedRunner>::check_operation(public),
            Operation::CheckPublic
        );
        assert_eq!(
            StateProber::<ScriptedRunner>::check_operation(private),
            Operation::CheckPrivate
        );
    }

    #[test]
    fn zero_exit_means_present() {
        let runner = ScriptedRunner::with_outputs(vec![CommandOutput::new(0, "pub rsa4096", "")]);
        let mut trace = AttemptTrace::default();
        let source = KeySource {
            key_type: KeyType::Private,
            from_file: false,
        };

        let present = StateProber::new(&runner)
            .probe(&commands(Some("ABCD1234"), None, KeyType::Private), source, &mut trace)
            .unwrap();

        assert!(present);
        assert_eq!(trace.count(Operation::Check), 1);
        assert_eq!(runner.executed()[0].to_string(), "gpg --list-keys ABCD1234");
    }

    #[test]
    fn non_zero_exit_means_absent() {
        let runner = ScriptedRunner::with_outputs(vec![CommandOutput::new(
            2,
            "",
            "gpg: error reading key: No public key",
        )]);
        let mut trace = AttemptTrace::default();
        let source = KeySource {
            key_type: KeyType::Public,
            from_file: true,
        };

        let present = StateProber::new(&runner)
            .probe(
                &commands(Some("ABCD1234"), Some("k.asc"), KeyType::Public),
                source,
                &mut trace,
            )
            .unwrap();

        assert!(!present);
        assert_eq!(trace.count(Operation::CheckPublic), 1);
    }

    #[test]
    fn missing_identity_skips_the_probe() {
        let runner = ScriptedRunner::new();
        let mut trace = AttemptTrace::default();
        let source = KeySource {
            key_type: KeyType::Public,
            from_file: true,
        };

        let present = StateProber::new(&runner)
            .probe(&commands(None, Some("k.asc"), KeyType::Public), source, &mut trace)
            .unwrap();

        assert!(!present);
        assert!(runner.executed().is_empty());
        assert!(trace.is_empty());
    }
}
