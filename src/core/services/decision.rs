use crate::core::models::desired_state::{DesiredState, KeySource, KeyType};
use crate::core::models::outcome::Action;

/// Pick the action that moves the keyring from its observed state to the
/// desired one.
///
/// | present | desired | source              | action           |
/// |---------|---------|---------------------|------------------|
/// | yes     | absent  | any                 | delete           |
/// | yes     | latest  | any                 | refresh          |
/// | yes     | present | any                 | no-op            |
/// | no      | absent  | any                 | no-op            |
/// | no      | present/latest | private, no file | receive     |
/// | no      | present/latest | key file or public | import-from-file |
pub fn decide(present: bool, desired: DesiredState, source: KeySource) -> Action {
    match (present, desired) {
        (true, DesiredState::Absent) => Action::Delete,
        (true, DesiredState::Latest) => Action::Refresh,
        (true, DesiredState::Present) => Action::NoOp,
        (false, _) if !desired.wants_key() => Action::NoOp,
        (false, _) if source.from_file || source.key_type == KeyType::Public => {
            Action::ImportFromFile
        }
        (false, _) => Action::Receive,
    }
}
