pub mod apply;
pub mod history;
pub mod run_helpers;
pub mod status;
