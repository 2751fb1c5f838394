pub mod desired_state;
pub mod endpoint;
pub mod operation;
pub mod outcome;
pub mod run_record;
pub mod trace;
