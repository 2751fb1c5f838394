pub mod command_runner;
pub mod sleeper;
pub mod trace_log;
