pub mod locator;
pub mod runner;
pub mod trace_log;
