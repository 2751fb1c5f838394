pub mod json_trace_log;
