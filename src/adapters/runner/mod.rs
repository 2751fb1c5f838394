pub mod process_runner;
#[cfg(test)]
pub mod scripted_runner;
