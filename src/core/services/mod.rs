pub mod command_templates;
pub mod decision;
pub mod identity_extractor;
pub mod reconciler;
pub mod retry_executor;
pub mod state_prober;
