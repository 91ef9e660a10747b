pub mod health;
pub mod history;
pub mod notifier;
pub mod orchestrator;
pub mod scanner_api;
pub mod view;

#[cfg(test)]
pub(crate) mod fake_api;
