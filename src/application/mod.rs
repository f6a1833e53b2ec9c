pub mod orchestrator;
pub mod tooling;
