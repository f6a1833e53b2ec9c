mod options;
mod runner;


pub use options::ChatOptions;
pub use runner::{ChatOrchestrator, UiChunkStream};
