//! Tool invocation protocol.
//!
//! A tool invocation is not a single return value but an ordered stream of
//! partial [`ToolResult`]s: a `started` value first, then one `completed`
//! value. Any failure is delivered as an `Err` item and is always the last
//! item of the stream.

mod error;
pub mod geocode;

pub use error::ToolError;
pub use geocode::{ADDRESS_TO_COORD, AddressToCoordTool, COORD_TO_ADDRESS, CoordToAddressTool};

use crate::domain::types::{ToolDefinition, ToolResult};
use crate::infrastructure::geocode::Geocoder;
use futures::Stream;
use futures::stream;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{info, warn};

/// Ordered results of one tool invocation.
pub type ToolStream = Pin<Box<dyn Stream<Item = Result<ToolResult, ToolError>> + Send + 'static>>;

/// A typed tool the model runtime can call.
///
/// Implementors declare their input shape and produce a [`ToolStream`];
/// name, description and schema live on the [`ToolDefinition`].
pub trait Tool: Send + Sync + 'static {
    /// Input decoded from the model-supplied JSON arguments.
    type Input: DeserializeOwned + Send + 'static;

    fn definition(&self) -> ToolDefinition;

    fn invoke(&self, input: Self::Input) -> ToolStream;
}

/// Type-erased [`Tool`].
trait DynTool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    fn invoke_dyn(&self, arguments: Value) -> ToolStream;
}

impl<T: Tool> DynTool for T {
    fn definition(&self) -> ToolDefinition {
        Tool::definition(self)
    }

    fn invoke_dyn(&self, arguments: Value) -> ToolStream {
        let arguments = if arguments.is_null() {
            Value::Object(Default::default())
        } else {
            arguments
        };
        match serde_json::from_value::<T::Input>(arguments) {
            Ok(input) => self.invoke(input),
            Err(err) => {
                let error = ToolError::InvalidInput {
                    tool: Tool::definition(self).name,
                    reason: err.to_string(),
                };
                Box::pin(stream::once(async move { Err::<ToolResult, _>(error) }))
            }
        }
    }
}

/// The set of tools registered with the model runtime for one service.
pub struct ToolRegistry {
    tools: Vec<Box<dyn DynTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Registry holding `addressToCoord` and `coordToAddress`.
    pub fn geocoding(geocoder: Arc<dyn Geocoder>) -> Self {
        let mut registry = Self::new();
        registry.register(AddressToCoordTool::new(Arc::clone(&geocoder)));
        registry.register(CoordToAddressTool::new(geocoder));
        registry
    }

    pub fn register(&mut self, tool: impl Tool) {
        self.tools.push(Box::new(tool));
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|tool| tool.definition()).collect()
    }

    /// Start the tool named `name` with the model-supplied arguments.
    pub fn invoke(&self, name: &str, arguments: Value) -> ToolStream {
        match self.tools.iter().find(|tool| tool.definition().name == name) {
            Some(tool) => {
                info!(tool = name, "Invoking tool");
                tool.invoke_dyn(arguments)
            }
            None => {
                warn!(requested_tool = name, "Unknown tool requested by model");
                let error = ToolError::UnknownTool(name.to_string());
                Box::pin(stream::once(async move { Err::<ToolResult, _>(error) }))
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
