//! Hook system: the transformer registry and the load dispatcher.

pub mod dispatcher;
pub mod registry;

pub use dispatcher::Dispatcher;
pub use registry::TransformerRegistry;
