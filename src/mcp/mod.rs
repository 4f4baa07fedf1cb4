pub mod dispatcher;
pub mod server;
pub mod tools;

pub use dispatcher::ToolDispatcher;
pub use server::McpServer;
