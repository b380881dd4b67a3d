//! Arithmetic tools served over MCP.

mod server;

pub use server::{MathServer, Operands};
