//! Combined tool catalog across servers.

use super::RegisteredTool;
use crate::model::ToolSpec;

/// The union of every server's advertised tools.
///
/// Tool names are unique: when two servers advertise the same name the
/// first registration wins.
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    tools: Vec<RegisteredTool>,
    specs: Vec<ToolSpec>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the tools one server advertised. Returns how many were added.
    pub fn register(&mut self, server_name: &str, specs: Vec<ToolSpec>) -> usize {
        let mut added = 0;
        for spec in specs {
            if let Some(existing) = self.get(&spec.name) {
                tracing::warn!(
                    tool = %spec.name,
                    server = server_name,
                    registered_by = %existing.server_name,
                    "duplicate tool name; keeping the first registration"
                );
                continue;
            }
            self.specs.push(spec.clone());
            self.tools.push(RegisteredTool {
                spec,
                server_name: server_name.to_string(),
            });
            added += 1;
        }
        added
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.iter().find(|tool| tool.spec.name == name)
    }

    pub fn specs(&self) -> &[ToolSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
