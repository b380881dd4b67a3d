//! MCP service exposing `get_weather`.

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};
use rmcp::{ErrorData as McpError, ServerHandler, schemars, tool, tool_handler, tool_router};
use serde::Deserialize;

use crate::client::WeatherClient;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetWeatherRequest {
    /// City name or location (e.g. "London", "New York", "California").
    pub location: String,
}

#[derive(Clone)]
pub struct WeatherServer {
    client: WeatherClient,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl WeatherServer {
    pub fn new(client: WeatherClient) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Get the current weather for a specific location.")]
    async fn get_weather(
        &self,
        Parameters(GetWeatherRequest { location }): Parameters<GetWeatherRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(%location, "get_weather");
        let text = self.client.current(&location).await;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

#[tool_handler]
impl ServerHandler for WeatherServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some("Current weather conditions from weatherapi.com.".into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
