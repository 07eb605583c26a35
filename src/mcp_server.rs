use crate::client::RagClient;
use crate::types::*;

use anyhow::{Context, Result};
use rmcp::{
    RoleServer, ServerHandler, ServiceExt,
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::*,
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct RagMcpServer {
    client: Arc<RagClient>,
    tool_router: ToolRouter<Self>,
}

impl RagMcpServer {
    pub async fn new(config_path: Option<&Path>) -> Result<Self> {
        let client = RagClient::new(config_path)
            .await
            .context("Failed to initialize client")?;
        Ok(Self::with_client(Arc::new(client)))
    }

    pub fn with_client(client: Arc<RagClient>) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }

    pub fn client(&self) -> &RagClient {
        &self.client
    }

    pub(crate) async fn run_index_project(
        &self,
        req: IndexProjectRequest,
        cancel: &CancellationToken,
    ) -> Result<String, String> {
        req.validate()?;

        let stats = self
            .client
            .index_project_cancellable(&req.path, cancel)
            .await
            .map_err(|e| format!("{:#}", e))?; // Use alternate display to show full error chain

        Ok(stats.to_report())
    }

    pub(crate) async fn run_codebase_search(
        &self,
        req: CodebaseSearchRequest,
        cancel: &CancellationToken,
    ) -> Result<String, String> {
        req.validate()?;
        let limit = req.effective_limit(self.client.config().search.limit)?;

        self.client
            .codebase_search(&req.query, limit, cancel)
            .await
            .map_err(|e| format!("{:#}", e))
    }
}

#[tool_router(router = tool_router)]
impl RagMcpServer {
    #[tool(
        description = "Index a project directory: extract every function and method, embed it and store it for semantic search. Re-indexing overwrites existing entries."
    )]
    async fn index_project(
        &self,
        ctx: RequestContext<RoleServer>,
        Parameters(req): Parameters<IndexProjectRequest>,
    ) -> Result<String, String> {
        self.run_index_project(req, &ctx.ct).await
    }

    #[tool(
        description = "Search the indexed codebase with a natural-language query. Returns the most similar functions with file, line and score."
    )]
    async fn codebase_search(
        &self,
        ctx: RequestContext<RoleServer>,
        Parameters(req): Parameters<CodebaseSearchRequest>,
    ) -> Result<String, String> {
        self.run_codebase_search(req, &ctx.ct).await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for RagMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "codebase-index".into(),
                title: Some("Codebase Index - Semantic Code Search".into()),
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Semantic search over a source tree. \
                Use index_project once per project (and again after changes), \
                then codebase_search to find relevant functions."
                    .into(),
            ),
        }
    }
}

impl RagMcpServer {
    pub async fn serve_stdio(config_path: Option<&Path>) -> Result<()> {
        tracing::info!("Starting codebase-index MCP server");

        let server = Self::new(config_path)
            .await
            .context("Failed to create MCP server")?;

        let transport = rmcp::transport::io::stdio();

        server.serve(transport).await?.waiting().await?;

        Ok(())
    }
}
