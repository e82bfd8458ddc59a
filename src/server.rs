//! MCP server implementation with tool routing.

use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, Implementation, InitializeResult, JsonObject,
    ListToolsResult, PaginatedRequestParams, ServerCapabilities, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, ServerHandler};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::tools::{self, RenderedImage};

/// PDF Tools MCP Server.
///
/// Stateless: every tool call opens the PDF it names and releases it before
/// returning.
#[derive(Clone)]
pub struct PdfToolsServer {
    config: Arc<ServerConfig>,
}

impl PdfToolsServer {
    /// Create a server with default limits.
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    /// Create a server with explicit limits.
    pub fn with_config(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    fn make_tool(name: &str, description: &str, schema: Value) -> Tool {
        Tool {
            name: Cow::Owned(name.to_string()),
            title: None,
            description: Some(Cow::Owned(description.to_string())),
            input_schema: Arc::new(serde_json::from_value(schema).unwrap_or_default()),
            output_schema: None,
            annotations: None,
            icons: None,
            meta: None,
        }
    }

    fn rect_schema() -> Value {
        serde_json::json!({
            "type": "object",
            "description": "Crop rectangle in page coordinates (points, origin at the top-left corner). Must overlap the page rectangle.",
            "properties": {
                "left": { "type": "number" },
                "top": { "type": "number" },
                "right": { "type": "number" },
                "bottom": { "type": "number" }
            },
            "required": ["left", "top", "right", "bottom"]
        })
    }

    /// Definitions of every tool the server exposes.
    pub fn tool_definitions() -> Vec<Tool> {
        vec![
            Self::make_tool(
                "read_pdf",
                "Read a PDF file and return its text content as Markdown. Pages are separated by a '-----' line. If output_path is given, the same text is also saved there.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "path": { "type": "string", "description": "Full path to the PDF file" },
                        "pages": {
                            "type": "array",
                            "items": { "type": "integer" },
                            "description": "Pages to read (0-indexed). Defaults to all pages."
                        },
                        "output_path": { "type": "string", "description": "Optional file to save the text to" }
                    },
                    "required": ["path"]
                }),
            ),
            Self::make_tool(
                "get_page_rect",
                "Get the page rectangle of a PDF in points. Without 'page', returns the rectangle shared by all pages and fails if page sizes differ. Useful before cropping, since crop rectangles must overlap the page rectangle.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "path": { "type": "string", "description": "Full path to the PDF file" },
                        "page": { "type": "integer", "description": "Page number (0-indexed)" }
                    },
                    "required": ["path"]
                }),
            ),
            Self::make_tool(
                "crop_pdf",
                "Extract the text inside a rectangle of one page as Markdown. The rectangle is clipped to the page.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "path": { "type": "string", "description": "Full path to the PDF file" },
                        "page": { "type": "integer", "description": "Page number (0-indexed)" },
                        "rect": Self::rect_schema()
                    },
                    "required": ["path", "page", "rect"]
                }),
            ),
            Self::make_tool(
                "get_pdf_image",
                "Render a page of a PDF to a PNG image.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "path": { "type": "string", "description": "Full path to the PDF file" },
                        "page": { "type": "integer", "description": "Page number (0-indexed)" },
                        "scale": { "type": "number", "default": 1.0, "description": "Scale factor (1.0 = 72 DPI), must be > 0" },
                        "output_path": { "type": "string", "description": "Optional file to save the PNG to" }
                    },
                    "required": ["path", "page"]
                }),
            ),
            Self::make_tool(
                "get_cropped_pdf_image",
                "Render the part of a page inside a rectangle to a PNG image. The rectangle is clipped to the page.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "path": { "type": "string", "description": "Full path to the PDF file" },
                        "page": { "type": "integer", "description": "Page number (0-indexed)" },
                        "rect": Self::rect_schema(),
                        "scale": { "type": "number", "default": 1.0, "description": "Scale factor (1.0 = 72 DPI), must be > 0" },
                        "output_path": { "type": "string", "description": "Optional file to save the PNG to" }
                    },
                    "required": ["path", "page", "rect"]
                }),
            ),
            Self::make_tool(
                "get_pdf_summary",
                "Summarise a PDF: page count, total text size, table of contents and first page size.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "path": { "type": "string", "description": "Full path to the PDF file" }
                    },
                    "required": ["path"]
                }),
            ),
        ]
    }

    fn parse<P: DeserializeOwned>(args: JsonObject) -> Result<P, McpError> {
        serde_json::from_value(Value::Object(args))
            .map_err(|e| McpError::invalid_params(e.to_string(), None))
    }

    fn image_content(image: RenderedImage) -> crate::Result<Vec<Content>> {
        let metadata = serde_json::to_string(&image.metadata())?;
        Ok(vec![
            Content::image(image.to_base64_png()?, "image/png"),
            Content::text(metadata),
        ])
    }

    /// Run a tool by name with raw JSON arguments.
    ///
    /// Unknown tools and malformed arguments are protocol errors; failures
    /// inside a tool are reported as an error result.
    pub async fn dispatch(&self, name: &str, args: JsonObject) -> Result<CallToolResult, McpError> {
        let config = Arc::clone(&self.config);

        // MuPDF handles are !Send, so each call runs start to finish on a blocking thread.
        let task: Box<dyn FnOnce() -> crate::Result<Vec<Content>> + Send> = match name {
            "read_pdf" => {
                let params: tools::ReadPdfParams = Self::parse(args)?;
                Box::new(move || tools::read_pdf(params).map(|r| vec![Content::text(r)]))
            }
            "get_page_rect" => {
                let params: tools::GetPageRectParams = Self::parse(args)?;
                Box::new(move || {
                    let rect = tools::get_page_rect(params)?;
                    Ok(vec![Content::text(serde_json::to_string(&rect)?)])
                })
            }
            "crop_pdf" => {
                let params: tools::CropPdfParams = Self::parse(args)?;
                Box::new(move || tools::crop_pdf(params).map(|r| vec![Content::text(r)]))
            }
            "get_pdf_image" => {
                let params: tools::GetPdfImageParams = Self::parse(args)?;
                Box::new(move || Self::image_content(tools::get_pdf_image(&config, params)?))
            }
            "get_cropped_pdf_image" => {
                let params: tools::GetCroppedPdfImageParams = Self::parse(args)?;
                Box::new(move || {
                    Self::image_content(tools::get_cropped_pdf_image(&config, params)?)
                })
            }
            "get_pdf_summary" => {
                let params: tools::GetPdfSummaryParams = Self::parse(args)?;
                Box::new(move || {
                    let summary = tools::get_pdf_summary(params)?;
                    Ok(vec![Content::text(serde_json::to_string(&summary)?)])
                })
            }
            _ => return Err(McpError::invalid_params(format!("Unknown tool: {}", name), None)),
        };

        let result = tokio::task::spawn_blocking(task)
            .await
            .map_err(|e| McpError::internal_error(format!("{} task failed: {}", name, e), None))?;

        match result {
            Ok(content) => Ok(CallToolResult::success(content)),
            Err(e) => {
                tracing::warn!(tool = name, error = %e, "tool call failed");
                Ok(CallToolResult::error(vec![Content::text(format!(
                    "{} failed: {}",
                    name, e
                ))]))
            }
        }
    }
}

impl Default for PdfToolsServer {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerHandler for PdfToolsServer {
    fn get_info(&self) -> InitializeResult {
        InitializeResult {
            protocol_version: Default::default(),
            server_info: Implementation {
                name: "pdf-tools-mcp-server".to_string(),
                title: Some("PDF Tools".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "PDF inspection tools backed by MuPDF. Every tool takes the full path of a PDF file; \
                 page numbers start at 0. Use get_page_rect first to learn the page size (in points, \
                 origin at the top-left corner) before cropping with crop_pdf or get_cropped_pdf_image."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_
    {
        async move {
            Ok(ListToolsResult {
                tools: Self::tool_definitions(),
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        let name = request.name.clone();
        let args = request.arguments.clone().unwrap_or_default();

        async move { self.dispatch(name.as_ref(), args).await }
    }
}
