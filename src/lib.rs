//! PDF Tools MCP Server library.
//!
//! This library provides an MCP server that exposes PDF text extraction,
//! page geometry, cropping and rasterisation tools using MuPDF. Every tool
//! call opens its document, does its work and releases it before returning.

pub mod config;
pub mod document;
pub mod error;
pub mod geometry;
pub mod markdown;
pub mod server;
pub mod tools;

pub use config::ServerConfig;
pub use error::{PdfToolsError, Result};
pub use geometry::Bounds;
pub use server::PdfToolsServer;
