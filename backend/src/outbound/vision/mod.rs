//! Image captioning and tagging adapter.
//!
//! Thin HTTP implementation of the `ImageAnalyzer` port.

mod dto;
mod http_analyzer;

pub use http_analyzer::AzureVisionAnalyzer;
