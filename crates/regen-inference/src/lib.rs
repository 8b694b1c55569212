//! Vision inference client.
//!
//! Sends an image plus a structured-extraction instruction to a ranked list
//! of remote vision models, trying candidates strictly in priority order,
//! and enforces the JSON contract on the free-text reply client-side.

pub mod client;
pub mod gemini;
pub mod image;
pub mod transport;

pub use client::{DEFAULT_MODEL_PRIORITY, VisionClient};
pub use gemini::GeminiTransport;
pub use image::ImageRef;
pub use transport::{ContentPart, ModelTransport};
