//! Infrastructure adapters for VOXPOP: the Gemini HTTP client, the
//! configuration file, and spreadsheet ingestion.

pub mod config;
pub mod gemini;
pub mod spreadsheet;

pub use config::{Config, ConfigService};
pub use gemini::GeminiClient;
