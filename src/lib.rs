//! # slidedeck
//!
//! Create, inspect and edit PowerPoint presentations, and expose those
//! operations as tools over the Model Context Protocol.
//!
//! The library works directly on the OOXML package: slides are XML parts in
//! a ZIP archive, and every operation reads and rewrites those parts.
//!
//! ## Quick Start
//!
//! ```no_run
//! use slidedeck::create::{create_presentation, PresentationSpec};
//! use slidedeck::inventory::{extract_text_inventory, to_json, JsonFormat};
//!
//! // Build a deck from a JSON description
//! let spec: PresentationSpec = serde_json::from_str(
//!     r#"{"slides": [{"shapes": [{"type": "textbox", "text": "Hello"}]}]}"#,
//! )?;
//! create_presentation("deck.pptx", &spec)?;
//!
//! // List its text, with overflow and overlap warnings
//! let inventory = extract_text_inventory("deck.pptx", false)?;
//! println!("{}", to_json(&inventory, JsonFormat::Pretty)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Editing
//!
//! ```no_run
//! use slidedeck::{rearrange, replace};
//!
//! // Keep slide 2, then two copies of slide 0
//! rearrange::rearrange_presentation("deck.pptx", "reordered.pptx", &[2, 0, 0])?;
//!
//! // Rewrite the text of one shape and clear the others
//! let replacements = replace::load_replacements(
//!     r#"{"slide-0": {"shape-0": [{"text": "New title", "bold": true}]}}"#,
//! )?;
//! replace::apply_replacements("reordered.pptx", &replacements, "final.pptx", true)?;
//! # Ok::<(), slidedeck::Error>(())
//! ```
//!
//! ## Tool server
//!
//! ```no_run
//! use slidedeck::{McpServer, ServerConfig};
//!
//! # async fn run() -> slidedeck::Result<()> {
//! McpServer::new(ServerConfig::new()).run_stdio().await
//! # }
//! ```

pub mod archive;
pub mod config;
pub mod container;
pub mod create;
pub mod detect;
pub mod error;
pub mod inventory;
pub mod mcp;
pub mod presentation;
pub mod rearrange;
pub mod replace;
pub mod thumbnail;
pub mod xml;

// Re-exports
pub use config::{ExternalTools, ServerConfig, ThumbnailOptions};
pub use container::{Package, Relationship, Relationships};
pub use detect::{detect_format_from_bytes, detect_format_from_path, FormatType};
pub use error::{Error, Result};
pub use inventory::{Inventory, ParagraphData, ShapeData, SlideInventory};
pub use mcp::McpServer;
pub use presentation::{Presentation, Rect};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create::{build_presentation, PresentationSpec};

    #[test]
    fn test_format_detection_pptx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.pptx");
        build_presentation(&PresentationSpec::default())
            .unwrap()
            .save(&path)
            .unwrap();

        assert_eq!(detect_format_from_path(&path).unwrap(), FormatType::Pptx);
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(detect_format_from_bytes(&bytes).unwrap(), FormatType::Pptx);
    }
}
