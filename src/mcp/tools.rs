//! Tool definitions and handlers.
//!
//! Handlers are synchronous: they open, edit and write files, and may run
//! external programs. The server calls them on the blocking thread pool.
//! Every outcome, including failures, is reported as a [`ToolResult`].

use super::protocol::ToolResult;
use crate::archive;
use crate::config::{ServerConfig, ThumbnailOptions, MAX_GRID_COLS, MIN_GRID_COLS};
use crate::create::{self, PresentationSpec};
use crate::error::Error;
use crate::inventory::{self, JsonFormat};
use crate::rearrange;
use crate::replace;
use crate::thumbnail;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CREATE_PRESENTATION: &str = "create_presentation";
pub const EXTRACT_TEXT_INVENTORY: &str = "extract_text_inventory";
pub const APPLY_TEXT_REPLACEMENTS: &str = "apply_text_replacements";
pub const REARRANGE_SLIDES: &str = "rearrange_slides";
pub const CREATE_THUMBNAIL_GRID: &str = "create_thumbnail_grid";
pub const UNPACK_OFFICE_DOCUMENT: &str = "unpack_office_document";
pub const PACK_OFFICE_DOCUMENT: &str = "pack_office_document";
pub const VALIDATE_OFFICE_DOCUMENT: &str = "validate_office_document";

/// A tool as listed by `tools/list`.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Every tool the server offers, in listing order.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: CREATE_PRESENTATION,
            description: "Create a new PowerPoint presentation from scratch. \
                Accepts a JSON specification with slides, shapes, text content, and formatting. \
                Supports text boxes, rectangles, ovals, images, and various text formatting options. \
                Use this to create new presentations before using other tools to modify them.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "output_path": {
                        "type": "string",
                        "description": "Path to save the new PowerPoint file (.pptx)"
                    },
                    "layout": {
                        "type": "string",
                        "description": "Slide layout: '16:9' (default), '4:3', 'widescreen', or 'standard'",
                        "default": "16:9"
                    },
                    "slides": {
                        "type": "array",
                        "description": "Array of slide specifications",
                        "items": {
                            "type": "object",
                            "properties": {
                                "background": {
                                    "type": "string",
                                    "description": "Background color (hex, e.g., '#FFFFFF')"
                                },
                                "shapes": {
                                    "type": "array",
                                    "description": "Array of shape specifications",
                                    "items": shape_schema()
                                }
                            }
                        }
                    }
                },
                "required": ["output_path"]
            }),
        },
        ToolDefinition {
            name: EXTRACT_TEXT_INVENTORY,
            description: "Extract structured text content from a PowerPoint presentation. \
                Returns JSON with all text shapes, their positions, and formatting details. \
                Useful for understanding presentation structure before making replacements.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "pptx_path": {
                        "type": "string",
                        "description": "Path to the PowerPoint file (.pptx)"
                    },
                    "output_path": {
                        "type": "string",
                        "description": "Optional: Path to save the inventory JSON file"
                    },
                    "issues_only": {
                        "type": "boolean",
                        "description": "If true, only include shapes with overflow or overlap issues",
                        "default": false
                    }
                },
                "required": ["pptx_path"]
            }),
        },
        ToolDefinition {
            name: APPLY_TEXT_REPLACEMENTS,
            description: "Apply text replacements to a PowerPoint presentation using a JSON specification. \
                The JSON should map slide/shape IDs to new paragraph content with formatting. \
                All text shapes are cleared unless explicitly provided with new content.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "pptx_path": {
                        "type": "string",
                        "description": "Path to the input PowerPoint file"
                    },
                    "replacements_json": {
                        "type": "string",
                        "description": "Path to JSON file with replacement specifications, or inline JSON string"
                    },
                    "output_path": {
                        "type": "string",
                        "description": "Path for the output PowerPoint file"
                    }
                },
                "required": ["pptx_path", "replacements_json", "output_path"]
            }),
        },
        ToolDefinition {
            name: REARRANGE_SLIDES,
            description: "Rearrange slides in a PowerPoint presentation. \
                Can duplicate, delete, and reorder slides based on a sequence of indices. \
                Slide indices are 0-based. The same index can appear multiple times to duplicate.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "template_path": {
                        "type": "string",
                        "description": "Path to the template/input PowerPoint file"
                    },
                    "output_path": {
                        "type": "string",
                        "description": "Path for the output PowerPoint file"
                    },
                    "slide_sequence": {
                        "type": "string",
                        "description": "Comma-separated slide indices (0-based), e.g., '0,34,34,50,52'"
                    }
                },
                "required": ["template_path", "output_path", "slide_sequence"]
            }),
        },
        ToolDefinition {
            name: CREATE_THUMBNAIL_GRID,
            description: "Create visual thumbnail grids from PowerPoint slides. \
                Useful for quick visual analysis of presentation structure and layouts. \
                For large presentations, multiple grid images are created automatically.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "pptx_path": {
                        "type": "string",
                        "description": "Path to the PowerPoint file"
                    },
                    "output_prefix": {
                        "type": "string",
                        "description": "Output prefix for image files (default: 'thumbnails')",
                        "default": "thumbnails"
                    },
                    "cols": {
                        "type": "integer",
                        "description": "Number of columns in the grid (3-6, default: 5)",
                        "default": 5,
                        "minimum": MIN_GRID_COLS,
                        "maximum": MAX_GRID_COLS
                    },
                    "outline_placeholders": {
                        "type": "boolean",
                        "description": "Outline text placeholders with red borders",
                        "default": false
                    }
                },
                "required": ["pptx_path"]
            }),
        },
        ToolDefinition {
            name: UNPACK_OFFICE_DOCUMENT,
            description: "Unpack an Office document (.docx, .pptx, .xlsx) to a directory. \
                The XML files are pretty-printed for easy reading and editing. \
                Use this to inspect or manually edit the raw XML structure.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "office_file": {
                        "type": "string",
                        "description": "Path to the Office file (.docx, .pptx, or .xlsx)"
                    },
                    "output_dir": {
                        "type": "string",
                        "description": "Directory to extract contents to"
                    }
                },
                "required": ["office_file", "output_dir"]
            }),
        },
        ToolDefinition {
            name: PACK_OFFICE_DOCUMENT,
            description: "Pack a directory back into an Office document (.docx, .pptx, .xlsx). \
                Removes pretty-printing whitespace from XML before packing. \
                Can optionally validate the document before saving.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "input_dir": {
                        "type": "string",
                        "description": "Directory containing unpacked Office document"
                    },
                    "output_file": {
                        "type": "string",
                        "description": "Path for the output Office file"
                    },
                    "validate": {
                        "type": "boolean",
                        "description": "Validate the document after packing (requires LibreOffice)",
                        "default": false
                    },
                    "force": {
                        "type": "boolean",
                        "description": "Skip validation and pack anyway",
                        "default": false
                    }
                },
                "required": ["input_dir", "output_file"]
            }),
        },
        ToolDefinition {
            name: VALIDATE_OFFICE_DOCUMENT,
            description: "Validate an unpacked Office document. \
                Checks XML well-formedness, namespace declarations and file references, \
                plus slide layout links for presentations and text run structure for Word documents. \
                Returns detailed error messages for any issues found.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "unpacked_dir": {
                        "type": "string",
                        "description": "Path to unpacked Office document directory"
                    },
                    "original_file": {
                        "type": "string",
                        "description": "Path to original Office file for comparison"
                    },
                    "verbose": {
                        "type": "boolean",
                        "description": "Enable verbose output",
                        "default": false
                    }
                },
                "required": ["unpacked_dir", "original_file"]
            }),
        },
    ]
}

fn shape_schema() -> Value {
    let alignment = json!({"type": "string", "enum": ["left", "center", "right"]});
    json!({
        "type": "object",
        "properties": {
            "type": {
                "type": "string",
                "enum": ["textbox", "rectangle", "rounded_rectangle", "oval", "image", "line"],
                "description": "Shape type"
            },
            "left": {"type": "number", "description": "Left position in inches"},
            "top": {"type": "number", "description": "Top position in inches"},
            "width": {"type": "number", "description": "Width in inches"},
            "height": {"type": "number", "description": "Height in inches"},
            "text": {"type": "string", "description": "Text content (for simple text)"},
            "paragraphs": {
                "type": "array",
                "description": "Array of paragraph specs for multi-paragraph text",
                "items": {
                    "type": "object",
                    "properties": {
                        "text": {"type": "string"},
                        "font_size": {"type": "number"},
                        "font_name": {"type": "string"},
                        "bold": {"type": "boolean"},
                        "italic": {"type": "boolean"},
                        "color": {"type": "string"},
                        "alignment": alignment.clone(),
                        "bullet": {"type": "boolean"}
                    }
                }
            },
            "font_size": {"type": "number", "description": "Font size in points"},
            "font_name": {"type": "string", "description": "Font name"},
            "bold": {"type": "boolean"},
            "italic": {"type": "boolean"},
            "color": {"type": "string", "description": "Text color (hex)"},
            "fill": {"type": "string", "description": "Shape fill color (hex)"},
            "alignment": alignment,
            "path": {"type": "string", "description": "Image file path (for image shapes)"}
        }
    })
}

/// Arguments of `create_presentation`.
#[derive(Debug, Deserialize)]
pub struct CreateArgs {
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(flatten)]
    pub spec: PresentationSpec,
}

/// Arguments of `extract_text_inventory`.
#[derive(Debug, Deserialize)]
pub struct InventoryArgs {
    pub pptx_path: PathBuf,
    #[serde(default)]
    pub output_path: Option<PathBuf>,
    #[serde(default)]
    pub issues_only: bool,
}

/// Arguments of `apply_text_replacements`.
#[derive(Debug, Deserialize)]
pub struct ReplaceArgs {
    pub pptx_path: PathBuf,
    pub replacements_json: String,
    pub output_path: PathBuf,
}

/// Arguments of `rearrange_slides`.
#[derive(Debug, Deserialize)]
pub struct RearrangeArgs {
    pub template_path: PathBuf,
    pub output_path: PathBuf,
    pub slide_sequence: String,
}

fn default_prefix() -> String {
    ThumbnailOptions::default().output_prefix
}

fn default_cols() -> i64 {
    ThumbnailOptions::default().cols as i64
}

/// Arguments of `create_thumbnail_grid`.
#[derive(Debug, Deserialize)]
pub struct ThumbnailArgs {
    pub pptx_path: PathBuf,
    #[serde(default = "default_prefix")]
    pub output_prefix: String,
    #[serde(default = "default_cols")]
    pub cols: i64,
    #[serde(default)]
    pub outline_placeholders: bool,
}

/// Arguments of `unpack_office_document`.
#[derive(Debug, Deserialize)]
pub struct UnpackArgs {
    pub office_file: PathBuf,
    pub output_dir: PathBuf,
}

/// Arguments of `pack_office_document`.
#[derive(Debug, Deserialize)]
pub struct PackArgs {
    pub input_dir: PathBuf,
    pub output_file: PathBuf,
    #[serde(default)]
    pub validate: bool,
    #[serde(default)]
    pub force: bool,
}

/// Arguments of `validate_office_document`.
#[derive(Debug, Deserialize)]
pub struct ValidateArgs {
    pub unpacked_dir: PathBuf,
    pub original_file: PathBuf,
    #[serde(default)]
    pub verbose: bool,
}

/// Run tool `name` with JSON `arguments`.
pub fn call_tool(name: &str, arguments: Value, config: &ServerConfig) -> ToolResult {
    debug!(tool = name, "tool call");
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    match name {
        CREATE_PRESENTATION => with_args(name, arguments, create_presentation),
        EXTRACT_TEXT_INVENTORY => with_args(name, arguments, extract_text_inventory),
        APPLY_TEXT_REPLACEMENTS => with_args(name, arguments, apply_text_replacements),
        REARRANGE_SLIDES => with_args(name, arguments, rearrange_slides),
        CREATE_THUMBNAIL_GRID => with_args(name, arguments, |args| create_thumbnail_grid(args, config)),
        UNPACK_OFFICE_DOCUMENT => with_args(name, arguments, unpack_office_document),
        PACK_OFFICE_DOCUMENT => with_args(name, arguments, |args| pack_office_document(args, config)),
        VALIDATE_OFFICE_DOCUMENT => with_args(name, arguments, validate_office_document),
        _ => ToolResult::error(format!("Unknown tool: {}", name)),
    }
}

fn with_args<A: DeserializeOwned>(
    name: &str,
    arguments: Value,
    handler: impl FnOnce(A) -> ToolResult,
) -> ToolResult {
    match serde_json::from_value::<A>(arguments) {
        Ok(args) => handler(args),
        Err(e) => {
            warn!(tool = name, error = %e, "invalid tool arguments");
            ToolResult::error(format!("Error: Invalid arguments for {}: {}", name, e))
        }
    }
}

fn create_presentation(args: CreateArgs) -> ToolResult {
    let Some(output_path) = args.output_path.filter(|p| !p.is_empty()) else {
        return ToolResult::error("Error: output_path is required");
    };
    match create::create_presentation(&output_path, &args.spec) {
        Ok(message) => ToolResult::text(message),
        Err(e) => ToolResult::error(format!("Error creating presentation: {}", e)),
    }
}

fn extract_text_inventory(args: InventoryArgs) -> ToolResult {
    if let Some(error) = check_pptx_input(&args.pptx_path) {
        return error;
    }
    let result = inventory::extract_text_inventory(&args.pptx_path, args.issues_only).and_then(|inv| {
        match &args.output_path {
            Some(output) => inventory::save_inventory(&inv, output),
            None => inventory::to_json(&inv, JsonFormat::Pretty),
        }
    });
    match result {
        Ok(text) => ToolResult::text(text),
        Err(e) => ToolResult::error(format!("Error: {}", e)),
    }
}

fn apply_text_replacements(args: ReplaceArgs) -> ToolResult {
    if !args.pptx_path.exists() {
        return ToolResult::error(format!("Error: Input file not found: {}", args.pptx_path.display()));
    }
    let replacements = match replace::load_replacements(&args.replacements_json) {
        Ok(value) => value,
        Err(Error::Json(_)) => return ToolResult::error("Error: Invalid JSON in replacements_json"),
        Err(e) => return ToolResult::error(format!("Error applying replacements: {}", e)),
    };
    match replace::apply_replacements(&args.pptx_path, &replacements, &args.output_path, true) {
        Ok(()) => ToolResult::text(format!(
            "Successfully applied replacements. Output saved to: {}",
            args.output_path.display()
        )),
        Err(e @ Error::Validation(_)) => ToolResult::error(format!("Validation error: {}", e)),
        Err(e) => ToolResult::error(format!("Error applying replacements: {}", e)),
    }
}

fn rearrange_slides(args: RearrangeArgs) -> ToolResult {
    if !args.template_path.exists() {
        return ToolResult::error(format!(
            "Error: Template file not found: {}",
            args.template_path.display()
        ));
    }
    let result = rearrange::parse_sequence(&args.slide_sequence).and_then(|sequence| {
        rearrange::rearrange_presentation(&args.template_path, &args.output_path, &sequence)
    });
    match result {
        Ok(()) => ToolResult::text(format!(
            "Successfully rearranged slides. Output saved to: {}",
            args.output_path.display()
        )),
        Err(Error::InvalidData(msg)) => ToolResult::error(format!("Error: {}", msg)),
        Err(e) => ToolResult::error(format!("Error rearranging slides: {}", e)),
    }
}

fn create_thumbnail_grid(args: ThumbnailArgs, config: &ServerConfig) -> ToolResult {
    if let Some(error) = check_pptx_input(&args.pptx_path) {
        return error;
    }
    let cols = args.cols.clamp(MIN_GRID_COLS as i64, MAX_GRID_COLS as i64) as u32;
    let options = ThumbnailOptions::new()
        .with_prefix(args.output_prefix)
        .with_cols(cols)
        .with_outlines(args.outline_placeholders);
    match thumbnail::create_thumbnail_grids(&args.pptx_path, &options, &config.tools) {
        Ok(paths) => ToolResult::text(thumbnail::summary(&paths)),
        Err(e) => ToolResult::error(format!("Error creating thumbnails: {}", e)),
    }
}

fn unpack_office_document(args: UnpackArgs) -> ToolResult {
    if !args.office_file.exists() {
        return ToolResult::error(format!("Error: File not found: {}", args.office_file.display()));
    }
    match archive::unpack_document(&args.office_file, &args.output_dir) {
        Ok(message) => ToolResult::text(message),
        Err(e) => ToolResult::error(format!("Error unpacking document: {}", e)),
    }
}

fn pack_office_document(args: PackArgs, config: &ServerConfig) -> ToolResult {
    if !args.input_dir.is_dir() {
        return ToolResult::error(format!(
            "Error: Directory not found: {}",
            args.input_dir.display()
        ));
    }
    let validate = args.validate && !args.force;
    match archive::pack_document(&args.input_dir, &args.output_file, validate, config) {
        Ok(true) => {
            let mut message = format!("Successfully packed document: {}", args.output_file.display());
            if args.force {
                message.push_str("\nWarning: Validation was skipped");
            }
            ToolResult::text(message)
        }
        Ok(false) => ToolResult::error(
            "Error: Validation failed. Document may be corrupt. Use force=true to pack anyway.",
        ),
        Err(Error::UnsupportedFormat(msg)) | Err(Error::InvalidData(msg)) => {
            ToolResult::error(format!("Error: {}", msg))
        }
        Err(e) => ToolResult::error(format!("Error packing document: {}", e)),
    }
}

fn validate_office_document(args: ValidateArgs) -> ToolResult {
    if !args.unpacked_dir.is_dir() {
        return ToolResult::error(format!(
            "Error: Directory not found: {}",
            args.unpacked_dir.display()
        ));
    }
    if !args.original_file.exists() {
        return ToolResult::error(format!(
            "Error: Original file not found: {}",
            args.original_file.display()
        ));
    }
    match archive::validate_document(&args.unpacked_dir, &args.original_file, args.verbose) {
        Ok((true, messages)) if messages.is_empty() => ToolResult::text("All validations PASSED!"),
        Ok((true, messages)) => {
            ToolResult::text(format!("All validations PASSED!\n{}", messages.join("\n")))
        }
        Ok((false, messages)) => {
            ToolResult::text(format!("Validation FAILED:\n{}", messages.join("\n")))
        }
        Err(e) => ToolResult::error(format!("Error validating document: {}", e)),
    }
}

fn check_pptx_input(path: &Path) -> Option<ToolResult> {
    if !path.exists() {
        return Some(ToolResult::error(format!("Error: File not found: {}", path.display())));
    }
    let is_pptx = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pptx"));
    if !is_pptx {
        return Some(ToolResult::error("Error: Input must be a PowerPoint file (.pptx)"));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExternalTools;

    fn config() -> ServerConfig {
        ServerConfig::default().with_tools(ExternalTools::default())
    }

    fn call(name: &str, args: Value) -> ToolResult {
        call_tool(name, args, &config())
    }

    #[test]
    fn test_definitions() {
        let tools = tool_definitions();
        let names: Vec<&str> = tools.iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            [
                "create_presentation",
                "extract_text_inventory",
                "apply_text_replacements",
                "rearrange_slides",
                "create_thumbnail_grid",
                "unpack_office_document",
                "pack_office_document",
                "validate_office_document"
            ]
        );
        for tool in &tools {
            assert_eq!(tool.input_schema["type"], "object");
            assert!(tool.input_schema["required"].is_array());
        }
    }

    #[test]
    fn test_unknown_tool() {
        let result = call("make_coffee", json!({}));
        assert!(result.is_error);
        assert_eq!(result.text_content(), "Unknown tool: make_coffee");
    }

    #[test]
    fn test_create_requires_output() {
        let result = call(CREATE_PRESENTATION, json!({"slides": []}));
        assert!(result.is_error);
        assert_eq!(result.text_content(), "Error: output_path is required");
    }

    #[test]
    fn test_missing_required_argument() {
        let result = call(REARRANGE_SLIDES, json!({"template_path": "a.pptx"}));
        assert!(result.is_error);
        assert!(result.text_content().contains("Invalid arguments for rearrange_slides"));
    }

    #[test]
    fn test_create_then_inventory() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("deck.pptx");
        let result = call(
            CREATE_PRESENTATION,
            json!({
                "output_path": output,
                "slides": [{"shapes": [{"type": "textbox", "text": "Hi"}]}]
            }),
        );
        assert!(!result.is_error, "{}", result.text_content());

        let result = call(EXTRACT_TEXT_INVENTORY, json!({"pptx_path": output}));
        assert!(!result.is_error);
        let inventory: Value = serde_json::from_str(&result.text_content()).unwrap();
        assert_eq!(inventory["slide-0"]["shape-0"]["paragraphs"][0]["text"], "Hi");
    }

    #[test]
    fn test_inventory_input_checks() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("none.pptx");
        let result = call(EXTRACT_TEXT_INVENTORY, json!({"pptx_path": missing}));
        assert!(result.text_content().starts_with("Error: File not found: "));

        let doc = dir.path().join("a.docx");
        std::fs::write(&doc, b"x").unwrap();
        let result = call(CREATE_THUMBNAIL_GRID, json!({"pptx_path": doc}));
        assert_eq!(result.text_content(), "Error: Input must be a PowerPoint file (.pptx)");
    }

    #[test]
    fn test_replace_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let deck = dir.path().join("deck.pptx");
        call(CREATE_PRESENTATION, json!({"output_path": deck}));
        let result = call(
            APPLY_TEXT_REPLACEMENTS,
            json!({
                "pptx_path": deck,
                "replacements_json": "{not json",
                "output_path": dir.path().join("out.pptx")
            }),
        );
        assert!(result.is_error);
        assert_eq!(result.text_content(), "Error: Invalid JSON in replacements_json");
    }

    #[test]
    fn test_rearrange_messages() {
        let dir = tempfile::tempdir().unwrap();
        let deck = dir.path().join("deck.pptx");
        call(CREATE_PRESENTATION, json!({"output_path": deck}));

        let result = call(
            REARRANGE_SLIDES,
            json!({"template_path": deck, "output_path": dir.path().join("o.pptx"), "slide_sequence": "0,x"}),
        );
        assert_eq!(
            result.text_content(),
            "Error: Invalid sequence format. Use comma-separated integers (e.g., 0,34,34,50,52)"
        );

        let result = call(
            REARRANGE_SLIDES,
            json!({"template_path": deck, "output_path": dir.path().join("o.pptx"), "slide_sequence": "0,3"}),
        );
        assert_eq!(
            result.text_content(),
            "Error: Slide index 3 out of range. Presentation has 1 slides (indices 0-0)"
        );

        let result = call(
            REARRANGE_SLIDES,
            json!({"template_path": deck, "output_path": dir.path().join("o.pptx"), "slide_sequence": "0,-1"}),
        );
        assert_eq!(
            result.text_content(),
            "Error: Slide index -1 out of range. Presentation has 1 slides (indices 0-0)"
        );

        let result = call(
            REARRANGE_SLIDES,
            json!({"template_path": deck, "output_path": dir.path().join("o.pptx"), "slide_sequence": "0,0"}),
        );
        assert!(!result.is_error);
        assert!(result.text_content().starts_with("Successfully rearranged slides."));
    }

    #[test]
    fn test_pack_force_and_validate() {
        let dir = tempfile::tempdir().unwrap();
        let deck = dir.path().join("deck.pptx");
        call(CREATE_PRESENTATION, json!({"output_path": deck}));
        let unpacked = dir.path().join("unpacked");
        let result = call(UNPACK_OFFICE_DOCUMENT, json!({"office_file": deck, "output_dir": unpacked}));
        assert!(result.text_content().starts_with("Extracted to: "));

        let result = call(VALIDATE_OFFICE_DOCUMENT, json!({"unpacked_dir": unpacked, "original_file": deck}));
        assert_eq!(result.text_content(), "All validations PASSED!");

        let out = dir.path().join("packed.pptx");
        let result = call(
            PACK_OFFICE_DOCUMENT,
            json!({"input_dir": unpacked, "output_file": out, "validate": true, "force": true}),
        );
        assert_eq!(
            result.text_content(),
            format!("Successfully packed document: {}\nWarning: Validation was skipped", out.display())
        );

        let result = call(
            PACK_OFFICE_DOCUMENT,
            json!({"input_dir": dir.path().join("nope"), "output_file": out}),
        );
        assert!(result.text_content().starts_with("Error: Directory not found: "));
    }
}
