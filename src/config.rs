//! Server and operation configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding the `soffice` location.
pub const SOFFICE_ENV: &str = "SOFFICE_PATH";

/// Environment variable overriding the `pdftoppm` location.
pub const PDFTOPPM_ENV: &str = "PDFTOPPM_PATH";

/// Fewest and most columns a thumbnail grid may have.
pub const MIN_GRID_COLS: u32 = 3;
pub const MAX_GRID_COLS: u32 = 6;

/// Locations of the external programs used for rendering and validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalTools {
    /// LibreOffice `soffice`
    pub soffice: Option<PathBuf>,
    /// Poppler `pdftoppm`
    pub pdftoppm: Option<PathBuf>,
    /// ImageMagick `convert`
    pub convert: Option<PathBuf>,
}

impl ExternalTools {
    /// Resolve each tool from its environment override, then `PATH`.
    pub fn detect() -> Self {
        Self {
            soffice: locate(Some(SOFFICE_ENV), &["soffice", "libreoffice"]),
            pdftoppm: locate(Some(PDFTOPPM_ENV), &["pdftoppm"]),
            convert: locate(None, &["convert"]),
        }
    }

    /// Set the `soffice` location.
    pub fn with_soffice(mut self, path: impl Into<PathBuf>) -> Self {
        self.soffice = Some(path.into());
        self
    }

    /// Set the `pdftoppm` location.
    pub fn with_pdftoppm(mut self, path: impl Into<PathBuf>) -> Self {
        self.pdftoppm = Some(path.into());
        self
    }

    /// Set the `convert` location.
    pub fn with_convert(mut self, path: impl Into<PathBuf>) -> Self {
        self.convert = Some(path.into());
        self
    }
}

fn locate(env: Option<&str>, names: &[&str]) -> Option<PathBuf> {
    if let Some(path) = env
        .and_then(|var| std::env::var_os(var))
        .filter(|v| !v.is_empty())
    {
        return Some(PathBuf::from(path));
    }
    names.iter().find_map(|name| which::which(name).ok())
}

/// Options for thumbnail grids.
#[derive(Debug, Clone)]
pub struct ThumbnailOptions {
    /// Output path prefix; `.png` or `-<n>.png` is appended
    pub output_prefix: String,

    /// Grid columns, clamped to 3..=6
    pub cols: u32,

    /// Outline shapes that contain text
    pub outline_placeholders: bool,

    /// Resolution slides are rendered at
    pub dpi: u32,

    /// Slides per grid image
    pub max_per_grid: usize,

    /// Target grid width in pixels
    pub grid_width: u32,

    /// Time allowed for the PDF conversion
    pub convert_timeout: Duration,

    /// Time allowed for rasterizing the PDF
    pub raster_timeout: Duration,
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        Self {
            output_prefix: "thumbnails".to_string(),
            cols: 5,
            outline_placeholders: false,
            dpi: 150,
            max_per_grid: 60,
            grid_width: 2400,
            convert_timeout: Duration::from_secs(120),
            raster_timeout: Duration::from_secs(300),
        }
    }
}

impl ThumbnailOptions {
    /// Create default thumbnail options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.output_prefix = prefix.into();
        self
    }

    /// Set the column count (clamped to the supported range).
    pub fn with_cols(mut self, cols: u32) -> Self {
        self.cols = cols.clamp(MIN_GRID_COLS, MAX_GRID_COLS);
        self
    }

    /// Outline text shapes on each thumbnail.
    pub fn with_outlines(mut self, outline: bool) -> Self {
        self.outline_placeholders = outline;
        self
    }

    /// Column count within the supported range.
    pub fn columns(&self) -> u32 {
        self.cols.clamp(MIN_GRID_COLS, MAX_GRID_COLS)
    }

    /// Thumbnail size for a slide of `slide_width` × `slide_height`.
    pub fn thumb_size(&self, slide_width: i64, slide_height: i64) -> (u32, u32) {
        let width = self.grid_width / (self.columns() + 1);
        let height = if slide_width > 0 {
            (width as f64 * slide_height as f64 / slide_width as f64) as u32
        } else {
            width * 3 / 4
        };
        (width, height.max(1))
    }
}

/// Settings of the tool server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Name reported in `initialize`
    pub name: String,

    /// Version reported in `initialize`
    pub version: String,

    /// External programs
    pub tools: ExternalTools,

    /// Time allowed for the `soffice` check after packing
    pub pack_validation_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "pptx-mcp-server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            tools: ExternalTools::default(),
            pack_validation_timeout: Duration::from_secs(30),
        }
    }
}

impl ServerConfig {
    /// Create a default configuration with external tools detected.
    pub fn new() -> Self {
        Self::default().with_tools(ExternalTools::detect())
    }

    /// Set external tool locations.
    pub fn with_tools(mut self, tools: ExternalTools) -> Self {
        self.tools = tools;
        self
    }

    /// Set the reported server name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}
