//! Office document kind detection.
//!
//! The archive tools accept Word, Excel and PowerPoint packages; the
//! presentation tools only PowerPoint. Detection looks at the file extension
//! first and can confirm it against the package's main content type.

use crate::container::{content_types, decode_xml_bytes, ContentTypes, CONTENT_TYPES_PART};
use crate::error::{Error, Result};
use std::io::{Cursor, Read, Seek};
use std::path::Path;

/// ZIP file magic bytes: PK\x03\x04
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

const DOCX_MAIN: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
const XLSX_MAIN: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";

/// Kind of Office package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatType {
    /// Word document (.docx)
    Docx,
    /// Excel workbook (.xlsx)
    Xlsx,
    /// PowerPoint presentation (.pptx)
    Pptx,
}

impl FormatType {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatType::Docx => "docx",
            FormatType::Xlsx => "xlsx",
            FormatType::Pptx => "pptx",
        }
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            FormatType::Docx => "Word Document",
            FormatType::Xlsx => "Excel Workbook",
            FormatType::Pptx => "PowerPoint Presentation",
        }
    }

    /// Top-level folder holding the main part.
    pub fn content_dir(&self) -> &'static str {
        match self {
            FormatType::Docx => "word",
            FormatType::Xlsx => "xl",
            FormatType::Pptx => "ppt",
        }
    }

    /// Map an extension (with or without dot, any case).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "docx" => Some(FormatType::Docx),
            "xlsx" => Some(FormatType::Xlsx),
            "pptx" => Some(FormatType::Pptx),
            _ => None,
        }
    }

    /// Map the extension of a path.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

impl std::fmt::Display for FormatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Require a supported Office extension on `path`.
pub fn require_office_extension(path: impl AsRef<Path>) -> Result<FormatType> {
    let path = path.as_ref();
    FormatType::from_path(path).ok_or_else(|| {
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        Error::UnsupportedFormat(format!(
            "Invalid file type: {}. Must be one of .docx, .pptx, .xlsx",
            ext
        ))
    })
}

/// Detect the format of a package on disk by its content.
pub fn detect_format_from_path(path: impl AsRef<Path>) -> Result<FormatType> {
    let data = std::fs::read(path.as_ref())?;
    detect_format_from_bytes(&data)
}

/// Detect the format of package bytes.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<FormatType> {
    if !is_zip_file(data) {
        return Err(Error::UnknownFormat);
    }
    detect_format_from_reader(Cursor::new(data))
}

/// Detect the format from a seekable ZIP reader.
pub fn detect_format_from_reader<R: Read + Seek>(reader: R) -> Result<FormatType> {
    let mut archive = zip::ZipArchive::new(reader)?;

    let types = match archive.by_name(CONTENT_TYPES_PART) {
        Ok(mut file) => {
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;
            ContentTypes::parse(&decode_xml_bytes(&bytes)?)?
        }
        Err(_) => return Err(Error::MissingComponent(CONTENT_TYPES_PART.to_string())),
    };

    for (_, ct) in &types.overrides {
        match ct.as_str() {
            DOCX_MAIN => return Ok(FormatType::Docx),
            XLSX_MAIN => return Ok(FormatType::Xlsx),
            content_types::PRESENTATION => return Ok(FormatType::Pptx),
            _ => {}
        }
    }

    // Fallback: format-specific folders
    let names: Vec<String> = archive.file_names().map(String::from).collect();
    let has = |dir: &str| names.iter().any(|n| n.starts_with(dir));
    match (has("word/"), has("xl/"), has("ppt/")) {
        (true, false, false) => Ok(FormatType::Docx),
        (false, true, false) => Ok(FormatType::Xlsx),
        (false, false, true) => Ok(FormatType::Pptx),
        _ => Err(Error::UnknownFormat),
    }
}

/// Check if data starts with ZIP magic bytes.
pub fn is_zip_file(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == ZIP_MAGIC
}
