//! ZIP package abstraction for OOXML documents.
//!
//! A [`Package`] holds every part of the archive in memory, in archive order.
//! Parts the tools never touch are written back byte-for-byte.

use crate::error::{Error, Result};
use crate::xml::{self, Element};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Write};
use std::path::Path;
use tracing::debug;

/// Relationship type URIs used by presentations.
pub mod rel_types {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
    pub const SLIDE_LAYOUT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
    pub const SLIDE_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
    pub const NOTES_SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide";
    pub const THEME: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
    pub const IMAGE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    pub const PRES_PROPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/presProps";
    pub const VIEW_PROPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/viewProps";
    pub const TABLE_STYLES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/tableStyles";
    pub const CORE_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
    pub const EXTENDED_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
}

/// Content types for presentation parts.
pub mod content_types {
    pub const RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
    pub const XML: &str = "application/xml";
    pub const PRESENTATION: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
    pub const SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
    pub const SLIDE_LAYOUT: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
    pub const SLIDE_MASTER: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
    pub const NOTES_SLIDE: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.notesSlide+xml";
    pub const THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
    pub const PRES_PROPS: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.presProps+xml";
    pub const VIEW_PROPS: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.viewProps+xml";
    pub const TABLE_STYLES: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.tableStyles+xml";
    pub const CORE_PROPERTIES: &str = "application/vnd.openxmlformats-package.core-properties+xml";
    pub const EXTENDED_PROPERTIES: &str =
        "application/vnd.openxmlformats-officedocument.extended-properties+xml";
}

const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// Name of the content types part.
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// A relationship entry from a .rels file.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path (relative or absolute)
    pub target: String,
    /// Whether the target is external
    pub external: bool,
}

/// Collection of relationships parsed from a .rels file, in file order.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    items: Vec<Relationship>,
}

impl Relationships {
    /// Create a new empty relationships collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the XML of a .rels part.
    pub fn parse(content: &str) -> Result<Self> {
        let mut rels = Relationships::new();
        if content.trim().is_empty() {
            return Ok(rels);
        }

        let doc = xml::parse(content)?;
        for rel in doc.root.children_named("Relationship") {
            let id = rel.attr("Id").unwrap_or_default().to_string();
            if id.is_empty() {
                continue;
            }
            rels.add(Relationship {
                id,
                rel_type: rel.attr("Type").unwrap_or_default().to_string(),
                target: rel.attr("Target").unwrap_or_default().to_string(),
                external: rel
                    .attr("TargetMode")
                    .map(|m| m.eq_ignore_ascii_case("external"))
                    .unwrap_or(false),
            });
        }
        Ok(rels)
    }

    /// Get a relationship by ID.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.id == id)
    }

    /// Point every relationship of `rel_type` at `target`.
    pub fn retarget_type(&mut self, rel_type: &str, target: &str) {
        for rel in self.items.iter_mut().filter(|r| r.rel_type == rel_type) {
            rel.target = target.to_string();
        }
    }

    /// Get relationships by type.
    pub fn get_by_type(&self, rel_type: &str) -> Vec<&Relationship> {
        self.items.iter().filter(|r| r.rel_type == rel_type).collect()
    }

    /// First relationship of a type.
    pub fn first_of_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.rel_type == rel_type)
    }

    /// Iterate in file order.
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.items.iter()
    }

    /// Number of relationships.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a relationship.
    pub fn add(&mut self, rel: Relationship) {
        self.items.push(rel);
    }

    /// Add an internal relationship with a fresh ID and return the ID.
    pub fn add_target(&mut self, rel_type: &str, target: impl Into<String>) -> String {
        let id = self.next_id();
        self.add(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.into(),
            external: false,
        });
        id
    }

    /// Remove a relationship by ID, returning it.
    pub fn remove(&mut self, id: &str) -> Option<Relationship> {
        let idx = self.items.iter().position(|r| r.id == id)?;
        Some(self.items.remove(idx))
    }

    /// Remove every relationship of a type.
    pub fn remove_type(&mut self, rel_type: &str) {
        self.items.retain(|r| r.rel_type != rel_type);
    }

    /// Smallest unused `rIdN`.
    pub fn next_id(&self) -> String {
        let max = self
            .items
            .iter()
            .filter_map(|r| r.id.strip_prefix("rId").and_then(|n| n.parse::<u32>().ok()))
            .max()
            .unwrap_or(0);
        format!("rId{}", max + 1)
    }

    /// Serialize to .rels XML.
    pub fn to_xml(&self) -> String {
        let mut root = Element::new("Relationships").with_attr("xmlns", RELATIONSHIPS_NS);
        for rel in &self.items {
            let mut e = Element::new("Relationship")
                .with_attr("Id", rel.id.as_str())
                .with_attr("Type", rel.rel_type.as_str())
                .with_attr("Target", rel.target.as_str());
            if rel.external {
                e.set_attr("TargetMode", "External");
            }
            root.push(e);
        }
        xml::Document::new(root).to_xml_string()
    }
}

/// The `[Content_Types].xml` part.
#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    /// `(extension, content type)` defaults.
    pub defaults: Vec<(String, String)>,
    /// `(part name with leading '/', content type)` overrides.
    pub overrides: Vec<(String, String)>,
}

impl ContentTypes {
    /// Parse `[Content_Types].xml`.
    pub fn parse(content: &str) -> Result<Self> {
        let doc = xml::parse(content)?;
        let mut ct = ContentTypes::default();
        for e in doc.root.elements() {
            let content_type = e.attr("ContentType").unwrap_or_default().to_string();
            match e.local_name() {
                "Default" => {
                    if let Some(ext) = e.attr("Extension") {
                        ct.defaults.push((ext.to_ascii_lowercase(), content_type));
                    }
                }
                "Override" => {
                    if let Some(part) = e.attr("PartName") {
                        ct.overrides.push((part.to_string(), content_type));
                    }
                }
                _ => {}
            }
        }
        Ok(ct)
    }

    /// Register a default for an extension if none exists.
    pub fn ensure_default(&mut self, ext: &str, content_type: &str) {
        let ext = ext.to_ascii_lowercase();
        if !self.defaults.iter().any(|(e, _)| *e == ext) {
            self.defaults.push((ext, content_type.to_string()));
        }
    }

    /// Set the override for a part (`part` without leading slash).
    pub fn set_override(&mut self, part: &str, content_type: &str) {
        let name = format!("/{}", part.trim_start_matches('/'));
        if let Some(slot) = self.overrides.iter_mut().find(|(p, _)| *p == name) {
            slot.1 = content_type.to_string();
        } else {
            self.overrides.push((name, content_type.to_string()));
        }
    }

    /// Remove the override for a part.
    pub fn remove_override(&mut self, part: &str) {
        let name = format!("/{}", part.trim_start_matches('/'));
        self.overrides.retain(|(p, _)| *p != name);
    }

    /// Content type of a part: override first, then extension default.
    pub fn content_type_of(&self, part: &str) -> Option<&str> {
        let name = format!("/{}", part.trim_start_matches('/'));
        if let Some((_, ct)) = self.overrides.iter().find(|(p, _)| p.eq_ignore_ascii_case(&name)) {
            return Some(ct);
        }
        let ext = part.rsplit('.').next()?.to_ascii_lowercase();
        self.defaults
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, ct)| ct.as_str())
    }

    /// Serialize to XML.
    pub fn to_xml(&self) -> String {
        let mut root = Element::new("Types").with_attr("xmlns", CONTENT_TYPES_NS);
        for (ext, ct) in &self.defaults {
            root.push(
                Element::new("Default")
                    .with_attr("Extension", ext.as_str())
                    .with_attr("ContentType", ct.as_str()),
            );
        }
        for (part, ct) in &self.overrides {
            root.push(
                Element::new("Override")
                    .with_attr("PartName", part.as_str())
                    .with_attr("ContentType", ct.as_str()),
            );
        }
        xml::Document::new(root).to_xml_string()
    }
}

/// Fix XML encoding declaration from UTF-16 to UTF-8.
///
/// When we decode UTF-16 XML to a Rust String (UTF-8), the XML declaration
/// still says encoding="UTF-16", which would mislead a re-read.
fn fix_xml_encoding_declaration(content: &str) -> String {
    if content.starts_with("<?xml") {
        if let Some(end_decl) = content.find("?>") {
            let decl = &content[..end_decl + 2];
            let rest = &content[end_decl + 2..];

            let fixed_decl = decl
                .replace("encoding=\"UTF-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='UTF-16'", "encoding='UTF-8'")
                .replace("encoding=\"utf-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='utf-16'", "encoding='UTF-8'");

            return format!("{}{}", fixed_decl, rest);
        }
    }
    content.to_string()
}

/// Decode XML bytes handling different encodings (UTF-8, UTF-16 LE/BE).
///
/// OOXML files are typically UTF-8 encoded, but some (especially older
/// or non-standard documents) may use UTF-16 encoding.
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    if bytes.len() >= 3 && bytes[0] == 0xEF && bytes[1] == 0xBB && bytes[2] == 0xBF {
        return String::from_utf8(bytes[3..].to_vec())
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)));
    }

    if bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] == 0xFE {
        let content = decode_utf16(&bytes[2..], u16::from_le_bytes)?;
        return Ok(fix_xml_encoding_declaration(&content));
    }

    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let content = decode_utf16(&bytes[2..], u16::from_be_bytes)?;
        return Ok(fix_xml_encoding_declaration(&content));
    }

    match String::from_utf8(bytes.to_vec()) {
        Ok(s) => Ok(s),
        Err(_) => {
            // UTF-16 without BOM: ASCII markup leaves NUL in every other byte
            if bytes.len() >= 4 && bytes[1] == 0 && bytes[3] == 0 {
                decode_utf16(bytes, u16::from_le_bytes)
            } else if bytes.len() >= 4 && bytes[0] == 0 && bytes[2] == 0 {
                decode_utf16(bytes, u16::from_be_bytes)
            } else {
                Ok(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String> {
    let len = bytes.len() & !1;
    let units = (0..len).step_by(2).map(|i| unit([bytes[i], bytes[i + 1]]));

    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Path of the .rels part that belongs to `part_path`.
///
/// `ppt/slides/slide1.xml` → `ppt/slides/_rels/slide1.xml.rels`; the package
/// itself (`""` or `"/"`) → `_rels/.rels`.
pub fn rels_path_for(part_path: &str) -> String {
    let part_path = part_path.trim_start_matches('/');
    if part_path.is_empty() {
        return "_rels/.rels".to_string();
    }
    match part_path.rfind('/') {
        Some(pos) => format!("{}/_rels/{}.rels", &part_path[..pos], &part_path[pos + 1..]),
        None => format!("_rels/{}.rels", part_path),
    }
}

/// OOXML package: every archive part held in memory.
#[derive(Clone, Default)]
pub struct Package {
    parts: Vec<(String, Vec<u8>)>,
}

impl Package {
    /// Create an empty package.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a package from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Create a package from the bytes of a ZIP archive.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(Cursor::new(data))?;
        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut bytes = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut bytes)?;
            parts.push((name, bytes));
        }
        debug!(parts = parts.len(), "package loaded");
        Ok(Self { parts })
    }

    /// Read an XML part as a string (UTF-8 or UTF-16).
    pub fn read_xml(&self, path: &str) -> Result<String> {
        decode_xml_bytes(self.read_binary_ref(path)?)
    }

    /// Read and parse an XML part.
    pub fn read_document(&self, path: &str) -> Result<xml::Document> {
        xml::parse(&self.read_xml(path)?)
            .map_err(|e| Error::XmlParse(format!("{}: {}", path, e)))
    }

    /// Read a binary part.
    pub fn read_binary(&self, path: &str) -> Result<Vec<u8>> {
        self.read_binary_ref(path).map(<[u8]>::to_vec)
    }

    fn read_binary_ref(&self, path: &str) -> Result<&[u8]> {
        let path = path.trim_start_matches('/');
        self.parts
            .iter()
            .find(|(name, _)| name == path)
            .map(|(_, data)| data.as_slice())
            .ok_or_else(|| Error::MissingComponent(path.to_string()))
    }

    /// Check if a part exists in the package.
    pub fn exists(&self, path: &str) -> bool {
        let path = path.trim_start_matches('/');
        self.parts.iter().any(|(name, _)| name == path)
    }

    /// List all parts in archive order.
    pub fn list_files(&self) -> Vec<String> {
        self.parts.iter().map(|(name, _)| name.clone()).collect()
    }

    /// List parts matching a prefix.
    pub fn list_files_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.parts
            .iter()
            .filter(|(n, _)| n.starts_with(prefix))
            .map(|(n, _)| n.clone())
            .collect()
    }

    /// Insert or replace a part.
    pub fn put_part(&mut self, path: &str, data: Vec<u8>) {
        let path = path.trim_start_matches('/');
        if let Some(slot) = self.parts.iter_mut().find(|(name, _)| name == path) {
            slot.1 = data;
        } else {
            self.parts.push((path.to_string(), data));
        }
    }

    /// Insert or replace an XML part from an element tree.
    pub fn put_document(&mut self, path: &str, doc: &xml::Document) {
        self.put_part(path, doc.to_xml_string().into_bytes());
    }

    /// Remove a part, returning whether it existed.
    pub fn remove_part(&mut self, path: &str) -> bool {
        let path = path.trim_start_matches('/');
        let before = self.parts.len();
        self.parts.retain(|(name, _)| name != path);
        self.parts.len() != before
    }

    /// Read the relationships of a part (empty when it has none).
    pub fn relationships(&self, part_path: &str) -> Result<Relationships> {
        let rels_path = rels_path_for(part_path);
        match self.read_xml(&rels_path) {
            Ok(content) => Relationships::parse(&content)
                .map_err(|e| Error::XmlParse(format!("{}: {}", rels_path, e))),
            Err(_) => Ok(Relationships::new()),
        }
    }

    /// Write the relationships of a part.
    pub fn set_relationships(&mut self, part_path: &str, rels: &Relationships) {
        self.put_part(&rels_path_for(part_path), rels.to_xml().into_bytes());
    }

    /// Read package-level relationships (_rels/.rels).
    pub fn package_relationships(&self) -> Result<Relationships> {
        self.relationships("")
    }

    /// Read `[Content_Types].xml`.
    pub fn content_types(&self) -> Result<ContentTypes> {
        ContentTypes::parse(&self.read_xml(CONTENT_TYPES_PART)?)
    }

    /// Write `[Content_Types].xml`.
    pub fn set_content_types(&mut self, ct: &ContentTypes) {
        self.put_part(CONTENT_TYPES_PART, ct.to_xml().into_bytes());
    }

    /// Serialize the package to ZIP bytes. `[Content_Types].xml` is written
    /// first as consumers expect.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buffer));
            let options = zip::write::SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Deflated);

            let ordered = self
                .parts
                .iter()
                .filter(|(n, _)| n == CONTENT_TYPES_PART)
                .chain(self.parts.iter().filter(|(n, _)| n != CONTENT_TYPES_PART));
            for (name, data) in ordered {
                zip.start_file(name.as_str(), options)?;
                zip.write_all(data)?;
            }
            zip.finish()?;
        }
        Ok(buffer)
    }

    /// Write the package to disk, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_bytes()?)?;
        debug!(path = %path.display(), parts = self.parts.len(), "package saved");
        Ok(())
    }

    /// Resolve a relative path from a base path.
    pub fn resolve_path(base: &str, relative: &str) -> String {
        if let Some(stripped) = relative.strip_prefix('/') {
            return stripped.to_string();
        }

        let base_path = Path::new(base);
        let base_dir = base_path.parent().unwrap_or(Path::new(""));

        let mut result = base_dir.to_path_buf();
        for component in Path::new(relative).components() {
            match component {
                std::path::Component::ParentDir => {
                    result.pop();
                }
                std::path::Component::Normal(c) => {
                    result.push(c);
                }
                _ => {}
            }
        }

        result.to_string_lossy().replace('\\', "/")
    }

    /// Relative target from the directory of `from_part` to `to_part`.
    pub fn relative_target(from_part: &str, to_part: &str) -> String {
        let from_dir: Vec<&str> = match from_part.rfind('/') {
            Some(pos) => from_part[..pos].split('/').collect(),
            None => Vec::new(),
        };
        let to: Vec<&str> = to_part.split('/').collect();
        let common = from_dir
            .iter()
            .zip(to.iter())
            .take_while(|(a, b)| a == b)
            .count();
        let mut segments: Vec<&str> = vec![".."; from_dir.len() - common];
        segments.extend_from_slice(&to[common..]);
        segments.join("/")
    }
}

impl std::fmt::Debug for Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Package")
            .field("parts", &self.parts.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_path() {
        assert_eq!(
            Package::resolve_path("ppt/slides/slide1.xml", "../media/image1.png"),
            "ppt/media/image1.png"
        );
        assert_eq!(
            Package::resolve_path("ppt/presentation.xml", "slides/slide2.xml"),
            "ppt/slides/slide2.xml"
        );
        assert_eq!(
            Package::resolve_path("ppt/slides/slide1.xml", "/ppt/media/image1.png"),
            "ppt/media/image1.png"
        );
    }

    #[test]
    fn test_relative_target() {
        assert_eq!(
            Package::relative_target("ppt/slides/slide1.xml", "ppt/slideLayouts/slideLayout1.xml"),
            "../slideLayouts/slideLayout1.xml"
        );
        assert_eq!(
            Package::relative_target("ppt/presentation.xml", "ppt/slides/slide3.xml"),
            "slides/slide3.xml"
        );
        assert_eq!(Package::relative_target("", "ppt/presentation.xml"), "ppt/presentation.xml");
    }

    #[test]
    fn test_rels_path_for() {
        assert_eq!(rels_path_for(""), "_rels/.rels");
        assert_eq!(
            rels_path_for("ppt/slides/slide1.xml"),
            "ppt/slides/_rels/slide1.xml.rels"
        );
        assert_eq!(
            rels_path_for("/ppt/presentation.xml"),
            "ppt/_rels/presentation.xml.rels"
        );
    }

    #[test]
    fn test_relationships_collection() {
        let mut rels = Relationships::new();
        let first = rels.add_target("http://test/type1", "target1.xml");
        let second = rels.add_target("http://test/type1", "target2.xml");
        assert_eq!(first, "rId1");
        assert_eq!(second, "rId2");

        assert!(rels.get("rId1").is_some());
        assert!(rels.get("rId3").is_none());
        assert_eq!(rels.get_by_type("http://test/type1").len(), 2);

        rels.remove("rId1");
        assert_eq!(rels.next_id(), "rId3");

        let parsed = Relationships::parse(&rels.to_xml()).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.get("rId2").unwrap().target, "target2.xml");
    }

    #[test]
    fn test_external_relationship_roundtrip() {
        let xml = r#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId4" Type="http://x/hyperlink" Target="https://example.com" TargetMode="External"/>
</Relationships>"#;
        let rels = Relationships::parse(xml).unwrap();
        assert!(rels.get("rId4").unwrap().external);
        assert!(rels.to_xml().contains(r#"TargetMode="External""#));
    }

    #[test]
    fn test_content_types() {
        let mut ct = ContentTypes::default();
        ct.ensure_default("rels", content_types::RELATIONSHIPS);
        ct.ensure_default("xml", content_types::XML);
        ct.set_override("ppt/slides/slide1.xml", content_types::SLIDE);

        assert_eq!(ct.content_type_of("ppt/slides/slide1.xml"), Some(content_types::SLIDE));
        assert_eq!(ct.content_type_of("ppt/other.xml"), Some(content_types::XML));

        let parsed = ContentTypes::parse(&ct.to_xml()).unwrap();
        assert_eq!(parsed.overrides.len(), 1);
        assert_eq!(parsed.defaults.len(), 2);

        let mut parsed = parsed;
        parsed.remove_override("/ppt/slides/slide1.xml");
        assert!(parsed.overrides.is_empty());
    }

    #[test]
    fn test_package_roundtrip_puts_content_types_first() {
        let mut pkg = Package::new();
        pkg.put_part("ppt/a.xml", b"<a/>".to_vec());
        pkg.put_part(CONTENT_TYPES_PART, b"<Types/>".to_vec());

        let bytes = pkg.to_bytes().unwrap();
        let reopened = Package::from_bytes(bytes).unwrap();
        assert_eq!(reopened.list_files()[0], CONTENT_TYPES_PART);
        assert_eq!(reopened.read_xml("/ppt/a.xml").unwrap(), "<a/>");
        assert!(matches!(
            reopened.read_binary("missing.xml"),
            Err(Error::MissingComponent(_))
        ));
    }

    #[test]
    fn test_not_a_zip() {
        assert!(matches!(
            Package::from_bytes(b"plain text".to_vec()),
            Err(Error::ZipArchive(_))
        ));
    }

    #[test]
    fn test_utf16_decoding_function() {
        let utf16_le = b"\xFF\xFE<\0?\0x\0m\0l\0>\0";
        assert_eq!(decode_xml_bytes(utf16_le).unwrap(), "<?xml>");

        let utf16_be = b"\xFE\xFF\0<\0?\0x\0m\0l\0>";
        assert_eq!(decode_xml_bytes(utf16_be).unwrap(), "<?xml>");

        let utf8_bom = b"\xEF\xBB\xBF<?xml>";
        assert_eq!(decode_xml_bytes(utf8_bom).unwrap(), "<?xml>");

        assert_eq!(decode_xml_bytes(b"<?xml>").unwrap(), "<?xml>");
    }
}
