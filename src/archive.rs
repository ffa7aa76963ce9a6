//! Unpacking, packing and checking Office packages as plain directories.
//!
//! Unpacked XML is pretty-printed so it can be edited by hand; packing
//! condenses it again. Validation runs structural checks on the unpacked
//! tree before it is packed.

use crate::config::ServerConfig;
use crate::container::{decode_xml_bytes, Package, Relationships};
use crate::detect::{require_office_extension, FormatType};
use crate::error::{Error, Result};
use crate::thumbnail::render::soffice_convert;
use crate::xml::{self, line_of};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

const INDENT: &str = "  ";
const PREVIEW_CHARS: usize = 30;

/// Extract `file` into `out_dir`, pretty-printing its XML parts.
pub fn unpack_document(file: impl AsRef<Path>, out_dir: impl AsRef<Path>) -> Result<String> {
    let file = file.as_ref();
    let out_dir = out_dir.as_ref();
    let format = require_office_extension(file)?;
    let package = Package::open(file)?;

    std::fs::create_dir_all(out_dir)?;
    let mut formatted = 0;
    for name in package.list_files() {
        let target = out_dir.join(safe_relative(&name)?);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = package.read_binary(&name)?;
        match is_xml_name(&name).then(|| pretty_print(&data)).flatten() {
            Some(pretty) => {
                std::fs::write(&target, pretty)?;
                formatted += 1;
            }
            None => std::fs::write(&target, &data)?,
        }
    }
    info!(file = %file.display(), dir = %out_dir.display(), formatted, "document unpacked");

    let mut result = format!(
        "Extracted to: {}\nFormatted {} XML files",
        out_dir.display(),
        formatted
    );
    if format == FormatType::Docx {
        result.push_str(&format!("\nSuggested RSID for edit session: {}", suggested_rsid()));
    }
    Ok(result)
}

/// Pack `input_dir` into `output_file`. With `validate`, the result must
/// convert cleanly through LibreOffice; a document that does not is deleted
/// and `false` is returned.
pub fn pack_document(
    input_dir: impl AsRef<Path>,
    output_file: impl AsRef<Path>,
    validate: bool,
    config: &ServerConfig,
) -> Result<bool> {
    let input_dir = input_dir.as_ref();
    let output_file = output_file.as_ref();
    if !input_dir.is_dir() {
        return Err(Error::InvalidData(format!(
            "{} is not a directory",
            input_dir.display()
        )));
    }
    let format = require_office_extension(output_file)?;

    let mut package = Package::new();
    for (name, path) in walk_files(input_dir)? {
        let data = std::fs::read(&path)?;
        let data = match is_xml_name(&name).then(|| condense(&data)).flatten() {
            Some(condensed) => condensed,
            None => data,
        };
        package.put_part(&name, data);
    }
    package.save(output_file)?;
    info!(dir = %input_dir.display(), output = %output_file.display(), "document packed");

    if !validate {
        return Ok(true);
    }
    let valid = check_with_soffice(output_file, format, config)?;
    if !valid {
        warn!(output = %output_file.display(), "packed document failed to convert; removing");
        std::fs::remove_file(output_file)?;
    }
    Ok(valid)
}

/// Check an unpacked document. Returns whether every check passed and the
/// report lines.
pub fn validate_document(
    unpacked_dir: impl AsRef<Path>,
    original_file: impl AsRef<Path>,
    verbose: bool,
) -> Result<(bool, Vec<String>)> {
    let unpacked_dir = unpacked_dir.as_ref();
    let original_file = original_file.as_ref();
    if !unpacked_dir.is_dir() {
        return Ok((false, vec![format!("Directory not found: {}", unpacked_dir.display())]));
    }
    if !original_file.exists() {
        return Ok((false, vec![format!("Original file not found: {}", original_file.display())]));
    }
    let format = match require_office_extension(original_file) {
        Ok(format) => format,
        Err(e) => return Ok((false, vec![e.to_string()])),
    };

    let tree = UnpackedTree::load(unpacked_dir)?;
    let checks = match format {
        FormatType::Pptx => tree.check_presentation(),
        FormatType::Docx => tree.check_word(),
        FormatType::Xlsx => {
            return Ok((false, vec!["Validation not yet supported for .xlsx".to_string()]));
        }
    };

    let mut passed_all = true;
    let mut messages = Vec::new();
    for check in checks {
        if check.problems.is_empty() {
            if verbose {
                messages.push(format!("PASSED - {}", check.name));
            }
        } else {
            passed_all = false;
            messages.push(format!("FAILED - {}", check.name));
            messages.extend(check.problems.iter().map(|p| format!("  {}", p)));
        }
    }
    debug!(dir = %unpacked_dir.display(), passed = passed_all, "validation finished");
    Ok((passed_all, messages))
}

/// One named check and the problems it found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: &'static str,
    pub problems: Vec<String>,
}

impl CheckResult {
    fn new(name: &'static str, problems: Vec<String>) -> Self {
        Self { name, problems }
    }

    pub fn passed(&self) -> bool {
        self.problems.is_empty()
    }
}

/// XML files of an unpacked document, keyed by `/`-separated relative path.
struct UnpackedTree {
    root: PathBuf,
    files: Vec<(String, String)>,
}

impl UnpackedTree {
    fn load(root: &Path) -> Result<Self> {
        let mut files = Vec::new();
        for (name, path) in walk_files(root)? {
            if is_xml_name(&name) {
                files.push((name, decode_xml_bytes(&std::fs::read(&path)?)?));
            }
        }
        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    fn check_presentation(&self) -> Vec<CheckResult> {
        let mut results = vec![CheckResult::new("XML well-formedness", self.well_formedness())];
        if !results[0].passed() {
            return results;
        }
        results.push(CheckResult::new("Namespace declarations", self.namespaces()));
        results.push(CheckResult::new("File references", self.references()));
        results.push(CheckResult::new("Slide layout references", self.slide_layouts()));
        results
    }

    fn check_word(&self) -> Vec<CheckResult> {
        let mut results = vec![CheckResult::new("XML well-formedness", self.well_formedness())];
        if !results[0].passed() {
            return results;
        }
        results.push(CheckResult::new("Namespace declarations", self.namespaces()));
        results.push(CheckResult::new("File references", self.references()));

        let mut whitespace = Vec::new();
        let mut deletions = Vec::new();
        for (name, content) in self.main_word_documents() {
            scan_word_text(name, content, &mut whitespace, &mut deletions);
        }
        results.push(CheckResult::new("Whitespace preservation", whitespace));
        results.push(CheckResult::new("Track changes", deletions));
        results
    }

    fn well_formedness(&self) -> Vec<String> {
        self.files
            .iter()
            .filter_map(|(name, content)| match xml::parse(content) {
                Err(Error::XmlParse(msg)) => Some(format!("{}: {}", name, msg)),
                Err(e) => Some(format!("{}: {}", name, e)),
                Ok(_) => None,
            })
            .collect()
    }

    fn namespaces(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for (name, content) in &self.files {
            let Ok(doc) = xml::parse(content) else {
                continue;
            };
            let declared = doc.root.declared_prefixes();
            for (_, value) in doc.root.attributes.iter().filter(|(k, _)| k.ends_with("Ignorable")) {
                for prefix in value.split_whitespace() {
                    if !declared.contains(&prefix) {
                        problems.push(format!(
                            "{}: Namespace '{}' in Ignorable but not declared",
                            name, prefix
                        ));
                    }
                }
            }
        }
        problems
    }

    fn references(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for (name, content) in self.rels_files() {
            let rels = match Relationships::parse(content) {
                Ok(rels) => rels,
                Err(e) => {
                    problems.push(format!("{}: Error parsing - {}", name, e));
                    continue;
                }
            };
            let source = source_part(name);
            for rel in rels.iter() {
                let target = rel.target.as_str();
                if target.is_empty()
                    || rel.external
                    || target.starts_with("http")
                    || target.starts_with("mailto:")
                {
                    continue;
                }
                let resolved = Package::resolve_path(&source, target);
                if !self.root.join(&resolved).exists() {
                    problems.push(format!("{}: Broken reference to {}", name, target));
                }
            }
        }
        problems
    }

    fn slide_layouts(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for (name, content) in self.rels_files() {
            let Some(file) = name.strip_prefix("ppt/slides/_rels/") else {
                continue;
            };
            if file.contains('/') || !file.ends_with(".xml.rels") {
                continue;
            }
            match Relationships::parse(content) {
                Ok(rels) => {
                    let count = rels.iter().filter(|r| r.rel_type.contains("slideLayout")).count();
                    if count > 1 {
                        problems.push(format!(
                            "{}: Multiple slideLayout references ({})",
                            name, count
                        ));
                    } else if count == 0 {
                        problems.push(format!("{}: Missing slideLayout reference", name));
                    }
                }
                Err(e) => problems.push(format!("{}: Error - {}", name, e)),
            }
        }
        problems
    }

    fn rels_files(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files
            .iter()
            .filter(|(name, _)| name.ends_with(".rels"))
            .map(|(n, c)| (n.as_str(), c.as_str()))
    }

    fn main_word_documents(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files
            .iter()
            .filter(|(name, _)| name == "document.xml" || name.ends_with("/document.xml"))
            .map(|(n, c)| (n.as_str(), c.as_str()))
    }
}

/// Part a `.rels` file describes: `ppt/slides/_rels/slide1.xml.rels` →
/// `ppt/slides/slide1.xml`, `_rels/.rels` → the package root.
fn source_part(rels_name: &str) -> String {
    let (dir, file) = match rels_name.rsplit_once('/') {
        Some((dir, file)) => (dir, file),
        None => ("", rels_name),
    };
    let owner = file.strip_suffix(".rels").unwrap_or(file);
    let parent = dir.strip_suffix("_rels").unwrap_or(dir).trim_end_matches('/');
    if owner.is_empty() {
        String::new()
    } else if parent.is_empty() {
        owner.to_string()
    } else {
        format!("{}/{}", parent, owner)
    }
}

/// Report `w:t` runs with unpreserved edge spaces, and `w:t` inside `w:del`.
fn scan_word_text(name: &str, xml: &str, whitespace: &mut Vec<String>, deletions: &mut Vec<String>) {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut del_depth = 0usize;
    // line, xml:space="preserve", accumulated text
    let mut run: Option<(usize, bool, String)> = None;

    loop {
        let pos = reader.buffer_position() as usize;
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(_) => return,
        };
        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:del" => del_depth += 1,
                b"w:t" => {
                    let preserve = e.attributes().flatten().any(|a| {
                        a.key.as_ref() == b"xml:space" && a.value.as_ref() == b"preserve"
                    });
                    run = Some((line_of(xml, pos), preserve, String::new()));
                }
                _ => {}
            },
            Event::Text(t) => {
                if let Some((_, _, text)) = run.as_mut() {
                    if let Ok(s) = t.unescape() {
                        text.push_str(&s);
                    }
                }
            }
            Event::CData(c) => {
                if let Some((_, _, text)) = run.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:del" => del_depth = del_depth.saturating_sub(1),
                b"w:t" => {
                    if let Some((line, preserve, text)) = run.take() {
                        if text.is_empty() {
                            continue;
                        }
                        let edge_space = text.starts_with(' ') || text.ends_with(' ');
                        if edge_space && !preserve {
                            whitespace.push(format!(
                                "{}: Line {}: w:t with whitespace missing xml:space='preserve': {}",
                                name,
                                line,
                                preview(&text)
                            ));
                        }
                        if del_depth > 0 {
                            deletions.push(format!(
                                "{}: Line {}: w:t found inside w:del: {}",
                                name,
                                line,
                                preview(&text)
                            ));
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => return,
            _ => {}
        }
    }
}

/// Quoted, escaped and truncated text for a report line.
fn preview(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('\'');
    for ch in text.chars() {
        match ch {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            '\r' => quoted.push_str("\\r"),
            c => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted.chars().take(PREVIEW_CHARS).collect()
}

fn check_with_soffice(document: &Path, format: FormatType, config: &ServerConfig) -> Result<bool> {
    let Some(soffice) = config.tools.soffice.as_deref() else {
        warn!("soffice not found; skipping conversion check");
        return Ok(true);
    };
    let filter = match format {
        FormatType::Docx => "html:HTML",
        FormatType::Pptx => "html:impress_html_Export",
        FormatType::Xlsx => "html:HTML (StarCalc)",
    };

    let scratch = tempfile::tempdir()?;
    let output = match soffice_convert(
        soffice,
        document,
        filter,
        scratch.path(),
        config.pack_validation_timeout,
    ) {
        Ok(output) => output,
        Err(Error::External(msg)) if msg.contains("timed out") => {
            warn!(error = %msg, "conversion check timed out");
            return Ok(false);
        }
        Err(e) => {
            warn!(error = %e, "conversion check could not run; skipping");
            return Ok(true);
        }
    };

    let stem = document
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let converted = scratch.path().join(format!("{}.html", stem));
    if !converted.is_file() {
        debug!(stderr = %output.stderr.trim(), "conversion produced no output");
    }
    Ok(converted.is_file())
}

fn is_xml_name(name: &str) -> bool {
    name.ends_with(".xml") || name.ends_with(".rels")
}

fn pretty_print(data: &[u8]) -> Option<Vec<u8>> {
    let text = decode_xml_bytes(data).ok()?;
    let doc = xml::parse(&text).ok()?;
    Some(doc.to_pretty_string(INDENT).into_bytes())
}

fn condense(data: &[u8]) -> Option<Vec<u8>> {
    let text = decode_xml_bytes(data).ok()?;
    let mut doc = xml::parse(&text).ok()?;
    doc.condense();
    Some(doc.to_xml_string().into_bytes())
}

/// Archive entry name as a path that stays inside the output directory.
fn safe_relative(name: &str) -> Result<PathBuf> {
    let path = Path::new(name);
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            _ => {
                return Err(Error::InvalidData(format!(
                    "Archive entry escapes the output directory: {}",
                    name
                )))
            }
        }
    }
    Ok(out)
}

/// Files below `root`, sorted, with `/`-separated relative names.
fn walk_files(root: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
                continue;
            }
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            files.push((name, path));
        }
    }
    files.sort();
    Ok(files)
}

fn suggested_rsid() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExternalTools;
    use crate::create::{build_presentation, PresentationSpec};
    use serde_json::json;

    fn sample_deck(dir: &Path) -> PathBuf {
        let spec: PresentationSpec = serde_json::from_value(json!({"slides": [
            {"shapes": [{"type": "textbox", "text": "Hello"}]},
            {"shapes": []}
        ]}))
        .unwrap();
        let path = dir.join("deck.pptx");
        build_presentation(&spec).unwrap().save(&path).unwrap();
        path
    }

    fn no_tools() -> ServerConfig {
        ServerConfig::default().with_tools(ExternalTools::default())
    }

    #[test]
    fn test_unpack_pretty_prints() {
        let dir = tempfile::tempdir().unwrap();
        let deck = sample_deck(dir.path());
        let out = dir.path().join("unpacked");

        let message = unpack_document(&deck, &out).unwrap();
        assert!(message.starts_with(&format!("Extracted to: {}\nFormatted ", out.display())));
        assert!(!message.contains("RSID"));

        let slide = std::fs::read_to_string(out.join("ppt/slides/slide1.xml")).unwrap();
        assert!(slide.lines().count() > 5);
        assert!(slide.contains("\n  <p:cSld"));
        assert!(out.join("[Content_Types].xml").is_file());
    }

    #[test]
    fn test_unpack_rejects_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"x").unwrap();
        let err = unpack_document(&path, dir.path().join("out")).unwrap_err();
        assert!(err.to_string().contains("Invalid file type: .txt"));
    }

    #[test]
    fn test_unpack_docx_suggests_rsid() {
        let dir = tempfile::tempdir().unwrap();
        let mut package = Package::new();
        package.put_part(
            "word/document.xml",
            br#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body/></w:document>"#.to_vec(),
        );
        let path = dir.path().join("letter.docx");
        package.save(&path).unwrap();

        let message = unpack_document(&path, dir.path().join("out")).unwrap();
        let rsid = message
            .lines()
            .last()
            .unwrap()
            .strip_prefix("Suggested RSID for edit session: ")
            .unwrap();
        assert_eq!(rsid.len(), 8);
        assert!(rsid.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn test_safe_relative() {
        assert_eq!(safe_relative("ppt/slides/slide1.xml").unwrap(), PathBuf::from("ppt/slides/slide1.xml"));
        assert!(safe_relative("../evil.xml").is_err());
        assert!(safe_relative("/etc/passwd").is_err());
    }

    #[test]
    fn test_round_trip_and_validate() {
        let dir = tempfile::tempdir().unwrap();
        let deck = sample_deck(dir.path());
        let out = dir.path().join("unpacked");
        unpack_document(&deck, &out).unwrap();

        let (ok, messages) = validate_document(&out, &deck, true).unwrap();
        assert!(ok, "{:?}", messages);
        assert_eq!(
            messages,
            [
                "PASSED - XML well-formedness",
                "PASSED - Namespace declarations",
                "PASSED - File references",
                "PASSED - Slide layout references"
            ]
        );

        let before = std::fs::read_to_string(out.join("ppt/slides/slide1.xml")).unwrap();
        let packed = dir.path().join("repacked.pptx");
        assert!(pack_document(&out, &packed, true, &no_tools()).unwrap());
        assert_eq!(
            std::fs::read_to_string(out.join("ppt/slides/slide1.xml")).unwrap(),
            before
        );

        let pres = crate::presentation::Presentation::open(&packed).unwrap();
        assert_eq!(pres.slide_count(), 2);
        let slide = Package::open(&packed)
            .unwrap()
            .read_xml("ppt/slides/slide1.xml")
            .unwrap();
        assert!(!slide.contains("\n  <"));
    }

    #[test]
    fn test_validate_reports_problems() {
        let dir = tempfile::tempdir().unwrap();
        let deck = sample_deck(dir.path());
        let out = dir.path().join("unpacked");
        unpack_document(&deck, &out).unwrap();

        let rels = out.join("ppt/slides/_rels/slide1.xml.rels");
        std::fs::write(
            &rels,
            r#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/missing.png"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/>
</Relationships>"#,
        )
        .unwrap();
        std::fs::write(
            out.join("ppt/slides/slide2.xml"),
            r#"<p:sld xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006" mc:Ignorable="p14"><p:cSld/></p:sld>"#,
        )
        .unwrap();

        let (ok, messages) = validate_document(&out, &deck, false).unwrap();
        assert!(!ok);
        assert_eq!(
            messages,
            [
                "FAILED - Namespace declarations",
                "  ppt/slides/slide2.xml: Namespace 'p14' in Ignorable but not declared",
                "FAILED - File references",
                "  ppt/slides/_rels/slide1.xml.rels: Broken reference to ../media/missing.png",
                "FAILED - Slide layout references",
                "  ppt/slides/_rels/slide1.xml.rels: Missing slideLayout reference",
            ]
        );
    }

    #[test]
    fn test_validate_stops_on_malformed_xml() {
        let dir = tempfile::tempdir().unwrap();
        let deck = sample_deck(dir.path());
        let out = dir.path().join("unpacked");
        unpack_document(&deck, &out).unwrap();
        std::fs::write(out.join("ppt/slides/slide2.xml"), "<p:sld>\n<p:cSld>\n</p:sld>").unwrap();

        let (ok, messages) = validate_document(&out, &deck, true).unwrap();
        assert!(!ok);
        assert_eq!(messages[0], "FAILED - XML well-formedness");
        assert!(messages[1].starts_with("  ppt/slides/slide2.xml: Line "));
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn test_validate_word_text_runs() {
        let dir = tempfile::tempdir().unwrap();
        let unpacked = dir.path().join("doc");
        std::fs::create_dir_all(unpacked.join("word")).unwrap();
        std::fs::write(
            unpacked.join("word/document.xml"),
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body><w:p>
<w:r><w:t> leading</w:t></w:r>
<w:r><w:t xml:space="preserve"> kept </w:t></w:r>
<w:del><w:r><w:t>gone</w:t></w:r></w:del>
</w:p></w:body></w:document>"#,
        )
        .unwrap();
        let original = dir.path().join("doc.docx");
        std::fs::write(&original, b"").unwrap();

        let (ok, messages) = validate_document(&unpacked, &original, false).unwrap();
        assert!(!ok);
        assert_eq!(
            messages,
            [
                "FAILED - Whitespace preservation",
                "  word/document.xml: Line 3: w:t with whitespace missing xml:space='preserve': ' leading'",
                "FAILED - Track changes",
                "  word/document.xml: Line 5: w:t found inside w:del: 'gone'",
            ]
        );
    }

    #[test]
    fn test_validate_xlsx_and_missing_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("book.xlsx");
        std::fs::write(&original, b"").unwrap();
        let (ok, messages) = validate_document(dir.path(), &original, false).unwrap();
        assert!(!ok);
        assert_eq!(messages, ["Validation not yet supported for .xlsx"]);

        let (ok, messages) =
            validate_document(dir.path().join("nope"), &original, false).unwrap();
        assert!(!ok);
        assert!(messages[0].starts_with("Directory not found"));
    }

    #[test]
    fn test_pack_rejects_bad_inputs() {
        let dir = tempfile::tempdir().unwrap();
        assert!(pack_document(dir.path().join("missing"), dir.path().join("a.pptx"), false, &no_tools()).is_err());
        assert!(pack_document(dir.path(), dir.path().join("a.zip"), false, &no_tools()).is_err());
    }

    #[test]
    fn test_source_part() {
        assert_eq!(source_part("_rels/.rels"), "");
        assert_eq!(source_part("ppt/slides/_rels/slide1.xml.rels"), "ppt/slides/slide1.xml");
        assert_eq!(source_part("ppt/_rels/presentation.xml.rels"), "ppt/presentation.xml");
    }

    #[test]
    fn test_preview_truncates() {
        assert_eq!(preview("it's"), "'it\\'s'");
        assert_eq!(preview(&"x".repeat(40)).chars().count(), 30);
    }
}
