//! Text inventory of an existing presentation.
//!
//! Every slide is walked for shapes that carry visible text. Shapes are
//! ordered the way a reader scans the slide (rows top to bottom, then left to
//! right) and checked for layout problems: text overflowing its frame, shapes
//! running off the slide, shapes overlapping each other and hand-typed bullet
//! symbols.
//!
//! ```no_run
//! use slidedeck::inventory::{extract_text_inventory, to_json, JsonFormat};
//!
//! let inventory = extract_text_inventory("deck.pptx", false)?;
//! println!("{}", to_json(&inventory, JsonFormat::Pretty)?);
//! # Ok::<(), slidedeck::Error>(())
//! ```

use crate::error::{Error, Result};
use crate::presentation::text::{self, Insets};
use crate::presentation::units::{emu_to_inches, round2};
use crate::presentation::{Presentation, ShapeRef, Slide, SlideContext};
use crate::xml::Element;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::path::Path;
use tracing::debug;
use unicode_width::UnicodeWidthChar;

/// Shapes whose tops differ by at most this many inches share a row.
const ROW_TOLERANCE: f64 = 0.5;

/// Minimum overlap on both axes, in inches, before shapes count as overlapping.
const OVERLAP_TOLERANCE: f64 = 0.05;

const FRAME_OVERFLOW_THRESHOLD: f64 = 0.05;
const SLIDE_OVERFLOW_THRESHOLD: f64 = 0.01;

const DPI: f64 = 96.0;
const FALLBACK_FONT_SIZE: f64 = 14.0;
const LINE_SPACING_BASE_SIZE: f64 = 12.0;

/// Width of a narrow glyph relative to the font size.
const NARROW_GLYPH_EM: f64 = 0.55;

const MANUAL_BULLETS: &[char] = &['•', '●', '○'];
const MANUAL_BULLET_WARNING: &str = "manual_bullet_symbol: use proper bullet formatting";

/// JSON output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonFormat {
    /// Compact single-line JSON
    Compact,
    /// Pretty-printed with 2-space indentation
    #[default]
    Pretty,
}

/// Text inventory of a whole presentation.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    /// Slides with at least one reported shape, in presentation order.
    pub slides: Vec<SlideInventory>,
}

impl Inventory {
    /// Number of slides in the inventory.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Number of shapes across all slides.
    pub fn shape_count(&self) -> usize {
        self.slides.iter().map(|s| s.shapes.len()).sum()
    }

    /// Look up a slide by key (`slide-3`).
    pub fn slide(&self, key: &str) -> Option<&SlideInventory> {
        self.slides.iter().find(|s| s.key() == key)
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

/// Shapes of one slide.
#[derive(Debug, Clone)]
pub struct SlideInventory {
    /// Zero-based slide index.
    pub index: usize,
    pub shapes: Vec<ShapeData>,
}

impl SlideInventory {
    pub fn key(&self) -> String {
        format!("slide-{}", self.index)
    }

    /// Look up a shape by key (`shape-0`).
    pub fn shape(&self, key: &str) -> Option<&ShapeData> {
        self.shapes.iter().find(|s| s.id == key)
    }
}

/// A text-bearing shape and what was found about it.
#[derive(Debug, Clone)]
pub struct ShapeData {
    /// `shape-<n>` in reading order.
    pub id: String,
    /// Location of the shape in the slide tree.
    pub shape: ShapeRef,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub placeholder_type: Option<&'static str>,
    /// Size from the matching layout placeholder, in points.
    pub default_font_size: Option<f64>,
    pub frame_overflow_bottom: Option<f64>,
    pub slide_overflow_right: Option<f64>,
    pub slide_overflow_bottom: Option<f64>,
    /// Overlapping shape ids with the overlap area in square inches.
    pub overlapping_shapes: Vec<(String, f64)>,
    pub warnings: Vec<String>,
    pub paragraphs: Vec<ParagraphData>,
}

impl ShapeData {
    pub fn has_issues(&self) -> bool {
        self.frame_overflow_bottom.is_some()
            || self.slide_overflow_right.is_some()
            || self.slide_overflow_bottom.is_some()
            || !self.overlapping_shapes.is_empty()
            || !self.warnings.is_empty()
    }
}

/// Formatting of a non-empty paragraph.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParagraphData {
    pub text: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub bullet: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_before: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_after: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_color: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_spacing: Option<f64>,
}

impl ParagraphData {
    /// Read a paragraph's formatting. Font attributes come from the first run.
    pub fn from_element(p: &Element) -> Self {
        let mut data = ParagraphData {
            text: text::paragraph_text(p).trim().to_string(),
            ..Default::default()
        };

        let ppr = p.child("pPr");
        if let Some(ppr) = ppr {
            if ppr.child("buChar").is_some() || ppr.child("buAutoNum").is_some() {
                data.bullet = true;
                data.level = Some(ppr.attr("lvl").and_then(|v| v.parse().ok()).unwrap_or(0));
            }
            data.alignment = match ppr.attr("algn") {
                Some("ctr") => Some("CENTER"),
                Some("r") => Some("RIGHT"),
                Some("just") => Some("JUSTIFY"),
                _ => None,
            };
            data.space_before = spacing_points(ppr, "spcBef");
            data.space_after = spacing_points(ppr, "spcAft");
        }

        if let Some(rpr) = text::runs(p).next().and_then(|r| r.child("rPr")) {
            data.font_name = rpr
                .child("latin")
                .and_then(|l| l.attr("typeface"))
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            data.font_size = rpr.attr_i64("sz").map(|sz| sz as f64 / 100.0);
            data.bold = rpr.attr("b").map(xml_bool);
            data.italic = rpr.attr("i").map(xml_bool);
            data.underline = rpr.attr("u").map(|u| u != "none");
            if let Some(fill) = rpr.child("solidFill") {
                if let Some(rgb) = fill.child("srgbClr").and_then(|c| c.attr("val")) {
                    data.color = Some(rgb.to_ascii_uppercase());
                } else if let Some(scheme) = fill.child("schemeClr").and_then(|c| c.attr("val")) {
                    data.theme_color = theme_color_name(scheme);
                }
            }
        }

        if let Some(ln_spc) = ppr.and_then(|ppr| ppr.child("lnSpc")) {
            if let Some(pts) = ln_spc.child("spcPts").and_then(|s| s.attr_i64("val")) {
                data.line_spacing = Some(round2(pts as f64 / 100.0));
            } else if let Some(pct) = ln_spc.child("spcPct").and_then(|s| s.attr_i64("val")) {
                let size = data.font_size.unwrap_or(LINE_SPACING_BASE_SIZE);
                data.line_spacing = Some(round2(pct as f64 / 100_000.0 * size));
            }
        }

        data
    }
}

fn xml_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "on")
}

/// `a:spcBef`/`a:spcAft` in points; only non-zero point values count.
fn spacing_points(ppr: &Element, local: &str) -> Option<f64> {
    ppr.child(local)?
        .child("spcPts")?
        .attr_i64("val")
        .filter(|v| *v != 0)
        .map(|v| v as f64 / 100.0)
}

fn theme_color_name(val: &str) -> Option<&'static str> {
    Some(match val {
        "accent1" => "ACCENT_1",
        "accent2" => "ACCENT_2",
        "accent3" => "ACCENT_3",
        "accent4" => "ACCENT_4",
        "accent5" => "ACCENT_5",
        "accent6" => "ACCENT_6",
        "bg1" => "BACKGROUND_1",
        "bg2" => "BACKGROUND_2",
        "dk1" => "DARK_1",
        "dk2" => "DARK_2",
        "lt1" => "LIGHT_1",
        "lt2" => "LIGHT_2",
        "tx1" => "TEXT_1",
        "tx2" => "TEXT_2",
        "hlink" => "HYPERLINK",
        "folHlink" => "FOLLOWED_HYPERLINK",
        _ => return None,
    })
}

/// Build the inventory of the presentation at `pptx_path`.
pub fn extract_text_inventory(pptx_path: impl AsRef<Path>, issues_only: bool) -> Result<Inventory> {
    let pres = Presentation::open(pptx_path)?;
    inventory_of(&pres, issues_only)
}

/// Build the inventory of an opened presentation.
pub fn inventory_of(pres: &Presentation, issues_only: bool) -> Result<Inventory> {
    let mut inventory = Inventory::default();
    for slide in pres.slides()? {
        let mut shapes = slide_shapes(pres, &slide);
        if issues_only {
            shapes.retain(ShapeData::has_issues);
        }
        debug!(slide = slide.index, shapes = shapes.len(), "inventoried slide");
        if !shapes.is_empty() {
            inventory.slides.push(SlideInventory {
                index: slide.index,
                shapes,
            });
        }
    }
    Ok(inventory)
}

/// Text-bearing shapes of a slide in reading order, with ids assigned and
/// every check applied.
pub fn slide_shapes(pres: &Presentation, slide: &Slide) -> Vec<ShapeData> {
    let ctx = pres.context(slide);
    let (slide_width, slide_height) = pres.slide_size();

    let mut refs = slide.shapes();
    ctx.resolve(&mut refs);

    let mut shapes: Vec<ShapeData> = refs
        .into_iter()
        .filter_map(|shape| {
            let tx_body = slide.shape_element(&shape)?.child("txBody")?;
            qualifies(&shape, tx_body).then(|| build_shape(shape, tx_body, &ctx))
        })
        .collect();

    sort_by_position(&mut shapes);
    for (i, shape) in shapes.iter_mut().enumerate() {
        shape.id = format!("shape-{}", i);
        check_slide_overflow(shape, slide_width, slide_height);
    }
    detect_overlaps(&mut shapes);
    shapes
}

fn qualifies(shape: &ShapeRef, tx_body: &Element) -> bool {
    if !shape.has_text_frame {
        return false;
    }
    let content = text::frame_text(tx_body);
    let content = content.trim();
    if content.is_empty() {
        return false;
    }
    match shape.placeholder_type() {
        Some("SLIDE_NUMBER") => false,
        Some("FOOTER") => !content.chars().all(|c| c.is_ascii_digit()),
        _ => true,
    }
}

fn build_shape(shape: ShapeRef, tx_body: &Element, ctx: &SlideContext) -> ShapeData {
    let placeholder_type = shape.placeholder_type();
    let default_font_size = shape
        .placeholder
        .as_ref()
        .and_then(|ph| ctx.layout_placeholder(ph))
        .and_then(|e| {
            e.descendants()
                .into_iter()
                .filter(|d| d.is("defRPr"))
                .find_map(|d| d.attr_i64("sz"))
        })
        .map(|sz| sz as f64 / 100.0);

    let paragraphs: Vec<ParagraphData> = text::paragraphs(tx_body)
        .map(ParagraphData::from_element)
        .filter(|p| !p.text.is_empty())
        .collect();

    let warnings = if paragraphs
        .iter()
        .any(|p| MANUAL_BULLETS.iter().any(|b| p.text.starts_with(&format!("{} ", b))))
    {
        vec![MANUAL_BULLET_WARNING.to_string()]
    } else {
        Vec::new()
    };

    let mut data = ShapeData {
        id: String::new(),
        left: round2(emu_to_inches(shape.bounds.left)),
        top: round2(emu_to_inches(shape.bounds.top)),
        width: round2(emu_to_inches(shape.bounds.width)),
        height: round2(emu_to_inches(shape.bounds.height)),
        shape,
        placeholder_type,
        default_font_size,
        frame_overflow_bottom: None,
        slide_overflow_right: None,
        slide_overflow_bottom: None,
        overlapping_shapes: Vec::new(),
        warnings,
        paragraphs: Vec::new(),
    };

    let title = placeholder_type.is_some_and(|t| t.contains("TITLE"));
    let default_size = ctx.master_style_size(title).unwrap_or(FALLBACK_FONT_SIZE);
    data.frame_overflow_bottom = estimate_frame_overflow(&data, tx_body, default_size);
    data.paragraphs = paragraphs;
    data
}

/// Sort into rows by top edge, each row left to right.
fn sort_by_position(shapes: &mut Vec<ShapeData>) {
    if shapes.is_empty() {
        return;
    }
    shapes.sort_by(|a, b| a.top.total_cmp(&b.top).then(a.left.total_cmp(&b.left)));

    let mut sorted = Vec::with_capacity(shapes.len());
    let mut row: Vec<ShapeData> = Vec::new();
    let mut row_top = shapes[0].top;
    for shape in shapes.drain(..) {
        if (shape.top - row_top).abs() > ROW_TOLERANCE {
            row.sort_by(|a, b| a.left.total_cmp(&b.left));
            sorted.append(&mut row);
            row_top = shape.top;
        }
        row.push(shape);
    }
    row.sort_by(|a, b| a.left.total_cmp(&b.left));
    sorted.append(&mut row);
    *shapes = sorted;
}

fn check_slide_overflow(shape: &mut ShapeData, slide_width: i64, slide_height: i64) {
    let bounds = shape.shape.bounds;
    let excess = |edge: i64, limit: i64| {
        (edge > limit)
            .then(|| round2(emu_to_inches(edge - limit)))
            .filter(|v| *v > SLIDE_OVERFLOW_THRESHOLD)
    };
    shape.slide_overflow_right = excess(bounds.right(), slide_width);
    shape.slide_overflow_bottom = excess(bounds.bottom(), slide_height);
}

fn detect_overlaps(shapes: &mut [ShapeData]) {
    for i in 0..shapes.len() {
        for j in i + 1..shapes.len() {
            if let Some(area) = overlap_area(&shapes[i], &shapes[j]) {
                let (first, second) = (shapes[i].id.clone(), shapes[j].id.clone());
                shapes[i].overlapping_shapes.push((second, area));
                shapes[j].overlapping_shapes.push((first, area));
            }
        }
    }
}

fn overlap_area(a: &ShapeData, b: &ShapeData) -> Option<f64> {
    let w = (a.left + a.width).min(b.left + b.width) - a.left.max(b.left);
    let h = (a.top + a.height).min(b.top + b.height) - a.top.max(b.top);
    (w > OVERLAP_TOLERANCE && h > OVERLAP_TOLERANCE).then(|| round2(w * h))
}

/// Estimated distance the text runs past the bottom of its frame, in inches.
fn estimate_frame_overflow(shape: &ShapeData, tx_body: &Element, default_size: f64) -> Option<f64> {
    let insets = Insets::from_body(tx_body);
    let usable_width = shape.width - emu_to_inches(insets.left) - emu_to_inches(insets.right);
    let usable_height = shape.height - emu_to_inches(insets.top) - emu_to_inches(insets.bottom);
    let width_px = (usable_width * DPI).trunc();
    let height_px = (usable_height * DPI).trunc();
    if width_px <= 0.0 || height_px <= 0.0 {
        return None;
    }

    let mut total_px = 0.0;
    for (index, p) in text::paragraphs(tx_body).enumerate() {
        let content = text::paragraph_text(p);
        if content.trim().is_empty() {
            continue;
        }
        let data = ParagraphData::from_element(p);
        let font_size = data.font_size.unwrap_or(default_size).trunc();
        let em_px = font_size * DPI / 72.0;

        let lines: usize = content
            .split('\n')
            .map(|line| wrap_line(line, width_px, em_px))
            .sum();
        let line_height = data.line_spacing.unwrap_or(font_size) * DPI / 72.0;

        if index > 0 {
            if let Some(before) = data.space_before {
                total_px += before * DPI / 72.0;
            }
        }
        total_px += lines as f64 * line_height;
        if let Some(after) = data.space_after {
            total_px += after * DPI / 72.0;
        }
    }

    if total_px <= height_px {
        return None;
    }
    Some(round2((total_px - height_px) / DPI)).filter(|v| *v > FRAME_OVERFLOW_THRESHOLD)
}

/// Approximate rendered width of `s` in pixels.
fn text_width(s: &str, em_px: f64) -> f64 {
    s.chars()
        .map(|c| match c.width() {
            Some(2) => em_px,
            Some(1) => em_px * NARROW_GLYPH_EM,
            _ => 0.0,
        })
        .sum()
}

/// Number of lines `line` takes with greedy word wrapping.
fn wrap_line(line: &str, max_px: f64, em_px: f64) -> usize {
    if line.is_empty() || text_width(line, em_px) <= max_px {
        return 1;
    }
    let mut count = 0;
    let mut current = String::new();
    for word in line.split(' ') {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if text_width(&candidate, em_px) <= max_px {
            current = candidate;
        } else {
            if !current.is_empty() {
                count += 1;
            }
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        count += 1;
    }
    count.max(1)
}

/// Serialize `(key, value)` pairs as a JSON object, keeping their order.
struct Ordered<'a, V>(&'a [(String, V)]);

impl<V: Serialize> Serialize for Ordered<'_, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for Inventory {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.slides.len()))?;
        for slide in &self.slides {
            map.serialize_entry(&slide.key(), slide)?;
        }
        map.end()
    }
}

impl Serialize for SlideInventory {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.shapes.len()))?;
        for shape in &self.shapes {
            map.serialize_entry(&shape.id, shape)?;
        }
        map.end()
    }
}

#[derive(Serialize)]
struct FrameOverflow {
    overflow_bottom: f64,
}

#[derive(Serialize)]
struct SlideOverflow {
    #[serde(skip_serializing_if = "Option::is_none")]
    overflow_right: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    overflow_bottom: Option<f64>,
}

#[derive(Serialize)]
struct Overflow {
    #[serde(skip_serializing_if = "Option::is_none")]
    frame: Option<FrameOverflow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    slide: Option<SlideOverflow>,
}

impl Serialize for ShapeData {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("left", &self.left)?;
        map.serialize_entry("top", &self.top)?;
        map.serialize_entry("width", &self.width)?;
        map.serialize_entry("height", &self.height)?;
        if let Some(kind) = self.placeholder_type {
            map.serialize_entry("placeholder_type", kind)?;
        }
        if let Some(size) = self.default_font_size.filter(|s| *s != 0.0) {
            map.serialize_entry("default_font_size", &size)?;
        }

        let slide = (self.slide_overflow_right.is_some() || self.slide_overflow_bottom.is_some())
            .then_some(SlideOverflow {
                overflow_right: self.slide_overflow_right,
                overflow_bottom: self.slide_overflow_bottom,
            });
        let frame = self
            .frame_overflow_bottom
            .map(|overflow_bottom| FrameOverflow { overflow_bottom });
        if frame.is_some() || slide.is_some() {
            map.serialize_entry("overflow", &Overflow { frame, slide })?;
        }

        if !self.overlapping_shapes.is_empty() {
            #[derive(Serialize)]
            struct Overlap<'a> {
                overlapping_shapes: Ordered<'a, f64>,
            }
            map.serialize_entry(
                "overlap",
                &Overlap {
                    overlapping_shapes: Ordered(&self.overlapping_shapes),
                },
            )?;
        }
        if !self.warnings.is_empty() {
            map.serialize_entry("warnings", &self.warnings)?;
        }
        map.serialize_entry("paragraphs", &self.paragraphs)?;
        map.end()
    }
}

/// Convert an inventory to JSON.
pub fn to_json(inventory: &Inventory, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Compact => serde_json::to_string(inventory)?,
        JsonFormat::Pretty => serde_json::to_string_pretty(inventory)?,
    };
    Ok(json)
}

/// Write an inventory as pretty JSON and return the summary line.
pub fn save_inventory(inventory: &Inventory, output_path: impl AsRef<Path>) -> Result<String> {
    let output_path = output_path.as_ref();
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output_path, to_json(inventory, JsonFormat::Pretty)?)
        .map_err(|e| Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", output_path.display(), e))))?;
    Ok(format!(
        "Inventory saved to: {}\nFound text in {} slides with {} text elements",
        output_path.display(),
        inventory.slide_count(),
        inventory.shape_count()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create::{build_presentation, PresentationSpec};
    use crate::xml;
    use serde_json::{json, Value};

    fn deck(spec: Value) -> Presentation {
        let spec: PresentationSpec = serde_json::from_value(spec).unwrap();
        build_presentation(&spec).unwrap()
    }

    fn paragraph(xml_text: &str) -> ParagraphData {
        let doc = xml::parse(&format!(
            r#"<a:p xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">{}</a:p>"#,
            xml_text
        ))
        .unwrap();
        ParagraphData::from_element(&doc.root)
    }

    #[test]
    fn test_paragraph_formatting() {
        let p = paragraph(
            r#"<a:pPr lvl="1" algn="ctr"><a:spcBef><a:spcPts val="600"/></a:spcBef><a:buChar char="•"/></a:pPr>
               <a:r><a:rPr sz="2400" b="1" u="sng"><a:solidFill><a:srgbClr val="ff0000"/></a:solidFill><a:latin typeface="Arial"/></a:rPr><a:t> Hello </a:t></a:r>"#,
        );
        assert_eq!(p.text, "Hello");
        assert!(p.bullet);
        assert_eq!(p.level, Some(1));
        assert_eq!(p.alignment, Some("CENTER"));
        assert_eq!(p.space_before, Some(6.0));
        assert_eq!(p.font_size, Some(24.0));
        assert_eq!(p.bold, Some(true));
        assert_eq!(p.underline, Some(true));
        assert_eq!(p.color.as_deref(), Some("FF0000"));
        assert_eq!(p.font_name.as_deref(), Some("Arial"));
    }

    #[test]
    fn test_paragraph_theme_color_and_line_spacing() {
        let p = paragraph(
            r#"<a:pPr><a:lnSpc><a:spcPct val="150000"/></a:lnSpc></a:pPr>
               <a:r><a:rPr><a:solidFill><a:schemeClr val="accent1"/></a:solidFill></a:rPr><a:t>x</a:t></a:r>"#,
        );
        assert_eq!(p.theme_color, Some("ACCENT_1"));
        assert_eq!(p.color, None);
        assert_eq!(p.line_spacing, Some(18.0));

        let json = serde_json::to_value(&p).unwrap();
        assert!(json.get("bullet").is_none());
        assert!(json.get("alignment").is_none());
    }

    #[test]
    fn test_reading_order() {
        let pres = deck(json!({"slides": [{"shapes": [
            {"type": "textbox", "left": 5, "top": 1.2, "width": 2, "height": 1, "text": "B"},
            {"type": "textbox", "left": 1, "top": 1.0, "width": 2, "height": 1, "text": "A"},
            {"type": "textbox", "left": 1, "top": 3.0, "width": 2, "height": 1, "text": "C"},
            {"type": "textbox", "left": 1, "top": 5.0, "width": 2, "height": 1, "text": "  "}
        ]}]}));
        let inventory = inventory_of(&pres, false).unwrap();
        let slide = inventory.slide("slide-0").unwrap();
        let texts: Vec<&str> = slide.shapes.iter().map(|s| s.paragraphs[0].text.as_str()).collect();
        assert_eq!(texts, ["A", "B", "C"]);
        assert_eq!(slide.shapes[1].id, "shape-1");
        assert!(!slide.shapes[0].has_issues());
    }

    #[test]
    fn test_overlap_and_slide_overflow() {
        let pres = deck(json!({"layout": "4:3", "slides": [{"shapes": [
            {"type": "textbox", "left": 1, "top": 1, "width": 3, "height": 2, "text": "one"},
            {"type": "textbox", "left": 2, "top": 2, "width": 3, "height": 2, "text": "two"},
            {"type": "textbox", "left": 8, "top": 6, "width": 3, "height": 2, "text": "edge"}
        ]}]}));
        let inventory = inventory_of(&pres, false).unwrap();
        let slide = &inventory.slides[0];
        assert_eq!(slide.shapes[0].overlapping_shapes, vec![("shape-1".to_string(), 2.0)]);
        assert_eq!(slide.shapes[1].overlapping_shapes, vec![("shape-0".to_string(), 2.0)]);
        assert_eq!(slide.shapes[2].slide_overflow_right, Some(1.0));
        assert_eq!(slide.shapes[2].slide_overflow_bottom, Some(0.5));
    }

    #[test]
    fn test_frame_overflow_and_warning() {
        let long = "word ".repeat(200);
        let pres = deck(json!({"slides": [{"shapes": [
            {"type": "textbox", "left": 1, "top": 1, "width": 3, "height": 0.5,
             "text": long, "font_size": 18},
            {"type": "textbox", "left": 6, "top": 1, "width": 3, "height": 1, "text": "• manual"}
        ]}]}));
        let inventory = inventory_of(&pres, false).unwrap();
        let shapes = &inventory.slides[0].shapes;
        assert!(shapes[0].frame_overflow_bottom.unwrap() > 1.0);
        assert_eq!(shapes[1].warnings, vec![MANUAL_BULLET_WARNING.to_string()]);
    }

    #[test]
    fn test_numeric_footers_are_skipped() {
        let mut pres = deck(json!({"slides": [{"shapes": [
            {"type": "textbox", "top": 1, "text": "12"},
            {"type": "textbox", "top": 2, "text": "½"},
            {"type": "textbox", "top": 3, "text": "Ⅻ"},
            {"type": "textbox", "top": 4, "text": "Draft"}
        ]}]}));
        let mut slide = pres.slide(0).unwrap();
        let sp_tree = slide.sp_tree_mut().unwrap();
        for sp in sp_tree.elements_mut().filter(|e| e.is("sp")) {
            let nv_pr = sp.find_mut(&["nvSpPr", "nvPr"]).unwrap();
            nv_pr.push(xml::Element::new("p:ph").with_attr("type", "ftr"));
        }
        pres.put_slide(&slide);

        let inventory = inventory_of(&pres, false).unwrap();
        let shapes = &inventory.slides[0].shapes;
        let texts: Vec<&str> = shapes.iter().map(|s| s.paragraphs[0].text.as_str()).collect();
        assert_eq!(texts, ["½", "Ⅻ", "Draft"]);
        assert!(shapes.iter().all(|s| s.placeholder_type == Some("FOOTER")));
    }

    #[test]
    fn test_issues_only_filters() {
        let pres = deck(json!({"slides": [
            {"shapes": [{"type": "textbox", "text": "fine"}]},
            {"shapes": [{"type": "textbox", "text": "● bad"}]}
        ]}));
        let inventory = inventory_of(&pres, true).unwrap();
        assert_eq!(inventory.slide_count(), 1);
        assert_eq!(inventory.slides[0].key(), "slide-1");
    }

    #[test]
    fn test_json_keeps_order() {
        let shapes: Vec<Value> = (0..12)
            .map(|i| json!({"shapes": [{"type": "textbox", "text": format!("s{}", i)}]}))
            .collect();
        let pres = deck(json!({ "slides": shapes }));
        let inventory = inventory_of(&pres, false).unwrap();
        let json = to_json(&inventory, JsonFormat::Compact).unwrap();
        let pos2 = json.find("\"slide-2\"").unwrap();
        let pos10 = json.find("\"slide-10\"").unwrap();
        assert!(pos2 < pos10);
        assert!(json.contains(r#""shape-0":{"left":0.5,"top":0.5,"width":5.0,"height":1.0"#));
    }

    #[test]
    fn test_wrap_line() {
        assert_eq!(wrap_line("", 100.0, 10.0), 1);
        assert_eq!(wrap_line("abc", 100.0, 10.0), 1);
        // each word is 5.5 px per char: "aaaa" = 22px
        assert_eq!(wrap_line("aaaa aaaa aaaa", 50.0, 10.0), 3);
        assert_eq!(text_width("日本", 10.0), 20.0);
    }

    #[test]
    fn test_save_inventory_summary() {
        let pres = deck(json!({"slides": [{"shapes": [{"type": "textbox", "text": "é"}]}]}));
        let inventory = inventory_of(&pres, false).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inv.json");
        let message = save_inventory(&inventory, &path).unwrap();
        assert!(message.ends_with("Found text in 1 slides with 1 text elements"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"é\""));
        assert!(written.contains("\n  \"slide-0\""));
    }
}
