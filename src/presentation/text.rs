//! Text frame access and paragraph building.

use super::units::{pt_to_centipoints, EMU_PER_INCH};
use crate::error::{Error, Result};
use crate::xml::{Element, Node};
use serde::Deserialize;

/// Elements that may follow `a:pPr` children in schema order, used to keep
/// insertion positions valid.
const PPR_AFTER_SPACING: &[&str] = &[
    "buClrTx", "buClr", "buSzTx", "buSzPct", "buSzPts", "buFontTx", "buFont", "buNone",
    "buAutoNum", "buChar", "buBlip", "tabLst", "defRPr", "extLst",
];

/// Text frame insets in EMU.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Insets {
    pub left: i64,
    pub right: i64,
    pub top: i64,
    pub bottom: i64,
}

impl Default for Insets {
    fn default() -> Self {
        Self {
            left: EMU_PER_INCH / 10,
            right: EMU_PER_INCH / 10,
            top: EMU_PER_INCH / 20,
            bottom: EMU_PER_INCH / 20,
        }
    }
}

impl Insets {
    /// Read `a:bodyPr` insets; absent or zero values keep the defaults.
    pub fn from_body(tx_body: &Element) -> Self {
        let mut insets = Insets::default();
        if let Some(body_pr) = tx_body.child("bodyPr") {
            let read = |name: &str, slot: &mut i64| {
                if let Some(v) = body_pr.attr_i64(name).filter(|v| *v != 0) {
                    *slot = v;
                }
            };
            read("lIns", &mut insets.left);
            read("rIns", &mut insets.right);
            read("tIns", &mut insets.top);
            read("bIns", &mut insets.bottom);
        }
        insets
    }
}

/// Paragraphs (`a:p`) of a text body.
pub fn paragraphs(tx_body: &Element) -> impl Iterator<Item = &Element> {
    tx_body.children_named("p")
}

/// Runs (`a:r`) of a paragraph.
pub fn runs(paragraph: &Element) -> impl Iterator<Item = &Element> {
    paragraph.children_named("r")
}

/// Text of a paragraph; line breaks become `\n`.
pub fn paragraph_text(paragraph: &Element) -> String {
    let mut out = String::new();
    for child in paragraph.elements() {
        match child.local_name() {
            "r" | "fld" => {
                if let Some(t) = child.child("t") {
                    out.push_str(&t.text());
                }
            }
            "br" => out.push('\n'),
            _ => {}
        }
    }
    out
}

/// Text of a whole text body, paragraphs joined by `\n`.
pub fn frame_text(tx_body: &Element) -> String {
    paragraphs(tx_body)
        .map(paragraph_text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse `#RRGGBB` or `RRGGBB` into upper-case hex.
pub fn parse_hex_color(value: &str) -> Option<String> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(hex.to_ascii_uppercase())
    } else {
        None
    }
}

/// Map an alignment name (any case) to its `algn` value.
pub fn parse_alignment(value: &str) -> Option<&'static str> {
    match value.to_ascii_lowercase().as_str() {
        "left" => Some("l"),
        "center" => Some("ctr"),
        "right" => Some("r"),
        "justify" => Some("just"),
        _ => None,
    }
}

/// `a:solidFill` with an sRGB color.
pub fn solid_fill(hex: &str) -> Element {
    Element::new("a:solidFill").with_child(Element::new("a:srgbClr").with_attr("val", hex))
}

/// Formatting and content of one paragraph.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ParagraphSpec {
    #[serde(deserialize_with = "text_value")]
    pub text: String,
    pub alignment: Option<String>,
    pub align: Option<String>,
    pub bullet: Option<bool>,
    pub level: Option<u32>,
    pub bullet_char: Option<String>,
    pub space_before: Option<f64>,
    pub space_after: Option<f64>,
    pub line_spacing: Option<f64>,
    pub font_name: Option<String>,
    pub font_size: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub color: Option<String>,
}

/// Accept strings, numbers and booleans as paragraph text.
fn text_value<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

impl ParagraphSpec {
    /// Paragraph with just text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// `alignment`, falling back to its `align` alias.
    pub fn alignment(&self) -> Option<&str> {
        self.alignment.as_deref().or(self.align.as_deref())
    }
}

/// How a [`ParagraphSpec`] is applied.
#[derive(Debug, Clone, Default)]
pub struct ParagraphStyle {
    /// Font size when the paragraph names none.
    pub default_font_size: Option<f64>,
    /// Alignment when the paragraph names none.
    pub default_alignment: Option<&'static str>,
    /// Reject invalid colors instead of ignoring them.
    pub strict_colors: bool,
}

/// Remove runs, breaks and fields from a paragraph, keeping its properties.
pub fn clear_paragraph(paragraph: &mut Element) {
    paragraph.remove_elements(|e| matches!(e.local_name(), "r" | "br" | "fld"));
}

/// Empty a text body: the first paragraph is cleared, the rest removed.
pub fn clear_text_body(tx_body: &mut Element) {
    let mut seen_first = false;
    tx_body.remove_elements(|e| {
        if !e.is("p") {
            return false;
        }
        if seen_first {
            return true;
        }
        seen_first = true;
        false
    });
    match tx_body.child_mut("p") {
        Some(p) => clear_paragraph(p),
        None => {
            tx_body.push(Element::new("a:p"));
        }
    }
}

/// Apply a paragraph spec to an `a:p`, appending the text as runs.
pub fn apply_paragraph(
    paragraph: &mut Element,
    spec: &ParagraphSpec,
    style: &ParagraphStyle,
) -> Result<()> {
    let color = match spec.color.as_deref() {
        Some(raw) => match parse_hex_color(raw) {
            Some(hex) => Some(hex),
            None if style.strict_colors => {
                return Err(Error::InvalidData(format!("Invalid color: {}", raw)))
            }
            None => None,
        },
        None => None,
    };

    let p_pr = paragraph.get_or_insert("pPr", &["r", "br", "fld", "endParaRPr"], || {
        Element::new("a:pPr")
    });

    if let Some(algn) = spec
        .alignment()
        .and_then(parse_alignment)
        .or(style.default_alignment)
    {
        p_pr.set_attr("algn", algn);
    }

    if let Some(pt) = spec.line_spacing {
        set_spacing(p_pr, "lnSpc", pt, &["spcBef", "spcAft"]);
    }
    if let Some(pt) = spec.space_before {
        set_spacing(p_pr, "spcBef", pt, &["spcAft"]);
    }
    if let Some(pt) = spec.space_after {
        set_spacing(p_pr, "spcAft", pt, &[]);
    }

    if spec.bullet.unwrap_or(false) {
        let level = spec.level.unwrap_or(0);
        if level > 0 {
            p_pr.set_attr("lvl", level.to_string());
        } else {
            p_pr.remove_attr("lvl");
        }
        p_pr.remove_elements(|e| e.local_name().starts_with("bu"));
        let ch = spec.bullet_char.as_deref().unwrap_or("\u{2022}");
        p_pr.insert_before(
            Element::new("a:buChar").with_attr("char", ch),
            &["tabLst", "defRPr", "extLst"],
        );
    }

    let mut r_pr = Element::new("a:rPr").with_attr("lang", "en-US");
    if let Some(size) = spec.font_size.or(style.default_font_size) {
        r_pr.set_attr("sz", pt_to_centipoints(size).to_string());
    }
    if let Some(b) = spec.bold {
        r_pr.set_attr("b", if b { "1" } else { "0" });
    }
    if let Some(i) = spec.italic {
        r_pr.set_attr("i", if i { "1" } else { "0" });
    }
    if let Some(u) = spec.underline {
        r_pr.set_attr("u", if u { "sng" } else { "none" });
    }
    r_pr.set_attr("dirty", "0");
    if let Some(hex) = color {
        r_pr.push(solid_fill(&hex));
    }
    if let Some(font) = spec.font_name.as_deref().filter(|f| !f.is_empty()) {
        r_pr.push(Element::new("a:latin").with_attr("typeface", font));
    }

    let lines: Vec<&str> = spec.text.split(['\n', '\u{b}']).collect();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            paragraph.insert_before(
                Element::new("a:br").with_child(r_pr.clone()),
                &["endParaRPr"],
            );
        }
        let mut t = Element::new("a:t");
        t.children.push(Node::Text(line.to_string()));
        paragraph.insert_before(
            Element::new("a:r").with_child(r_pr.clone()).with_child(t),
            &["endParaRPr"],
        );
    }
    Ok(())
}

fn set_spacing(p_pr: &mut Element, local: &str, pt: f64, before: &[&str]) {
    let mut order: Vec<&str> = before.to_vec();
    order.extend_from_slice(PPR_AFTER_SPACING);
    p_pr.remove_elements(|e| e.is(local));
    p_pr.insert_before(
        Element::new(format!("a:{}", local)).with_child(
            Element::new("a:spcPts").with_attr("val", pt_to_centipoints(pt).to_string()),
        ),
        &order,
    );
}

/// Build a new `a:p` from a spec.
pub fn build_paragraph(spec: &ParagraphSpec, style: &ParagraphStyle) -> Result<Element> {
    let mut p = Element::new("a:p");
    apply_paragraph(&mut p, spec, style)?;
    Ok(p)
}
