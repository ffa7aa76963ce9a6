//! Building new presentations from a JSON description.
//!
//! ```no_run
//! use slidedeck::create::{create_presentation, PresentationSpec};
//!
//! let spec: PresentationSpec = serde_json::from_str(r#"{
//!     "layout": "16:9",
//!     "slides": [{"shapes": [{"type": "textbox", "text": "Hello"}]}]
//! }"#)?;
//! let message = create_presentation("out/hello.pptx", &spec)?;
//! println!("{}", message);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::container::{rel_types, Package};
use crate::error::{Error, Result};
use crate::presentation::text::{self, ParagraphSpec, ParagraphStyle};
use crate::presentation::units::{inches_to_emu, pt_to_emu};
use crate::presentation::{shape, Presentation, Slide};
use crate::xml::Element;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

/// Named slide sizes in inches.
const LAYOUTS: &[(&str, f64, f64)] = &[
    ("16:9", 13.333, 7.5),
    ("4:3", 10.0, 7.5),
    ("widescreen", 13.333, 7.5),
    ("standard", 10.0, 7.5),
];

/// Slide size of the blank template, kept when neither a known layout nor a
/// custom size is given.
const TEMPLATE_SIZE: (f64, f64) = (10.0, 7.5);

const DEFAULT_LEFT: f64 = 0.5;
const DEFAULT_TOP: f64 = 0.5;
const DEFAULT_WIDTH: f64 = 5.0;
const DEFAULT_HEIGHT: f64 = 1.0;

/// Description of a whole presentation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PresentationSpec {
    /// `16:9` (default), `4:3`, `widescreen` or `standard`.
    pub layout: Option<String>,
    /// Custom width in inches, used with `height` when `layout` is not a
    /// known name.
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub slides: Vec<SlideSpec>,
}

impl PresentationSpec {
    /// Slide size in inches. A custom size must be positive in both
    /// directions, since `p:sldSz` does not accept zero or negative extents.
    pub fn dimensions(&self) -> (f64, f64) {
        let layout = self.layout.as_deref().unwrap_or("16:9");
        if let Some((_, w, h)) = LAYOUTS.iter().find(|(name, _, _)| *name == layout) {
            return (*w, *h);
        }
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0.0 && h > 0.0 => (w, h),
            _ => TEMPLATE_SIZE,
        }
    }
}

/// One slide: optional background and shapes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SlideSpec {
    /// `"#RRGGBB"` or `{"color": "#RRGGBB"}`.
    pub background: Option<Value>,
    pub shapes: Vec<ShapeSpec>,
}

/// One shape. Positions and sizes are in inches.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShapeSpec {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,

    pub text: Option<Value>,
    pub paragraphs: Vec<ParagraphSpec>,
    pub font_size: Option<f64>,
    pub font_name: Option<String>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub color: Option<String>,
    pub alignment: Option<String>,
    pub word_wrap: Option<bool>,
    pub valign: Option<String>,
    /// One number for all sides, or `[top, right, bottom, left]`.
    pub margin: Option<Value>,

    pub fill: Option<String>,
    pub fill_color: Option<String>,
    pub background: Option<Value>,
    /// `{"color", "width"}`, `false` or `"none"`.
    pub border: Option<Value>,
    pub line: Option<Value>,
    pub no_border: Option<bool>,
    pub no_line: Option<bool>,

    pub path: Option<String>,
    pub src: Option<String>,
    pub line_width: Option<f64>,
}

impl ShapeSpec {
    fn bounds(&self) -> (i64, i64, i64, i64) {
        (
            inches_to_emu(self.left.unwrap_or(DEFAULT_LEFT)),
            inches_to_emu(self.top.unwrap_or(DEFAULT_TOP)),
            inches_to_emu(self.width.unwrap_or(DEFAULT_WIDTH)),
            inches_to_emu(self.height.unwrap_or(DEFAULT_HEIGHT)),
        )
    }

    fn has_text(&self) -> bool {
        self.text.is_some() || !self.paragraphs.is_empty()
    }

    /// Paragraphs to write; a bare `text` becomes one paragraph carrying the
    /// shape-level formatting.
    fn effective_paragraphs(&self) -> Vec<ParagraphSpec> {
        if !self.paragraphs.is_empty() {
            return self.paragraphs.clone();
        }
        let Some(text) = &self.text else {
            return Vec::new();
        };
        vec![ParagraphSpec {
            text: match text {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            },
            font_size: self.font_size,
            font_name: self.font_name.clone(),
            bold: self.bold,
            italic: self.italic,
            color: self.color.clone(),
            alignment: self.alignment.clone(),
            ..Default::default()
        }]
    }
}

/// Build a presentation in memory.
pub fn build_presentation(spec: &PresentationSpec) -> Result<Presentation> {
    let (width, height) = spec.dimensions();
    let mut pres = Presentation::new_blank(inches_to_emu(width), inches_to_emu(height))?;
    let layout = pres.default_layout()?;

    let blank = [SlideSpec::default()];
    let slides: &[SlideSpec] = if spec.slides.is_empty() {
        &blank
    } else {
        &spec.slides
    };

    for (index, slide_spec) in slides.iter().enumerate() {
        let mut slide = pres.add_slide(&layout)?;
        fill_slide(&mut pres, &mut slide, slide_spec)
            .map_err(within(format!("slide {}", index)))?;
        pres.put_slide(&slide);
    }
    Ok(pres)
}

/// Build a presentation and write it to `output_path`.
pub fn create_presentation(output_path: impl AsRef<Path>, spec: &PresentationSpec) -> Result<String> {
    let output_path = output_path.as_ref();
    let pres = build_presentation(spec)?;
    pres.save(output_path)?;
    let count = pres.slide_count();
    info!(path = %output_path.display(), slides = count, "presentation created");
    Ok(format!(
        "Created presentation with {} slides: {}",
        count,
        output_path.display()
    ))
}

fn fill_slide(pres: &mut Presentation, slide: &mut Slide, spec: &SlideSpec) -> Result<()> {
    if let Some(background) = &spec.background {
        let hex = color_value(background)?;
        set_background(slide, &hex)?;
    }
    for (i, shape_spec) in spec.shapes.iter().enumerate() {
        add_shape(pres, slide, shape_spec).map_err(within(format!("shape {}", i)))?;
    }
    Ok(())
}

/// Prefix invalid-input errors with where they occurred.
fn within(label: String) -> impl FnOnce(Error) -> Error {
    move |err| match err {
        Error::InvalidData(msg) => Error::InvalidData(format!("{}: {}", label, msg)),
        other => other,
    }
}

/// Color from `"#RRGGBB"` or `{"color": "#RRGGBB"}`.
fn color_value(value: &Value) -> Result<String> {
    let raw = match value {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map.get("color").and_then(Value::as_str).unwrap_or_default(),
        _ => "",
    };
    strict_color(raw)
}

fn strict_color(raw: &str) -> Result<String> {
    text::parse_hex_color(raw).ok_or_else(|| Error::InvalidData(format!("Invalid color: {}", raw)))
}

fn set_background(slide: &mut Slide, hex: &str) -> Result<()> {
    let c_sld = slide
        .part
        .doc
        .root
        .child_mut("cSld")
        .ok_or_else(|| Error::MissingComponent("p:cSld".to_string()))?;
    c_sld.remove_elements(|e| e.is("bg"));
    c_sld.insert_before(
        Element::new("p:bg").with_child(
            Element::new("p:bgPr")
                .with_child(text::solid_fill(hex))
                .with_child(Element::new("a:effectLst")),
        ),
        &["spTree"],
    );
    Ok(())
}

fn add_shape(pres: &mut Presentation, slide: &mut Slide, spec: &ShapeSpec) -> Result<()> {
    let kind = spec.kind.as_deref().unwrap_or("textbox");
    let id = slide.sp_tree().map(shape::max_shape_id).unwrap_or(1) + 1;
    let (x, y, cx, cy) = spec.bounds();

    let element = match kind {
        "textbox" => {
            let mut sp = textbox(id, x, y, cx, cy);
            apply_text(&mut sp, spec)?;
            sp
        }
        "rectangle" | "rounded_rectangle" | "oval" => {
            let (prst, label) = match kind {
                "rectangle" => ("rect", "Rectangle"),
                "rounded_rectangle" => ("roundRect", "Rounded Rectangle"),
                _ => ("ellipse", "Oval"),
            };
            let mut sp = autoshape(id, label, prst, x, y, cx, cy);
            apply_fill(&mut sp, spec)?;
            if spec.has_text() {
                apply_text(&mut sp, spec)?;
            }
            sp
        }
        "image" => {
            let Some(path) = spec.path.as_deref().or(spec.src.as_deref()) else {
                warn!("image shape without a path skipped");
                return Ok(());
            };
            if !Path::new(path).exists() {
                warn!(path, "image file not found, shape skipped");
                return Ok(());
            }
            let rel_id = embed_image(pres, slide, Path::new(path))?;
            picture(id, path, &rel_id, x, y, cx, cy)
        }
        "line" => connector(id, spec, x, y, cx, cy)?,
        other => return Err(Error::InvalidData(format!("Unknown shape type: {}", other))),
    };

    debug!(kind, id, "shape added");
    slide
        .sp_tree_mut()
        .ok_or_else(|| Error::MissingComponent("p:spTree".to_string()))?
        .insert_before(element, &["extLst"]);
    Ok(())
}

fn xfrm(x: i64, y: i64, cx: i64, cy: i64) -> Element {
    Element::new("a:xfrm")
        .with_child(
            Element::new("a:off")
                .with_attr("x", x.to_string())
                .with_attr("y", y.to_string()),
        )
        .with_child(
            Element::new("a:ext")
                .with_attr("cx", cx.to_string())
                .with_attr("cy", cy.to_string()),
        )
}

fn prst_geom(prst: &str) -> Element {
    Element::new("a:prstGeom")
        .with_attr("prst", prst)
        .with_child(Element::new("a:avLst"))
}

fn c_nv_pr(id: u32, name: String) -> Element {
    Element::new("p:cNvPr")
        .with_attr("id", id.to_string())
        .with_attr("name", name)
}

fn scheme_ref(local: &str, idx: &str, color: &str) -> Element {
    Element::new(format!("a:{}", local))
        .with_attr("idx", idx)
        .with_child(Element::new("a:schemeClr").with_attr("val", color))
}

fn textbox(id: u32, x: i64, y: i64, cx: i64, cy: i64) -> Element {
    Element::new("p:sp")
        .with_child(
            Element::new("p:nvSpPr")
                .with_child(c_nv_pr(id, format!("TextBox {}", id - 1)))
                .with_child(Element::new("p:cNvSpPr").with_attr("txBox", "1"))
                .with_child(Element::new("p:nvPr")),
        )
        .with_child(
            Element::new("p:spPr")
                .with_child(xfrm(x, y, cx, cy))
                .with_child(prst_geom("rect"))
                .with_child(Element::new("a:noFill")),
        )
        .with_child(
            Element::new("p:txBody")
                .with_child(
                    Element::new("a:bodyPr")
                        .with_attr("wrap", "none")
                        .with_child(Element::new("a:spAutoFit")),
                )
                .with_child(Element::new("a:lstStyle"))
                .with_child(Element::new("a:p")),
        )
}

fn autoshape(id: u32, label: &str, prst: &str, x: i64, y: i64, cx: i64, cy: i64) -> Element {
    Element::new("p:sp")
        .with_child(
            Element::new("p:nvSpPr")
                .with_child(c_nv_pr(id, format!("{} {}", label, id - 1)))
                .with_child(Element::new("p:cNvSpPr"))
                .with_child(Element::new("p:nvPr")),
        )
        .with_child(
            Element::new("p:spPr")
                .with_child(xfrm(x, y, cx, cy))
                .with_child(prst_geom(prst)),
        )
        .with_child(
            Element::new("p:style")
                .with_child(scheme_ref("lnRef", "1", "accent1"))
                .with_child(scheme_ref("fillRef", "3", "accent1"))
                .with_child(scheme_ref("effectRef", "2", "accent1"))
                .with_child(scheme_ref("fontRef", "minor", "lt1")),
        )
        .with_child(
            Element::new("p:txBody")
                .with_child(
                    Element::new("a:bodyPr")
                        .with_attr("rtlCol", "0")
                        .with_attr("anchor", "ctr"),
                )
                .with_child(Element::new("a:lstStyle"))
                .with_child(
                    Element::new("a:p").with_child(Element::new("a:pPr").with_attr("algn", "ctr")),
                ),
        )
}

fn picture(id: u32, path: &str, rel_id: &str, x: i64, y: i64, cx: i64, cy: i64) -> Element {
    let descr = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Element::new("p:pic")
        .with_child(
            Element::new("p:nvPicPr")
                .with_child(
                    c_nv_pr(id, format!("Picture {}", id - 1)).with_attr("descr", descr),
                )
                .with_child(
                    Element::new("p:cNvPicPr").with_child(
                        Element::new("a:picLocks").with_attr("noChangeAspect", "1"),
                    ),
                )
                .with_child(Element::new("p:nvPr")),
        )
        .with_child(
            Element::new("p:blipFill")
                .with_child(Element::new("a:blip").with_attr("r:embed", rel_id))
                .with_child(Element::new("a:stretch").with_child(Element::new("a:fillRect"))),
        )
        .with_child(
            Element::new("p:spPr")
                .with_child(xfrm(x, y, cx, cy))
                .with_child(prst_geom("rect")),
        )
}

/// Straight connector from (x, y) to (x + cx, y + cy); negative extents flip.
fn connector(id: u32, spec: &ShapeSpec, x: i64, y: i64, cx: i64, cy: i64) -> Result<Element> {
    let mut frame = xfrm(x.min(x + cx), y.min(y + cy), cx.abs(), cy.abs());
    if cx < 0 {
        frame.set_attr("flipH", "1");
    }
    if cy < 0 {
        frame.set_attr("flipV", "1");
    }

    let mut sp_pr = Element::new("p:spPr")
        .with_child(frame)
        .with_child(prst_geom("line"));
    if spec.color.is_some() || spec.line_width.is_some() {
        let mut ln = Element::new("a:ln");
        if let Some(w) = spec.line_width {
            ln.set_attr("w", pt_to_emu(w).to_string());
        }
        if let Some(raw) = spec.color.as_deref() {
            ln.push(text::solid_fill(&strict_color(raw)?));
        }
        sp_pr.push(ln);
    }

    Ok(Element::new("p:cxnSp")
        .with_child(
            Element::new("p:nvCxnSpPr")
                .with_child(c_nv_pr(id, format!("Straight Connector {}", id - 1)))
                .with_child(Element::new("p:cNvCxnSpPr"))
                .with_child(Element::new("p:nvPr")),
        )
        .with_child(sp_pr)
        .with_child(
            Element::new("p:style")
                .with_child(scheme_ref("lnRef", "1", "accent1"))
                .with_child(scheme_ref("fillRef", "0", "accent1"))
                .with_child(scheme_ref("effectRef", "0", "accent1"))
                .with_child(scheme_ref("fontRef", "minor", "tx1")),
        ))
}

fn apply_fill(sp: &mut Element, spec: &ShapeSpec) -> Result<()> {
    let sp_pr = sp
        .child_mut("spPr")
        .ok_or_else(|| Error::MissingComponent("p:spPr".to_string()))?;

    let fill = spec
        .fill
        .clone()
        .or_else(|| spec.fill_color.clone())
        .or_else(|| spec.background.as_ref().and_then(Value::as_str).map(str::to_string));
    if let Some(raw) = fill {
        sp_pr.push(text::solid_fill(&strict_color(&raw)?));
    }

    let border = spec.border.as_ref().or(spec.line.as_ref());
    let no_line = || Element::new("a:ln").with_child(Element::new("a:noFill"));
    match border {
        Some(Value::Object(map)) => {
            let mut ln = Element::new("a:ln");
            if let Some(w) = map.get("width").and_then(Value::as_f64) {
                ln.set_attr("w", pt_to_emu(w).to_string());
            }
            if let Some(raw) = map.get("color").and_then(Value::as_str) {
                ln.push(text::solid_fill(&strict_color(raw)?));
            }
            sp_pr.push(ln);
        }
        Some(Value::Bool(false)) => {
            sp_pr.push(no_line());
        }
        Some(Value::String(s)) if s.eq_ignore_ascii_case("none") => {
            sp_pr.push(no_line());
        }
        _ if spec.no_border.unwrap_or(false) || spec.no_line.unwrap_or(false) => {
            sp_pr.push(no_line());
        }
        _ => {}
    }
    Ok(())
}

fn apply_text(sp: &mut Element, spec: &ShapeSpec) -> Result<()> {
    let tx_body = sp
        .child_mut("txBody")
        .ok_or_else(|| Error::MissingComponent("p:txBody".to_string()))?;

    {
        let body_pr = tx_body.get_or_insert("bodyPr", &["lstStyle", "p"], || {
            Element::new("a:bodyPr")
        });
        let wrap = spec.word_wrap.unwrap_or(true);
        body_pr.set_attr("wrap", if wrap { "square" } else { "none" });

        let anchor = match spec.valign.as_deref().unwrap_or("top") {
            "top" => Some("t"),
            "middle" => Some("ctr"),
            "bottom" => Some("b"),
            _ => None,
        };
        if let Some(anchor) = anchor {
            body_pr.set_attr("anchor", anchor);
        }

        if let Some(margins) = spec.margin.as_ref().and_then(margin_values) {
            for (attr, inches) in ["tIns", "rIns", "bIns", "lIns"].into_iter().zip(margins) {
                body_pr.set_attr(attr, inches_to_emu(inches).to_string());
            }
        }
    }

    let style = ParagraphStyle {
        default_font_size: None,
        default_alignment: Some("l"),
        strict_colors: true,
    };
    for (i, para) in spec.effective_paragraphs().iter().enumerate() {
        if i == 0 {
            if let Some(first) = tx_body.child_mut("p") {
                text::apply_paragraph(first, para, &style)?;
                continue;
            }
        }
        tx_body.push(text::build_paragraph(para, &style)?);
    }
    Ok(())
}

/// `[top, right, bottom, left]` from a number or a four-item list.
fn margin_values(value: &Value) -> Option<[f64; 4]> {
    match value {
        Value::Number(n) => n.as_f64().map(|m| [m; 4]),
        Value::Array(items) if items.len() == 4 => {
            let mut out = [0.0; 4];
            for (slot, item) in out.iter_mut().zip(items) {
                *slot = item.as_f64()?;
            }
            Some(out)
        }
        _ => None,
    }
}

/// Copy an image into `ppt/media` and relate it to the slide.
fn embed_image(pres: &mut Presentation, slide: &mut Slide, path: &Path) -> Result<String> {
    let format = image::ImageReader::open(path)?
        .with_guessed_format()?
        .format();
    let (ext, content_type) = match format {
        Some(image::ImageFormat::Png) => ("png", "image/png"),
        Some(image::ImageFormat::Jpeg) => ("jpeg", "image/jpeg"),
        Some(image::ImageFormat::Gif) => ("gif", "image/gif"),
        Some(image::ImageFormat::Bmp) => ("bmp", "image/bmp"),
        _ => {
            return Err(Error::UnsupportedFormat(format!(
                "image {} (expected PNG, JPEG, GIF or BMP)",
                path.display()
            )))
        }
    };

    let data = std::fs::read(path)?;
    let package = pres.package_mut();
    let media = (1..)
        .map(|n| format!("ppt/media/image{}.{}", n, ext))
        .find(|name| !package.exists(name))
        .unwrap_or_default();
    package.put_part(&media, data);

    let mut types = package.content_types()?;
    types.ensure_default(ext, content_type);
    package.set_content_types(&types);

    Ok(slide.part.rels.add_target(
        rel_types::IMAGE,
        Package::relative_target(slide.name(), &media),
    ))
}
