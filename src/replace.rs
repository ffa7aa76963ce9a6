//! Replacing the text of existing shapes.
//!
//! Replacements are keyed the same way the inventory is: `slide-<i>` then
//! `shape-<j>`, where shapes are numbered in reading order. Each listed shape
//! gets the given paragraphs; every other text shape is cleared unless
//! `clear_unspecified` is off.

use crate::error::{Error, Result};
use crate::inventory::{slide_shapes, ShapeData};
use crate::presentation::text::{self, ParagraphSpec, ParagraphStyle};
use crate::presentation::{Presentation, Slide};
use crate::xml::Element;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info};

/// Digits after `prefix`, as in `slide-12`.
fn numbered_id<'a>(id: &'a str, prefix: &str) -> Option<&'a str> {
    id.strip_prefix(prefix)
        .filter(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Read replacements from a JSON file, or parse `source` itself as JSON when
/// no such file exists.
pub fn load_replacements(source: &str) -> Result<Value> {
    let path = Path::new(source);
    let json = if path.is_file() {
        std::fs::read_to_string(path)?
    } else {
        source.to_string()
    };
    Ok(serde_json::from_str(&json)?)
}

/// Apply replacements from `replacements` to `pptx_path` and write the
/// result to `output_path`.
pub fn apply_replacements(
    pptx_path: impl AsRef<Path>,
    replacements: &Value,
    output_path: impl AsRef<Path>,
    clear_unspecified: bool,
) -> Result<()> {
    let pptx_path = pptx_path.as_ref();
    let output_path = output_path.as_ref();
    if !pptx_path.is_file() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("PowerPoint file not found: {}", pptx_path.display()),
        )));
    }

    let mut pres = Presentation::open(pptx_path)?;
    replace_in(&mut pres, replacements, clear_unspecified)?;
    pres.save(output_path)?;
    info!(input = %pptx_path.display(), output = %output_path.display(), "replacements applied");
    Ok(())
}

/// Validate and apply replacements to an opened presentation.
pub fn replace_in(pres: &mut Presentation, replacements: &Value, clear_unspecified: bool) -> Result<()> {
    let errors = validate_replacements(pres, replacements)?;
    if !errors.is_empty() {
        return Err(Error::Validation(errors));
    }

    let empty = Map::new();
    let by_slide = replacements.as_object().unwrap_or(&empty);

    for mut slide in pres.slides()? {
        let shapes = slide_shapes(pres, &slide);
        let listed = by_slide
            .get(&format!("slide-{}", slide.index))
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        let mut touched = false;
        for shape in &shapes {
            match listed.get(&shape.id) {
                Some(specs) => {
                    let specs: Vec<ParagraphSpec> = serde_json::from_value(specs.clone())?;
                    replace_shape(&mut slide, shape, &specs)?;
                    touched = true;
                }
                None if clear_unspecified => {
                    if let Some(tx_body) = text_body_mut(&mut slide, shape) {
                        text::clear_text_body(tx_body);
                        touched = true;
                    }
                }
                None => {}
            }
        }
        if touched {
            debug!(slide = slide.index, shapes = shapes.len(), "rewrote slide text");
            pres.put_slide(&slide);
        }
    }
    Ok(())
}

/// Check replacement keys and shapes against the presentation. All problems
/// are returned together.
pub fn validate_replacements(pres: &Presentation, replacements: &Value) -> Result<Vec<String>> {
    let Some(by_slide) = replacements.as_object() else {
        return Ok(vec!["Expected dictionary of slide replacements".to_string()]);
    };

    let slide_count = pres.slide_count();
    let mut errors = Vec::new();
    for (slide_id, slide_value) in by_slide {
        let Some(number) = numbered_id(slide_id, "slide-") else {
            errors.push(format!("Invalid slide ID format: {}", slide_id));
            continue;
        };
        let index = match number.parse::<usize>() {
            Ok(i) if i < slide_count => i,
            _ => {
                errors.push(format!(
                    "Slide index out of range: {} (presentation has {} slides)",
                    slide_id, slide_count
                ));
                continue;
            }
        };

        let Some(shape_values) = slide_value.as_object() else {
            errors.push(format!("{}: Expected dictionary of shape replacements", slide_id));
            continue;
        };

        let slide = pres.slide(index)?;
        let available: Vec<String> = slide_shapes(pres, &slide).into_iter().map(|s| s.id).collect();

        for (shape_id, specs) in shape_values {
            let at = format!("{}/{}", slide_id, shape_id);
            if numbered_id(shape_id, "shape-").is_none() {
                errors.push(format!("{}: Invalid shape ID format", at));
                continue;
            }
            if !available.contains(shape_id) {
                errors.push(format!(
                    "{}: Shape not found (available: {})",
                    at,
                    list_repr(&available)
                ));
                continue;
            }
            let Some(specs) = specs.as_array() else {
                errors.push(format!("{}: Expected list of paragraph specifications", at));
                continue;
            };
            for (i, spec) in specs.iter().enumerate() {
                match spec.as_object() {
                    None => errors.push(format!("{}/paragraph-{}: Expected dictionary", at, i)),
                    Some(fields) if !fields.contains_key("text") => errors.push(format!(
                        "{}/paragraph-{}: Missing required 'text' field",
                        at, i
                    )),
                    Some(_) => {}
                }
            }
        }
    }
    Ok(errors)
}

/// `['a', 'b']`
fn list_repr(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| format!("'{}'", s)).collect();
    format!("[{}]", quoted.join(", "))
}

fn text_body_mut<'a>(slide: &'a mut Slide, shape: &ShapeData) -> Option<&'a mut Element> {
    slide.shape_element_mut(&shape.shape)?.child_mut("txBody")
}

fn replace_shape(slide: &mut Slide, shape: &ShapeData, specs: &[ParagraphSpec]) -> Result<()> {
    let style = ParagraphStyle {
        default_font_size: shape.default_font_size,
        ..Default::default()
    };
    let Some(tx_body) = text_body_mut(slide, shape) else {
        return Ok(());
    };
    text::clear_text_body(tx_body);
    for (i, spec) in specs.iter().enumerate() {
        if i == 0 {
            if let Some(first) = tx_body.child_mut("p") {
                text::apply_paragraph(first, spec, &style)?;
                continue;
            }
        }
        tx_body.push(text::build_paragraph(spec, &style)?);
    }
    Ok(())
}
