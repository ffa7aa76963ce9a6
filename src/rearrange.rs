//! Reordering, duplicating and deleting slides.
//!
//! A sequence of zero-based slide indices describes the output deck exactly.
//! The first occurrence of an index keeps the original slide; every further
//! occurrence is a copy (slide XML, relationships and speaker notes). Slides
//! that do not appear are removed from the package.

use crate::container::{content_types, rel_types, rels_path_for, Package};
use crate::error::{Error, Result};
use crate::presentation::{Presentation, SlideId};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Parse `"0, 3,3,1"` into indices. Negative numbers parse here and are
/// rejected as out of range by [`rearrange`].
pub fn parse_sequence(sequence: &str) -> Result<Vec<i64>> {
    sequence
        .split(',')
        .map(|item| {
            item.trim().parse::<i64>().map_err(|_| {
                Error::InvalidData(
                    "Invalid sequence format. Use comma-separated integers (e.g., 0,34,34,50,52)"
                        .to_string(),
                )
            })
        })
        .collect()
}

/// Rearrange `template_path` into `output_path` following `sequence`.
pub fn rearrange_presentation(
    template_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    sequence: &[i64],
) -> Result<()> {
    let template_path = template_path.as_ref();
    let output_path = output_path.as_ref();
    let mut pres = Presentation::open(template_path)?;
    rearrange(&mut pres, sequence)?;
    pres.save(output_path)?;
    info!(
        template = %template_path.display(),
        output = %output_path.display(),
        slides = sequence.len(),
        "slides rearranged"
    );
    Ok(())
}

/// Rearrange an opened presentation in place.
pub fn rearrange(pres: &mut Presentation, sequence: &[i64]) -> Result<()> {
    let original = pres.slide_ids();
    let count = original.len();
    if sequence.is_empty() {
        return Err(Error::InvalidData(
            "Slide sequence must name at least one slide".to_string(),
        ));
    }
    let indices = slide_indices(sequence, count)?;

    let mut seen = HashSet::new();
    let mut order: Vec<SlideId> = Vec::with_capacity(indices.len());
    for index in indices {
        if seen.insert(index) {
            order.push(original[index].clone());
        } else {
            order.push(duplicate_slide(pres, &original[index])?);
        }
    }

    // duplicates were appended, so original positions are still valid
    for index in (0..count).rev().filter(|i| !seen.contains(i)) {
        pres.remove_slide(index)?;
    }

    pres.set_slide_ids(&order);
    debug!(slides = order.len(), removed = count - seen.len(), "slide list rewritten");
    Ok(())
}

/// Check every index against the slide count.
fn slide_indices(sequence: &[i64], count: usize) -> Result<Vec<usize>> {
    sequence
        .iter()
        .map(|&i| {
            usize::try_from(i).ok().filter(|i| *i < count).ok_or_else(|| {
                Error::InvalidData(format!(
                    "Slide index {} out of range. Presentation has {} slides (indices 0-{})",
                    i,
                    count,
                    count as i64 - 1
                ))
            })
        })
        .collect()
}

/// Copy a slide (with its notes) to a new part appended to the slide list.
fn duplicate_slide(pres: &mut Presentation, source: &SlideId) -> Result<SlideId> {
    let slide = pres.part(&source.part)?;
    let name = pres.next_slide_name();
    let mut rels = slide.rels.clone();

    if let Some(notes_source) = slide.related_part(rel_types::NOTES_SLIDE) {
        let notes_name = next_notes_name(pres.package());
        let mut notes = pres.part(&notes_source)?;
        notes.name = notes_name.clone();
        notes
            .rels
            .retarget_type(rel_types::SLIDE, &Package::relative_target(&notes_name, &name));
        pres.put_part(&notes);

        let package = pres.package_mut();
        let mut types = package.content_types()?;
        types.set_override(&notes_name, content_types::NOTES_SLIDE);
        package.set_content_types(&types);

        rels.retarget_type(
            rel_types::NOTES_SLIDE,
            &Package::relative_target(&name, &notes_name),
        );
    }

    pres.append_slide_part(&name, slide.doc, rels)?;
    debug!(source = %source.part, copy = %name, "slide duplicated");
    pres.slide_ids()
        .pop()
        .ok_or_else(|| Error::MissingComponent(name.clone()))
}

fn next_notes_name(package: &Package) -> String {
    (1..)
        .map(|n| format!("ppt/notesSlides/notesSlide{}.xml", n))
        .find(|name| !package.exists(name) && !package.exists(&rels_path_for(name)))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Relationships;
    use crate::create::{build_presentation, PresentationSpec};
    use crate::inventory::inventory_of;
    use crate::xml::{self, Document};
    use serde_json::json;

    fn deck(n: usize) -> Presentation {
        let slides: Vec<_> = (0..n)
            .map(|i| json!({"shapes": [{"type": "textbox", "text": format!("Slide {}", i)}]}))
            .collect();
        let spec: PresentationSpec = serde_json::from_value(json!({ "slides": slides })).unwrap();
        build_presentation(&spec).unwrap()
    }

    fn titles(pres: &Presentation) -> Vec<String> {
        inventory_of(pres, false)
            .unwrap()
            .slides
            .iter()
            .map(|s| s.shapes[0].paragraphs[0].text.clone())
            .collect()
    }

    #[test]
    fn test_parse_sequence() {
        assert_eq!(parse_sequence("0, 2 ,2,1").unwrap(), vec![0, 2, 2, 1]);
        let err = parse_sequence("0,a").unwrap_err();
        assert!(err.to_string().contains("Invalid sequence format"));
        assert!(parse_sequence("").is_err());
        assert_eq!(parse_sequence("0,-1").unwrap(), vec![0, -1]);
    }

    #[test]
    fn test_reorder_duplicate_delete() {
        let mut pres = deck(4);
        rearrange(&mut pres, &[2, 0, 2]).unwrap();
        assert_eq!(titles(&pres), ["Slide 2", "Slide 0", "Slide 2"]);

        let parts: HashSet<String> = pres.slide_ids().into_iter().map(|s| s.part).collect();
        assert_eq!(parts.len(), 3);
        let files = pres.package().list_files_with_prefix("ppt/slides/slide");
        assert_eq!(files.len(), 3);

        let types = pres.package().content_types().unwrap();
        for part in &parts {
            assert!(types.content_type_of(part).is_some());
        }
    }

    #[test]
    fn test_out_of_range() {
        let mut pres = deck(2);
        let err = rearrange(&mut pres, &[0, 5]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid data: Slide index 5 out of range. Presentation has 2 slides (indices 0-1)"
        );
        assert!(rearrange(&mut pres, &[]).is_err());

        let err = rearrange(&mut pres, &[0, -1]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid data: Slide index -1 out of range. Presentation has 2 slides (indices 0-1)"
        );
        assert_eq!(pres.slide_count(), 2);
    }

    #[test]
    fn test_duplicate_copies_notes() {
        let mut pres = deck(1);
        let slide_part = pres.slide_ids()[0].part.clone();

        let notes_name = "ppt/notesSlides/notesSlide1.xml";
        let notes_doc: Document = xml::parse(
            r#"<p:notes xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld/></p:notes>"#,
        )
        .unwrap();
        let mut notes_rels = Relationships::new();
        notes_rels.add_target(rel_types::SLIDE, "../slides/slide1.xml");
        let package = pres.package_mut();
        package.put_document(notes_name, &notes_doc);
        package.set_relationships(notes_name, &notes_rels);
        let mut slide_rels = package.relationships(&slide_part).unwrap();
        slide_rels.add_target(rel_types::NOTES_SLIDE, "../notesSlides/notesSlide1.xml");
        package.set_relationships(&slide_part, &slide_rels);

        rearrange(&mut pres, &[0, 0]).unwrap();
        let ids = pres.slide_ids();
        assert_eq!(ids.len(), 2);

        let copy = pres.part(&ids[1].part).unwrap();
        let copy_notes = copy.related_part(rel_types::NOTES_SLIDE).unwrap();
        assert_eq!(copy_notes, "ppt/notesSlides/notesSlide2.xml");
        let back = pres.part(&copy_notes).unwrap();
        assert_eq!(back.related_part(rel_types::SLIDE).unwrap(), ids[1].part);
    }

    #[test]
    fn test_rearrange_presentation_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pptx");
        let output = dir.path().join("out/result.pptx");
        deck(3).save(&input).unwrap();

        rearrange_presentation(&input, &output, &[1]).unwrap();
        let result = Presentation::open(&output).unwrap();
        assert_eq!(titles(&result), ["Slide 1"]);
    }
}
