//! Presentation (PPTX) document view.
//!
//! [`Presentation`] wraps a [`Package`] and keeps `ppt/presentation.xml` and
//! its relationships parsed. Slides, layouts and masters are loaded on demand
//! as [`Part`]s, edited as element trees and written back with
//! [`Presentation::put_slide`].

pub mod shape;
pub(crate) mod template;
pub mod text;
pub mod units;

pub use shape::{Placeholder, ShapeKind, ShapeRef};
pub use units::Rect;

use crate::container::{content_types, rel_types, Package, Relationships};
use crate::error::{Error, Result};
use crate::xml::{self, Document, Element};
use std::path::Path;
use tracing::{debug, warn};

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

/// First id PowerPoint assigns in `p:sldIdLst`.
const MIN_SLIDE_ID: u32 = 256;

/// An XML part with its relationships.
#[derive(Debug, Clone)]
pub struct Part {
    /// Part name without leading slash.
    pub name: String,
    pub doc: Document,
    pub rels: Relationships,
}

impl Part {
    /// `p:cSld/p:spTree`, present in slides, layouts and masters.
    pub fn sp_tree(&self) -> Option<&Element> {
        self.doc.root.find(&["cSld", "spTree"])
    }

    /// Target part of the first relationship of a type.
    pub fn related_part(&self, rel_type: &str) -> Option<String> {
        self.rels
            .first_of_type(rel_type)
            .filter(|r| !r.external)
            .map(|r| Package::resolve_path(&self.name, &r.target))
    }

    /// Placeholder shapes of this part.
    pub fn placeholders(&self) -> Vec<(Placeholder, &Element)> {
        let Some(tree) = self.sp_tree() else {
            return Vec::new();
        };
        tree.elements()
            .filter_map(|e| shape::placeholder_of(e).map(|ph| (ph, e)))
            .collect()
    }
}

/// A slide loaded from the package.
#[derive(Debug, Clone)]
pub struct Slide {
    /// Position in the slide list (0-based).
    pub index: usize,
    pub part: Part,
}

impl Slide {
    /// Part name, e.g. `ppt/slides/slide1.xml`.
    pub fn name(&self) -> &str {
        &self.part.name
    }

    /// `p:cSld/p:spTree`.
    pub fn sp_tree(&self) -> Option<&Element> {
        self.part.sp_tree()
    }

    /// Mutable `p:cSld/p:spTree`.
    pub fn sp_tree_mut(&mut self) -> Option<&mut Element> {
        self.part.doc.root.find_mut(&["cSld", "spTree"])
    }

    /// Leaf shapes with positions from their own transforms.
    pub fn shapes(&self) -> Vec<ShapeRef> {
        self.sp_tree().map(shape::walk_shapes).unwrap_or_default()
    }

    /// Element of a shape found by [`Slide::shapes`].
    pub fn shape_element(&self, shape: &ShapeRef) -> Option<&Element> {
        self.sp_tree()?.element_at(&shape.path)
    }

    /// Mutable element of a shape found by [`Slide::shapes`].
    pub fn shape_element_mut(&mut self, shape: &ShapeRef) -> Option<&mut Element> {
        self.sp_tree_mut()?.element_at_mut(&shape.path)
    }

    /// The slide layout part this slide uses.
    pub fn layout_part(&self) -> Option<String> {
        self.part.related_part(rel_types::SLIDE_LAYOUT)
    }

    /// The notes slide part, if the slide has notes.
    pub fn notes_part(&self) -> Option<String> {
        self.part.related_part(rel_types::NOTES_SLIDE)
    }
}

/// Layout and master of a slide, used for placeholder inheritance.
#[derive(Debug, Clone, Default)]
pub struct SlideContext {
    pub layout: Option<Part>,
    pub master: Option<Part>,
}

impl SlideContext {
    /// The layout placeholder a slide placeholder inherits from.
    pub fn layout_placeholder(&self, ph: &Placeholder) -> Option<&Element> {
        find_placeholder(self.layout.as_ref()?, ph)
    }

    /// Position inherited from the layout, then the master.
    pub fn inherited_bounds(&self, ph: &Placeholder) -> Option<Rect> {
        [self.layout.as_ref(), self.master.as_ref()]
            .into_iter()
            .flatten()
            .filter_map(|part| find_placeholder(part, ph))
            .find_map(|e| shape::shape_xfrm(e).map(shape::xfrm_rect))
    }

    /// Fill in bounds of placeholders that have no transform of their own.
    pub fn resolve(&self, shapes: &mut [ShapeRef]) {
        for s in shapes.iter_mut().filter(|s| !s.has_xfrm) {
            if let Some(bounds) = s.placeholder.as_ref().and_then(|ph| self.inherited_bounds(ph)) {
                s.bounds = bounds;
            }
        }
    }

    /// First `sz` of the master's title or body text style, in points.
    pub fn master_style_size(&self, title: bool) -> Option<f64> {
        let style = if title { "titleStyle" } else { "bodyStyle" };
        let master = self.master.as_ref()?;
        let style = master.doc.root.find(&["txStyles", style])?;
        style
            .descendants()
            .into_iter()
            .find_map(|e| e.attr_i64("sz"))
            .map(|sz| (sz / 100) as f64)
    }
}

fn find_placeholder<'a>(part: &'a Part, ph: &Placeholder) -> Option<&'a Element> {
    part.placeholders()
        .into_iter()
        .find(|(candidate, _)| ph.matches(candidate))
        .map(|(_, e)| e)
}

/// Entry of `p:sldIdLst`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideId {
    pub id: u32,
    pub rel_id: String,
    /// Resolved slide part name.
    pub part: String,
}

/// A presentation document.
#[derive(Debug, Clone)]
pub struct Presentation {
    package: Package,
    part_name: String,
    doc: Document,
    rels: Relationships,
}

impl Presentation {
    /// Open a presentation from a file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_package(Package::open(path)?)
    }

    /// Open a presentation from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_package(Package::from_bytes(data)?)
    }

    /// Wrap a package whose main part is a presentation.
    pub fn from_package(package: Package) -> Result<Self> {
        let root_rels = package.package_relationships()?;
        let part_name = root_rels
            .first_of_type(rel_types::OFFICE_DOCUMENT)
            .map(|r| Package::resolve_path("", &r.target))
            .unwrap_or_else(|| template::PRESENTATION_PART.to_string());

        if !package.exists(&part_name) {
            return Err(Error::MissingComponent(part_name));
        }
        let doc = package.read_document(&part_name)?;
        if !doc.root.is("presentation") {
            return Err(Error::UnsupportedFormat(format!(
                "{} is not a presentation part",
                part_name
            )));
        }
        let rels = package.relationships(&part_name)?;
        debug!(part = %part_name, "presentation loaded");
        Ok(Self {
            package,
            part_name,
            doc,
            rels,
        })
    }

    /// A new presentation without slides.
    pub fn new_blank(width: i64, height: i64) -> Result<Self> {
        let mut pres = Self::from_package(template::blank_package())?;
        pres.set_slide_size(width, height);
        Ok(pres)
    }

    /// The underlying package.
    pub fn package(&self) -> &Package {
        &self.package
    }

    /// Mutable access to the underlying package.
    pub fn package_mut(&mut self) -> &mut Package {
        &mut self.package
    }

    /// Slide size in EMU (defaults to 10 × 7.5 in).
    pub fn slide_size(&self) -> (i64, i64) {
        let sz = self.doc.root.child("sldSz");
        (
            sz.and_then(|s| s.attr_i64("cx"))
                .unwrap_or(units::DEFAULT_SLIDE_WIDTH),
            sz.and_then(|s| s.attr_i64("cy"))
                .unwrap_or(units::DEFAULT_SLIDE_HEIGHT),
        )
    }

    /// Set the slide size in EMU.
    pub fn set_slide_size(&mut self, width: i64, height: i64) {
        let sz = self.doc.root.get_or_insert(
            "sldSz",
            &["notesSz", "smartTags", "embeddedFontLst", "custShowLst", "photoAlbum",
              "custDataLst", "kinsoku", "defaultTextStyle", "modifyVerifier", "extLst"],
            || Element::new("p:sldSz"),
        );
        sz.set_attr("cx", width.to_string());
        sz.set_attr("cy", height.to_string());
        self.commit();
    }

    /// Entries of the slide list in presentation order. Entries whose
    /// relationship is missing are skipped.
    pub fn slide_ids(&self) -> Vec<SlideId> {
        let Some(list) = self.doc.root.child("sldIdLst") else {
            return Vec::new();
        };
        list.children_named("sldId")
            .filter_map(|e| {
                let rel_id = relationship_attr(e)?;
                let Some(rel) = self.rels.get(rel_id) else {
                    warn!(rel_id, "slide id without relationship");
                    return None;
                };
                Some(SlideId {
                    id: e.attr("id").and_then(|v| v.parse().ok()).unwrap_or(0),
                    rel_id: rel_id.to_string(),
                    part: Package::resolve_path(&self.part_name, &rel.target),
                })
            })
            .collect()
    }

    /// Number of slides.
    pub fn slide_count(&self) -> usize {
        self.slide_ids().len()
    }

    /// Load any XML part with its relationships.
    pub fn part(&self, name: &str) -> Result<Part> {
        Ok(Part {
            name: name.to_string(),
            doc: self.package.read_document(name)?,
            rels: self.package.relationships(name)?,
        })
    }

    /// Load the slide at `index`.
    pub fn slide(&self, index: usize) -> Result<Slide> {
        let ids = self.slide_ids();
        let entry = ids.get(index).ok_or_else(|| {
            Error::InvalidData(format!(
                "Slide index {} out of range (presentation has {} slides)",
                index,
                ids.len()
            ))
        })?;
        Ok(Slide {
            index,
            part: self.part(&entry.part)?,
        })
    }

    /// Load every slide in order.
    pub fn slides(&self) -> Result<Vec<Slide>> {
        self.slide_ids()
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                Ok(Slide {
                    index,
                    part: self.part(&entry.part)?,
                })
            })
            .collect()
    }

    /// Layout and master of a slide. Missing parts leave the slot empty.
    pub fn context(&self, slide: &Slide) -> SlideContext {
        let layout = slide.layout_part().and_then(|name| self.part(&name).ok());
        let master = layout
            .as_ref()
            .and_then(|l| l.related_part(rel_types::SLIDE_MASTER))
            .and_then(|name| self.part(&name).ok());
        SlideContext { layout, master }
    }

    /// Write an edited slide back into the package.
    pub fn put_slide(&mut self, slide: &Slide) {
        self.put_part(&slide.part);
    }

    /// Write an edited part back into the package.
    pub fn put_part(&mut self, part: &Part) {
        self.package.put_document(&part.name, &part.doc);
        self.package.set_relationships(&part.name, &part.rels);
    }

    /// First layout of the first master.
    pub fn default_layout(&self) -> Result<String> {
        let master_rel = self
            .rels
            .first_of_type(rel_types::SLIDE_MASTER)
            .ok_or_else(|| Error::MissingComponent("slide master".to_string()))?;
        let master = self.part(&Package::resolve_path(&self.part_name, &master_rel.target))?;
        master
            .related_part(rel_types::SLIDE_LAYOUT)
            .ok_or_else(|| Error::MissingComponent("slide layout".to_string()))
    }

    /// Append an empty slide using `layout_part`.
    pub fn add_slide(&mut self, layout_part: &str) -> Result<Slide> {
        let root = Element::new("p:sld")
            .with_attr("xmlns:a", NS_A)
            .with_attr("xmlns:r", NS_R)
            .with_attr("xmlns:p", NS_P)
            .with_child(Element::new("p:cSld").with_child(empty_sp_tree()))
            .with_child(
                Element::new("p:clrMapOvr").with_child(Element::new("a:masterClrMapping")),
            );
        let name = self.next_slide_name();
        let mut rels = Relationships::new();
        rels.add_target(
            rel_types::SLIDE_LAYOUT,
            Package::relative_target(&name, layout_part),
        );
        self.append_slide_part(&name, Document::new(root), rels)
    }

    /// Unused `ppt/slides/slideN.xml` name.
    pub fn next_slide_name(&self) -> String {
        (1..)
            .map(|n| format!("ppt/slides/slide{}.xml", n))
            .find(|name| !self.package.exists(name))
            .unwrap_or_default()
    }

    /// Store a slide part and append it to the slide list.
    pub fn append_slide_part(
        &mut self,
        name: &str,
        doc: Document,
        rels: Relationships,
    ) -> Result<Slide> {
        let part = Part {
            name: name.to_string(),
            doc,
            rels,
        };
        self.put_part(&part);

        let mut types = self.package.content_types()?;
        types.set_override(name, content_types::SLIDE);
        self.package.set_content_types(&types);

        let rel_id = self.rels.add_target(
            rel_types::SLIDE,
            Package::relative_target(&self.part_name, name),
        );
        let next_id = self
            .slide_ids()
            .iter()
            .map(|s| s.id + 1)
            .max()
            .unwrap_or(MIN_SLIDE_ID)
            .max(MIN_SLIDE_ID);
        let list = self.doc.root.get_or_insert(
            "sldIdLst",
            &["sldSz", "notesSz", "defaultTextStyle", "extLst"],
            || Element::new("p:sldIdLst"),
        );
        list.push(
            Element::new("p:sldId")
                .with_attr("id", next_id.to_string())
                .with_attr("r:id", rel_id),
        );
        self.commit();

        let index = self.slide_count() - 1;
        debug!(slide = %name, index, "slide added");
        Ok(Slide { index, part })
    }

    /// Rewrite the slide list to `ids`.
    pub fn set_slide_ids(&mut self, ids: &[SlideId]) {
        let list = self.doc.root.get_or_insert(
            "sldIdLst",
            &["sldSz", "notesSz", "defaultTextStyle", "extLst"],
            || Element::new("p:sldIdLst"),
        );
        list.children.clear();
        for entry in ids {
            list.push(
                Element::new("p:sldId")
                    .with_attr("id", entry.id.to_string())
                    .with_attr("r:id", entry.rel_id.as_str()),
            );
        }
        self.commit();
    }

    /// Delete a slide with its relationships, content type and notes.
    pub fn remove_slide(&mut self, index: usize) -> Result<()> {
        let mut ids = self.slide_ids();
        if index >= ids.len() {
            return Err(Error::InvalidData(format!(
                "Slide index {} out of range (presentation has {} slides)",
                index,
                ids.len()
            )));
        }
        let entry = ids.remove(index);
        let slide_rels = self.package.relationships(&entry.part)?;

        self.set_slide_ids(&ids);
        self.rels.remove(&entry.rel_id);
        self.commit();

        let mut removed = vec![entry.part.clone()];
        if let Some(notes) = slide_rels
            .first_of_type(rel_types::NOTES_SLIDE)
            .map(|r| Package::resolve_path(&entry.part, &r.target))
        {
            removed.push(notes);
        }

        let mut types = self.package.content_types()?;
        for part in &removed {
            self.package.remove_part(part);
            self.package
                .remove_part(&crate::container::rels_path_for(part));
            types.remove_override(part);
        }
        self.package.set_content_types(&types);
        debug!(slide = %entry.part, "slide removed");
        Ok(())
    }

    /// Serialize to PPTX bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.package.to_bytes()
    }

    /// Write the presentation to disk, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.package.save(path)
    }

    fn commit(&mut self) {
        self.package.put_document(&self.part_name, &self.doc);
        self.package.set_relationships(&self.part_name, &self.rels);
    }
}

fn empty_sp_tree() -> Element {
    Element::new("p:spTree")
        .with_child(
            Element::new("p:nvGrpSpPr")
                .with_child(Element::new("p:cNvPr").with_attr("id", "1").with_attr("name", ""))
                .with_child(Element::new("p:cNvGrpSpPr"))
                .with_child(Element::new("p:nvPr")),
        )
        .with_child(
            Element::new("p:grpSpPr").with_child(
                Element::new("a:xfrm")
                    .with_child(Element::new("a:off").with_attr("x", "0").with_attr("y", "0"))
                    .with_child(Element::new("a:ext").with_attr("cx", "0").with_attr("cy", "0"))
                    .with_child(Element::new("a:chOff").with_attr("x", "0").with_attr("y", "0"))
                    .with_child(
                        Element::new("a:chExt").with_attr("cx", "0").with_attr("cy", "0"),
                    ),
            ),
        )
}

/// Value of a prefixed `id` attribute (`r:id`), whatever the prefix.
fn relationship_attr(e: &Element) -> Option<&str> {
    e.attributes
        .iter()
        .find(|(k, _)| k.contains(':') && xml::local_name(k) == "id")
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_presentation() {
        let pres = Presentation::new_blank(12_192_000, 6_858_000).unwrap();
        assert_eq!(pres.slide_size(), (12_192_000, 6_858_000));
        assert_eq!(pres.slide_count(), 0);
        assert_eq!(pres.default_layout().unwrap(), template::BLANK_LAYOUT_PART);
    }

    #[test]
    fn test_add_and_remove_slides() {
        let mut pres = Presentation::new_blank(9_144_000, 6_858_000).unwrap();
        let layout = pres.default_layout().unwrap();
        let first = pres.add_slide(&layout).unwrap();
        let second = pres.add_slide(&layout).unwrap();
        assert_eq!(first.name(), "ppt/slides/slide1.xml");
        assert_eq!(second.name(), "ppt/slides/slide2.xml");
        assert_eq!(second.index, 1);

        let ids = pres.slide_ids();
        assert_eq!(ids[0].id, 256);
        assert_eq!(ids[1].id, 257);

        let ctx = pres.context(&pres.slide(0).unwrap());
        assert!(ctx.layout.is_some());
        assert_eq!(ctx.master_style_size(true), Some(44.0));
        assert_eq!(ctx.master_style_size(false), Some(28.0));

        pres.remove_slide(0).unwrap();
        assert_eq!(pres.slide_count(), 1);
        assert!(!pres.package().exists("ppt/slides/slide1.xml"));
        let types = pres.package().content_types().unwrap();
        assert!(types.content_type_of("ppt/slides/slide1.xml") != Some(content_types::SLIDE));

        // Round trip through bytes
        let reopened = Presentation::from_bytes(pres.to_bytes().unwrap()).unwrap();
        assert_eq!(reopened.slide(0).unwrap().name(), "ppt/slides/slide2.xml");
    }

    #[test]
    fn test_not_a_presentation() {
        let mut pkg = Package::new();
        let mut rels = Relationships::new();
        rels.add_target(rel_types::OFFICE_DOCUMENT, "word/document.xml");
        pkg.set_relationships("", &rels);
        pkg.put_part("word/document.xml", b"<w:document xmlns:w=\"w\"/>".to_vec());
        assert!(matches!(
            Presentation::from_package(pkg),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_inherited_placeholder_bounds() {
        let master = Part {
            name: "ppt/slideMasters/slideMaster1.xml".into(),
            doc: xml::parse(template::SLIDE_MASTER_XML).unwrap(),
            rels: Relationships::new(),
        };
        let ctx = SlideContext {
            layout: None,
            master: Some(master),
        };
        let title = Placeholder {
            kind: Some("title".into()),
            idx: None,
        };
        assert_eq!(
            ctx.inherited_bounds(&title),
            Some(Rect::new(457_200, 274_638, 8_229_600, 1_143_000))
        );
    }
}
