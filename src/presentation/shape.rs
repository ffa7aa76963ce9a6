//! Shape tree traversal.
//!
//! Shapes are addressed by their path of child-node indices below `p:spTree`
//! so callers can come back to the same element for mutation after a
//! read-only walk.

use super::units::Rect;
use crate::xml::Element;

/// Kind of a shape-tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// `p:sp`: autoshape or text box
    Shape,
    /// `p:pic`
    Picture,
    /// `p:cxnSp`
    Connector,
    /// `p:graphicFrame`: table, chart, diagram
    GraphicFrame,
}

/// Placeholder reference from `p:nvPr/p:ph`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Raw `type` attribute; `None` means an object placeholder.
    pub kind: Option<String>,
    /// `idx` attribute.
    pub idx: Option<u32>,
}

impl Placeholder {
    fn from_nv_pr(nv_pr: &Element) -> Option<Self> {
        let ph = nv_pr.child("ph")?;
        Some(Self {
            kind: ph.attr("type").map(str::to_string),
            idx: ph.attr("idx").and_then(|v| v.parse().ok()),
        })
    }

    /// Raw type with the schema default applied.
    pub fn raw_type(&self) -> &str {
        self.kind.as_deref().unwrap_or("obj")
    }

    /// Upper-case type name as reported in inventories.
    pub fn type_name(&self) -> &'static str {
        placeholder_type_name(self.raw_type())
    }

    /// Whether another placeholder (from a layout or master) is the one this
    /// placeholder inherits from. Matches on `idx` when both carry one,
    /// otherwise on type.
    pub fn matches(&self, other: &Placeholder) -> bool {
        match (self.idx, other.idx) {
            (Some(a), Some(b)) => a == b,
            _ => self.inheritance_type() == other.inheritance_type(),
        }
    }

    fn inheritance_type(&self) -> &str {
        match self.raw_type() {
            "ctrTitle" => "title",
            "subTitle" | "obj" => "body",
            other => other,
        }
    }
}

/// Map a `p:ph@type` value to its upper-case name.
pub fn placeholder_type_name(raw: &str) -> &'static str {
    match raw {
        "title" => "TITLE",
        "body" => "BODY",
        "ctrTitle" => "CENTER_TITLE",
        "subTitle" => "SUBTITLE",
        "dt" => "DATE",
        "ftr" => "FOOTER",
        "sldNum" => "SLIDE_NUMBER",
        "pic" => "PICTURE",
        "tbl" => "TABLE",
        "chart" => "CHART",
        "clipArt" => "CLIP_ART",
        "dgm" => "ORG_CHART",
        "media" => "MEDIA_CLIP",
        "sldImg" => "SLIDE_IMAGE",
        "hdr" => "HEADER",
        "vertTitle" => "VERTICAL_TITLE",
        "vertBody" => "VERTICAL_BODY",
        "vertObj" => "VERTICAL_OBJECT",
        _ => "OBJECT",
    }
}

/// A leaf shape found while walking a shape tree.
#[derive(Debug, Clone)]
pub struct ShapeRef {
    /// Child-node indices from the `p:spTree` element.
    pub path: Vec<usize>,
    pub kind: ShapeKind,
    /// `p:cNvPr@id`
    pub id: Option<u32>,
    /// `p:cNvPr@name`
    pub name: String,
    /// Absolute bounds on the slide; zero when unknown.
    pub bounds: Rect,
    /// Whether the shape carries its own `a:xfrm`.
    pub has_xfrm: bool,
    pub placeholder: Option<Placeholder>,
    /// Whether the shape owns a `p:txBody`.
    pub has_text_frame: bool,
}

impl ShapeRef {
    /// Whether the shape sits directly in the slide's shape tree.
    pub fn is_top_level(&self) -> bool {
        self.path.len() == 1
    }

    /// Upper-case placeholder type, if the shape is a placeholder.
    pub fn placeholder_type(&self) -> Option<&'static str> {
        self.placeholder.as_ref().map(Placeholder::type_name)
    }
}

/// Affine map from group child space to slide space, per axis.
#[derive(Debug, Clone, Copy)]
struct Transform {
    sx: f64,
    sy: f64,
    tx: f64,
    ty: f64,
}

impl Transform {
    const IDENTITY: Transform = Transform {
        sx: 1.0,
        sy: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    fn apply(&self, r: Rect) -> Rect {
        Rect {
            left: (r.left as f64 * self.sx + self.tx).round() as i64,
            top: (r.top as f64 * self.sy + self.ty).round() as i64,
            width: (r.width as f64 * self.sx).round() as i64,
            height: (r.height as f64 * self.sy).round() as i64,
        }
    }

    /// `self ∘ inner`
    fn then(&self, inner: Transform) -> Transform {
        Transform {
            sx: self.sx * inner.sx,
            sy: self.sy * inner.sy,
            tx: self.sx * inner.tx + self.tx,
            ty: self.sy * inner.ty + self.ty,
        }
    }

    /// Child-space map of a group from its `a:xfrm`.
    fn for_group(xfrm: &Element) -> Transform {
        let (off_x, off_y) = point(xfrm, "off", "x", "y");
        let (ext_x, ext_y) = point(xfrm, "ext", "cx", "cy");
        let (ch_off_x, ch_off_y) = point(xfrm, "chOff", "x", "y");
        let (ch_ext_x, ch_ext_y) = point(xfrm, "chExt", "cx", "cy");

        let scale = |ext: i64, ch_ext: i64| {
            if ch_ext == 0 {
                1.0
            } else {
                ext as f64 / ch_ext as f64
            }
        };
        let sx = scale(ext_x, ch_ext_x);
        let sy = scale(ext_y, ch_ext_y);
        Transform {
            sx,
            sy,
            tx: off_x as f64 - ch_off_x as f64 * sx,
            ty: off_y as f64 - ch_off_y as f64 * sy,
        }
    }
}

fn point(xfrm: &Element, local: &str, ax: &str, ay: &str) -> (i64, i64) {
    xfrm.child(local)
        .map(|e| (e.attr_i64(ax).unwrap_or(0), e.attr_i64(ay).unwrap_or(0)))
        .unwrap_or((0, 0))
}

/// The `a:xfrm` (or `p:xfrm` for graphic frames) of a shape element.
pub fn shape_xfrm(shape: &Element) -> Option<&Element> {
    if shape.is("graphicFrame") {
        return shape.child("xfrm");
    }
    let props = if shape.is("grpSp") {
        shape.child("grpSpPr")
    } else {
        shape.child("spPr")
    }?;
    props.child("xfrm")
}

/// Bounds of a shape in its parent's coordinate space.
pub fn xfrm_rect(xfrm: &Element) -> Rect {
    let (left, top) = point(xfrm, "off", "x", "y");
    let (width, height) = point(xfrm, "ext", "cx", "cy");
    Rect::new(left, top, width, height)
}

/// Non-visual properties wrapper (`p:nvSpPr`, `p:nvPicPr`, ...).
fn non_visual(shape: &Element) -> Option<&Element> {
    shape
        .elements()
        .find(|e| e.local_name().starts_with("nv") && e.local_name().ends_with("Pr"))
}

/// Placeholder of a shape element, if any.
pub fn placeholder_of(shape: &Element) -> Option<Placeholder> {
    non_visual(shape)
        .and_then(|nv| nv.child("nvPr"))
        .and_then(Placeholder::from_nv_pr)
}

/// Walk a shape tree, returning leaf shapes with absolute bounds.
///
/// Groups are descended into; their children are mapped through the group's
/// `chOff`/`chExt` to slide coordinates.
pub fn walk_shapes(sp_tree: &Element) -> Vec<ShapeRef> {
    let mut out = Vec::new();
    walk(sp_tree, &mut Vec::new(), Transform::IDENTITY, &mut out);
    out
}

fn walk(parent: &Element, path: &mut Vec<usize>, transform: Transform, out: &mut Vec<ShapeRef>) {
    for (i, node) in parent.children.iter().enumerate() {
        let Some(el) = node.as_element() else {
            continue;
        };
        let kind = match el.local_name() {
            "sp" => ShapeKind::Shape,
            "pic" => ShapeKind::Picture,
            "cxnSp" => ShapeKind::Connector,
            "graphicFrame" => ShapeKind::GraphicFrame,
            "grpSp" => {
                let inner = shape_xfrm(el)
                    .map(Transform::for_group)
                    .unwrap_or(Transform::IDENTITY);
                path.push(i);
                walk(el, path, transform.then(inner), out);
                path.pop();
                continue;
            }
            _ => continue,
        };

        let c_nv_pr = non_visual(el).and_then(|nv| nv.child("cNvPr"));
        let xfrm = shape_xfrm(el);
        let mut full_path = path.clone();
        full_path.push(i);

        out.push(ShapeRef {
            path: full_path,
            kind,
            id: c_nv_pr.and_then(|c| c.attr("id")).and_then(|v| v.parse().ok()),
            name: c_nv_pr
                .and_then(|c| c.attr("name"))
                .unwrap_or_default()
                .to_string(),
            bounds: xfrm
                .map(|x| transform.apply(xfrm_rect(x)))
                .unwrap_or_default(),
            has_xfrm: xfrm.is_some(),
            placeholder: placeholder_of(el),
            has_text_frame: kind == ShapeKind::Shape && el.child("txBody").is_some(),
        });
    }
}

/// Largest `p:cNvPr@id` anywhere in a shape tree.
pub fn max_shape_id(sp_tree: &Element) -> u32 {
    sp_tree
        .descendants()
        .into_iter()
        .filter(|e| e.is("cNvPr"))
        .filter_map(|e| e.attr("id").and_then(|v| v.parse().ok()))
        .max()
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml;

    const TREE: &str = r#"<p:spTree xmlns:p="p" xmlns:a="a">
  <p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
  <p:grpSpPr/>
  <p:sp>
    <p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr>
    <p:spPr/>
    <p:txBody><a:bodyPr/><a:p><a:r><a:t>Hello</a:t></a:r></a:p></p:txBody>
  </p:sp>
  <p:grpSp>
    <p:nvGrpSpPr><p:cNvPr id="3" name="Group 2"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
    <p:grpSpPr><a:xfrm><a:off x="1000" y="2000"/><a:ext cx="200" cy="200"/><a:chOff x="100" y="100"/><a:chExt cx="100" cy="100"/></a:xfrm></p:grpSpPr>
    <p:sp>
      <p:nvSpPr><p:cNvPr id="4" name="TextBox 3"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>
      <p:spPr><a:xfrm><a:off x="150" y="100"/><a:ext cx="50" cy="10"/></a:xfrm></p:spPr>
      <p:txBody><a:bodyPr/><a:p/></p:txBody>
    </p:sp>
  </p:grpSp>
  <p:pic>
    <p:nvPicPr><p:cNvPr id="9" name="Picture 8"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr>
    <p:spPr><a:xfrm><a:off x="5" y="6"/><a:ext cx="7" cy="8"/></a:xfrm></p:spPr>
  </p:pic>
</p:spTree>"#;

    #[test]
    fn test_walk_flattens_groups_with_transform() {
        let doc = xml::parse(TREE).unwrap();
        let shapes = walk_shapes(&doc.root);
        assert_eq!(shapes.len(), 3);

        let title = &shapes[0];
        assert!(title.is_top_level());
        assert_eq!(title.placeholder_type(), Some("TITLE"));
        assert!(!title.has_xfrm);
        assert!(title.has_text_frame);

        let grouped = &shapes[1];
        assert!(!grouped.is_top_level());
        assert_eq!(grouped.id, Some(4));
        // (150 - 100) * 2 + 1000, (100 - 100) * 2 + 2000
        assert_eq!(grouped.bounds, Rect::new(1100, 2000, 100, 20));
        assert_eq!(doc.root.element_at(&grouped.path).unwrap().name, "p:sp");

        assert_eq!(shapes[2].kind, ShapeKind::Picture);
        assert!(!shapes[2].has_text_frame);
        assert_eq!(max_shape_id(&doc.root), 9);
    }

    #[test]
    fn test_placeholder_matching() {
        let slide = Placeholder {
            kind: None,
            idx: Some(1),
        };
        let layout_body = Placeholder {
            kind: Some("body".into()),
            idx: Some(1),
        };
        let title = Placeholder {
            kind: Some("ctrTitle".into()),
            idx: None,
        };
        let master_title = Placeholder {
            kind: Some("title".into()),
            idx: None,
        };
        assert!(slide.matches(&layout_body));
        assert!(title.matches(&master_title));
        assert!(!title.matches(&layout_body));
        assert_eq!(slide.type_name(), "OBJECT");
        assert_eq!(placeholder_type_name("sldNum"), "SLIDE_NUMBER");
    }
}
