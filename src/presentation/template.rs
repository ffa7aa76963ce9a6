//! Parts of a new, empty presentation.
//!
//! One master, one blank layout and one theme. Everything else a deck needs
//! is added by the create operation.

use crate::container::{content_types as ct, rel_types, ContentTypes, Package, Relationships};

const PRESENTATION_XML: &str = include_str!("../../resources/presentation.xml");
pub(crate) const SLIDE_MASTER_XML: &str = include_str!("../../resources/slideMaster1.xml");
const SLIDE_LAYOUT_XML: &str = include_str!("../../resources/slideLayout1.xml");
const THEME_XML: &str = include_str!("../../resources/theme1.xml");
const PRES_PROPS_XML: &str = include_str!("../../resources/presProps.xml");
const VIEW_PROPS_XML: &str = include_str!("../../resources/viewProps.xml");
const TABLE_STYLES_XML: &str = include_str!("../../resources/tableStyles.xml");
const CORE_XML: &str = include_str!("../../resources/core.xml");
const APP_XML: &str = include_str!("../../resources/app.xml");

pub(crate) const PRESENTATION_PART: &str = "ppt/presentation.xml";
pub(crate) const BLANK_LAYOUT_PART: &str = "ppt/slideLayouts/slideLayout1.xml";
const MASTER_PART: &str = "ppt/slideMasters/slideMaster1.xml";
const THEME_PART: &str = "ppt/theme/theme1.xml";

/// Package holding an empty presentation (no slides, default size).
pub(crate) fn blank_package() -> Package {
    let mut pkg = Package::new();

    let mut types = ContentTypes::default();
    types.ensure_default("rels", ct::RELATIONSHIPS);
    types.ensure_default("xml", ct::XML);
    for (part, content_type) in [
        (PRESENTATION_PART, ct::PRESENTATION),
        (MASTER_PART, ct::SLIDE_MASTER),
        (BLANK_LAYOUT_PART, ct::SLIDE_LAYOUT),
        (THEME_PART, ct::THEME),
        ("ppt/presProps.xml", ct::PRES_PROPS),
        ("ppt/viewProps.xml", ct::VIEW_PROPS),
        ("ppt/tableStyles.xml", ct::TABLE_STYLES),
        ("docProps/core.xml", ct::CORE_PROPERTIES),
        ("docProps/app.xml", ct::EXTENDED_PROPERTIES),
    ] {
        types.set_override(part, content_type);
    }
    pkg.set_content_types(&types);

    let mut root_rels = Relationships::new();
    root_rels.add_target(rel_types::OFFICE_DOCUMENT, PRESENTATION_PART);
    root_rels.add_target(rel_types::CORE_PROPERTIES, "docProps/core.xml");
    root_rels.add_target(rel_types::EXTENDED_PROPERTIES, "docProps/app.xml");
    pkg.set_relationships("", &root_rels);

    pkg.put_part("docProps/core.xml", CORE_XML.as_bytes().to_vec());
    pkg.put_part("docProps/app.xml", APP_XML.as_bytes().to_vec());
    pkg.put_part(PRESENTATION_PART, PRESENTATION_XML.as_bytes().to_vec());

    // rId1 must stay the master: presentation.xml refers to it
    let mut pres_rels = Relationships::new();
    pres_rels.add_target(rel_types::SLIDE_MASTER, "slideMasters/slideMaster1.xml");
    pres_rels.add_target(rel_types::THEME, "theme/theme1.xml");
    pres_rels.add_target(rel_types::PRES_PROPS, "presProps.xml");
    pres_rels.add_target(rel_types::VIEW_PROPS, "viewProps.xml");
    pres_rels.add_target(rel_types::TABLE_STYLES, "tableStyles.xml");
    pkg.set_relationships(PRESENTATION_PART, &pres_rels);

    pkg.put_part(MASTER_PART, SLIDE_MASTER_XML.as_bytes().to_vec());
    let mut master_rels = Relationships::new();
    master_rels.add_target(rel_types::SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml");
    master_rels.add_target(rel_types::THEME, "../theme/theme1.xml");
    pkg.set_relationships(MASTER_PART, &master_rels);

    pkg.put_part(BLANK_LAYOUT_PART, SLIDE_LAYOUT_XML.as_bytes().to_vec());
    let mut layout_rels = Relationships::new();
    layout_rels.add_target(rel_types::SLIDE_MASTER, "../slideMasters/slideMaster1.xml");
    pkg.set_relationships(BLANK_LAYOUT_PART, &layout_rels);

    pkg.put_part(THEME_PART, THEME_XML.as_bytes().to_vec());
    pkg.put_part("ppt/presProps.xml", PRES_PROPS_XML.as_bytes().to_vec());
    pkg.put_part("ppt/viewProps.xml", VIEW_PROPS_XML.as_bytes().to_vec());
    pkg.put_part("ppt/tableStyles.xml", TABLE_STYLES_XML.as_bytes().to_vec());

    pkg
}
