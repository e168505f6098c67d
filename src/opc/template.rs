//! Default word-processing package
//!
//! The parts below form the smallest package that word processors open
//! without complaint, plus the styles, fonts and theme that a new document
//! offers to callers.

use crate::opc::content_types as ct;
use crate::opc::{rel_types, well_known, Package, Part, PartUri};

const DOCUMENT_XML: &str = include_str!("../../resources/document.xml");
pub(crate) const STYLES_XML: &str = include_str!("../../resources/styles.xml");
const NUMBERING_XML: &str = include_str!("../../resources/numbering.xml");
pub(crate) const FONT_TABLE_XML: &str = include_str!("../../resources/fontTable.xml");
const SETTINGS_XML: &str = include_str!("../../resources/settings.xml");
pub(crate) const THEME_XML: &str = include_str!("../../resources/theme/theme1.xml");
const CORE_XML: &str = include_str!("../../resources/docProps/core.xml");
const APP_XML: &str = include_str!("../../resources/docProps/app.xml");

/// Build the default package
pub(crate) fn default_package() -> Package {
    let mut package = Package::new();

    let document = well_known::document();
    add(&mut package, document.clone(), ct::MAIN_DOCUMENT, DOCUMENT_XML);

    let document_parts = [
        (well_known::styles(), ct::STYLES, rel_types::STYLES, STYLES_XML),
        (well_known::settings(), ct::SETTINGS, rel_types::SETTINGS, SETTINGS_XML),
        (well_known::numbering(), ct::NUMBERING, rel_types::NUMBERING, NUMBERING_XML),
        (well_known::font_table(), ct::FONT_TABLE, rel_types::FONT_TABLE, FONT_TABLE_XML),
        (well_known::theme(), ct::THEME, rel_types::THEME, THEME_XML),
    ];

    let mut rels = crate::opc::Relationships::new();
    for (uri, content_type, rel_type, xml) in document_parts {
        rels.add(rel_type, &document.relative_target(&uri));
        add(&mut package, uri, content_type, xml);
    }
    if let Some(part) = package.part_mut(&document) {
        part.set_relationships(rels);
    }

    add(&mut package, well_known::core_props(), ct::CORE_PROPERTIES, CORE_XML);
    add(&mut package, well_known::app_props(), ct::EXTENDED_PROPERTIES, APP_XML);

    let package_rels = package.relationships_mut();
    package_rels.add(rel_types::OFFICE_DOCUMENT, "word/document.xml");
    package_rels.add(rel_types::CORE_PROPERTIES, "docProps/core.xml");
    package_rels.add(rel_types::EXTENDED_PROPERTIES, "docProps/app.xml");

    package
}

fn add(package: &mut Package, uri: PartUri, content_type: &str, xml: &str) {
    package.add_part(Part::new(uri, content_type, xml.as_bytes().to_vec()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_package_is_wired() {
        let package = default_package();

        let main = package.main_document_part().unwrap();
        assert_eq!(main.content_type(), ct::MAIN_DOCUMENT);

        for rel_type in [
            rel_types::STYLES,
            rel_types::NUMBERING,
            rel_types::FONT_TABLE,
            rel_types::THEME,
            rel_types::SETTINGS,
        ] {
            assert!(
                package.document_part_by_rel_type(rel_type).is_some(),
                "missing {}",
                rel_type
            );
        }

        assert_eq!(
            package.content_types().get(&well_known::styles()),
            Some(ct::STYLES)
        );
    }

    #[test]
    fn test_resources_are_well_formed() {
        for xml in [
            DOCUMENT_XML,
            STYLES_XML,
            NUMBERING_XML,
            FONT_TABLE_XML,
            SETTINGS_XML,
            THEME_XML,
            CORE_XML,
            APP_XML,
        ] {
            let mut reader = quick_xml::Reader::from_str(xml);
            while !matches!(reader.read_event().unwrap(), quick_xml::events::Event::Eof) {}
        }
    }
}
