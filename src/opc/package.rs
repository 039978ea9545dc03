//! OPC Package implementation
//!
//! Handles reading and writing DOCX files as ZIP packages

use crate::error::{Error, Result};
use crate::opc::content_types::{self, ContentTypes};
use crate::opc::part_uri::well_known;
use crate::opc::relationships::{rel_types, Relationships, TargetMode};
use crate::opc::{Part, PartUri};
use crate::templates;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;
use zip::read::ZipArchive;
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

const CONTENT_TYPES_ENTRY: &str = "[Content_Types].xml";
const ROOT_RELS_ENTRY: &str = "_rels/.rels";

/// An OPC package: named parts, their relationships and the content-type registry
#[derive(Debug, Default)]
pub struct Package {
    /// All parts in the package, ordered by name
    parts: BTreeMap<PartUri, Part>,
    /// Package-level relationships (/_rels/.rels)
    relationships: Relationships,
    /// Content types ([Content_Types].xml)
    content_types: ContentTypes,
}

impl Package {
    /// Create a package with no parts at all
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a package seeded with an empty main document and the
    /// styles, settings and numbering parts it references
    pub fn create_empty() -> Self {
        let mut package = Self::new();
        package
            .content_types
            .add_default("rels", content_types::RELATIONSHIPS);
        package.content_types.add_default("xml", content_types::XML);

        let document = well_known::document();
        let seeded = [
            (document.clone(), content_types::MAIN_DOCUMENT, templates::DOCUMENT),
            (well_known::styles(), content_types::STYLES, templates::STYLES),
            (well_known::settings(), content_types::SETTINGS, templates::SETTINGS),
            (well_known::numbering(), content_types::NUMBERING, templates::NUMBERING),
        ];
        for (uri, content_type, xml) in seeded {
            package.set_part(uri, content_type, xml.as_bytes().to_vec());
        }

        package
            .relationships
            .add_with_id("rId1", rel_types::OFFICE_DOCUMENT, document.zip_name(), TargetMode::Internal);

        if let Some(part) = package.parts.get_mut(&document) {
            let rels = part.relationships_mut();
            rels.ensure(rel_types::STYLES, "styles.xml", TargetMode::Internal);
            rels.ensure(rel_types::SETTINGS, "settings.xml", TargetMode::Internal);
            rels.ensure(rel_types::NUMBERING, "numbering.xml", TargetMode::Internal);
        }

        package
    }

    /// Open a package from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("opening package {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Open a package from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Open a package from a reader
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut package = Self::new();

        // Part content types depend on the registry, so it goes first
        package.content_types = read_content_types(&mut archive)?;
        package.relationships = read_root_relationships(&mut archive)?;
        package.read_parts(&mut archive)?;
        package.read_part_relationships(&mut archive)?;

        log::debug!(
            "loaded package with {} parts and {} root relationships",
            package.parts.len(),
            package.relationships.len()
        );
        Ok(package)
    }

    /// Save the package to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        log::debug!("saving package to {}", path.display());
        let file = File::create(path)?;
        self.write_to(file)
    }

    /// Save the package to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(Cursor::new(&mut buf))?;
        Ok(buf)
    }

    /// Write the package to a writer
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        self.check_internal_targets();

        let mut zip = ZipWriter::new(writer);
        let options: FileOptions<()> =
            FileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file(CONTENT_TYPES_ENTRY, options)?;
        self.content_types.write_to(&mut zip)?;

        if !self.relationships.is_empty() {
            zip.start_file(ROOT_RELS_ENTRY, options)?;
            self.relationships.write_to(&mut zip)?;
        }

        for (uri, part) in &self.parts {
            zip.start_file(uri.zip_name(), options)?;
            zip.write_all(part.data())?;

            if !part.relationships().is_empty() {
                zip.start_file(uri.relationships_uri().zip_name(), options)?;
                part.relationships().write_to(&mut zip)?;
            }
        }

        zip.finish()?;
        Ok(())
    }

    /// Release the package. Nothing is written back; call [`Package::save`] first.
    pub fn close(self) {
        log::debug!("closing package with {} parts", self.parts.len());
    }

    /// Get a part by URI
    pub fn part(&self, uri: &PartUri) -> Option<&Part> {
        self.parts.get(uri)
    }

    /// Get a mutable part by URI
    pub fn part_mut(&mut self, uri: &PartUri) -> Option<&mut Part> {
        self.parts.get_mut(uri)
    }

    /// Whether a part exists
    pub fn contains(&self, uri: &PartUri) -> bool {
        self.parts.contains_key(uri)
    }

    /// Insert or replace a part's payload.
    ///
    /// A non-empty content type is registered as an override; an existing
    /// part keeps its relationships.
    pub fn set_part(&mut self, uri: PartUri, content_type: &str, data: Vec<u8>) {
        if !content_type.is_empty() {
            self.content_types.add_override(&uri, content_type);
        }
        let content_type = self.content_type_of(&uri);
        match self.parts.get_mut(&uri) {
            Some(part) => {
                part.set_content_type(content_type);
                part.set_data(data);
            }
            None => {
                self.parts
                    .insert(uri.clone(), Part::new(uri, content_type, data));
            }
        }
    }

    /// Remove a part and its override
    pub fn remove_part(&mut self, uri: &PartUri) -> Option<Part> {
        self.content_types.remove_override(uri);
        self.parts.remove(uri)
    }

    /// Get all parts
    pub fn parts(&self) -> impl Iterator<Item = (&PartUri, &Part)> {
        self.parts.iter()
    }

    /// Content type of a part: override, else extension default, else ""
    pub fn content_type_of(&self, uri: &PartUri) -> String {
        self.content_types.get(uri).unwrap_or_default().to_string()
    }

    /// Get package-level relationships
    pub fn relationships(&self) -> &Relationships {
        &self.relationships
    }

    /// Get mutable package-level relationships
    pub fn relationships_mut(&mut self) -> &mut Relationships {
        &mut self.relationships
    }

    /// Relationships owned by `owner`, or the package root when `owner` is `None`
    pub fn relationships_of(&self, owner: Option<&PartUri>) -> Option<&Relationships> {
        match owner {
            None => Some(&self.relationships),
            Some(uri) => self.parts.get(uri).map(Part::relationships),
        }
    }

    /// Return the ID of a matching relationship on `owner`, creating it if needed
    pub fn ensure_relationship(
        &mut self,
        owner: Option<&PartUri>,
        rel_type: &str,
        target: &str,
        mode: TargetMode,
    ) -> Result<String> {
        let rels = match owner {
            None => &mut self.relationships,
            Some(uri) => self
                .parts
                .get_mut(uri)
                .ok_or_else(|| Error::MissingPart(uri.to_string()))?
                .relationships_mut(),
        };
        Ok(rels.ensure(rel_type, target, mode))
    }

    /// Look up a relationship's target and mode; `None` when the ID is unknown
    pub fn resolve_relationship(
        &self,
        owner: Option<&PartUri>,
        id: &str,
    ) -> Option<(String, TargetMode)> {
        self.relationships_of(owner)?
            .resolve(id)
            .map(|(target, mode)| (target.to_string(), mode))
    }

    /// Get content types
    pub fn content_types(&self) -> &ContentTypes {
        &self.content_types
    }

    /// Get mutable content types
    pub fn content_types_mut(&mut self) -> &mut ContentTypes {
        &mut self.content_types
    }

    /// URI of the main document part, found through the root relationship
    pub fn main_document_uri(&self) -> Option<PartUri> {
        let rel = self.relationships.by_type(rel_types::OFFICE_DOCUMENT)?;
        PartUri::from_root_target(&rel.target).ok()
    }

    // === Private methods ===

    fn read_parts<R: Read + Seek>(&mut self, archive: &mut ZipArchive<R>) -> Result<()> {
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }

            let name = file.name().to_string();
            if name == CONTENT_TYPES_ENTRY || name.ends_with(".rels") {
                continue;
            }

            let uri = PartUri::new(&name)?;
            let content_type = self.content_type_of(&uri);

            let mut data = Vec::new();
            file.read_to_end(&mut data)?;

            self.parts
                .insert(uri.clone(), Part::new(uri, content_type, data));
        }

        Ok(())
    }

    fn read_part_relationships<R: Read + Seek>(
        &mut self,
        archive: &mut ZipArchive<R>,
    ) -> Result<()> {
        for (uri, part) in self.parts.iter_mut() {
            let rels_uri = uri.relationships_uri();
            if let Ok(mut file) = archive.by_name(rels_uri.zip_name()) {
                let mut content = String::new();
                file.read_to_string(&mut content)?;
                part.set_relationships(Relationships::from_xml(&content)?);
            }
        }

        Ok(())
    }

    fn check_internal_targets(&self) {
        let owners = std::iter::once((None, &self.relationships)).chain(
            self.parts
                .iter()
                .map(|(uri, part)| (Some(uri), part.relationships())),
        );
        for (owner, rels) in owners {
            for rel in rels.iter() {
                if rel.target_mode == TargetMode::External {
                    continue;
                }
                let resolved = match owner {
                    Some(uri) => uri.resolve(&rel.target),
                    None => PartUri::from_root_target(&rel.target),
                };
                if !resolved.map(|t| self.parts.contains_key(&t)).unwrap_or(false) {
                    log::warn!(
                        "relationship {} of {} points at missing part {}",
                        rel.id,
                        owner.map(PartUri::as_str).unwrap_or("/"),
                        rel.target
                    );
                }
            }
        }
    }
}

fn read_content_types<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<ContentTypes> {
    let mut file = archive
        .by_name(CONTENT_TYPES_ENTRY)
        .map_err(|_| Error::MissingPart(CONTENT_TYPES_ENTRY.into()))?;

    let mut content = String::new();
    file.read_to_string(&mut content)?;

    ContentTypes::from_xml(&content)
}

fn read_root_relationships<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<Relationships> {
    match archive.by_name(ROOT_RELS_ENTRY) {
        Ok(mut file) => {
            let mut content = String::new();
            file.read_to_string(&mut content)?;
            Relationships::from_xml(&content)
        }
        Err(_) => Ok(Relationships::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_package() {
        let pkg = Package::new();
        assert!(pkg.parts.is_empty());
        assert!(pkg.relationships.is_empty());
    }

    #[test]
    fn test_create_empty_seeds_parts() {
        let pkg = Package::create_empty();

        let doc = well_known::document();
        assert_eq!(pkg.main_document_uri(), Some(doc.clone()));
        assert_eq!(pkg.content_type_of(&doc), content_types::MAIN_DOCUMENT);
        assert_eq!(
            pkg.content_type_of(&well_known::numbering()),
            content_types::NUMBERING
        );

        let rels = pkg.part(&doc).unwrap().relationships();
        assert_eq!(rels.resolve("rId1"), Some(("styles.xml", TargetMode::Internal)));
        assert_eq!(rels.resolve("rId2"), Some(("settings.xml", TargetMode::Internal)));
        assert_eq!(rels.resolve("rId3"), Some(("numbering.xml", TargetMode::Internal)));
    }

    #[test]
    fn test_content_type_fallbacks() {
        let mut pkg = Package::create_empty();
        let image = PartUri::new("/word/media/image1.png").unwrap();
        pkg.set_part(image.clone(), "", vec![1, 2, 3]);
        assert_eq!(pkg.content_type_of(&image), "");

        pkg.content_types_mut().add_default("png", "image/png");
        assert_eq!(pkg.content_type_of(&image), "image/png");

        let custom = PartUri::new("/custom/data.xml").unwrap();
        assert_eq!(pkg.content_type_of(&custom), content_types::XML);
    }

    #[test]
    fn test_set_part_keeps_relationships() {
        let mut pkg = Package::create_empty();
        let doc = well_known::document();
        pkg.set_part(doc.clone(), content_types::MAIN_DOCUMENT, b"<x/>".to_vec());

        let part = pkg.part(&doc).unwrap();
        assert_eq!(part.data(), b"<x/>");
        assert_eq!(part.relationships().len(), 3);
    }

    #[test]
    fn test_ensure_and_resolve_relationship() {
        let mut pkg = Package::create_empty();
        let doc = well_known::document();

        let id = pkg
            .ensure_relationship(
                Some(&doc),
                rel_types::HYPERLINK,
                "https://example.com",
                TargetMode::External,
            )
            .unwrap();
        assert_eq!(id, "rId4");
        assert_eq!(
            pkg.resolve_relationship(Some(&doc), &id),
            Some(("https://example.com".to_string(), TargetMode::External))
        );
        assert_eq!(pkg.resolve_relationship(Some(&doc), "rId99"), None);

        let missing = PartUri::new("/word/nothing.xml").unwrap();
        assert!(pkg
            .ensure_relationship(Some(&missing), rel_types::IMAGE, "a.png", TargetMode::Internal)
            .is_err());
    }

    #[test]
    fn test_roundtrip_with_parts() {
        let pkg = Package::create_empty();
        let bytes = pkg.to_bytes().unwrap();
        let pkg2 = Package::from_bytes(&bytes).unwrap();

        let names: Vec<_> = pkg2.parts().map(|(uri, _)| uri.as_str()).collect();
        assert_eq!(
            names,
            [
                "/word/document.xml",
                "/word/numbering.xml",
                "/word/settings.xml",
                "/word/styles.xml"
            ]
        );
        assert_eq!(pkg2.content_types(), pkg.content_types());
        assert_eq!(pkg2.relationships(), pkg.relationships());

        let doc = well_known::document();
        assert_eq!(
            pkg2.part(&doc).unwrap().relationships(),
            pkg.part(&doc).unwrap().relationships()
        );
        assert_eq!(pkg2.part(&doc).unwrap().content_type(), content_types::MAIN_DOCUMENT);
    }

    #[test]
    fn test_missing_content_types_is_error() {
        let mut buf = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buf));
            let options: FileOptions<()> = FileOptions::default();
            zip.start_file("word/document.xml", options).unwrap();
            zip.write_all(b"<w:document/>").unwrap();
            zip.finish().unwrap();
        }

        assert!(matches!(
            Package::from_bytes(&buf),
            Err(Error::MissingPart(_))
        ));
    }

    #[test]
    fn test_not_a_zip_is_error() {
        assert!(matches!(
            Package::from_bytes(b"definitely not a zip"),
            Err(Error::Zip(_))
        ));
    }
}
