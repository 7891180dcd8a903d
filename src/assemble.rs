//! Incremental output document assembly.
//!
//! Each appended page carries exactly one full-page JPEG image XObject drawn
//! over a MediaBox sized to the page's *unscaled* source geometry, so the
//! raster scale used for quality never leaks into page dimensions.
//!
//! Builder invariant: the builder starts with an implicit blank placeholder
//! page and the first `append_page` both adds the real page and removes the
//! placeholder. Finishing with the placeholder still present (no pages
//! appended) is an assembly error, never a stray leading page in the output.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use log::debug;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::encode::EncodedImage;
use crate::error::CompressError;
use crate::raster::PageGeometry;

pub struct OutputBuilder {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
    placeholder: Option<ObjectId>,
}

impl OutputBuilder {
    pub fn begin() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut blank = Dictionary::new();
        blank.set("Type", Object::Name(b"Page".to_vec()));
        blank.set("Parent", Object::Reference(pages_id));
        blank.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ]),
        );
        let placeholder = doc.add_object(Object::Dictionary(blank));

        Self {
            doc,
            pages_id,
            kids: Vec::new(),
            placeholder: Some(placeholder),
        }
    }

    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Append one page. Pages must arrive in source order; the output page
    /// order is the append order.
    pub fn append_page(
        &mut self,
        image: &EncodedImage,
        geometry: PageGeometry,
    ) -> Result<(), CompressError> {
        if let Some(id) = self.placeholder.take() {
            self.doc.objects.remove(&id);
        }

        let mut img_dict = Dictionary::new();
        img_dict.set("Type", Object::Name(b"XObject".to_vec()));
        img_dict.set("Subtype", Object::Name(b"Image".to_vec()));
        img_dict.set("Width", Object::Integer(image.width as i64));
        img_dict.set("Height", Object::Integer(image.height as i64));
        img_dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
        img_dict.set("BitsPerComponent", Object::Integer(8));
        img_dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
        let image_id = self
            .doc
            .add_object(Object::Stream(Stream::new(img_dict, image.data.clone())));

        // Scale the unit image square up to the full unscaled page.
        let ops = format!(
            "q\n{} 0 0 {} 0 0 cm\n/Im0 Do\nQ",
            geometry.width, geometry.height
        );
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
        encoder
            .write_all(ops.as_bytes())
            .map_err(|e| CompressError::Assembly(format!("content stream: {e}")))?;
        let compressed = encoder
            .finish()
            .map_err(|e| CompressError::Assembly(format!("content stream: {e}")))?;

        let mut content_dict = Dictionary::new();
        content_dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
        let content_id = self
            .doc
            .add_object(Object::Stream(Stream::new(content_dict, compressed)));

        let mut xobjects = Dictionary::new();
        xobjects.set("Im0", Object::Reference(image_id));
        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(xobjects));

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(self.pages_id));
        page.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(geometry.width),
                Object::Real(geometry.height),
            ]),
        );
        page.set("Contents", Object::Reference(content_id));
        page.set("Resources", Object::Dictionary(resources));
        let page_id = self.doc.add_object(Object::Dictionary(page));
        self.kids.push(page_id);

        debug!(
            "appended page {} ({}x{} pt, {} byte image)",
            self.kids.len(),
            geometry.width,
            geometry.height,
            image.data.len()
        );
        Ok(())
    }

    /// Close the page tree and serialize the document.
    pub fn finish(mut self) -> Result<Vec<u8>, CompressError> {
        if self.placeholder.is_some() {
            return Err(CompressError::Assembly("no pages appended".to_string()));
        }

        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set(
            "Kids",
            Object::Array(self.kids.iter().map(|id| Object::Reference(*id)).collect()),
        );
        pages.set("Count", Object::Integer(self.kids.len() as i64));
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(self.pages_id));
        let catalog_id = self.doc.add_object(Object::Dictionary(catalog));
        self.doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut bytes = Vec::new();
        self.doc
            .save_to(&mut bytes)
            .map_err(|e| CompressError::Assembly(e.to_string()))?;
        Ok(bytes)
    }
}
