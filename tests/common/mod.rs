#![allow(dead_code)]

//! Shared test doubles: a synthetic rasterizer and a recording locator.

use std::cell::RefCell;
use std::rc::Rc;

use recompress_pdf::{
    CompressError, Locator, PageGeometry, PageRasterizer, RasterSurface, Route, SourceDocument,
};

/// Synthetic rasterizer. Any buffer that parses as a PDF (i.e. the assembled
/// output of a previous pass) is opened with its real page geometry read back
/// via lopdf; anything else is treated as the configured fake source.
pub struct FakeRasterizer {
    source_pages: Vec<(f32, f32)>,
    fail_on_source_page: Option<usize>,
    fail_on_parsed_page: Option<usize>,
    /// Every byte buffer handed to `open`, in order.
    pub opened: RefCell<Vec<Vec<u8>>>,
    /// Every scale passed to `rasterize`, in order.
    pub scales: RefCell<Vec<f32>>,
    /// `strong_count - 1` equals the number of documents currently open.
    pub live_docs: Rc<()>,
}

impl FakeRasterizer {
    pub fn with_pages(pages: &[(f32, f32)]) -> Self {
        Self {
            source_pages: pages.to_vec(),
            fail_on_source_page: None,
            fail_on_parsed_page: None,
            opened: RefCell::new(Vec::new()),
            scales: RefCell::new(Vec::new()),
            live_docs: Rc::new(()),
        }
    }

    /// Make `rasterize(page, _)` fail (zero-based) when reading the fake source.
    pub fn fail_on_source_page(mut self, page: usize) -> Self {
        self.fail_on_source_page = Some(page);
        self
    }

    /// Make `rasterize(page, _)` fail (zero-based) when re-reading a real PDF,
    /// i.e. during the grayscale pass.
    pub fn fail_on_parsed_page(mut self, page: usize) -> Self {
        self.fail_on_parsed_page = Some(page);
        self
    }

    pub fn open_documents(&self) -> usize {
        Rc::strong_count(&self.live_docs) - 1
    }
}

fn media_box(doc: &lopdf::Document, page_id: lopdf::ObjectId) -> (f32, f32) {
    let num = |o: &lopdf::Object| match o {
        lopdf::Object::Integer(n) => *n as f32,
        lopdf::Object::Real(n) => *n,
        other => panic!("non-numeric MediaBox entry: {other:?}"),
    };
    match doc.get_object(page_id) {
        Ok(lopdf::Object::Dictionary(page)) => match page.get(b"MediaBox") {
            Ok(lopdf::Object::Array(mb)) => (num(&mb[2]), num(&mb[3])),
            other => panic!("missing MediaBox: {other:?}"),
        },
        other => panic!("page is not a dictionary: {other:?}"),
    }
}

pub struct FakeDocument<'a> {
    pages: Vec<(f32, f32)>,
    fail_on_page: Option<usize>,
    parent: &'a FakeRasterizer,
    _live: Rc<()>,
}

impl PageRasterizer for FakeRasterizer {
    type Doc<'a>
        = FakeDocument<'a>
    where
        Self: 'a;

    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<FakeDocument<'a>, CompressError> {
        self.opened.borrow_mut().push(bytes.to_vec());

        let parsed = lopdf::Document::load_mem(bytes)
            .ok()
            .filter(|doc| !doc.get_pages().is_empty());
        let (pages, fail_on_page) = match parsed {
            Some(doc) => {
                let pages = doc
                    .get_pages()
                    .values()
                    .map(|id| media_box(&doc, *id))
                    .collect();
                (pages, self.fail_on_parsed_page)
            }
            None => (self.source_pages.clone(), self.fail_on_source_page),
        };

        Ok(FakeDocument {
            pages,
            fail_on_page,
            parent: self,
            _live: self.live_docs.clone(),
        })
    }
}

impl SourceDocument for FakeDocument<'_> {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn geometry(&self, page: usize) -> Result<PageGeometry, CompressError> {
        let (width, height) = self.pages.get(page).copied().ok_or(CompressError::Render {
            page: page + 1,
            message: "page out of range".to_string(),
        })?;
        Ok(PageGeometry { width, height })
    }

    fn rasterize(&self, page: usize, scale: f32) -> Result<RasterSurface, CompressError> {
        if self.fail_on_page == Some(page) {
            return Err(CompressError::Render {
                page: page + 1,
                message: "synthetic render failure".to_string(),
            });
        }
        self.parent.scales.borrow_mut().push(scale);

        let geometry = self.geometry(page)?;
        let width = ((geometry.width * scale).round() as u32).max(1);
        let height = ((geometry.height * scale).round() as u32).max(1);

        // Chromatic gradient so the grayscale pass has real work to do.
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[
                    ((x * 7 + page as u32) % 256) as u8,
                    ((y * 11) % 256) as u8,
                    90,
                    255,
                ]);
            }
        }
        Ok(RasterSurface {
            width,
            height,
            pixels,
        })
    }
}

/// Locator that records every navigation.
pub struct RecordingLocator {
    route: Route,
    pub history: Vec<Route>,
}

impl RecordingLocator {
    pub fn at(route: Route) -> Self {
        Self {
            route,
            history: Vec::new(),
        }
    }
}

impl Locator for RecordingLocator {
    fn current(&self) -> Route {
        self.route
    }

    fn replace(&mut self, route: Route) {
        self.route = route;
        self.history.push(route);
    }
}

/// Parse assembled output and return the (width, height) of every page in order.
pub fn output_page_sizes(bytes: &[u8]) -> Vec<(f32, f32)> {
    let doc = lopdf::Document::load_mem(bytes).expect("output must be a parseable PDF");
    doc.get_pages()
        .values()
        .map(|id| media_box(&doc, *id))
        .collect()
}

/// Decode every page image (DCTDecode XObject) of assembled output.
pub fn output_page_images(bytes: &[u8]) -> Vec<image::RgbImage> {
    let doc = lopdf::Document::load_mem(bytes).expect("output must be a parseable PDF");
    let mut images = Vec::new();
    for (_, object) in doc.objects.iter() {
        if let lopdf::Object::Stream(stream) = object {
            let is_image = matches!(
                stream.dict.get(b"Subtype"),
                Ok(lopdf::Object::Name(n)) if n == b"Image"
            );
            if is_image {
                let decoded = image::load_from_memory_with_format(
                    &stream.content,
                    image::ImageFormat::Jpeg,
                )
                .expect("page image must be valid JPEG");
                images.push(decoded.to_rgb8());
            }
        }
    }
    images
}
