use super::{Error, Result};
use crate::archive::Package;
use crate::ids::IdSource;
use crate::parser_config::ParserConfig;
use crate::presentation::{assemble_document, PresentationIndex};
use crate::types::{PresentationDocument, PresentationMetadata, Slide};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Holds the internal representation of a loaded PowerPoint (pptx) container.
///
/// `PptxContainer` reads every part of the package into memory once, then locates the
/// presentation part, its slide list, slide size, theme and core properties. Slides are only
/// parsed when requested, either all at once with [`parse`](Self::parse) or one at a time.
pub struct PptxContainer {
    pub config: ParserConfig,
    package: Package,
    index: PresentationIndex,
    name: Option<String>,
}

impl PptxContainer {
    /// Opens a PowerPoint pptx file and initializes a `PptxContainer`.
    ///
    /// The document name defaults to the file stem.
    ///
    /// # Errors
    ///
    /// Errors are returned on file access problems or failures during the unzipping process.
    pub fn open(path: &Path, config: ParserConfig) -> Result<Self> {
        let file = File::open(path)?;
        let package = Package::from_reader(BufReader::new(file))?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned());

        Ok(Self::from_package(package, name.as_deref(), config))
    }

    /// Loads a package from raw bytes.
    ///
    /// Without a `name` the document is named after its title, or `"Imported Presentation"`.
    ///
    /// # Errors
    ///
    /// Fails when the bytes are not a readable zip archive.
    pub fn from_bytes(bytes: &[u8], name: Option<&str>, config: ParserConfig) -> Result<Self> {
        let package = Package::from_bytes(bytes)?;
        Ok(Self::from_package(package, name, config))
    }

    /// Wraps an already loaded package.
    pub fn from_package(package: Package, name: Option<&str>, config: ParserConfig) -> Self {
        let index = PresentationIndex::load(&package);
        log::debug!(
            "Loaded package with {} parts and {} listed slides",
            package.len(),
            index.slides.len()
        );

        Self {
            config,
            package,
            index,
            name: name.map(str::to_string),
        }
    }

    /// Number of slides listed by the presentation, including ones that may fail to parse.
    pub fn slide_count(&self) -> usize {
        self.index.slides.len()
    }

    /// Metadata read while opening the package. `slide_count` is only filled in by [`parse`](Self::parse).
    pub fn metadata(&self) -> &PresentationMetadata {
        &self.index.metadata
    }

    /// Parses every slide into a [`PresentationDocument`].
    ///
    /// Slides that cannot be parsed are listed in the document's diagnostics instead of failing
    /// the call. With `multi_threaded` enabled slides are assembled in parallel using Rayon.
    pub fn parse(&self) -> PresentationDocument {
        assemble_document(&self.package, &self.index, &self.config, self.name.as_deref())
    }

    /// Loads a single slide by its 1-based number.
    ///
    /// # Errors
    ///
    /// * [`Error::SlideNotFound`] if the presentation has no such slide.
    /// * Any error that made the slide unparsable.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pptx_model::{ParserConfig, PptxContainer};
    /// use std::path::Path;
    ///
    /// let container = PptxContainer::open(Path::new("presentation.pptx"), ParserConfig::default())?;
    /// let slide = container.load_slide(1)?;
    /// println!("{} has {} objects", slide.name, slide.objects.len());
    /// # Ok::<(), pptx_model::Error>(())
    /// ```
    pub fn load_slide(&self, slide_number: u32) -> Result<Slide> {
        let slide_ref = self.index.find(slide_number).ok_or(Error::SlideNotFound)?;
        let ids = IdSource::new(self.config.id_strategy);
        self.index
            .assemble(&self.package, &self.config, &ids, slide_ref)
            .map(|(slide, _)| slide)
    }

    /// Streams slides one by one in presentation order.
    pub fn iter_slides(&self) -> SlideIterator<'_> {
        SlideIterator::new(self)
    }
}

/// An iterator for streaming slides from a PPTX file.
///
/// Slides are parsed lazily as the iterator advances, so only one slide model is alive at a time.
/// Identifiers are unique across the whole iteration.
///
/// # Example
///
/// ```no_run
/// use pptx_model::{ParserConfig, PptxContainer};
/// use std::path::Path;
///
/// let container = PptxContainer::open(Path::new("presentation.pptx"), ParserConfig::default())?;
/// for slide_result in container.iter_slides() {
///     match slide_result {
///         Ok(slide) => println!("Processing slide {}", slide.slide_number),
///         Err(e) => eprintln!("Error: {:?}", e),
///     }
/// }
/// # Ok::<(), pptx_model::Error>(())
/// ```
pub struct SlideIterator<'a> {
    container: &'a PptxContainer,
    ids: IdSource,
    current_index: usize,
}

impl<'a> SlideIterator<'a> {
    fn new(container: &'a PptxContainer) -> Self {
        Self {
            container,
            ids: IdSource::new(container.config.id_strategy),
            current_index: 0,
        }
    }
}

impl Iterator for SlideIterator<'_> {
    type Item = Result<Slide>;

    /// Parses the next slide.
    ///
    /// * `Some(Ok(Slide))` - The next slide was successfully parsed.
    /// * `Some(Err(_))` - The next slide could not be parsed; iteration can continue.
    /// * `None` - There are no more slides to process.
    fn next(&mut self) -> Option<Self::Item> {
        let index = &self.container.index;
        let slide_ref = index.slides.get(self.current_index)?;
        self.current_index += 1;

        Some(
            index
                .assemble(&self.container.package, &self.container.config, &self.ids, slide_ref)
                .map(|(slide, _)| slide),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.container.index.slides.len() - self.current_index;
        (remaining, Some(remaining))
    }
}
