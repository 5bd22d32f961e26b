use crate::constants::DEFAULT_MAX_GROUP_DEPTH;

/// How object and slide identifiers are generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdStrategy {
    /// Random v4 UUIDs.
    #[default]
    Uuid,
    /// `<kind>-<n>` from a counter that starts at 1 for every parse.
    Sequential,
}

/// Configuration options for the PPTX parser.
///
/// Use [`ParserConfig::builder()`] to create a configuration instance.
/// This allows you to customize only the desired fields while falling back to sensible defaults for the rest.
///
/// # Configuration Options
///
/// | Parameter | Type | Default | Description |
/// |-----------|------|---------|-------------|
/// | `extract_images` | `bool` | `true` | Whether image payloads are read from the package |
/// | `read_image_dimensions` | `bool` | `true` | Whether the intrinsic pixel size of images is probed |
/// | `flatten_groups` | `bool` | `false` | Emit group members directly instead of `Group` objects |
/// | `multi_threaded` | `bool` | `false` | Assemble slides in parallel |
/// | `max_group_depth` | `usize` | `64` | Deepest allowed group nesting before a slide is rejected |
/// | `id_strategy` | [`IdStrategy`] | `Uuid` | How identifiers are generated |
///
/// # Example
///
/// ```
/// use pptx_model::{IdStrategy, ParserConfig};
///
/// let config = ParserConfig::builder()
///     .extract_images(false)
///     .id_strategy(IdStrategy::Sequential)
///     .build();
/// assert!(!config.extract_images);
/// ```
#[derive(Debug, Clone)]
pub struct ParserConfig {
    pub extract_images: bool,
    pub read_image_dimensions: bool,
    pub flatten_groups: bool,
    pub multi_threaded: bool,
    pub max_group_depth: usize,
    pub id_strategy: IdStrategy,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            extract_images: true,
            read_image_dimensions: true,
            flatten_groups: false,
            multi_threaded: false,
            max_group_depth: DEFAULT_MAX_GROUP_DEPTH,
            id_strategy: IdStrategy::default(),
        }
    }
}

impl ParserConfig {
    pub fn builder() -> ParserConfigBuilder {
        ParserConfigBuilder::default()
    }
}

/// Builder for [`ParserConfig`].
///
/// Allows setting individual configuration fields while falling back to defaults for any unspecified values
#[derive(Debug, Default)]
pub struct ParserConfigBuilder {
    extract_images: Option<bool>,
    read_image_dimensions: Option<bool>,
    flatten_groups: Option<bool>,
    multi_threaded: Option<bool>,
    max_group_depth: Option<usize>,
    id_strategy: Option<IdStrategy>,
}

impl ParserConfigBuilder {
    /// Sets whether image payloads should be read from the package.
    pub fn extract_images(mut self, value: bool) -> Self {
        self.extract_images = Some(value);
        self
    }

    pub fn read_image_dimensions(mut self, value: bool) -> Self {
        self.read_image_dimensions = Some(value);
        self
    }

    /// When set, members of groups are appended to the slide's object list in place of the group.
    pub fn flatten_groups(mut self, value: bool) -> Self {
        self.flatten_groups = Some(value);
        self
    }

    pub fn multi_threaded(mut self, value: bool) -> Self {
        self.multi_threaded = Some(value);
        self
    }

    pub fn max_group_depth(mut self, value: usize) -> Self {
        self.max_group_depth = Some(value);
        self
    }

    pub fn id_strategy(mut self, value: IdStrategy) -> Self {
        self.id_strategy = Some(value);
        self
    }

    /// Builds the final [`ParserConfig`] instance, applying default values for any fields that were not set.
    pub fn build(self) -> ParserConfig {
        let defaults = ParserConfig::default();
        ParserConfig {
            extract_images: self.extract_images.unwrap_or(defaults.extract_images),
            read_image_dimensions: self.read_image_dimensions.unwrap_or(defaults.read_image_dimensions),
            flatten_groups: self.flatten_groups.unwrap_or(defaults.flatten_groups),
            multi_threaded: self.multi_threaded.unwrap_or(defaults.multi_threaded),
            max_group_depth: self.max_group_depth.unwrap_or(defaults.max_group_depth),
            id_strategy: self.id_strategy.unwrap_or(defaults.id_strategy),
        }
    }
}
