/// English Metric Units per pixel at 96 DPI.
pub const EMU_PER_PX: f64 = 9525.0;

/// `a:xfrm@rot` is stored in 60000ths of a degree.
pub const ROTATION_UNITS_PER_DEGREE: f64 = 60_000.0;

/// `a:srcRect` crop edges are stored in 1000ths of a percent.
pub const CROP_UNITS: f64 = 100_000.0;

/// Run sizes (`a:rPr@sz`) are stored in hundredths of a point.
pub const FONT_SIZE_UNITS: f64 = 100.0;

pub const DEFAULT_SLIDE_WIDTH_EMU: i64 = 9_144_000;
pub const DEFAULT_SLIDE_HEIGHT_EMU: i64 = 6_858_000;

pub const DEFAULT_MAX_GROUP_DEPTH: usize = 64;

pub const ROOT_RELS_PATH: &str = "_rels/.rels";
pub const DEFAULT_PRESENTATION_PATH: &str = "ppt/presentation.xml";
pub const DEFAULT_CORE_PROPS_PATH: &str = "docProps/core.xml";
pub const SLIDES_DIR_PREFIX: &str = "ppt/slides/slide";

/// Relationship types are matched by suffix so Transitional and Strict namespaces both resolve.
pub const OFFICE_DOCUMENT_REL_SUFFIX: &str = "/officeDocument";
pub const CORE_PROPERTIES_REL_SUFFIX: &str = "/core-properties";
pub const THEME_REL_SUFFIX: &str = "/theme";
