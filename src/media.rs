use base64::{engine::general_purpose, Engine as _};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::io::Cursor;

/// Bytes of an embedded media part together with what renderers need to display them.
#[derive(Clone, PartialEq)]
pub struct ImagePayload {
    /// Package path the bytes were read from.
    pub path: String,
    pub mime: &'static str,
    pub data: Vec<u8>,
    /// Lowercase hex SHA-256 of `data`.
    pub digest: String,
    /// Intrinsic pixel size, when the format could be probed.
    pub dimensions: Option<(u32, u32)>,
}

impl ImagePayload {
    pub(crate) fn new(path: &str, data: Vec<u8>, probe_dimensions: bool) -> Self {
        let digest = format!("{:x}", Sha256::digest(&data));
        let dimensions = if probe_dimensions {
            read_dimensions(&data)
        } else {
            None
        };

        Self {
            path: path.to_string(),
            mime: mime_from_extension(path),
            data,
            digest,
            dimensions,
        }
    }

    /// `data:<mime>;base64,<payload>`
    pub fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime,
            general_purpose::STANDARD.encode(&self.data)
        )
    }
}

impl std::fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePayload")
            .field("path", &self.path)
            .field("mime", &self.mime)
            .field("len", &self.data.len())
            .field("digest", &self.digest)
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

impl Serialize for ImagePayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ImagePayload", 6)?;
        state.serialize_field("path", &self.path)?;
        state.serialize_field("mime", self.mime)?;
        state.serialize_field("src", &self.data_uri())?;
        state.serialize_field("digest", &self.digest)?;
        state.serialize_field("width", &self.dimensions.map(|(w, _)| w))?;
        state.serialize_field("height", &self.dimensions.map(|(_, h)| h))?;
        state.end()
    }
}

/// MIME type from the file extension of a media part.
pub fn mime_from_extension(path: &str) -> &'static str {
    let extension = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}

fn read_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()?;
    match reader.into_dimensions() {
        Ok(dimensions) => Some(dimensions),
        Err(e) => {
            log::debug!("Could not read image dimensions: {}", e);
            None
        }
    }
}
