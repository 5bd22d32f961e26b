use crate::Result;
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Seek};

/// Read access to the parts of an OPC package.
///
/// Implementations must be shareable across threads so slides can be assembled in parallel.
pub trait Archive: Sync {
    /// All part paths in the package, without a leading `/`.
    fn list_entries(&self) -> Vec<String>;

    /// UTF-8 content of a part, with any byte-order mark removed.
    fn read_text(&self, path: &str) -> Option<String>;

    fn read_binary(&self, path: &str) -> Option<Vec<u8>>;
}

/// A fully loaded presentation package.
///
/// Every entry is decompressed once when the package is opened; afterwards reads never touch
/// the underlying zip archive.
#[derive(Debug, Clone, Default)]
pub struct Package {
    entries: BTreeMap<String, Vec<u8>>,
}

impl Package {
    /// Reads every file entry of a zip archive.
    ///
    /// # Errors
    ///
    /// Fails when the data is not a readable zip archive or an entry cannot be decompressed.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;
        let mut entries = BTreeMap::new();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().trim_start_matches('/').to_string();
            // The declared size is untrusted; grow with what actually decompresses.
            let mut content = Vec::new();
            file.read_to_end(&mut content)?;
            entries.insert(name, content);
        }

        log::debug!("Loaded package with {} entries", entries.len());
        Ok(Self { entries })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Builds a package from already extracted `(path, bytes)` pairs.
    pub fn from_entries<I, P, B>(entries: I) -> Self
    where
        I: IntoIterator<Item = (P, B)>,
        P: Into<String>,
        B: Into<Vec<u8>>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(path, bytes)| {
                    let path: String = path.into();
                    (path.trim_start_matches('/').to_string(), bytes.into())
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }
}

impl Archive for Package {
    fn list_entries(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn read_text(&self, path: &str) -> Option<String> {
        let bytes = self.entries.get(path)?;
        match std::str::from_utf8(bytes) {
            Ok(text) => Some(text.trim_start_matches('\u{feff}').to_string()),
            Err(e) => {
                log::warn!("Part {} is not valid UTF-8: {}", path, e);
                None
            }
        }
    }

    fn read_binary(&self, path: &str) -> Option<Vec<u8>> {
        self.entries.get(path).cloned()
    }
}
