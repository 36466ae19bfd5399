//! Session archive access.
//!
//! A session archive is a zip file with three entries per exchange under a
//! common prefix: `<prefix><id>_c.txt` (client request), `<prefix><id>_s.txt`
//! (server response) and `<prefix><id>_m.xml` (session metadata).

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use zip::ZipArchive;

use crate::bytes::{ends_with_ignore_case, starts_with_ignore_case};
use crate::error::{ConvertError, Result};

const CLIENT_SUFFIX: &str = "_c.txt";
const SERVER_SUFFIX: &str = "_s.txt";
const METADATA_SUFFIX: &str = "_m.xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Client,
    Server,
    Metadata,
}

impl Role {
    fn suffix(self) -> &'static str {
        match self {
            Role::Client => CLIENT_SUFFIX,
            Role::Server => SERVER_SUFFIX,
            Role::Metadata => METADATA_SUFFIX,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        [Role::Client, Role::Server, Role::Metadata]
            .into_iter()
            .find(|role| ends_with_ignore_case(name.as_bytes(), role.suffix().as_bytes()))
    }
}

/// Archive entry indices belonging to one exchange.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Frame {
    pub client: Option<usize>,
    pub server: Option<usize>,
    pub metadata: Option<usize>,
}

impl Frame {
    fn slot(&mut self, role: Role) -> &mut Option<usize> {
        match role {
            Role::Client => &mut self.client,
            Role::Server => &mut self.server,
            Role::Metadata => &mut self.metadata,
        }
    }
}

/// Exchanges of an archive keyed by id, iterated in ascending id order.
#[derive(Debug, Clone, Default)]
pub struct FrameIndex {
    frames: BTreeMap<u32, Frame>,
}

impl FrameIndex {
    /// Groups entry names by exchange id. `names` yields `(entry index, name)`.
    ///
    /// Names outside `prefix`, directories and names without a known role
    /// suffix are ignored. A name that has both but no numeric id in between
    /// makes the whole archive unusable.
    pub fn build<'n>(
        names: impl IntoIterator<Item = (usize, &'n str)>,
        prefix: &str,
    ) -> Result<Self> {
        let mut frames = BTreeMap::new();
        for (index, name) in names {
            if name.ends_with('/') || !starts_with_ignore_case(name.as_bytes(), prefix.as_bytes())
            {
                continue;
            }
            let Some(role) = Role::from_name(name) else {
                continue;
            };

            let end = name.len().saturating_sub(role.suffix().len());
            let id = name
                .get(prefix.len()..end)
                .and_then(|id| id.parse::<u32>().ok())
                .ok_or_else(|| ConvertError::MalformedArchiveIndex(name.to_string()))?;

            let slot = frames.entry(id).or_insert_with(Frame::default).slot(role);
            if slot.replace(index).is_some() {
                tracing::warn!("duplicate {role:?} entry for exchange #{id}, using {name:?}");
            }
        }
        Ok(Self { frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &Frame)> {
        self.frames.iter().map(|(id, frame)| (*id, frame))
    }
}

/// An open session archive. Entries are read on demand.
pub struct SazArchive<R> {
    zip: ZipArchive<R>,
    password: Option<String>,
}

impl SazArchive<BufReader<File>> {
    pub fn open(path: &Path, password: Option<String>) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file), password)
    }
}

impl<R: Read + Seek> SazArchive<R> {
    pub fn new(reader: R, password: Option<String>) -> Result<Self> {
        Ok(Self {
            zip: ZipArchive::new(reader)?,
            password,
        })
    }

    /// Number of zip entries, directories included.
    pub fn entry_count(&self) -> usize {
        self.zip.len()
    }

    /// Builds the exchange index from the archive's entry names.
    pub fn index(&self, prefix: &str) -> Result<FrameIndex> {
        let names = (0..self.zip.len())
            .filter_map(|index| self.zip.name_for_index(index).map(|name| (index, name)));
        FrameIndex::build(names, prefix)
    }

    /// Reads entry `index` into `buf`, replacing its content.
    pub fn read_entry(&mut self, index: usize, buf: &mut Vec<u8>) -> Result<()> {
        buf.clear();
        let mut entry = match &self.password {
            Some(password) => self.zip.by_index_decrypt(index, password.as_bytes())?,
            None => self.zip.by_index(index)?,
        };
        entry.read_to_end(buf)?;
        Ok(())
    }
}
