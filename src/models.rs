use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Whether a source path is a single file or a directory tree.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    File,
    Directory,
}

/// Archive container recognised from a file's leading bytes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    Zip,
    Gzip,
    /// Unix `compress` (.Z, usually .tar.Z)
    UnixCompress,
    Lzh,
    Bzip2,
    Lzip,
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveFormat::Zip => write!(f, "zip"),
            ArchiveFormat::Gzip => write!(f, "gzip"),
            ArchiveFormat::UnixCompress => write!(f, "compress"),
            ArchiveFormat::Lzh => write!(f, "lzh"),
            ArchiveFormat::Bzip2 => write!(f, "bzip2"),
            ArchiveFormat::Lzip => write!(f, "lzip"),
        }
    }
}

/// A user supplied source path after classification. Immutable once built.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub path: PathBuf,
    pub kind: SourceKind,
    pub archive: Option<ArchiveFormat>,
}

impl SourceSpec {
    pub fn is_archive(&self) -> bool {
        self.archive.is_some()
    }

    pub fn is_file(&self) -> bool {
        self.kind == SourceKind::File
    }
}

/// A file found under a staged root, paired with its destination blob name.
///
/// `relative_name` uses `/` separators and never starts with one.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub absolute_path: PathBuf,
    pub relative_name: String,
    pub size_bytes: u64,
}

impl FileEntry {
    pub fn is_empty(&self) -> bool {
        self.size_bytes == 0
    }

    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.relative_name)
            .extension()
            .and_then(|e| e.to_str())
    }
}

/// How a source that sniffs as an archive is treated.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArchivePolicy {
    /// Upload the archive itself as a single blob
    #[default]
    Opaque,
    /// Extract the archive and upload its contents
    Extract,
}

impl ArchivePolicy {
    pub fn from_extract_flag(extract: bool) -> Self {
        if extract {
            ArchivePolicy::Extract
        } else {
            ArchivePolicy::Opaque
        }
    }
}

/// Azure blob access tier.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessTier {
    Hot,
    Cool,
    Archive,
}

impl fmt::Display for AccessTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessTier::Hot => write!(f, "Hot"),
            AccessTier::Cool => write!(f, "Cool"),
            AccessTier::Archive => write!(f, "Archive"),
        }
    }
}

impl FromStr for AccessTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hot" => Ok(AccessTier::Hot),
            "cool" => Ok(AccessTier::Cool),
            "archive" => Ok(AccessTier::Archive),
            other => Err(format!("unknown access tier '{}' (expected Hot, Cool or Archive)", other)),
        }
    }
}

/// Azure blob type.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlobType {
    #[default]
    Block,
    Append,
    Page,
}

impl fmt::Display for BlobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlobType::Block => write!(f, "Block"),
            BlobType::Append => write!(f, "Append"),
            BlobType::Page => write!(f, "Page"),
        }
    }
}

impl FromStr for BlobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "block" => Ok(BlobType::Block),
            "append" => Ok(BlobType::Append),
            "page" => Ok(BlobType::Page),
            other => Err(format!("unknown blob type '{}' (expected Block, Append or Page)", other)),
        }
    }
}

/// Where the blobs of one upload go.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub account: String,
    pub container: String,
    pub access_tier: Option<AccessTier>,
    pub blob_type: BlobType,
}

/// One "create remote object" declaration handed to a blob store.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BlobUploadSpec {
    pub relative_name: String,
    pub absolute_path: PathBuf,
    pub size_bytes: u64,
    pub content_type: String,
    pub access_tier: Option<AccessTier>,
    pub blob_type: BlobType,
    pub container: String,
    pub account: String,
}
