use std::fmt;
use std::fs;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::Value;
use tempfile::TempDir;
use zip::ZipArchive;

mod error;
pub mod launch;

pub use error::Error;
pub use error::LaunchError;
pub use error::Result;
pub use launch::Launcher;
pub use launch::SystemLauncher;

pub const ARCHIVE_NAME: &str = "temp.zip";
pub const JSON_NAME: &str = "temp.json";

const WORKSPACE_PREFIX: &str = "jsonpeek-";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parent directory for the per-run workspace. Defaults to the system
    /// temp directory.
    pub temp_root: Option<PathBuf>,
}

#[derive(Debug)]
pub enum Outcome {
    Opened { path: PathBuf },
    Saved { path: PathBuf, error: LaunchError },
    NoJson,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Opened { path } => {
                writeln!(f, "JSON opened in the viewer: {}", path.display())?;
                write!(f, "Do not delete the temporary file while it is in use.")
            }
            Outcome::Saved { path, error } => {
                writeln!(f, "Could not open the viewer: {}", chain(error))?;
                write!(f, "The JSON file was saved to: {}", path.display())
            }
            Outcome::NoJson => {
                write!(f, "No valid JSON content found in the archive.")
            }
        }
    }
}

/// Renders an error and all of its sources on one line.
pub fn chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

/// Decodes standard padded base64, ignoring ASCII whitespace.
pub fn decode(input: &str) -> Result<Vec<u8>> {
    let compact: Vec<u8> = input
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    Ok(STANDARD.decode(compact)?)
}

/// Parses one entry's bytes as json, tolerating a utf-8 byte order mark.
fn parse_entry(data: &[u8]) -> Option<Value> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    serde_json::from_slice(data).ok()
}

/// Returns the first entry, in archive order, whose content is json.
pub fn find_first_json<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<Option<Value>> {
    let mut buf = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        buf.clear();
        entry.read_to_end(&mut buf).map_err(|source| Error::Entry {
            name: entry.name().to_owned(),
            source,
        })?;

        match parse_entry(&buf) {
            Some(value) => {
                log::debug!("entry {:?} is json", entry.name());
                return Ok(Some(value));
            }
            None => {
                log::debug!("skipping {:?}: not json", entry.name());
                continue;
            }
        }
    }
    Ok(None)
}

/// Pretty prints with two space indentation and non-ascii kept as is.
pub fn render(value: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// The per-run temporary directory.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn create(config: &Config) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        let dir = match &config.temp_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|e| Error::io("failed to create temporary directory", e))?;
        log::debug!("workspace at {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn archive_path(&self) -> PathBuf {
        self.path().join(ARCHIVE_NAME)
    }

    pub fn json_path(&self) -> PathBuf {
        self.path().join(JSON_NAME)
    }

    pub fn write_archive(&self, data: &[u8]) -> Result<PathBuf> {
        let path = self.archive_path();
        fs::write(&path, data).map_err(|e| {
            Error::io(format!("failed to write {}", path.display()), e)
        })?;
        Ok(path)
    }

    pub fn write_json(&self, text: &str) -> Result<PathBuf> {
        let path = self.json_path();
        fs::write(&path, text).map_err(|e| {
            Error::io(format!("failed to write {}", path.display()), e)
        })?;
        Ok(path)
    }

    /// Leaves the directory on disk for whoever reads it next.
    pub fn keep(self) -> PathBuf {
        self.dir.keep()
    }

    pub fn remove(self) -> Result<()> {
        let path = self.path().to_owned();
        self.dir.close().map_err(|e| {
            Error::io(format!("failed to remove {}", path.display()), e)
        })
    }
}

/// Decodes `input`, extracts the first json entry of the zip archive it
/// holds, and hands a pretty printed copy to `launcher`.
///
/// The workspace is removed when the archive holds no json or the run
/// fails after creating it. It is kept once the json file is written, even
/// if the launch fails.
pub fn run(
    input: &str,
    config: &Config,
    launcher: &dyn Launcher,
) -> Result<Outcome> {
    let zip_data = decode(input)?;
    log::debug!("decoded {} bytes", zip_data.len());

    let workspace = Workspace::create(config)?;
    let archive_path = workspace.write_archive(&zip_data)?;

    let file = File::open(&archive_path).map_err(|e| {
        Error::io(format!("failed to open {}", archive_path.display()), e)
    })?;
    let mut archive = ZipArchive::new(file)?;
    log::debug!("archive has {} entries", archive.len());

    let value = find_first_json(&mut archive)?;
    drop(archive);

    let Some(value) = value else {
        workspace.remove()?;
        return Ok(Outcome::NoJson);
    };

    workspace.write_json(&render(&value)?)?;
    let path = workspace.keep().join(JSON_NAME);

    match launcher.open(&path) {
        Ok(()) => Ok(Outcome::Opened { path }),
        Err(error) => {
            log::warn!("viewer launch failed: {}", chain(&error));
            Ok(Outcome::Saved { path, error })
        }
    }
}
