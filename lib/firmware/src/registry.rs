use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::{Error, FirmwareArtifact, Result, Version, UNKNOWN_VERSION};

pub const MAX_FIRMWARE_SIZE: u64 = 5 * 1024 * 1024;
pub const FIRMWARE_EXTENSION: &str = "bin";

const PART_PREFIX: &str = ".upload-";

/// Firmware stored in a single working directory. The directory is the source
/// of truth: the artifact served to devices is the most recently modified
/// `.bin` file in it.
pub struct FirmwareRegistry {
    directory: PathBuf,
    max_size: u64,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    known: HashMap<String, Known>,
    update_requested_at: Option<DateTime<Utc>>,
}

// metadata learned at upload time, valid while the file is unchanged
struct Known {
    artifact: FirmwareArtifact,
    modified: SystemTime,
}

impl FirmwareRegistry {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self::with_max_size(directory, MAX_FIRMWARE_SIZE)
    }

    pub fn with_max_size(directory: impl Into<PathBuf>, max_size: u64) -> Self {
        Self {
            directory: directory.into(),
            max_size,
            inner: Mutex::from(Inner::default()),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Starts streaming an upload named `file_name` by the client. Only the
    /// name's extension is checked here; the size ceiling is enforced as
    /// chunks arrive.
    pub async fn begin_upload(&self, file_name: &str) -> Result<Upload<'_>> {
        if !has_firmware_extension(file_name) {
            return Err(Error::InvalidFormat(format!(
                "only .{FIRMWARE_EXTENSION} files are accepted, got {file_name:?}"
            )));
        }

        fs::create_dir_all(&self.directory).await?;

        let part_path = self
            .directory
            .join(format!("{PART_PREFIX}{}.part", uuid::Uuid::new_v4()));
        let file = File::create(&part_path).await?;

        debug!("receiving {file_name} into {}", part_path.display());

        Ok(Upload {
            registry: self,
            file_name: file_name.to_string(),
            part_path,
            file: Some(file),
            digest: md5::Context::new(),
            written: 0,
            settled: false,
        })
    }

    pub async fn store(
        &self,
        file_name: &str,
        bytes: &[u8],
        declared_version: &str,
    ) -> Result<FirmwareArtifact> {
        let mut upload = self.begin_upload(file_name).await?;
        upload.write(bytes).await?;
        upload.finish(declared_version).await
    }

    /// The most recently modified artifact, or the unavailable sentinel.
    pub async fn current(&self) -> Result<FirmwareArtifact> {
        let mut inner = self.inner.lock().await;
        let artifacts = self.scan(&mut inner).await?;

        Ok(artifacts
            .into_iter()
            .next()
            .unwrap_or_else(FirmwareArtifact::unavailable))
    }

    /// Every stored artifact, newest first.
    pub async fn list(&self) -> Result<Vec<FirmwareArtifact>> {
        let mut inner = self.inner.lock().await;
        self.scan(&mut inner).await
    }

    pub async fn fetch_bytes(&self) -> Result<(FirmwareArtifact, Vec<u8>)> {
        let mut inner = self.inner.lock().await;
        let artifact = self
            .scan(&mut inner)
            .await?
            .into_iter()
            .next()
            .ok_or(Error::NotFound)?;

        let file_name = artifact.filename.as_deref().ok_or(Error::NotFound)?;
        let bytes = match fs::read(self.directory.join(file_name)).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Err(Error::NotFound),
            Err(err) => return Err(err.into()),
        };

        if inner.update_requested_at.take().is_some() {
            info!("pending update request served with {file_name}");
        }

        Ok((artifact, bytes))
    }

    /// Removes every stored artifact. Uploads still in flight are left alone.
    pub async fn delete(&self) -> Result<usize> {
        let mut inner = self.inner.lock().await;
        let mut removed = 0;

        for artifact in self.scan(&mut inner).await? {
            let Some(file_name) = artifact.filename else {
                continue;
            };

            match fs::remove_file(self.directory.join(&file_name)).await {
                Ok(()) => removed += 1,
                Err(err) if err.kind() == ErrorKind::NotFound => (),
                Err(err) => return Err(err.into()),
            }
        }

        inner.known.clear();
        inner.update_requested_at = None;

        info!("removed {removed} firmware file(s)");

        Ok(removed)
    }

    /// Records that the dashboard asked the device to update.
    pub async fn request_update(&self) -> Result<FirmwareArtifact> {
        let mut inner = self.inner.lock().await;
        let artifact = self
            .scan(&mut inner)
            .await?
            .into_iter()
            .next()
            .ok_or(Error::NotFound)?;

        inner.update_requested_at = Some(Utc::now());

        Ok(artifact)
    }

    pub async fn update_requested_at(&self) -> Option<DateTime<Utc>> {
        self.inner.lock().await.update_requested_at
    }

    async fn scan(&self, inner: &mut Inner) -> Result<Vec<FirmwareArtifact>> {
        let mut entries = match fs::read_dir(&self.directory).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                inner.known.clear();
                return Ok(vec![]);
            }
            Err(err) => return Err(err.into()),
        };

        let mut found = vec![];

        while let Some(entry) = entries.next_entry().await? {
            let Ok(file_name) = entry.file_name().into_string() else {
                continue;
            };

            if file_name.starts_with('.') || !has_firmware_extension(&file_name) {
                continue;
            }

            let metadata = match entry.metadata().await {
                Ok(metadata) if metadata.is_file() => metadata,
                Ok(_) => continue,
                Err(err) if err.kind() == ErrorKind::NotFound => continue,
                Err(err) => return Err(err.into()),
            };
            let modified = metadata.modified()?;

            let cached = inner
                .known
                .get(&file_name)
                .filter(|known| {
                    known.modified == modified && known.artifact.size_bytes == metadata.len()
                })
                .map(|known| known.artifact.clone());

            let artifact = match cached {
                Some(artifact) => artifact,
                None => {
                    let artifact = describe(&entry.path(), &file_name, &metadata).await?;
                    inner.known.insert(
                        file_name.clone(),
                        Known {
                            artifact: artifact.clone(),
                            modified,
                        },
                    );
                    artifact
                }
            };

            found.push((modified, artifact));
        }

        inner.known.retain(|file_name, _| {
            found
                .iter()
                .any(|(_, artifact)| artifact.filename.as_deref() == Some(file_name.as_str()))
        });

        found.sort_by(|(a_modified, a), (b_modified, b)| {
            b_modified
                .cmp(a_modified)
                .then_with(|| b.filename.cmp(&a.filename))
        });

        Ok(found.into_iter().map(|(_, artifact)| artifact).collect())
    }
}

/// An upload in progress. Dropping it without calling [`Upload::finish`]
/// discards everything written so far.
pub struct Upload<'a> {
    registry: &'a FirmwareRegistry,
    file_name: String,
    part_path: PathBuf,
    file: Option<File>,
    digest: md5::Context,
    written: u64,
    settled: bool,
}

impl Upload<'_> {
    pub async fn write(&mut self, chunk: &[u8]) -> Result<()> {
        let written = self.written + chunk.len() as u64;
        let limit = self.registry.max_size;

        if written > limit {
            warn!("rejecting {}: more than {limit} bytes", self.file_name);
            self.discard().await;
            return Err(Error::TooLarge { limit });
        }

        let Some(file) = self.file.as_mut() else {
            return Err(Error::InvalidFormat("upload already discarded".to_string()));
        };

        if let Err(err) = file.write_all(chunk).await {
            self.discard().await;
            return Err(err.into());
        }

        self.digest.consume(chunk);
        self.written = written;

        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    /// Moves the received bytes into place as `firmware-<version>.bin`. An
    /// empty `declared_version` falls back to the version found in the client
    /// file name.
    pub async fn finish(mut self, declared_version: &str) -> Result<FirmwareArtifact> {
        let Some(mut file) = self.file.take() else {
            return Err(Error::InvalidFormat("upload already discarded".to_string()));
        };

        if self.written == 0 {
            drop(file);
            self.discard().await;
            return Err(Error::InvalidFormat("empty firmware file".to_string()));
        }

        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        let version = match declared_version.trim() {
            "" => Version::extract(&self.file_name)
                .unwrap_or(UNKNOWN_VERSION)
                .to_string(),
            declared => declared.to_string(),
        };

        let digest = std::mem::replace(&mut self.digest, md5::Context::new());
        let checksum = format!("{:x}", digest.compute());

        let stored_name = stored_file_name(&version);
        let path = self.registry.directory.join(&stored_name);

        let mut inner = self.registry.inner.lock().await;

        fs::rename(&self.part_path, &path).await?;
        self.settled = true;

        let modified = fs::metadata(&path).await?.modified()?;

        let artifact = FirmwareArtifact {
            version,
            size_bytes: self.written,
            checksum,
            uploaded_at: Some(Utc::now()),
            available: true,
            filename: Some(stored_name.clone()),
        };

        inner.known.insert(
            stored_name,
            Known {
                artifact: artifact.clone(),
                modified,
            },
        );

        info!(
            "stored firmware {} ({} bytes, md5 {})",
            artifact.version, artifact.size_bytes, artifact.checksum
        );

        Ok(artifact)
    }

    async fn discard(&mut self) {
        self.file = None;

        if let Err(err) = fs::remove_file(&self.part_path).await {
            if err.kind() != ErrorKind::NotFound {
                warn!("unable to remove {}: {err}", self.part_path.display());
            }
        }

        self.settled = true;
    }
}

impl Drop for Upload<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.file = None;

            // drop can't await; the part file must be gone before the handler returns,
            // so unlink it synchronously (a single syscall)
            if let Err(err) = std::fs::remove_file(&self.part_path) {
                if err.kind() != ErrorKind::NotFound {
                    warn!("unable to remove {}: {err}", self.part_path.display());
                }
            }
        }
    }
}

fn has_firmware_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|extension| extension.eq_ignore_ascii_case(FIRMWARE_EXTENSION))
}

fn stored_file_name(version: &str) -> String {
    let version: String = version
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '_' | '-' => c,
            _ => '_',
        })
        .collect();

    format!("firmware-{version}.{FIRMWARE_EXTENSION}")
}

// for files that were not uploaded through this process
async fn describe(path: &Path, file_name: &str, metadata: &Metadata) -> Result<FirmwareArtifact> {
    let bytes = fs::read(path).await?;

    Ok(FirmwareArtifact {
        version: Version::extract(file_name)
            .unwrap_or(UNKNOWN_VERSION)
            .to_string(),
        size_bytes: bytes.len() as u64,
        checksum: format!("{:x}", md5::compute(&bytes)),
        uploaded_at: metadata.modified().ok().map(DateTime::<Utc>::from),
        available: true,
        filename: Some(file_name.to_string()),
    })
}
