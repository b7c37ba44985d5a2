//! Filesystem-backed object store: one directory per bucket, one file per
//! object.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use stowage_errors::ObjectError;

/// Size and name of a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    pub bucket: String,
    pub name: String,
    pub size: u64,
}

pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Open the data directory. It must already exist.
    pub fn open(root: &Path) -> Result<Self, ObjectError> {
        if !root.is_dir() {
            return Err(ObjectError::DiskNotFound {
                path: root.display().to_string(),
            });
        }
        tracing::debug!(root = %root.display(), "opened object store");
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn make_bucket(&self, bucket: &str) -> Result<(), ObjectError> {
        let path = self.bucket_path(bucket)?;
        fs::create_dir(&path).map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => ObjectError::BucketExists {
                bucket: bucket.to_string(),
            },
            _ => ObjectError::Io(e),
        })
    }

    pub fn remove_bucket(&self, bucket: &str) -> Result<(), ObjectError> {
        let path = self.existing_bucket(bucket)?;
        if fs::read_dir(&path)?.next().is_some() {
            return Err(ObjectError::BucketNotEmpty {
                bucket: bucket.to_string(),
            });
        }
        fs::remove_dir(&path)?;
        Ok(())
    }

    pub fn stat_bucket(&self, bucket: &str) -> Result<(), ObjectError> {
        self.existing_bucket(bucket).map(|_| ())
    }

    pub fn stat_object(&self, bucket: &str, object: &str) -> Result<ObjectInfo, ObjectError> {
        let path = self.existing_bucket(bucket)?.join(object_path(bucket, object)?);
        let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ObjectError::ObjectNotFound {
                bucket: bucket.to_string(),
                object: object.to_string(),
            },
            _ => ObjectError::Io(e),
        })?;

        if metadata.is_dir() {
            return Err(ObjectError::ObjectExistsAsDirectory {
                bucket: bucket.to_string(),
                object: object.to_string(),
            });
        }
        Ok(ObjectInfo {
            bucket: bucket.to_string(),
            name: object.to_string(),
            size: metadata.len(),
        })
    }

    /// All objects in a bucket, sorted by name.
    pub fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectInfo>, ObjectError> {
        let bucket_dir = self.existing_bucket(bucket)?;
        let mut objects = Vec::new();
        let mut pending = vec![bucket_dir.clone()];

        while let Some(dir) = pending.pop() {
            for entry in fs::read_dir(&dir)? {
                let entry = entry?;
                let metadata = entry.metadata()?;
                if metadata.is_dir() {
                    pending.push(entry.path());
                    continue;
                }
                let path = entry.path();
                let name = path
                    .strip_prefix(&bucket_dir)
                    .unwrap_or(&path)
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                objects.push(ObjectInfo {
                    bucket: bucket.to_string(),
                    name,
                    size: metadata.len(),
                });
            }
        }

        objects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(objects)
    }

    fn bucket_path(&self, bucket: &str) -> Result<PathBuf, ObjectError> {
        if !is_valid_bucket_name(bucket) {
            return Err(ObjectError::BucketNameInvalid {
                bucket: bucket.to_string(),
            });
        }
        Ok(self.root.join(bucket))
    }

    fn existing_bucket(&self, bucket: &str) -> Result<PathBuf, ObjectError> {
        let path = self.bucket_path(bucket)?;
        if !path.is_dir() {
            return Err(ObjectError::BucketNotFound {
                bucket: bucket.to_string(),
            });
        }
        Ok(path)
    }
}

/// Lowercase letters, digits, `-` and `.`, 3 to 63 characters, starting and
/// ending with a letter or digit.
pub fn is_valid_bucket_name(bucket: &str) -> bool {
    let bytes = bucket.as_bytes();
    if !(3..=63).contains(&bytes.len()) {
        return false;
    }
    let edge_ok = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    edge_ok(bytes[0])
        && edge_ok(bytes[bytes.len() - 1])
        && bytes
            .iter()
            .all(|&b| edge_ok(b) || b == b'-' || b == b'.')
        && !bucket.contains("..")
}

fn object_path(bucket: &str, object: &str) -> Result<PathBuf, ObjectError> {
    let path = Path::new(object);
    let valid = !object.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if !valid {
        return Err(ObjectError::ObjectNameInvalid {
            bucket: bucket.to_string(),
            object: object.to_string(),
        });
    }
    Ok(path.to_path_buf())
}
