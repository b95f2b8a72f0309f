use crate::error::{DeliveryError, Result};
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

const APP_DIR: &str = "bulkmsg";
const OBJECTS_DIR: &str = "objects";
const UPLOAD_PREFIX: &str = "uploads";

/// Byte storage for uploaded tables and images, keyed by opaque strings.
pub trait ObjectStore {
    /// Stores bytes under a fresh `uploads/<uuid><ext>` key; `<ext>` is empty
    /// when the original name has no extension.
    fn put(&self, data: &[u8], original_filename: Option<&str>) -> Result<String>;
    fn put_at(&self, key: &str, data: &[u8]) -> Result<()>;
    fn get(&self, key: &str) -> Result<Vec<u8>>;
}

pub fn new_upload_key(original_filename: Option<&str>) -> String {
    let extension = original_filename
        .and_then(|name| Path::new(name).extension())
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default();
    format!("{UPLOAD_PREFIX}/{}{extension}", Uuid::new_v4())
}

pub fn default_storage_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os("XDG_DATA_HOME") {
        let path = PathBuf::from(dir);
        if path.as_os_str().is_empty() {
            return Err(DeliveryError::InvalidStoragePath(path));
        }
        return Ok(path.join(APP_DIR).join(OBJECTS_DIR));
    }

    let home = dirs::home_dir().ok_or(DeliveryError::MissingHomeDir)?;
    Ok(home
        .join(".local")
        .join("share")
        .join(APP_DIR)
        .join(OBJECTS_DIR))
}

/// Keys are relative paths of plain segments; anything that could escape the
/// storage root is rejected.
fn key_path(key: &str) -> Result<PathBuf> {
    let invalid = || DeliveryError::InvalidKey(key.to_string());
    if key.is_empty() || key.split('/').any(str::is_empty) || key.contains('\\') {
        return Err(invalid());
    }
    let path = Path::new(key);
    if !path
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
    {
        return Err(invalid());
    }
    Ok(path.to_path_buf())
}

#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if root.as_os_str().is_empty() {
            return Err(DeliveryError::InvalidStoragePath(root));
        }
        if !root.exists() {
            fs::create_dir_all(&root)?;
        }
        restrict_dir_permissions(&root)?;
        Ok(Self { root })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(default_storage_dir()?)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, key: &str) -> Result<PathBuf> {
        Ok(self.root.join(key_path(key)?))
    }
}

impl ObjectStore for FsObjectStore {
    fn put(&self, data: &[u8], original_filename: Option<&str>) -> Result<String> {
        let key = new_upload_key(original_filename);
        self.put_at(&key, data)?;
        Ok(key)
    }

    fn put_at(&self, key: &str, data: &[u8]) -> Result<()> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, data)?;
        debug!(key, bytes = data.len(), "stored object");
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.object_path(key)?;
        fs::read(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => DeliveryError::NotFound(key.to_string()),
            _ => DeliveryError::Io(err),
        })
    }
}

#[cfg(unix)]
fn restrict_dir_permissions(dir: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let perms = fs::Permissions::from_mode(0o700);
    fs::set_permissions(dir, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_dir_permissions(_dir: &Path) -> Result<()> {
    Ok(())
}
