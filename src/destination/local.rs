//! Rehydration onto the host filesystem through `std::fs`.

use super::apple_double::AppleDouble;
use super::Destination;
use crate::error::DestinationError;
use crate::types::FourCharCode;
use chrono::{DateTime, Utc};
use std::fs::{self, File, FileTimes};
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Writes data forks as plain files. Resource forks and Finder info go to an AppleDouble
/// sidecar beside each file.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    pub fn new() -> Self {
        Self
    }

    fn update_sidecar(
        &self,
        path: &Path,
        update: impl FnOnce(&mut AppleDouble),
    ) -> Result<(), DestinationError> {
        let sidecar = AppleDouble::sidecar_path(path);
        let mut double = match fs::read(&sidecar) {
            Ok(bytes) => AppleDouble::parse(&bytes)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => AppleDouble::default(),
            Err(err) => return Err(err.into()),
        };
        update(&mut double);
        fs::write(&sidecar, double.to_bytes())?;
        Ok(())
    }

    fn set_times(&self, path: &Path, times: FileTimes) -> Result<(), DestinationError> {
        open_for_times(path)?.set_times(times)?;
        Ok(())
    }
}

#[cfg(windows)]
fn open_for_times(path: &Path) -> io::Result<File> {
    use std::os::windows::fs::OpenOptionsExt;
    // FILE_FLAG_BACKUP_SEMANTICS, required to open directories.
    fs::OpenOptions::new()
        .write(true)
        .custom_flags(0x0200_0000)
        .open(path)
}

#[cfg(not(windows))]
fn open_for_times(path: &Path) -> io::Result<File> {
    File::open(path)
}

impl Destination for LocalFilesystem {
    fn create_directory(&self, path: &Path) -> Result<(), DestinationError> {
        fs::create_dir_all(path)?;
        Ok(())
    }

    fn write_data_fork(&self, path: &Path, data: &[u8]) -> Result<(), DestinationError> {
        fs::write(path, data)?;
        Ok(())
    }

    fn write_resource_fork(&self, path: &Path, data: &[u8]) -> Result<(), DestinationError> {
        if data.is_empty() {
            return Ok(());
        }
        self.update_sidecar(path, |double| double.resource_fork = data.to_vec())
    }

    #[cfg(any(target_os = "macos", windows))]
    fn set_creation_date(&self, path: &Path, date: DateTime<Utc>) -> Result<(), DestinationError> {
        #[cfg(target_os = "macos")]
        use std::os::macos::fs::FileTimesExt;
        #[cfg(windows)]
        use std::os::windows::fs::FileTimesExt;

        self.set_times(path, FileTimes::new().set_created(SystemTime::from(date)))
    }

    #[cfg(not(any(target_os = "macos", windows)))]
    fn set_creation_date(&self, _path: &Path, _date: DateTime<Utc>) -> Result<(), DestinationError> {
        Err(DestinationError::Unsupported("creation date"))
    }

    fn set_modification_date(
        &self,
        path: &Path,
        date: DateTime<Utc>,
    ) -> Result<(), DestinationError> {
        self.set_times(path, FileTimes::new().set_modified(SystemTime::from(date)))
    }

    fn set_type_code(&self, path: &Path, code: FourCharCode) -> Result<(), DestinationError> {
        self.update_sidecar(path, |double| double.set_file_type(code))
    }

    fn set_creator_code(&self, path: &Path, code: FourCharCode) -> Result<(), DestinationError> {
        self.update_sidecar(path, |double| double.set_creator(code))
    }

    fn companion_names(&self, name: &str) -> Vec<String> {
        vec![AppleDouble::sidecar_name(name)]
    }
}
