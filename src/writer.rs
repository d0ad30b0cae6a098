use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;

use crate::config::WriteMode;
use crate::error::{Result, RootCaError};
use crate::pki::RootCaBundle;

/// Combined certificate and private key, PEM.
pub const CA_PEM_FILE: &str = "ca.pem";
/// Certificate only, raw DER.
pub const CA_CRT_FILE: &str = "ca.crt";

const FILE_MODE: u32 = 0o644;

/// Paths of the files written by [`write_bundle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFiles {
    pub pem: PathBuf,
    pub crt: PathBuf,
}

/// Writes `ca.pem` then `ca.crt` into `dir`, overwriting existing files.
pub fn write_bundle(dir: &Path, bundle: &RootCaBundle, mode: WriteMode) -> Result<WrittenFiles> {
    let pem = dir.join(CA_PEM_FILE);
    write_file(&pem, bundle.combined_pem().as_bytes(), mode)?;

    let crt = dir.join(CA_CRT_FILE);
    write_file(&crt, &bundle.certificate_der, mode)?;

    Ok(WrittenFiles { pem, crt })
}

fn write_file(path: &Path, contents: &[u8], mode: WriteMode) -> Result<()> {
    debug!("writing {} bytes to {} ({mode:?})", contents.len(), path.display());
    let result = match mode {
        WriteMode::Direct => write_direct(path, contents),
        WriteMode::Atomic => write_atomic(path, contents),
    };
    result.map_err(|source| RootCaError::WriteError {
        path: path.to_path_buf(),
        source,
    })
}

fn write_direct(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(FILE_MODE);
    }
    let mut file: File = options.open(path)?;
    // the open mode is filtered by the umask and ignored for existing files
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(FILE_MODE))?;
    }
    file.write_all(contents)
}

fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(FILE_MODE))?;
    }
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
