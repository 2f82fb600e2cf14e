//! Script source loading.
//!
//! Only regular files are accepted. The path is checked before any read is
//! attempted, so directories and special files never get opened.

use crate::error::{RuntimeError, RuntimeResult};
use std::io::{ErrorKind, Read};
use std::path::Path;
use tracing::debug;

/// Read a script file into a string.
pub fn load_script_file(path: &Path) -> RuntimeResult<String> {
    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(RuntimeError::NotRegularFile {
                path: path.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(RuntimeError::IoRead {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if metadata.is_dir() || !metadata.is_file() {
        return Err(RuntimeError::NotRegularFile {
            path: path.to_path_buf(),
        });
    }

    let io_err = |source| RuntimeError::IoRead {
        path: path.to_path_buf(),
        source,
    };

    let mut file = std::fs::File::open(path).map_err(io_err)?;
    let mut content = String::with_capacity(metadata.len() as usize);
    file.read_to_string(&mut content).map_err(io_err)?;

    debug!("Loaded script {:?} ({} bytes)", path, content.len());
    Ok(content)
}
