use std::path::Path;

use tracing::{debug, info};

use crate::{cli::WORKDIR_ENV, error::ReportError};

/// Changes the process working directory to `target`, if one is configured.
///
/// Returns whether the directory was changed. With no target the current
/// directory is kept and an informational message is logged.
pub fn enter_working_directory(target: Option<&Path>) -> Result<bool, ReportError> {
    let Some(path) = target else {
        info!("{WORKDIR_ENV} environment variable is not set.");
        return Ok(false);
    };

    std::env::set_current_dir(path).map_err(|source| ReportError::ChangeDirectory {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "changed working directory");

    Ok(true)
}
