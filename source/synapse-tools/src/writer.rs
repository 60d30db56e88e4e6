//! Atomic swap of the compiled configuration into place, plus the
//! conditional proxy reload (spec.md §4.5). `synapse_config::serialize`
//! produces the canonical bytes; everything here is the I/O that pure
//! function deliberately doesn't do.

use std::io::Write;
use std::path::Path;
use std::process::Command;

use synapse_config::common_types::operator_config::OperatorConfig;

use crate::error::AppError;

/// Writes `bytes` to `path` via a sibling temp file + rename, mode 0644
/// ("match permissions that puppet expects", per `original_source`).
/// Always swaps the file into place — monitoring depends on mtime
/// freshness — but returns whether the contents actually changed, so the
/// caller only reloads when they did (spec.md §4.5, Testable Property 2).
pub fn write_config_atomic(path: &Path, bytes: &[u8]) -> Result<bool, AppError> {
    let changed = match std::fs::read(path) {
        Ok(existing) => existing != bytes,
        Err(_) => true,
    };

    let tmp_path = path.with_extension("tmp");
    {
        let mut file = std::fs::File::create(&tmp_path).map_err(|source| AppError::ReadFile {
            path: tmp_path.display().to_string(),
            source,
        })?;
        file.write_all(bytes).map_err(|source| AppError::ReadFile {
            path: tmp_path.display().to_string(),
            source,
        })?;
    }
    set_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, path).map_err(|source| AppError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;

    Ok(changed)
}

#[cfg(unix)]
fn set_permissions(path: &Path) -> Result<(), AppError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o644)).map_err(|source| AppError::ReadFile {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(not(unix))]
fn set_permissions(_path: &Path) -> Result<(), AppError> {
    Ok(())
}

/// Triggers a reload of the supervised proxy: a custom
/// `synapse_restart_command` overrides, otherwise stop+start of
/// `synapse_command` so process limits (file descriptors, etc.) get
/// re-read from the init system rather than inherited across a single
/// reload signal.
pub fn reload(operator_config: &OperatorConfig) -> Result<(), AppError> {
    match &operator_config.synapse_restart_command {
        Some(cmd) => run(cmd),
        None => {
            run(&with_arg(&operator_config.synapse_command, "stop"))?;
            run(&with_arg(&operator_config.synapse_command, "start"))
        }
    }
}

fn with_arg(cmd: &[String], arg: &str) -> Vec<String> {
    let mut out = cmd.to_vec();
    out.push(arg.to_string());
    out
}

fn run(cmd: &[String]) -> Result<(), AppError> {
    let Some((program, args)) = cmd.split_first() else {
        return Ok(());
    };
    let status = Command::new(program).args(args).status().map_err(|_| AppError::ReloadFailed)?;
    if !status.success() {
        return Err(AppError::ReloadFailed);
    }
    Ok(())
}
