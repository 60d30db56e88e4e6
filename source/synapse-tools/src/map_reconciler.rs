//! Owns the identity map file and the proxy admin-socket protocol
//! (spec.md §4.6). The delta itself is computed by
//! `synapse_config::map_diff`; this module supplies the I/O that pure
//! function needs: reading/writing the on-disk map and dispatching each
//! resulting op over a short-lived unix socket connection.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use synapse_config::map_diff::{IdentityMapDiff, MapOp};
use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;
use tokio::time::timeout;

use crate::error::AppError;

/// Parses the map file's on-disk format: space-separated `ip identity`
/// records, one per line. Blank tokens from extra whitespace are ignored
/// (spec.md §4.6).
pub fn parse_map_file(contents: &str) -> HashMap<String, String> {
    contents
        .lines()
        .filter_map(|line| {
            let mut tokens = line.split_whitespace();
            let ip = tokens.next()?;
            let identity = tokens.next()?;
            Some((ip.to_string(), identity.to_string()))
        })
        .collect()
}

/// Reads the previous map file; a missing file is an empty map, not an
/// error (there may not have been a prior run).
pub fn read_map_file(path: &Path) -> Result<HashMap<String, String>, AppError> {
    if !path.is_file() {
        return Ok(HashMap::new());
    }
    let raw = std::fs::read_to_string(path).map_err(|source| AppError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    Ok(parse_map_file(&raw))
}

/// Renders the current inventory to the file format: `ip identity` lines
/// joined by `\n`, no trailing newline, in the caller's iteration order.
pub fn render_map_file(entries: &[(String, String)]) -> String {
    entries.iter().map(|(ip, identity)| format!("{ip} {identity}")).collect::<Vec<_>>().join("\n")
}

/// Replaces the map file's contents via a sibling temp file + rename.
pub fn write_map_file_atomic(path: &Path, entries: &[(String, String)]) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| AppError::ReadFile {
            path: parent.display().to_string(),
            source,
        })?;
    }
    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, render_map_file(entries)).map_err(|source| AppError::ReadFile {
        path: tmp_path.display().to_string(),
        source,
    })?;
    std::fs::rename(&tmp_path, path).map_err(|source| AppError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    Ok(())
}

/// A single short-lived connection to the proxy's admin socket: write
/// `<command>\n`, close. No read phase, no retry — a failure here is
/// surfaced, not swallowed (spec.md §5, §7).
pub struct AdminSocketClient {
    socket_path: PathBuf,
    write_timeout: Duration,
}

impl AdminSocketClient {
    pub fn new(socket_path: impl Into<PathBuf>, write_timeout: Duration) -> Self {
        AdminSocketClient {
            socket_path: socket_path.into(),
            write_timeout,
        }
    }

    pub async fn send(&self, command: &str) -> Result<(), AppError> {
        let attempt = async {
            let mut stream = UnixStream::connect(&self.socket_path).await?;
            stream.write_all(format!("{command}\n").as_bytes()).await?;
            stream.shutdown().await
        };
        match timeout(self.write_timeout, attempt).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(AppError::AdminSocket {
                command: command.to_string(),
                source,
            }),
            Err(_) => Err(AppError::AdminSocket {
                command: command.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::TimedOut, "admin socket write timed out"),
            }),
        }
    }
}

fn command_for(op: &MapOp, map_file: &str) -> String {
    match op {
        MapOp::Add { ip, identity } => format!("add map {map_file} {ip} {identity}"),
        MapOp::Set { ip, identity } => format!("set map {map_file} {ip} {identity}"),
        MapOp::Del { ip } => format!("del map {map_file} {ip}"),
    }
}

/// Reconciles the proxy's in-memory identity table with `current`: computes
/// the minimal add/set/del delta against the on-disk previous map, dispatches
/// every socket op (only when `update_haproxy` is set), then — only once all
/// have been dispatched — rewrites the file. This ordering is the one thing
/// spec.md §5 requires: an interrupted run leaves the proxy's table strictly
/// ahead of the file, so a re-run's delta against the stale file stays
/// idempotent (it just re-issues whatever didn't make it to disk).
pub async fn reconcile(
    socket: &AdminSocketClient,
    map_file: &Path,
    current: &[(String, String)],
    update_haproxy: bool,
) -> Result<(), AppError> {
    if update_haproxy {
        let previous = read_map_file(map_file)?;
        let current_map: HashMap<String, String> = current.iter().cloned().collect();
        let ops = IdentityMapDiff::compute(&previous, &current_map);
        let map_file_str = map_file.display().to_string();
        for op in &ops {
            socket.send(&command_for(op, &map_file_str)).await?;
        }
    }
    write_map_file_atomic(map_file, current)
}
