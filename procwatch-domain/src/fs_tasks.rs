//! Core filesystem helpers, run on tokio's blocking pool.

use std::path::PathBuf;
use std::time::SystemTime;

use procwatch_core::error::CoreError;
use procwatch_core::utils::fs as core_fs;

async fn run<T, F>(op: F) -> Result<T, CoreError>
where
    F: FnOnce() -> Result<T, CoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| CoreError::Internal(format!("Blocking file task failed: {}", e)))?
}

pub(crate) async fn read_bytes(path: PathBuf) -> Result<Vec<u8>, CoreError> {
    run(move || core_fs::read_bytes(&path)).await
}

pub(crate) async fn modified_time(path: PathBuf) -> Result<Option<SystemTime>, CoreError> {
    run(move || core_fs::modified_time(&path)).await
}

pub(crate) async fn write_bytes_atomically(path: PathBuf, content: Vec<u8>) -> Result<(), CoreError> {
    run(move || core_fs::write_bytes_atomically(&path, &content)).await
}
