//! General utilities for procwatch.
//!
//! - [`fs`]: directory creation, byte reads, modification times and atomic writes.
//! - [`paths`]: XDG/application directory resolution.
//! - [`string_utils`]: path normalization and display truncation.

pub mod fs;
pub mod paths;
pub mod string_utils;

pub use fs::{ensure_dir_exists, modified_time, read_bytes, write_bytes_atomically, write_string_atomically};
pub use string_utils::{base_name, normalize_path, normalize_path_trimmed, truncate_string};
