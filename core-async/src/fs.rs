//! Async filesystem helpers re-exported from the underlying runtime.
//!
//! The surface mirrors `tokio::fs` so downstream crates keep the familiar API
//! without depending on Tokio directly.

pub use tokio::fs::{
    canonicalize, create_dir_all, metadata, read, read_dir, read_to_string, remove_file, rename,
    write, DirEntry, File, OpenOptions,
};
