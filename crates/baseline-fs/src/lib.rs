//! Filesystem primitives shared by the baseline crates.
//!
//! Nothing here ever overwrites a target in place: writers produce a temp
//! file, and [`io::replace`] renames it over the original.

pub mod checksum;
pub mod error;
pub mod io;
pub mod path;

pub use checksum::{compute_file_checksum, files_identical};
pub use error::{Error, Result};
pub use io::{copy_file, read_text, read_text_if_exists, replace, temp_path_for, write_text};
pub use path::is_sane_path;
