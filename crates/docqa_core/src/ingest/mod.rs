pub mod loader;
mod pdf;

pub use loader::{detect_file_kind, load_files, write_combined_text, FileKind};
