#![doc = include_str!("../README.md")]

pub mod cli;
pub mod error;
pub mod tools;

pub use error::{MendError, Result};
pub use tools::clean::{clean_text, clean_text_ascii, normalize, normalize_value, CleanOptions};
pub use tools::plot::{render_confusion_matrix, write_confusion_matrix, PlotOptions};
pub use tools::repair::{repair_text, RepairConfig};
