pub mod error;
pub mod io;
pub mod model;
pub mod sync;

pub use error::{ErrorCategory, ExcelError, Result};
