pub mod repository;
pub mod spreadsheet;
pub mod uncaught;

pub use repository::RepositoryExceptionHandler;
pub use spreadsheet::SpreadsheetExceptionHandler;
pub use uncaught::UncaughtExceptionHandler;
