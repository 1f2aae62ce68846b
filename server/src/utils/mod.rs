pub mod error;
pub mod extract;
pub mod pagination;
pub mod response;

pub use error::{AppError, AppResult};
pub use extract::{AppJson, AppPath, AppQuery};
pub use pagination::{Page, PageParams};
