pub mod error;
pub mod model;
pub mod progress;

pub use error::AppError;
pub use model::DownloadPlan;
