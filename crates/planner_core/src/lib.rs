pub mod api;
pub mod date;
pub mod error;
pub mod ids;
pub mod model;
pub mod ops;

pub use api::*;
pub use date::*;
pub use error::{PlannerError, PlannerResult};
pub use ids::*;
pub use model::*;
pub use ops::*;
