pub mod audit;
pub mod auth;
pub mod common;
pub mod customer;
pub mod pagination;
pub mod point_transaction;
pub mod program;
pub mod redemption;
pub mod settings;
pub mod stats;
pub mod upload;

pub use audit::*;
pub use auth::*;
pub use common::*;
pub use customer::*;
pub use pagination::*;
pub use point_transaction::*;
pub use program::*;
pub use redemption::*;
pub use settings::*;
pub use stats::*;
pub use upload::*;
