pub mod admin;
pub mod loyalty;
pub mod program;
pub mod redemption;
pub mod super_admin;
pub mod upload;

pub use admin::admin_config;
pub use loyalty::loyalty_config;
pub use program::program_config;
pub use redemption::redemption_config;
pub use super_admin::super_admin_config;
pub use upload::upload_config;
