pub mod jwt;
pub mod qr;

pub use jwt::JwtService;
pub use qr::generate_qr_token;
