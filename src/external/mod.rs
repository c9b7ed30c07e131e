pub mod storage;

pub use storage::StorageService;
