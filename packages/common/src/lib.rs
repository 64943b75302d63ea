pub mod storage;
pub mod user_status;

pub use user_status::UserStatus;
