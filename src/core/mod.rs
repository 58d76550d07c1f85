pub mod clock;
pub mod notify;
pub mod points;
pub mod session;
pub mod storage;
