pub mod mail;
pub mod storage;
pub mod trips;
