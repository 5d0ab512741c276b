#![forbid(unsafe_code)]

pub mod live;
pub mod repository;
pub mod sqlite;
