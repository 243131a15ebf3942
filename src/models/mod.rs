//! Data models for the Liblend server

pub mod book;
pub mod borrowing;
pub mod user;
