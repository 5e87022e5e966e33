//! Data model shared by the API clients and the dashboard state.

pub mod dtos;
pub mod structs;
