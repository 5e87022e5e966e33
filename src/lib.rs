pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod interface;
pub mod model;

#[cfg(feature = "no-wasm")]
pub use client::request::NoWasmClient;
#[cfg(feature = "no-wasm")]
pub use reqwest::Client;
#[cfg(feature = "no-wasm")]
pub use tokio;

#[cfg(feature = "wasm")]
pub use client::gloo::WasmClient;
