pub mod content;
pub mod geometry;
pub mod motion;
pub mod page;
pub mod scene;
pub mod telemetry;
pub mod theme;
pub mod viewport;

#[cfg(target_arch = "wasm32")]
mod browser;
#[cfg(target_arch = "wasm32")]
mod canvas;
#[cfg(target_arch = "wasm32")]
mod frontend;

#[cfg(not(target_arch = "wasm32"))]
pub mod server;

#[cfg(target_arch = "wasm32")]
pub use frontend::run;
