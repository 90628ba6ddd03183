mod error;
pub mod offline;

pub use error::RuntimeError;
pub use offline::{render, RenderSettings, StereoRender};
#[cfg(feature = "native")]
pub use offline::render_wav;

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
pub mod native;
#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
pub use native::{NativeSynth, PlayOptions};

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod wasm;
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub use wasm::WasmLife;
