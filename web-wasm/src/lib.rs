//! Spare Parts Gallery (WASM)
//!
//! ホストページから `SparePartsGallery` を生成して使う。
//! 下書きはオリジンの localStorage に保存される。

mod api;
mod gallery;
pub mod local_store;

pub use gallery::SparePartsGallery;
pub use local_store::LocalStore;

use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
}
