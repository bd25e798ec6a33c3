use wasm_bindgen::prelude::*;

// console.log / console.warn, wrapped by the crate-level logging macros
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    pub fn log(s: &str);

    #[wasm_bindgen(js_namespace = console)]
    pub fn warn(s: &str);
}

