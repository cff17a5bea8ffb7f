//! Diagnostics sink.
//!
//! Messages go to the browser console when running as WebAssembly. Native
//! builds (unit tests) write to stderr instead, since the console bindings
//! can only be called from inside a JavaScript host.

#[cfg(target_arch = "wasm32")]
pub fn error(message: &str) {
    web_sys::console::error_1(&message.into());
}

#[cfg(not(target_arch = "wasm32"))]
pub fn error(message: &str) {
    eprintln!("error: {message}");
}

#[cfg(target_arch = "wasm32")]
pub fn warn(message: &str) {
    web_sys::console::warn_1(&message.into());
}

#[cfg(not(target_arch = "wasm32"))]
pub fn warn(message: &str) {
    eprintln!("warning: {message}");
}
