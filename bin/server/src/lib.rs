//! Lost & Found administrative dashboard.
//!
//! Leptos application rendered on the server and hydrated in the browser.
//! The server side guards dashboard routes per request; the browser keeps a
//! cached copy of the resolved session for rendering decisions.

#![allow(non_snake_case)]

pub mod app;
#[cfg(feature = "ssr")]
pub mod auth;
#[cfg(feature = "ssr")]
pub mod config;
pub mod error;
pub mod pages;
pub mod permissions;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    use crate::app::App;
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(App);
}
