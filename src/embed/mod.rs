//! Embedded static resources.
//!
//! - `template` - Template types for typed variable injection
//! - `RELOAD_JS` - live-reload client served by the dev server
//!
//! # Usage
//!
//! ```ignore
//! use embed::{RELOAD_JS, ReloadVars};
//!
//! let js = RELOAD_JS.render(&ReloadVars { ws_port: 35729 });
//! ```

mod template;

pub use template::{Template, TemplateVars};

/// URL the dev server answers with the reload client.
pub const RELOAD_JS_URL: &str = "/__pipewright/reload.js";

/// Variables for the reload client.
pub struct ReloadVars {
    pub ws_port: u16,
}

impl TemplateVars for ReloadVars {
    fn apply(&self, content: &str) -> String {
        content.replace("__PIPEWRIGHT_WS_PORT__", &self.ws_port.to_string())
    }
}

/// Live-reload client (minified by build.rs).
pub const RELOAD_JS: Template<ReloadVars> =
    Template::new(include_str!(concat!(env!("OUT_DIR"), "/reload.min.js")));

/// `<script>` tag injected into served HTML pages.
pub fn reload_script_tag() -> String {
    format!(r#"<script src="{RELOAD_JS_URL}" defer></script>"#)
}
