//! `[fonts]` and `[icons]` section configuration.
//!
//! Both are plain recursive copies, so they share one shape and differ
//! only in their default locations.
//!
//! ```toml
//! [fonts]
//! src = "assets/fonts"
//! dest = "assets/fonts"    # same as src: nothing to copy in dev
//! build = "assets/fonts"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::check_relative;
use crate::config::{ConfigDiagnostics, FieldPath};

macro_rules! copy_section {
    ($(#[$meta:meta])* $name:ident, $section:literal, $dir:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct $name {
            pub src: PathBuf,
            pub dest: PathBuf,
            pub build: PathBuf,
        }

        impl $name {
            pub const SRC: FieldPath = FieldPath::new(concat!($section, ".src"));
            pub const DEST: FieldPath = FieldPath::new(concat!($section, ".dest"));
            pub const BUILD: FieldPath = FieldPath::new(concat!($section, ".build"));

            pub fn validate_paths(&self, diag: &mut ConfigDiagnostics) {
                check_relative(&self.src, Self::SRC, diag);
                check_relative(&self.dest, Self::DEST, diag);
                check_relative(&self.build, Self::BUILD, diag);
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    src: $dir.into(),
                    dest: $dir.into(),
                    build: $dir.into(),
                }
            }
        }
    };
}

copy_section!(
    /// Web font copy settings.
    FontsConfig,
    "fonts",
    "assets/fonts"
);

copy_section!(
    /// Icon copy settings.
    IconsConfig,
    "icons",
    "assets/icons"
);
