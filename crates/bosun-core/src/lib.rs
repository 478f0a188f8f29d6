//! # Bosun Core
//!
//! Core types shared by the bosun crates:
//!
//! - [`ImageReference`] - container image reference split into registry and repository
//! - [`AddonConfig`] - an add-on's `config.yaml`, rewritten one field at a time
//! - [`docs`] - idempotent writers for mirrored README and changelog files
//! - [`Credentials`] - registry and GitHub credentials read from the environment
//!
//! ## Example
//!
//! ```rust
//! use bosun_core::{AddonConfig, ImageReference};
//!
//! let mut config = AddonConfig::parse("app/config.yaml", "image: ghcr.io/foo/app\nversion: \"1.0.0\"\n")
//!     .unwrap()
//!     .unwrap();
//!
//! let image = ImageReference::parse(&config.image().unwrap());
//! assert_eq!(image.repository, "foo/app");
//!
//! config.set_version("1.1.0").unwrap();
//! assert_eq!(config.text(), "image: ghcr.io/foo/app\nversion: \"1.1.0\"\n");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod credentials;
pub mod docs;
pub mod error;
pub mod image;


pub use config::{AddonConfig, CONFIG_FILE_NAME};
pub use credentials::Credentials;
pub use error::{Error, Result};
pub use image::{ImageReference, DEFAULT_REGISTRY};
