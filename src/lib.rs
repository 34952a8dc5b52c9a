pub mod cache;
pub mod collab;
pub mod config;
pub mod error;
pub mod interaction;
pub mod layout;
pub mod reduce;
pub mod service;
pub mod util;

pub use config::{Configuration, LayoutKind, ShrinkMethod};
pub use error::{GraphError, Result};
