//! trajscope viewer
//!
//! Hosts a projection session around `trajscope-core`: loads model tensors,
//! holds the selection controls, and hands finished figures to a renderer.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trajscope_viewer::{Controls, JsonRenderer, Session, SessionOptions, ViewerConfig};
//! use trajscope_viewer::loader::FsLoader;
//!
//! # async fn run() -> trajscope_viewer::Result<()> {
//! let config = ViewerConfig::default();
//! let (session, _notices) = Session::new(
//!     Arc::new(FsLoader::new(&config.data_dir)),
//!     Arc::new(JsonRenderer::stdout()),
//!     config.registry()?,
//!     Controls::from_config(&config),
//!     SessionOptions::default(),
//! );
//!
//! session.select_model("llama-3.2-1B")?.await.ok();
//! session.set_selection("1,2,last-1");
//! session.update()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod loader;
pub mod render;
pub mod repl;
pub mod session;
pub mod tracing;

pub use config::{ModelDescriptor, ModelRegistry, ViewerConfig};
pub use error::{Error, Result};
pub use render::{JsonRenderer, MemoryRenderer, RenderTarget, Renderer};
pub use session::{
    Controls, LoadedModel, Notice, NoticeLevel, Session, SessionOptions, TimeOption,
};
