//! Figure sinks

use std::io::Write;
use std::path::PathBuf;

use parking_lot::Mutex;
use trajscope_core::Figure;

use crate::error::{Error, Result};

/// Consumer of prepared figures.
pub trait Renderer: Send + Sync {
    fn render(&self, figure: &Figure) -> Result<()>;
}

/// Where [`JsonRenderer`] writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderTarget {
    Stdout,
    /// Overwritten on every render
    File(PathBuf),
}

/// Writes each figure as a pretty-printed plotly JSON document.
#[derive(Debug, Clone)]
pub struct JsonRenderer {
    target: RenderTarget,
}

impl JsonRenderer {
    pub fn new(target: RenderTarget) -> Self {
        Self { target }
    }

    pub fn stdout() -> Self {
        Self::new(RenderTarget::Stdout)
    }
}

impl Renderer for JsonRenderer {
    fn render(&self, figure: &Figure) -> Result<()> {
        let json = figure.to_json()?;
        match &self.target {
            RenderTarget::Stdout => {
                let mut out = std::io::stdout().lock();
                writeln!(out, "{}", json)?;
                out.flush()?;
            }
            RenderTarget::File(path) => {
                std::fs::write(path, json).map_err(|e| {
                    Error::Render(format!("cannot write {}: {}", path.display(), e))
                })?;
            }
        }
        Ok(())
    }
}

/// Keeps rendered figures in memory.
#[derive(Debug, Default)]
pub struct MemoryRenderer {
    figures: Mutex<Vec<Figure>>,
}

impl MemoryRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<Figure> {
        self.figures.lock().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.figures.lock().len()
    }
}

impl Renderer for MemoryRenderer {
    fn render(&self, figure: &Figure) -> Result<()> {
        self.figures.lock().push(figure.clone());
        Ok(())
    }
}
