//! Viewer session: loaded model state, selection controls and the update flow
//!
//! The session owns the only copy of the loaded tensors. A model load runs as a
//! spawned task; selecting another model aborts the previous task and bumps a
//! generation counter, so a load that finishes late is discarded instead of
//! overwriting newer data. Tensors are installed as a pair or not at all.
//!
//! Every failed operation is logged with context and produces exactly one
//! [`Notice`] on the session's notice channel.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error, info, warn};
use trajscope_core::{BasisSelector, Figure, ModelData, ProjectionRequest, Projector};

use crate::config::{ModelDescriptor, ModelRegistry, ViewerConfig};
use crate::error::{Error, Result};
use crate::loader::DataLoader;
use crate::render::Renderer;

/// Bases plotted right after a model loads: the first three, fewer if the
/// model has fewer.
const DEFAULT_PLOT_BASES: usize = 3;

/// Severity of a user-visible notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// User-visible notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.level {
            NoticeLevel::Info => write!(f, "{}", self.message),
            NoticeLevel::Error => write!(f, "error: {}", self.message),
        }
    }
}

/// Current state of the selection controls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    pub time_index: usize,
    /// Free-text basis selection, e.g. `"1,2,last-1"`
    pub selection: String,
    pub exclude_last_step: bool,
}

impl Controls {
    pub fn from_config(config: &ViewerConfig) -> Self {
        Self {
            time_index: config.default_time_index,
            selection: config.default_selection.clone(),
            exclude_last_step: false,
        }
    }
}

impl Default for Controls {
    fn default() -> Self {
        Self::from_config(&ViewerConfig::default())
    }
}

/// Entry of the time selector: `value` is 0-based, `label` 1-based
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOption {
    pub value: usize,
    pub label: String,
}

/// A model whose tensors are fully loaded
#[derive(Debug)]
pub struct LoadedModel {
    pub descriptor: ModelDescriptor,
    pub data: ModelData,
}

/// Session behaviour switches
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Render the default plot as soon as a model finishes loading
    pub plot_on_load: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self { plot_on_load: true }
    }
}

struct SessionState {
    model: Option<Arc<LoadedModel>>,
    generation: u64,
    controls: Controls,
}

struct Inner {
    loader: Arc<dyn DataLoader>,
    renderer: Arc<dyn Renderer>,
    registry: ModelRegistry,
    options: SessionOptions,
    state: RwLock<SessionState>,
    inflight: Mutex<Option<AbortHandle>>,
    notices: mpsc::UnboundedSender<Notice>,
}

/// Handle to a viewer session. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

impl Session {
    /// Create a session and the receiving end of its notice channel.
    pub fn new(
        loader: Arc<dyn DataLoader>,
        renderer: Arc<dyn Renderer>,
        registry: ModelRegistry,
        controls: Controls,
        options: SessionOptions,
    ) -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let inner = Inner {
            loader,
            renderer,
            registry,
            options,
            state: RwLock::new(SessionState {
                model: None,
                generation: 0,
                controls,
            }),
            inflight: Mutex::new(None),
            notices: tx,
        };
        (
            Self {
                inner: Arc::new(inner),
            },
            rx,
        )
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.inner.registry
    }

    /// Snapshot of the currently installed model, if any.
    pub fn model(&self) -> Option<Arc<LoadedModel>> {
        self.inner.state.read().model.clone()
    }

    pub fn controls(&self) -> Controls {
        self.inner.state.read().controls.clone()
    }

    /// Options for the time selector of the installed model.
    pub fn time_options(&self) -> Vec<TimeOption> {
        let count = self
            .model()
            .map(|m| m.data.time_step_count())
            .unwrap_or(0);
        (0..count)
            .map(|i| TimeOption {
                value: i,
                label: (i + 1).to_string(),
            })
            .collect()
    }

    /// Start loading `model_id`, cancelling any load still in flight.
    ///
    /// The returned handle completes once the load has been installed,
    /// discarded, or reported as failed. Must be called inside a tokio runtime.
    pub fn select_model(&self, model_id: &str) -> Result<JoinHandle<()>> {
        let descriptor = match self.inner.registry.get(model_id) {
            Some(d) => d.clone(),
            None => {
                let err = Error::UnknownModel(model_id.to_string());
                warn!(model = %model_id, "Model selection rejected");
                self.inner.notify(Notice::error(err.to_string()));
                return Err(err);
            }
        };

        let generation = {
            let mut state = self.inner.state.write();
            state.generation += 1;
            state.generation
        };

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move { inner.load_model(descriptor, generation).await });

        if let Some(previous) = self.inner.inflight.lock().replace(handle.abort_handle()) {
            if !previous.is_finished() {
                debug!(generation, "Aborting superseded model load");
                previous.abort();
            }
        }

        Ok(handle)
    }

    /// Change the time slice and re-plot.
    pub fn set_time(&self, time_index: usize) -> Result<Figure> {
        self.inner.state.write().controls.time_index = time_index;
        self.update()
    }

    /// Change the basis selection text. Takes effect on the next update.
    pub fn set_selection(&self, selection: impl Into<String>) {
        self.inner.state.write().controls.selection = selection.into();
    }

    /// Toggle dropping the final step of each trajectory and re-plot.
    pub fn set_exclude_last_step(&self, exclude: bool) -> Result<Figure> {
        self.inner.state.write().controls.exclude_last_step = exclude;
        self.update()
    }

    /// Load `model_id` and render it once at `time_index`.
    ///
    /// Returns `None` when any step failed. Every failure has already been
    /// logged and sent as exactly one notice, so callers report nothing more.
    pub async fn plot_once(&self, model_id: &str, time_index: usize) -> Option<Figure> {
        let handle = self.select_model(model_id).ok()?;
        if let Err(e) = handle.await {
            error!(model = %model_id, error = %e, "Model load task did not complete");
            self.inner.notify(Notice::error(format!(
                "Failed to load data for model '{}'. Check the log for details.",
                model_id
            )));
            return None;
        }

        // A failed load has reported itself and left the previous model in place.
        self.model().filter(|m| m.descriptor.id == model_id)?;
        self.set_time(time_index).ok()
    }

    /// Parse, project and render with the current controls.
    pub fn update(&self) -> Result<Figure> {
        let (model, controls) = {
            let state = self.inner.state.read();
            (state.model.clone(), state.controls.clone())
        };

        let result = model.as_deref().ok_or(Error::NotLoaded).and_then(|model| {
            let bases = BasisSelector::new(model.data.basis_count()).resolve(&controls.selection)?;
            let request = ProjectionRequest::new(controls.time_index, bases)
                .exclude_last_step(controls.exclude_last_step);
            self.inner.plot(model, &request)
        });

        if let Err(e) = &result {
            error!(
                model = model.as_ref().map(|m| m.descriptor.id.as_str()).unwrap_or("-"),
                time = controls.time_index,
                selection = %controls.selection,
                exclude_last_step = controls.exclude_last_step,
                error = %e,
                "Failed to update plot"
            );
            self.inner
                .notify(Notice::error(format!("Failed to update the plot: {}", e)));
        }
        result
    }
}

impl Inner {
    fn notify(&self, notice: Notice) {
        // Receiver gone means nobody is listening any more.
        let _ = self.notices.send(notice);
    }

    fn is_current(&self, generation: u64) -> bool {
        self.state.read().generation == generation
    }

    async fn load_model(self: Arc<Self>, descriptor: ModelDescriptor, generation: u64) {
        info!(model = %descriptor.id, generation, "Loading model data");

        let data = match self.loader.load(&descriptor.id).await {
            Ok(data) => data,
            Err(source) => {
                if !self.is_current(generation) {
                    debug!(model = %descriptor.id, "Ignoring failure of superseded load");
                    return;
                }
                let err = Error::Load {
                    model: descriptor.id.clone(),
                    source,
                };
                error!(model = %descriptor.id, error = %err, "Error loading data");
                self.notify(Notice::error(format!(
                    "Failed to load data for model '{}'. Check the log for details.",
                    descriptor.id
                )));
                return;
            }
        };

        info!(
            model = %descriptor.id,
            trajectories = ?data.trajectories().shape(),
            basis = ?data.basis().shape(),
            "Data loaded"
        );

        let loaded = Arc::new(LoadedModel { descriptor, data });
        {
            let mut state = self.state.write();
            if state.generation != generation {
                debug!(model = %loaded.descriptor.id, "Discarding superseded load");
                return;
            }
            state.model = Some(Arc::clone(&loaded));
            state.controls.time_index = 0;
        }

        info!(
            model = %loaded.descriptor.id,
            time_steps = loaded.data.time_step_count(),
            "Time selector populated"
        );
        self.notify(Notice::info(format!("Loaded model {}", loaded.descriptor.name)));

        if self.options.plot_on_load {
            let bases = (0..DEFAULT_PLOT_BASES.min(loaded.data.basis_count())).collect();
            if let Err(e) = self.plot(&loaded, &ProjectionRequest::new(0, bases)) {
                error!(model = %loaded.descriptor.id, error = %e, "Failed to draw default plot");
                self.notify(Notice::error(format!("Failed to update the plot: {}", e)));
            }
        }
    }

    fn plot(&self, model: &LoadedModel, request: &ProjectionRequest) -> Result<Figure> {
        debug!(
            model = %model.descriptor.id,
            time = request.time_index,
            bases = ?request.bases,
            exclude_last_step = request.exclude_last_step,
            "Updating plot"
        );

        let projected = Projector::new(&model.data).project(request)?;
        if projected.is_empty() {
            return Err(Error::EmptyProjection);
        }

        let figure = Figure::from_projection(&projected);
        self.renderer.render(&figure)?;
        Ok(figure)
    }
}
