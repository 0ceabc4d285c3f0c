//! Shared model runtime: readiness state plus the published model.
//!
//! One [`ModelRuntime`] is created per process and shared by `Arc` between
//! the loader (the only writer) and the gate / HTTP handlers (readers).
//!
//! The model is stored in a [`OnceLock`] before the state is stored as
//! [`ReadinessState::Ready`] with `Release` ordering, and readers load the
//! state with `Acquire`. A reader that observes `Ready` therefore always sees
//! the model and its parameters.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU8, Ordering};

use candle_core::Device;
use tokio::sync::watch;

use crate::config::ModelParameters;
use crate::model::DiffusionModel;
use crate::{Error, Result};

/// Lifecycle of the model. Forward-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReadinessState {
    NotStarted = 0,
    Loading = 1,
    Ready = 2,
}

impl ReadinessState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ReadinessState::NotStarted,
            1 => ReadinessState::Loading,
            _ => ReadinessState::Ready,
        }
    }
}

/// A model that finished loading, with the parameters read from its config.
pub struct LoadedModel {
    pub model: Box<dyn DiffusionModel>,
    pub parameters: ModelParameters,
    pub device: Device,
}

pub struct ModelRuntime {
    state: AtomicU8,
    loaded: OnceLock<LoadedModel>,
    changes: watch::Sender<ReadinessState>,
}

impl Default for ModelRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelRuntime {
    pub fn new() -> Self {
        let (changes, _) = watch::channel(ReadinessState::NotStarted);
        Self {
            state: AtomicU8::new(ReadinessState::NotStarted as u8),
            loaded: OnceLock::new(),
            changes,
        }
    }

    pub fn state(&self) -> ReadinessState {
        ReadinessState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// The published model, or `None` until the state is `Ready`.
    pub fn loaded(&self) -> Option<&LoadedModel> {
        if self.state() == ReadinessState::Ready {
            self.loaded.get()
        } else {
            None
        }
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<ReadinessState> {
        self.changes.subscribe()
    }

    /// Wait until the state is `Ready`. Never returns if loading fails.
    pub async fn wait_ready(&self) {
        let mut rx = self.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|state| *state == ReadinessState::Ready).await;
    }

    /// `NotStarted -> Loading`. Fails if loading was already started.
    pub(crate) fn begin_loading(&self) -> Result<()> {
        self.state
            .compare_exchange(
                ReadinessState::NotStarted as u8,
                ReadinessState::Loading as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map_err(|current| {
                Error::Loader(format!(
                    "model loading already started (state: {:?})",
                    ReadinessState::from_u8(current)
                ))
            })?;
        self.changes.send_replace(ReadinessState::Loading);
        Ok(())
    }

    /// Store the model and move `Loading -> Ready`.
    pub(crate) fn publish(&self, loaded: LoadedModel) -> Result<()> {
        if self.state() != ReadinessState::Loading {
            return Err(Error::Loader(format!(
                "cannot publish model in state {:?}",
                self.state()
            )));
        }
        self.loaded
            .set(loaded)
            .map_err(|_| Error::Loader("model already published".into()))?;
        self.state
            .store(ReadinessState::Ready as u8, Ordering::Release);
        self.changes.send_replace(ReadinessState::Ready);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubModel, loaded_model};

    #[test]
    fn test_initial_state() {
        let runtime = ModelRuntime::new();
        assert_eq!(runtime.state(), ReadinessState::NotStarted);
        assert!(runtime.loaded().is_none());
    }

    #[test]
    fn test_begin_loading_is_single_shot() {
        let runtime = ModelRuntime::new();
        runtime.begin_loading().unwrap();
        assert_eq!(runtime.state(), ReadinessState::Loading);
        assert!(matches!(runtime.begin_loading(), Err(Error::Loader(_))));
        assert_eq!(runtime.state(), ReadinessState::Loading);
    }

    #[test]
    fn test_publish_requires_loading() {
        let runtime = ModelRuntime::new();
        let (model, _calls) = StubModel::tone();
        assert!(runtime.publish(loaded_model(model)).is_err());
        assert_eq!(runtime.state(), ReadinessState::NotStarted);
    }

    #[test]
    fn test_publish_makes_parameters_visible() {
        let runtime = ModelRuntime::new();
        runtime.begin_loading().unwrap();
        assert!(runtime.loaded().is_none());

        let (model, _calls) = StubModel::tone();
        runtime.publish(loaded_model(model)).unwrap();
        assert_eq!(runtime.state(), ReadinessState::Ready);

        let loaded = runtime.loaded().unwrap();
        assert!(loaded.parameters.sample_rate > 0);
        assert!(loaded.parameters.sample_size > 0);

        let (model, _calls) = StubModel::tone();
        assert!(runtime.publish(loaded_model(model)).is_err());
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions() {
        let runtime = ModelRuntime::new();
        let mut rx = runtime.subscribe();
        assert_eq!(*rx.borrow(), ReadinessState::NotStarted);

        runtime.begin_loading().unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), ReadinessState::Loading);

        let (model, _calls) = StubModel::tone();
        runtime.publish(loaded_model(model)).unwrap();
        runtime.wait_ready().await;
        assert_eq!(*rx.borrow_and_update(), ReadinessState::Ready);
    }
}
