//! The debounced theme switcher.
//!
//! Two workers run on the tokio runtime: the debouncer collapses bursts of
//! tray activations into at most one pending trigger, and the toggler
//! serializes the actual theme flips behind a cooldown. They talk over
//! capacity-1 channels and share a watch channel for cancellation, so the
//! UI callback never blocks and a flood of clicks never queues up work.

mod debounce;
mod toggler;

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::notifications::Notifier;
use crate::theme::ThemeStore;

/// A single tray activation. Produced by the UI layer, consumed by the
/// debouncer.
pub struct Activation;

/// "Run the toggle action now." At most one of these is ever pending.
struct Trigger;

/// Minimum delay between two toggle actions.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(5);

pub struct Options {
    pub cooldown: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            cooldown: DEFAULT_COOLDOWN,
        }
    }
}

/// Handle to the two background workers.
pub struct Switcher {
    activations: mpsc::Sender<Activation>,
    cancel: Arc<watch::Sender<()>>,
    workers: Vec<JoinHandle<()>>,
}

impl Switcher {
    /// Spawn the debouncer and toggler on the given runtime.
    pub fn spawn(
        runtime: &Handle,
        opts: Options,
        store: Arc<dyn ThemeStore + Send + Sync>,
        notifier: Arc<dyn Notifier>,
    ) -> Switcher {
        let (activations_tx, activations_rx) = mpsc::channel(1);
        let (triggers_tx, triggers_rx) = mpsc::channel(1);
        let (cancel_tx, _) = watch::channel(());
        let cancel = Arc::new(cancel_tx);

        let debouncer = runtime.spawn(debounce::run(
            activations_rx,
            triggers_tx,
            cancel.subscribe(),
        ));
        let toggler = runtime.spawn(toggler::run(
            triggers_rx,
            opts.cooldown,
            store,
            notifier,
            cancel.clone(),
        ));

        Switcher {
            activations: activations_tx,
            cancel,
            workers: vec![debouncer, toggler],
        }
    }

    /// Hand one activation to the debouncer without ever blocking the
    /// caller. Dropped silently when one is already waiting.
    pub fn activate(&self) {
        if self.activations.try_send(Activation).is_err() {
            debug!("activation dropped, switcher is busy");
        }
    }

    /// Observe the cancellation signal, e.g. to exit the UI loop when a
    /// worker decides the store is gone for good.
    pub fn cancelled(&self) -> watch::Receiver<()> {
        self.cancel.subscribe()
    }

    pub fn request_stop(&self) {
        let _ = self.cancel.send(());
    }

    /// Stop both workers and wait for them. An in-flight toggle action
    /// completes before this returns.
    pub async fn shutdown(&mut self) {
        self.request_stop();
        for worker in self.workers.drain(..) {
            let _ = worker.await;
        }
    }
}
