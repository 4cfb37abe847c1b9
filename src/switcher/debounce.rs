use log::debug;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};

use super::{Activation, Trigger};

/// Collapse a bursty stream of activations into non-overlapping triggers.
///
/// The trigger channel holds a single slot; while it is occupied, further
/// activations are dropped on the floor. This stage cannot fail, it only
/// drops.
pub(super) async fn run(
    mut activations: mpsc::Receiver<Activation>,
    triggers: mpsc::Sender<Trigger>,
    mut cancel: watch::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = cancel.changed() => break,
            activation = activations.recv() => {
                match activation {
                    Some(Activation) => match triggers.try_send(Trigger) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => {
                            debug!("a toggle is already pending, dropping activation");
                        }
                        Err(TrySendError::Closed(_)) => break,
                    },
                    None => break,
                }
            }
        }
    }
    debug!("debouncer stopped");
}
