use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, watch};
use tokio::time::sleep;

use super::Trigger;
use crate::notifications::Notifier;
use crate::theme::{self, ThemeError, ThemeStore};

/// Serialize toggle actions and enforce the cooldown between them.
///
/// Idle → Executing → Cooling → Idle, until cancellation. A trigger that
/// piled up while the worker was executing or cooling is discarded once the
/// cooldown has passed; a fresh click is required to start the next action.
pub(super) async fn run(
    mut triggers: mpsc::Receiver<Trigger>,
    cooldown: Duration,
    store: Arc<dyn ThemeStore + Send + Sync>,
    notifier: Arc<dyn Notifier>,
    cancel: Arc<watch::Sender<()>>,
) {
    let mut cancelled = cancel.subscribe();

    loop {
        tokio::select! {
            _ = cancelled.changed() => break,
            trigger = triggers.recv() => {
                if trigger.is_none() {
                    break;
                }

                match theme::toggle_theme(store.as_ref()) {
                    Ok(mode) => {
                        info!("theme switched to {}", mode);
                        notifier.theme_changed(mode);
                    }
                    Err(err) => {
                        error!("failed to switch the theme: {}", err);
                        notifier.theme_change_failed(&err);

                        if let ThemeError::StoreUnavailable(_) = err {
                            // Nothing left to toggle against; bring the
                            // whole application down cleanly.
                            let _ = cancel.send(());
                            break;
                        }
                    }
                }

                tokio::select! {
                    _ = cancelled.changed() => break,
                    _ = sleep(cooldown) => {}
                }

                match triggers.try_recv() {
                    Ok(Trigger) => debug!("discarding trigger that arrived during the cooldown"),
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => break,
                }
            }
        }
    }
    debug!("toggler stopped");
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use tokio::sync::{mpsc, watch};
    use tokio::time::{sleep, timeout};

    use super::run;
    use crate::notifications::Notifier;
    use crate::switcher::Trigger;
    use crate::theme::testing::MemoryStore;
    use crate::theme::{ThemeError, ThemeMode};

    #[derive(Default)]
    struct RecordingNotifier {
        modes: Mutex<Vec<ThemeMode>>,
        failures: AtomicUsize,
    }

    impl RecordingNotifier {
        fn changes(&self) -> usize {
            self.modes.lock().unwrap().len()
        }
    }

    impl Notifier for RecordingNotifier {
        fn theme_changed(&self, mode: ThemeMode) {
            self.modes.lock().unwrap().push(mode);
        }

        fn theme_change_failed(&self, _error: &ThemeError) {
            self.failures.fetch_add(1, Ordering::SeqCst);
        }
    }

    async fn wait_until(what: &str, condition: impl Fn() -> bool) {
        timeout(Duration::from_secs(2), async {
            while !condition() {
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {}", what));
    }

    fn spawn_toggler(
        cooldown: Duration,
        store: Arc<MemoryStore>,
        notifier: Arc<RecordingNotifier>,
    ) -> (
        mpsc::Sender<Trigger>,
        Arc<watch::Sender<()>>,
        tokio::task::JoinHandle<()>,
    ) {
        let (triggers_tx, triggers_rx) = mpsc::channel(1);
        let (cancel_tx, _) = watch::channel(());
        let cancel = Arc::new(cancel_tx);
        let worker = tokio::spawn(run(
            triggers_rx,
            cooldown,
            store,
            notifier,
            cancel.clone(),
        ));
        (triggers_tx, cancel, worker)
    }

    #[tokio::test]
    async fn trigger_during_cooldown_is_discarded_not_queued() {
        let store = Arc::new(MemoryStore::new(Some(1)));
        let notifier = Arc::new(RecordingNotifier::default());
        let (triggers, cancel, worker) =
            spawn_toggler(Duration::from_millis(300), store.clone(), notifier.clone());

        triggers.send(Trigger).await.expect("Expected send to work");
        wait_until("first toggle", || notifier.changes() == 1).await;

        // Lands inside the cooldown window, so it must never execute.
        triggers.send(Trigger).await.expect("Expected send to work");

        sleep(Duration::from_millis(700)).await;
        assert_eq!(notifier.changes(), 1);
        assert_eq!(store.current(), Some(0));

        // A fresh trigger after the cooldown runs as usual.
        triggers.send(Trigger).await.expect("Expected send to work");
        wait_until("second toggle", || notifier.changes() == 2).await;
        assert_eq!(
            *notifier.modes.lock().unwrap(),
            vec![ThemeMode::Dark, ThemeMode::Light]
        );

        let _ = cancel.send(());
        timeout(Duration::from_secs(1), worker)
            .await
            .expect("Expected the toggler to stop")
            .expect("Expected the toggler not to panic");
    }

    #[tokio::test]
    async fn write_failure_keeps_the_loop_alive() {
        let store = Arc::new(MemoryStore::new(Some(1)));
        store.fail_next_write();
        let notifier = Arc::new(RecordingNotifier::default());
        let (triggers, cancel, worker) =
            spawn_toggler(Duration::from_millis(50), store.clone(), notifier.clone());

        triggers.send(Trigger).await.expect("Expected send to work");
        wait_until("reported failure", || {
            notifier.failures.load(Ordering::SeqCst) == 1
        })
        .await;
        assert_eq!(store.current(), Some(1));

        // Past the cooldown the next trigger succeeds.
        sleep(Duration::from_millis(150)).await;
        triggers.send(Trigger).await.expect("Expected send to work");
        wait_until("successful toggle", || notifier.changes() == 1).await;
        assert_eq!(store.current(), Some(0));

        let _ = cancel.send(());
        timeout(Duration::from_secs(1), worker)
            .await
            .expect("Expected the toggler to stop")
            .expect("Expected the toggler not to panic");
    }

    #[tokio::test]
    async fn cancellation_during_cooldown_stops_the_worker() {
        let store = Arc::new(MemoryStore::new(Some(1)));
        let notifier = Arc::new(RecordingNotifier::default());
        let (triggers, cancel, worker) =
            spawn_toggler(Duration::from_secs(30), store.clone(), notifier.clone());

        triggers.send(Trigger).await.expect("Expected send to work");
        wait_until("first toggle", || notifier.changes() == 1).await;

        // The worker is now deep in a 30s cooldown; cancellation must not
        // wait it out.
        let _ = cancel.send(());
        timeout(Duration::from_secs(1), worker)
            .await
            .expect("Expected the toggler to stop during the cooldown")
            .expect("Expected the toggler not to panic");

        drop(triggers);
    }
}
