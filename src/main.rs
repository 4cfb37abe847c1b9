// Prevents additional console window on Windows in release, DO NOT REMOVE!!
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
// Non-Windows builds only get the stub main below; the core still has to
// compile (and test) there.
#![cfg_attr(not(target_os = "windows"), allow(dead_code))]

mod notifications;
mod switcher;
mod theme;

#[cfg(target_os = "windows")]
mod registry;
#[cfg(target_os = "windows")]
mod tray;

pub(crate) const APP_NAME: &str = "Night Switch";

#[cfg(target_os = "windows")]
fn main() {
    use std::sync::Arc;

    use log::info;
    use tao::event::Event;
    use tao::event_loop::{ControlFlow, EventLoopBuilder};

    use crate::switcher::{Options, Switcher};
    use crate::theme::{ThemeMode, ThemeStore};
    use crate::tray::AppEvent;

    pretty_env_logger::init();
    info!("starting {} v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    let runtime = tokio::runtime::Runtime::new().expect("failed to start the tokio runtime");

    let event_loop = EventLoopBuilder::<AppEvent>::with_user_event().build();
    let proxy = event_loop.create_proxy();

    let store = Arc::new(registry::RegistryStore);
    let notifier = Arc::new(tray::TrayNotifier::new(proxy.clone()));
    let mut switcher = Switcher::spawn(
        runtime.handle(),
        Options::default(),
        store.clone(),
        notifier,
    );

    // Workers can raise cancellation on their own (unusable store); forward
    // that to the event loop so the tray goes away with them.
    {
        let proxy = proxy.clone();
        let mut cancelled = switcher.cancelled();
        runtime.spawn(async move {
            let _ = cancelled.changed().await;
            let _ = proxy.send_event(AppEvent::Quit);
        });
    }

    // Seed the icon and status row from whatever is stored right now,
    // falling back to light when the value is absent or unreadable.
    let current = store
        .read()
        .ok()
        .flatten()
        .and_then(ThemeMode::from_dword)
        .unwrap_or(ThemeMode::Light);
    let tray = tray::setup_tray(&proxy, current).expect("failed to create the tray icon");

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        if let Event::UserEvent(event) = event {
            match event {
                AppEvent::Activated => switcher.activate(),
                AppEvent::ThemeChanged(mode) => tray.set_mode(mode),
                AppEvent::Quit => {
                    info!("exit requested, stopping workers");
                    runtime.block_on(switcher.shutdown());
                    *control_flow = ControlFlow::Exit;
                }
            }
        }
    });
}

#[cfg(not(target_os = "windows"))]
fn main() {
    pretty_env_logger::init();
    log::error!(
        "{} only runs on Windows: the theme setting it toggles lives in the Windows registry",
        APP_NAME
    );
    std::process::exit(1);
}
