use std::sync::Mutex;

use log::{debug, error};
use tao::event_loop::EventLoopProxy;
use tray_icon::menu::{Menu, MenuEvent, MenuItem, PredefinedMenuItem};
use tray_icon::{Icon, MouseButton, MouseButtonState, TrayIcon, TrayIconBuilder, TrayIconEvent};

use crate::notifications::{self, Notifier};
use crate::theme::{ThemeError, ThemeMode};

/// Events forwarded into the main event loop, either from the tray
/// callbacks or from the background workers.
#[derive(Debug)]
pub enum AppEvent {
    /// Primary-button release on the tray icon.
    Activated,
    /// A toggle went through; update the icon and status row.
    ThemeChanged(ThemeMode),
    /// Stop the workers and leave the event loop.
    Quit,
}

const ICON_SIZE: u32 = 32;

pub struct Tray {
    icon: TrayIcon,
    status: MenuItem,
}

impl Tray {
    pub fn set_mode(&self, mode: ThemeMode) {
        self.status.set_text(format!("Theme: {}", mode));
        if let Err(err) = self.icon.set_icon(Some(icon_for(mode))) {
            error!("failed to update tray icon: {}", err);
        }
    }
}

/// Build the tray icon and context menu, and route tray events into the
/// event loop as [`AppEvent`]s.
///
/// The returned handle must stay alive for as long as the icon should be
/// visible.
pub fn setup_tray(
    proxy: &EventLoopProxy<AppEvent>,
    mode: ThemeMode,
) -> Result<Tray, Box<dyn std::error::Error>> {
    let status = MenuItem::with_id("status", format!("Theme: {}", mode), false, None);
    let exit = MenuItem::with_id("exit", "Exit", true, None);

    let menu = Menu::new();
    menu.append(&status)?;
    menu.append(&PredefinedMenuItem::separator())?;
    menu.append(&exit)?;

    let icon = TrayIconBuilder::new()
        .with_menu(Box::new(menu))
        .with_tooltip(crate::APP_NAME)
        .with_icon(icon_for(mode))
        .build()?;

    // Both handlers live in statics and must be Sync, hence the Mutex
    // around the proxy. Only a released primary click counts as an
    // activation; other buttons belong to the context menu.
    {
        let proxy = Mutex::new(proxy.clone());
        TrayIconEvent::set_event_handler(Some(move |event: TrayIconEvent| {
            if let TrayIconEvent::Click {
                button: MouseButton::Left,
                button_state: MouseButtonState::Up,
                ..
            } = event
            {
                if let Ok(proxy) = proxy.lock() {
                    let _ = proxy.send_event(AppEvent::Activated);
                }
            }
        }));
    }

    {
        let proxy = Mutex::new(proxy.clone());
        MenuEvent::set_event_handler(Some(move |event: MenuEvent| match event.id.0.as_str() {
            "exit" => {
                if let Ok(proxy) = proxy.lock() {
                    let _ = proxy.send_event(AppEvent::Quit);
                }
            }
            other => {
                debug!("unknown menu event id: {}", other);
            }
        }));
    }

    Ok(Tray { icon, status })
}

/// Reports toggle outcomes from the worker thread: a toast for the user,
/// plus a proxy event so the main loop can restyle the icon.
pub struct TrayNotifier {
    proxy: Mutex<EventLoopProxy<AppEvent>>,
}

impl TrayNotifier {
    pub fn new(proxy: EventLoopProxy<AppEvent>) -> Self {
        TrayNotifier {
            proxy: Mutex::new(proxy),
        }
    }

    fn send(&self, event: AppEvent) {
        if let Ok(proxy) = self.proxy.lock() {
            let _ = proxy.send_event(event);
        }
    }
}

impl Notifier for TrayNotifier {
    fn theme_changed(&self, mode: ThemeMode) {
        notifications::show_success_toast(mode);
        self.send(AppEvent::ThemeChanged(mode));
    }

    fn theme_change_failed(&self, error: &ThemeError) {
        notifications::show_error_toast(error);
    }
}

/// A flat disc in the shade of the active theme. Rendered in code; there
/// are no image assets.
fn icon_for(mode: ThemeMode) -> Icon {
    let (r, g, b) = match mode {
        ThemeMode::Light => (0xf8, 0xfa, 0xfc),
        ThemeMode::Dark => (0x1e, 0x29, 0x3b),
    };

    let center = (ICON_SIZE as f32 - 1.0) / 2.0;
    let radius = ICON_SIZE as f32 / 2.0 - 1.5;
    let mut rgba = Vec::with_capacity((ICON_SIZE * ICON_SIZE * 4) as usize);
    for y in 0..ICON_SIZE {
        for x in 0..ICON_SIZE {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            if dx * dx + dy * dy <= radius * radius {
                rgba.extend_from_slice(&[r, g, b, 0xff]);
            } else {
                rgba.extend_from_slice(&[0, 0, 0, 0]);
            }
        }
    }

    Icon::from_rgba(rgba, ICON_SIZE, ICON_SIZE).expect("static icon dimensions are valid")
}
