use crate::theme::{ThemeError, ThemeMode};

/// Tells the user how a toggle attempt went.
///
/// The toggler only ever talks to this trait; the tray layer provides the
/// implementation that shows toasts and keeps the icon in sync.
pub trait Notifier: Send + Sync {
    fn theme_changed(&self, mode: ThemeMode);
    fn theme_change_failed(&self, error: &ThemeError);
}

#[cfg(target_os = "windows")]
pub fn show_success_toast(mode: ThemeMode) {
    use tauri_winrt_notification::{Duration, Sound, Toast};

    let text = format!("Apps now use the {} theme.", mode);
    let toast = Toast::new(Toast::POWERSHELL_APP_ID)
        .title(crate::APP_NAME)
        .text1(&text)
        .sound(Some(Sound::Default))
        .duration(Duration::Short);

    // A toast that fails to display is logged and forgotten; it must not
    // take the toggler down with it.
    if let Err(err) = toast.show() {
        log::error!("failed to display notification: {}", err);
    }
}

#[cfg(target_os = "windows")]
pub fn show_error_toast(error: &ThemeError) {
    use tauri_winrt_notification::{Duration, Sound, Toast};

    let text = format!("Could not change the app theme: {}", error);
    let toast = Toast::new(Toast::POWERSHELL_APP_ID)
        .title(crate::APP_NAME)
        .text1(&text)
        .sound(Some(Sound::Default))
        .duration(Duration::Short);

    if let Err(err) = toast.show() {
        log::error!("failed to display notification: {}", err);
    }
}
