use std::fmt;
use std::io;

use thiserror::Error;

/// The two recognized states of the Windows app theme setting.
///
/// The registry stores this as a DWORD: 1 means apps use the light theme,
/// 0 means they use the dark theme. Reads and writes must keep this exact
/// encoding so the OS theme subsystem picks the change up.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    pub fn from_dword(value: u32) -> Option<ThemeMode> {
        match value {
            1 => Some(ThemeMode::Light),
            0 => Some(ThemeMode::Dark),
            _ => None,
        }
    }

    pub fn as_dword(self) -> u32 {
        match self {
            ThemeMode::Light => 1,
            ThemeMode::Dark => 0,
        }
    }

    pub fn inverted(self) -> ThemeMode {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThemeMode::Light => write!(f, "light"),
            ThemeMode::Dark => write!(f, "dark"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ThemeError {
    #[error("theme store unavailable: {0}")]
    StoreUnavailable(#[source] io::Error),

    #[error("failed to read the theme setting: {0}")]
    ReadFailed(#[source] io::Error),

    #[error("failed to write the theme setting: {0}")]
    WriteFailed(#[source] io::Error),

    #[error("unrecognized theme value {0}")]
    UnrecognizedValue(u32),
}

pub type Result<T> = std::result::Result<T, ThemeError>;

/// Where the theme setting lives.
///
/// `read` returns the raw stored value, or `None` when the value has never
/// been set. The production implementation sits on top of the registry; the
/// trait exists so the toggle action and the worker loops can be exercised
/// without one.
pub trait ThemeStore {
    fn read(&self) -> Result<Option<u32>>;
    fn write(&self, value: u32) -> Result<()>;
}

/// Flip the theme setting and return the new mode.
///
/// The value is never cached between calls: it is re-read right before the
/// inversion so the decision is based on whatever is stored now, even if the
/// first read had to initialize it.
pub fn toggle_theme(store: &dyn ThemeStore) -> Result<ThemeMode> {
    // First run: establish a known baseline before toggling.
    if store.read()?.is_none() {
        store.write(ThemeMode::Light.as_dword())?;
    }

    let raw = store.read()?.ok_or_else(|| {
        ThemeError::ReadFailed(io::Error::new(
            io::ErrorKind::NotFound,
            "value missing after initialization",
        ))
    })?;

    let current = ThemeMode::from_dword(raw).ok_or(ThemeError::UnrecognizedValue(raw))?;
    let next = current.inverted();
    store.write(next.as_dword())?;

    Ok(next)
}
