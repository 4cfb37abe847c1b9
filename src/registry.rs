use std::io;

use winreg::enums::{HKEY_CURRENT_USER, KEY_QUERY_VALUE, KEY_SET_VALUE};
use winreg::RegKey;

use crate::theme::{Result, ThemeError, ThemeStore};

// HKCU key backing the Windows app theme. 1 = light, 0 = dark.
const SUBKEY: &str = "Software\\Microsoft\\Windows\\CurrentVersion\\Themes\\Personalize";
const VALUE: &str = "AppsUseLightTheme";

/// The real theme setting: a DWORD in the current user's registry hive.
///
/// The key is opened (created on first run) per operation with query+set
/// access, so a value written by another tool between two toggles is always
/// picked up.
pub struct RegistryStore;

impl RegistryStore {
    fn open(&self) -> Result<RegKey> {
        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        let (key, _) = hkcu
            .create_subkey_with_flags(SUBKEY, KEY_QUERY_VALUE | KEY_SET_VALUE)
            .map_err(ThemeError::StoreUnavailable)?;
        Ok(key)
    }
}

impl ThemeStore for RegistryStore {
    fn read(&self) -> Result<Option<u32>> {
        let key = self.open()?;
        match key.get_value::<u32, _>(VALUE) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(ThemeError::ReadFailed(err)),
        }
    }

    fn write(&self, value: u32) -> Result<()> {
        let key = self.open()?;
        key.set_value(VALUE, &value)
            .map_err(ThemeError::WriteFailed)
    }
}
