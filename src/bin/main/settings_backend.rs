use clock_core::settings::{PersistedSettings, SettingsStore};
use clock_hal_esp32s3::storage::flash_settings::{FlashSettingsError, FlashSettingsStore};
use log::info;

/// Flash-backed settings, or RAM-only operation when no partition is usable.
pub(super) struct SettingsBackend {
    flash: Option<FlashSettingsStore>,
}

impl SettingsBackend {
    pub(super) fn open() -> Self {
        let flash = match FlashSettingsStore::new() {
            Ok(store) => Some(store),
            Err(err) => {
                info!(
                    "settings storage unavailable ({:?}); changes will be volatile",
                    err
                );
                None
            }
        };
        Self { flash }
    }
}

impl SettingsStore for SettingsBackend {
    type Error = FlashSettingsError;

    fn load(&mut self) -> Result<Option<PersistedSettings>, Self::Error> {
        match self.flash.as_mut() {
            Some(store) => store.load(),
            None => Ok(None),
        }
    }

    fn save(&mut self, settings: &PersistedSettings) -> Result<(), Self::Error> {
        match self.flash.as_mut() {
            Some(store) => store.save(settings),
            None => Ok(()),
        }
    }
}
