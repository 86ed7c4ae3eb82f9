//! Player preferences
//!
//! Persisted as JSON next to the high scores, under its own key.

use serde::{Deserialize, Serialize};

use crate::platform::{KeyValueStore, StorageError};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Silence all sound
    pub muted: bool,

    // === Haptics ===
    /// Vibrate on hits, start and crash (where supported)
    pub haptics: bool,

    // === Accessibility ===
    /// Reduced motion (no idle hover)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            haptics: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "meteor_shooter_settings";

    /// Effective sound volume (respects mute)
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume.clamp(0.0, 1.0) * self.sfx_volume.clamp(0.0, 1.0)
        }
    }

    /// Effective idle hover (respects reduced_motion)
    pub fn effective_hover(&self) -> bool {
        !self.reduced_motion
    }

    /// Load settings, falling back to defaults on any problem
    pub fn load(store: &impl KeyValueStore) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    settings
                }
                Err(err) => {
                    log::warn!("Ignoring malformed settings: {}", err);
                    Self::default()
                }
            },
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(err) => {
                log::warn!("Could not read settings: {}", err);
                Self::default()
            }
        }
    }

    /// Save settings
    pub fn save(&self, store: &mut impl KeyValueStore) -> Result<(), StorageError> {
        let json = serde_json::to_string(self)?;
        store.set(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    #[test]
    fn test_round_trip() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            muted: true,
            reduced_motion: true,
            ..Default::default()
        };
        settings.save(&mut store).unwrap();
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let store = MemoryStore::new();
        store.insert_raw(Settings::STORAGE_KEY, r#"{"haptics": false}"#);
        let settings = Settings::load(&store);
        assert!(!settings.haptics);
        assert_eq!(settings.master_volume, Settings::default().master_volume);
    }

    #[test]
    fn test_malformed_or_offline_uses_defaults() {
        let mut store = MemoryStore::new();
        store.insert_raw(Settings::STORAGE_KEY, "{oops");
        assert_eq!(Settings::load(&store), Settings::default());

        store.set_offline(true);
        assert_eq!(Settings::load(&store), Settings::default());
        assert!(Settings::default().save(&mut store).is_err());
    }

    #[test]
    fn test_effective_volume() {
        let mut settings = Settings {
            master_volume: 0.5,
            sfx_volume: 0.5,
            ..Default::default()
        };
        assert!((settings.effective_volume() - 0.25).abs() < 1e-6);
        settings.muted = true;
        assert_eq!(settings.effective_volume(), 0.0);
        settings.master_volume = 4.0;
        settings.muted = false;
        assert!((settings.effective_volume() - 0.5).abs() < 1e-6);
    }
}
