use serde::{Deserialize, Serialize};

/// Values remembered between runs.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// Stable device identifier sent to the server.
    #[serde(default)]
    pub device_id: Option<String>,

    /// Last browsed library ID.
    #[serde(default)]
    pub last_library_id: Option<String>,
}

impl StateConfig {
    /// Returns the device ID, generating one on first use.
    ///
    /// The boolean is true when a new ID was generated and the state needs
    /// saving.
    pub fn ensure_device_id(&mut self) -> (String, bool) {
        if let Some(id) = self.device_id.as_ref().filter(|id| !id.trim().is_empty()) {
            return (id.clone(), false);
        }
        let id = uuid::Uuid::new_v4().to_string();
        self.device_id = Some(id.clone());
        (id, true)
    }
}
