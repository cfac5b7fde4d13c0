use serde::{Deserialize, Serialize};

use crate::review::Language;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    #[serde(default)]
    pub language: Language,
}

fn default_backend_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            language: Language::Python,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        confy::load("critiq", "config").unwrap_or_default()
    }

    pub fn save(&self) {
        let _ = confy::store("critiq", "config", self.clone());
    }
}
