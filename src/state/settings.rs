/// User preferences that survive across sessions
///
/// This struct is serialized to JSON and stored in the settings
/// database under a single fixed key. The JSON shape is versionless:
/// unknown fields are ignored and missing fields fall back to defaults.

use serde::{Deserialize, Serialize};

/// Key under which the settings live in the store
pub const SETTINGS_KEY: &str = "ecommerce_settings";

/// Persisted user preferences
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Product feature bullet points, one per line
    pub features: String,

    /// Free-form target audience description
    pub audience: String,

    /// Dark theme enabled
    pub dark_mode: bool,
}

impl Default for Settings {
    /// Seed values shown on first run
    fn default() -> Self {
        Self {
            features: [
                "Material: 100% Organic Cotton",
                "Color: Deep Navy Blue",
                "Fit: Athletic, breathable",
                "Benefit: Lasts 5x longer than standard shirts",
            ]
            .join("\n"),
            audience: "Environmentally conscious millennials".to_string(),
            dark_mode: true,
        }
    }
}

impl Settings {
    /// Convert to JSON string for database storage
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from JSON string (from database)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Copy of these settings with the editable text fields replaced
    pub fn with_text(&self, features: &str, audience: &str) -> Self {
        Self {
            features: features.to_string(),
            audience: audience.to_string(),
            dark_mode: self.dark_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.dark_mode);
        assert_eq!(settings.audience, "Environmentally conscious millennials");
        assert_eq!(settings.features.lines().count(), 4);
        assert!(settings.features.starts_with("Material: 100% Organic Cotton\n"));
    }

    #[test]
    fn test_json_field_names() {
        let settings = Settings {
            features: "Material: Cotton".to_string(),
            audience: "Teens".to_string(),
            dark_mode: false,
        };

        let value: serde_json::Value = serde_json::from_str(&settings.to_json().unwrap()).unwrap();
        assert_eq!(value["features"], "Material: Cotton");
        assert_eq!(value["audience"], "Teens");
        assert_eq!(value["darkMode"], false);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let restored = Settings::from_json(r#"{"darkMode": false}"#).unwrap();

        assert!(!restored.dark_mode);
        assert_eq!(restored.audience, Settings::default().audience);
        assert_eq!(restored.features, Settings::default().features);
    }

    #[test]
    fn test_with_text_keeps_dark_mode() {
        let mut settings = Settings::default();
        settings.dark_mode = false;

        let updated = settings.with_text("Color: Red", "Runners");

        assert_eq!(updated.features, "Color: Red");
        assert_eq!(updated.audience, "Runners");
        assert!(!updated.dark_mode);
    }
}
