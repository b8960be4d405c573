use crate::config::FontFamily;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub foreground: String,
    pub background: String,
    pub corner_square: Option<String>,
    pub corner_dot: Option<String>,
    pub frame_border: String,
    pub frame_background: String,
    pub frame_text: String,
    pub font_family: FontFamily,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            foreground: "#000000".to_string(),
            background: "#FFFFFF".to_string(),
            corner_square: None,
            corner_dot: None,
            frame_border: "#000000".to_string(),
            frame_background: "#FFFFFF".to_string(),
            frame_text: "#FFFFFF".to_string(),
            font_family: FontFamily::Sans,
        }
    }

    pub fn modern() -> Self {
        Self {
            foreground: "#1C2430".to_string(),
            background: "#FFFFFF".to_string(),
            corner_square: Some("#3B5BDB".to_string()),
            corner_dot: Some("#1C2430".to_string()),
            frame_border: "#3B5BDB".to_string(),
            frame_background: "#F8FAFF".to_string(),
            frame_text: "#FFFFFF".to_string(),
            font_family: FontFamily::Rounded,
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "classic" | "default" => Some(Self::classic()),
            "modern" => Some(Self::modern()),
            _ => None,
        }
    }
}
