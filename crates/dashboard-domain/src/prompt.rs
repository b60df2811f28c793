//! Prompt templates for store assets and listing copy.

use dashboard_core::{DashboardError, DashboardResult};
use serde::{Deserialize, Serialize};

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default
    } else {
        trimmed
    }
}

/// Image prompt for a blocky landscape background.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackgroundPrompt {
    pub theme: String,
    pub lighting: String,
    pub details: String,
}

impl BackgroundPrompt {
    pub fn render(&self) -> String {
        format!(
            "A pixelated Minecraft-style background with the theme '{}'. \
             The lighting is {}. \
             It includes {}. \
             The overall image is simple, colorful, and clearly Minecraft-inspired, \
             keeping the blocky aesthetic intact, without any realistic details. \
             The image is in landscape orientation and does not include any UI elements or text.",
            or_default(&self.theme, "a generic theme"),
            or_default(&self.lighting, "standard lighting"),
            or_default(&self.details, "basic features"),
        )
    }
}

/// Image prompt for a square app icon built around a character close-up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IconPrompt {
    pub emotion: String,
    pub background: String,
    pub color_theme: String,
    pub additional_details: String,
}

impl IconPrompt {
    pub fn render(&self) -> String {
        let mut prompt = format!(
            "A square game app icon design featuring a close-up of a Minecraft-style character. \
             The character appears {}, taking up most of the frame in a fun and vibrant 3D \
             Minecraft-inspired style. In the background, {}, creating a dynamic scene. \
             The color palette emphasizes {} for added atmosphere.",
            or_default(&self.emotion, "neutral"),
            or_default(&self.background, "simple Minecraft scenery"),
            or_default(&self.color_theme, "Minecraft-style colors"),
        );
        let additional = self.additional_details.trim();
        if !additional.is_empty() {
            prompt.push_str(&format!(" Additional details: {}.", additional));
        }
        prompt
    }
}

/// Short and long store listing text produced by the text generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppDescription {
    pub short: String,
    pub long: String,
}

impl AppDescription {
    /// Request text sent to the generator. Both inputs are required.
    pub fn prompt(app_name: &str, app_details: &str) -> DashboardResult<String> {
        let app_name = app_name.trim();
        let app_details = app_details.trim();
        if app_name.is_empty() || app_details.is_empty() {
            return Err(DashboardError::Validation(
                "app name and app details are both required".into(),
            ));
        }
        Ok(format!(
            "Create app store descriptions for \"{}\".\n\
             Details: {}\n\n\
             Format:\n\
             SHORT:\n\
             [write a short description under 80 characters]\n\n\
             LONG:\n\
             [write 4-5 paragraphs about features and benefits]",
            app_name, app_details
        ))
    }

    /// Split generator output into its `SHORT:` and `LONG:` sections.
    pub fn parse(text: &str) -> DashboardResult<Self> {
        let (short_part, long_part) = text.split_once("LONG:").ok_or_else(|| {
            DashboardError::UpstreamResponse("response has no LONG: section".into())
        })?;
        let short = short_part.replacen("SHORT:", "", 1).trim().to_string();
        let long = long_part.trim().to_string();
        if short.is_empty() || long.is_empty() {
            return Err(DashboardError::UpstreamResponse(
                "response has an empty description section".into(),
            ));
        }
        Ok(Self { short, long })
    }

    /// Plain-text export of both descriptions.
    pub fn render_download(&self, app_name: &str) -> String {
        format!(
            "App Name: {}\n\nShort Description:\n{}\n\nLong Description:\n{}",
            app_name, self.short, self.long
        )
    }

    /// `My Cool App` becomes `my-cool-app-description.txt`.
    pub fn download_file_name(app_name: &str) -> String {
        let slug = app_name
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");
        format!("{}-description.txt", slug)
    }
}
