//! Model instruction construction for each edit action
//!
//! The instruction text is the only thing the model sees besides the image,
//! so the safety policy lives here: skin-tone adjustments are honored,
//! race or ethnicity changes are refused, ambiguous requests resolve to no
//! change. Building an instruction is a pure function of its inputs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Pixel coordinate pair marking the focal point of a localized edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hotspot {
    pub x: i32,
    pub y: i32,
}

/// The three supported edit modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    /// Localized edit around a hotspot.
    Edit,
    /// Global stylistic filter.
    Filter,
    /// Global photorealistic adjustment.
    Adjust,
}

impl EditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Filter => "filter",
            Self::Adjust => "adjust",
        }
    }
}

impl fmt::Display for EditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "edit" => Ok(Self::Edit),
            "filter" => Ok(Self::Filter),
            "adjust" => Ok(Self::Adjust),
            other => Err(AppError::InvalidAction(other.to_string())),
        }
    }
}

const PERSON_POLICY: &str = "Safety & Ethics Policy:
- You MUST fulfill requests to adjust skin tone, such as 'give me a tan', 'make my skin darker', or 'make my skin lighter'. These are considered standard photo enhancements.
- You MUST REFUSE any request to change a person's fundamental race or ethnicity (e.g., 'make me look Asian', 'change this person to be Black'). Do not perform these edits. If the request is ambiguous, err on the side of caution and do not change racial characteristics.";

/// Build the instruction text sent to the model for one request.
///
/// The hotspot must be present exactly when the action is [`EditAction::Edit`];
/// both violations of that invariant fail before any model call.
pub fn build_instruction(
    action: EditAction,
    prompt: &str,
    hotspot: Option<Hotspot>,
) -> Result<String> {
    match (action, hotspot) {
        (EditAction::Edit, Some(hotspot)) => Ok(edit_instruction(prompt, hotspot)),
        (EditAction::Edit, None) => Err(AppError::MissingField("hotspot")),
        (EditAction::Filter, None) => Ok(filter_instruction(prompt)),
        (EditAction::Adjust, None) => Ok(adjust_instruction(prompt)),
        (action, Some(_)) => Err(AppError::InvalidRequest(format!(
            "'hotspot' is only valid for the 'edit' action, not '{}'",
            action
        ))),
    }
}

fn edit_instruction(prompt: &str, hotspot: Hotspot) -> String {
    format!(
        "You are an expert photo editor AI. Your task is to perform a natural, localized edit on the provided image based on the user's request.
User Request: \"{prompt}\"
Edit Location: Focus on the area around pixel coordinates (x: {x}, y: {y}).
Editing Guidelines:
- The edit must be realistic and blend seamlessly with the surrounding area.
- The rest of the image (outside the immediate edit area) must remain identical to the original.
{policy}
Output: Return ONLY the final edited image. Do not return text.",
        prompt = prompt,
        x = hotspot.x,
        y = hotspot.y,
        policy = PERSON_POLICY,
    )
}

fn filter_instruction(prompt: &str) -> String {
    format!(
        "You are an expert photo editor AI. Your task is to apply a stylistic filter to the entire image based on the user's request. Do not change the composition or content, only apply the style.
Filter Request: \"{prompt}\"
Safety & Ethics Policy:
- Filters may subtly shift colors, but you MUST ensure they do not alter a person's fundamental race or ethnicity.
- You MUST REFUSE any request that explicitly asks to change a person's race (e.g., 'apply a filter to make me look Chinese').
Output: Return ONLY the final filtered image. Do not return text.",
        prompt = prompt,
    )
}

fn adjust_instruction(prompt: &str) -> String {
    format!(
        "You are an expert photo editor AI. Your task is to perform a natural, global adjustment to the entire image based on the user's request.
User Request: \"{prompt}\"
Editing Guidelines:
- The adjustment must be applied across the entire image.
- The result must be photorealistic.
{policy}
Output: Return ONLY the final adjusted image. Do not return text.",
        prompt = prompt,
        policy = PERSON_POLICY,
    )
}
