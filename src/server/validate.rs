//! Request parameter validation.
//!
//! Syntax checks on the filename path parameter and the optional resolution
//! query parameter, performed upstream of the pipeline. Violations produce a
//! 400 response carrying a JSON list of field errors.

use serde::Serialize;

use crate::images::Resolution;

/// A single field validation failure.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ValidationError {
    /// The offending parameter (`"filename"` or `"resolution"`)
    pub field: &'static str,

    /// Human-readable message
    pub message: &'static str,
}

/// All validation failures for one request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    fn push(&mut self, field: &'static str, message: &'static str) {
        self.errors.push(ValidationError { field, message });
    }
}

/// Validate the request parameters, returning the parsed resolution.
///
/// The filename must be a bare name (no path separators) with a `.png`,
/// `.jpg` or `.jpeg` extension. The resolution, when present, must be
/// `{width}x{height}` with positive integers.
pub fn validate_request(
    filename: &str,
    resolution: Option<&str>,
) -> Result<Option<Resolution>, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if filename.is_empty() {
        errors.push("filename", "Image name cannot be empty!");
    } else {
        if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
            errors.push("filename", "Image name must not contain path separators!");
        }
        if !has_valid_extension(filename) {
            errors.push("filename", "Image name must have a valid file extension!");
        }
    }

    let parsed = match resolution {
        Some(raw) => match raw.parse::<Resolution>() {
            Ok(resolution) => Some(resolution),
            Err(_) => {
                errors.push(
                    "resolution",
                    "Resolution must be in the format {width}x{height}!",
                );
                None
            }
        },
        None => None,
    };

    if errors.errors.is_empty() {
        Ok(parsed)
    } else {
        Err(errors)
    }
}

fn has_valid_extension(filename: &str) -> bool {
    let lowered = filename.to_ascii_lowercase();
    lowered.ends_with(".png") || lowered.ends_with(".jpg") || lowered.ends_with(".jpeg")
}
