//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::{AUTH_STATUS_VALUES, Config};

/// Deepest sub-frame chain the geometry cache may be configured to walk.
pub const MAX_SUB_FRAME_DEPTH_LIMIT: usize = 32;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Collapse into the first error, if any.
    pub fn into_result(self) -> Result<(), ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(ConfigError::InvalidValue {
                field: error.path,
                message: error.message,
            }),
            None => Ok(()),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_server(config, &mut result);
        Self::validate_debounce(config, &mut result);
        Self::validate_geometry(config, &mut result);
        Self::validate_surfaces(config, &mut result);
        Self::validate_vault(config, &mut result);

        result
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error(ValidationError::new("server.port", "Port cannot be 0"));
        }

        if config.server.host.is_empty() {
            result.add_error(ValidationError::new("server.host", "Host cannot be empty"));
        }

        if config.server.request_timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "server.request_timeout_ms",
                "Frame request timeout cannot be 0",
            ));
        }
    }

    fn validate_debounce(config: &Config, result: &mut ValidationResult) {
        let windows = [
            ("debounce.reposition_ms", config.debounce.reposition_ms),
            ("debounce.rebuild_sub_frame_ms", config.debounce.rebuild_sub_frame_ms),
            ("debounce.position_update_ms", config.debounce.position_update_ms),
            ("debounce.fade_in_ms", config.debounce.fade_in_ms),
        ];
        for (path, value) in windows {
            if value == 0 {
                result.add_error(ValidationError::new(path, "window must be greater than 0"));
            } else if value > 10_000 {
                result.add_warning(ValidationWarning::new(
                    path,
                    format!("window of {}ms will make the menu feel unresponsive", value),
                ));
            }
        }
    }

    fn validate_geometry(config: &Config, result: &mut ValidationResult) {
        let depth = config.geometry.max_sub_frame_depth;
        if depth == 0 || depth > MAX_SUB_FRAME_DEPTH_LIMIT {
            result.add_error(ValidationError::new(
                "geometry.max_sub_frame_depth",
                format!("must be between 1 and {}", MAX_SUB_FRAME_DEPTH_LIMIT),
            ));
        }

        if config.geometry.probe_timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "geometry.probe_timeout_ms",
                "probe_timeout_ms must be greater than 0",
            ));
        }
    }

    fn validate_surfaces(config: &Config, result: &mut ValidationResult) {
        let surfaces = &config.surfaces;
        let urls = [
            ("surfaces.button_url", &surfaces.button_url),
            ("surfaces.list_url", &surfaces.list_url),
            ("surfaces.style_sheet_url_button", &surfaces.style_sheet_url_button),
            ("surfaces.style_sheet_url_list", &surfaces.style_sheet_url_list),
            ("surfaces.icons_server_url", &surfaces.icons_server_url),
        ];
        for (path, url) in urls {
            if url.trim().is_empty() {
                result.add_error(ValidationError::new(path, "URL cannot be empty"));
            }
        }

        let icons = &surfaces.icons_server_url;
        if !icons.is_empty() && !icons.starts_with("http://") && !icons.starts_with("https://") {
            result.add_error(ValidationError::new(
                "surfaces.icons_server_url",
                "icons_server_url must start with http:// or https://",
            ));
        } else if icons.ends_with('/') {
            result.add_warning(ValidationWarning::new(
                "surfaces.icons_server_url",
                "trailing slash will be trimmed when building icon URLs",
            ));
        }
    }

    fn validate_vault(config: &Config, result: &mut ValidationResult) {
        if !AUTH_STATUS_VALUES.contains(&config.vault.auth_status.as_str()) {
            result.add_error(ValidationError::new(
                "vault.auth_status",
                format!(
                    "Unknown auth status '{}', valid values: {:?}",
                    config.vault.auth_status, AUTH_STATUS_VALUES
                ),
            ));
        }

        if let Some(ref path) = config.vault.credentials_file {
            if !path.exists() {
                result.add_warning(ValidationWarning::new(
                    "vault.credentials_file",
                    format!("Credentials file does not exist: {:?}", path),
                ));
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
