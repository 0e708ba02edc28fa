//! Configuration validation.

use crate::schema::Config;

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

        Self::validate_model(config, &mut result);
        Self::validate_cache(config, &mut result);
        Self::validate_analysis(config, &mut result);

        result
    }

    fn validate_model(config: &Config, result: &mut ValidationResult) {
        let model = &config.model;

        if model.model.is_empty() {
            result.add_error(ValidationError::new("model.model", "Model name cannot be empty"));
        }

        if !model.base_url.starts_with("http://") && !model.base_url.starts_with("https://") {
            result.add_error(ValidationError::new(
                "model.base_url",
                "base_url must start with http:// or https://",
            ));
        }

        if !(0.0..=2.0).contains(&model.temperature) {
            result.add_error(ValidationError::new(
                "model.temperature",
                "temperature must be between 0.0 and 2.0",
            ));
        }

        if model.top_k == 0 {
            result.add_error(ValidationError::new("model.top_k", "top_k must be greater than 0"));
        }

        if model.api_key.is_none() {
            result.add_warning(ValidationWarning::new(
                "model.api_key",
                "API key is not set, only keyless local servers will accept requests",
            ));
        }
    }

    fn validate_cache(config: &Config, result: &mut ValidationResult) {
        let cache = &config.cache;

        if cache.score_key.is_empty() || cache.insights_key.is_empty() {
            result.add_error(ValidationError::new("cache", "Cache keys cannot be empty"));
        }

        if cache.score_key == cache.insights_key {
            result.add_error(ValidationError::new(
                "cache.insights_key",
                "score_key and insights_key must differ",
            ));
        }

        if cache.insights_ttl_seconds == 0 {
            result.add_warning(ValidationWarning::new(
                "cache.insights_ttl_seconds",
                "TTL of 0 disables insight cache hits",
            ));
        }

        if cache.flush_debounce_ms > 10_000 {
            result.add_warning(ValidationWarning::new(
                "cache.flush_debounce_ms",
                "flush debounce is very high (>10s), writes may be lost on crash",
            ));
        }
    }

    fn validate_analysis(config: &Config, result: &mut ValidationResult) {
        if config.analysis.history_capacity == 0 {
            result.add_error(ValidationError::new(
                "analysis.history_capacity",
                "history_capacity must be greater than 0",
            ));
        }

        if config.analysis.max_field_chars == 0 {
            result.add_error(ValidationError::new(
                "analysis.max_field_chars",
                "max_field_chars must be greater than 0",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
