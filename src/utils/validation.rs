use crate::domain::settings::{OutputFormat, ScannerConfig};
use crate::utils::error::{AuditError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(AuditError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(AuditError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_file_extension(field_name: &str, file: &str, allowed_extensions: &[&str]) -> Result<()> {
    let allowed: HashSet<&str> = allowed_extensions.iter().copied().collect();

    match std::path::Path::new(file).extension().and_then(|ext| ext.to_str()) {
        Some(extension) if allowed.contains(extension.to_ascii_lowercase().as_str()) => Ok(()),
        Some(extension) => Err(AuditError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                extension,
                allowed_extensions.join(", ")
            ),
        }),
        None => Err(AuditError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: "File has no extension or invalid filename".to_string(),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AuditError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_output_formats(field_name: &str, formats: &[OutputFormat]) -> Result<()> {
    if formats.is_empty() {
        return Err(AuditError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    Ok(())
}

/// Column conventions and classification tables must leave the scanner something to match.
pub fn validate_scanner(config: &ScannerConfig) -> Result<()> {
    if config.label_column == config.value_column {
        return Err(AuditError::InvalidConfigValueError {
            field: "scanner.value_column".to_string(),
            value: config.value_column.to_string(),
            reason: "Value column must differ from the label column".to_string(),
        });
    }

    if config.outlets.is_empty() {
        return Err(AuditError::MissingConfigError {
            field: "scanner.outlets".to_string(),
        });
    }

    for outlet in &config.outlets {
        validate_non_empty_string("scanner.outlets.label", &outlet.label)?;
    }
    validate_non_empty_string("scanner.screen_keyword", &config.screen_keyword)?;

    let screen_keyword = config.screen_keyword.to_lowercase();
    if let Some(token) = config
        .category_tokens
        .iter()
        .find(|t| t.to_lowercase().contains(&screen_keyword))
    {
        return Err(AuditError::InvalidConfigValueError {
            field: "scanner.category_tokens".to_string(),
            value: token.clone(),
            reason: format!("Category token contains the screen keyword '{}'", config.screen_keyword),
        });
    }

    Ok(())
}
