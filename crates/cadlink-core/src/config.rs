//! Configuration file serialization

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{CONFIG_VERSION, DEFAULT_DELIMITER};
use crate::export::ExportOptions;
use crate::import::{HeaderMode, ImportOptions, ParseOptions};
use crate::units::Unit;

/// Persistent client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CadlinkConfig {
    /// File format version
    pub version: u32,
    /// Unit assumed for CSV imports when none is given explicitly
    pub default_unit: Option<Unit>,
    /// CSV field delimiter (a single ASCII character)
    pub delimiter: char,
    /// Header handling for imports
    pub header: HeaderMode,
    /// Whether exports start with an `x,y,z` row
    pub export_header: bool,
    /// Directory that relative document paths are resolved against
    pub document_dir: Option<PathBuf>,
}

impl Default for CadlinkConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            default_unit: None,
            delimiter: char::from(DEFAULT_DELIMITER),
            header: HeaderMode::Detect,
            export_header: true,
            document_dir: None,
        }
    }
}

impl CadlinkConfig {
    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = self.to_bytes()?;
        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// Serialize configuration to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        Ok(content.into_bytes())
    }

    /// Load configuration from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        ron::from_str(&content).map_err(|e| ConfigError::Deserialize(e.to_string()))
    }

    /// Load configuration from bytes
    pub fn load_from_bytes(data: &[u8]) -> Result<Self, ConfigError> {
        let content =
            std::str::from_utf8(data).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))
    }

    /// Configured delimiter as a CSV byte
    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        delimiter_byte(self.delimiter)
    }

    /// Build import options, preferring `unit` over the configured default
    pub fn import_options(&self, unit: Option<Unit>) -> Result<ImportOptions, ConfigError> {
        let unit = unit.or(self.default_unit).ok_or(ConfigError::MissingUnit)?;
        Ok(ImportOptions {
            unit,
            parse: ParseOptions {
                delimiter: self.delimiter_byte()?,
                header: self.header,
            },
        })
    }

    /// Build export options, writing millimeters unless `unit` is given
    pub fn export_options(&self, unit: Option<Unit>) -> Result<ExportOptions, ConfigError> {
        Ok(ExportOptions {
            unit: unit.unwrap_or(Unit::Millimeter),
            delimiter: self.delimiter_byte()?,
            write_header: self.export_header,
        })
    }

    /// Resolve a document path against `document_dir`
    pub fn resolve_document_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        match &self.document_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// Convert a delimiter character to the byte the CSV reader and writer use
pub fn delimiter_byte(delimiter: char) -> Result<u8, ConfigError> {
    u8::try_from(delimiter)
        .ok()
        .filter(|b| b.is_ascii() && !matches!(*b, b'\n' | b'\r'))
        .ok_or(ConfigError::InvalidDelimiter(delimiter))
}

/// Configuration-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    #[error("No unit given and no default_unit configured")]
    MissingUnit,
    #[error("Delimiter must be a single ASCII character other than a line break, got {0:?}")]
    InvalidDelimiter(char),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("cadlink.ron");

        let config = CadlinkConfig {
            default_unit: Some(Unit::Inch),
            delimiter: ';',
            document_dir: Some(PathBuf::from("/parts")),
            ..CadlinkConfig::default()
        };
        config.save(&path).unwrap();

        assert_eq!(CadlinkConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = CadlinkConfig::load_from_bytes(b"(default_unit: Some(Meter))").unwrap();
        assert_eq!(config.default_unit, Some(Unit::Meter));
        assert_eq!(config.delimiter, ',');
        assert!(config.export_header);
    }

    #[test]
    fn test_import_options_require_unit() {
        let config = CadlinkConfig::default();
        assert!(matches!(
            config.import_options(None),
            Err(ConfigError::MissingUnit)
        ));

        let options = config.import_options(Some(Unit::Centimeter)).unwrap();
        assert_eq!(options.unit, Unit::Centimeter);
    }

    #[test]
    fn test_explicit_unit_overrides_default() {
        let config = CadlinkConfig {
            default_unit: Some(Unit::Meter),
            ..CadlinkConfig::default()
        };
        assert_eq!(config.import_options(None).unwrap().unit, Unit::Meter);
        assert_eq!(
            config.import_options(Some(Unit::Inch)).unwrap().unit,
            Unit::Inch
        );
    }

    #[test]
    fn test_delimiter_is_converted_to_byte() {
        let config = CadlinkConfig {
            default_unit: Some(Unit::Meter),
            delimiter: '\t',
            ..CadlinkConfig::default()
        };
        assert_eq!(config.import_options(None).unwrap().parse.delimiter, b'\t');
        assert_eq!(config.export_options(None).unwrap().delimiter, b'\t');
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let config = CadlinkConfig {
            default_unit: Some(Unit::Meter),
            delimiter: '§',
            ..CadlinkConfig::default()
        };
        assert!(matches!(
            config.import_options(None),
            Err(ConfigError::InvalidDelimiter('§'))
        ));
        assert!(matches!(
            config.export_options(None),
            Err(ConfigError::InvalidDelimiter('§'))
        ));
        assert!(matches!(
            delimiter_byte('\n'),
            Err(ConfigError::InvalidDelimiter('\n'))
        ));
    }

    #[test]
    fn test_resolve_document_path() {
        let config = CadlinkConfig {
            document_dir: Some(PathBuf::from("/parts")),
            ..CadlinkConfig::default()
        };
        assert_eq!(
            config.resolve_document_path("bracket.ron"),
            PathBuf::from("/parts/bracket.ron")
        );
        assert_eq!(
            config.resolve_document_path("/tmp/other.ron"),
            PathBuf::from("/tmp/other.ron")
        );
    }

    #[test]
    fn test_invalid_file() {
        assert!(matches!(
            CadlinkConfig::load_from_bytes(b"(delimiter: 42"),
            Err(ConfigError::Deserialize(_))
        ));
    }
}
