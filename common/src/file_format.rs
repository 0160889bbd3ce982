use std::path::Path;

use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum FileExtensionError {
    #[error("Failed to get file extension")]
    MissingFileExtension,
    #[error("Unsupported file extension for file: {0}")]
    UnsupportedFileExtension(String),
}

pub type FileFormatResult<T> = Result<T, FileExtensionError>;

#[derive(Debug, thiserror::Error)]
pub enum SerdeFormatError {
    #[error("YAML deserialization failed")]
    Yaml(#[from] serde_yml::Error),
    #[error("JSON deserialization failed")]
    Json(#[from] serde_json::Error),
}

pub type SerdeFormatResult<T> = Result<T, SerdeFormatError>;

pub fn get_file_extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|os_str| os_str.to_str())
}

/// Text formats accepted for configuration files.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SerdeFormat {
    Yaml,
    Json,
}

impl SerdeFormat {
    pub fn from_path(path: &Path) -> FileFormatResult<Self> {
        let ext = get_file_extension(path).ok_or(FileExtensionError::MissingFileExtension)?;

        if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") {
            Ok(Self::Yaml)
        } else if ext.eq_ignore_ascii_case("json") {
            Ok(Self::Json)
        } else {
            Err(FileExtensionError::UnsupportedFileExtension(
                path.display().to_string(),
            ))
        }
    }

    pub fn deserialize<T: DeserializeOwned + 'static>(self, text: &str) -> SerdeFormatResult<T> {
        match self {
            Self::Yaml => Ok(serde_yml::from_str(text)?),
            Self::Json => Ok(serde_json::from_str(text)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            SerdeFormat::from_path(Path::new("reduce.yaml")).unwrap(),
            SerdeFormat::Yaml
        );
        assert_eq!(
            SerdeFormat::from_path(Path::new("reduce.YML")).unwrap(),
            SerdeFormat::Yaml
        );
        assert_eq!(
            SerdeFormat::from_path(Path::new("/tmp/reduce.json")).unwrap(),
            SerdeFormat::Json
        );
    }

    #[test]
    fn test_missing_and_unsupported_extension() {
        assert!(matches!(
            SerdeFormat::from_path(Path::new("reduce")),
            Err(FileExtensionError::MissingFileExtension)
        ));
        let err = SerdeFormat::from_path(Path::new("reduce.toml")).unwrap_err();
        assert!(err.to_string().contains("reduce.toml"));
    }

    #[test]
    fn test_deserialize_both_formats() {
        let from_yaml: Vec<u32> = SerdeFormat::Yaml.deserialize("- 1\n- 2\n").unwrap();
        let from_json: Vec<u32> = SerdeFormat::Json.deserialize("[1, 2]").unwrap();
        assert_eq!(from_yaml, vec![1, 2]);
        assert_eq!(from_json, from_yaml);
    }

    #[test]
    fn test_deserialize_error_is_tagged() {
        let err = SerdeFormat::Json.deserialize::<Vec<u32>>("{").unwrap_err();
        assert!(matches!(err, SerdeFormatError::Json(_)));
    }
}
