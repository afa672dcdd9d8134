//! Suite file loader.
//!
//! Suites are YAML by default; a file with a `.json` extension is read as
//! JSON.

use crate::config::error::{ConfigError, ConfigResult};
use mp_protocol::suite_models::TestSuite;
use std::path::Path;
use tracing::debug;

/// Loads and validates a suite file.
///
/// # Arguments
///
/// * `path` - Path to the suite file
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - The file cannot be read
/// - The file is not valid YAML (or JSON, for `.json` files)
/// - The suite has no cases, or a case names no process class
///
/// # Example
///
/// ```rust,no_run
/// use mp_core::config::loader::load_suite;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let suite = load_suite(Path::new("process.suite.yaml")).await?;
/// println!("Loaded {} cases", suite.processes.len());
/// # Ok(())
/// # }
/// ```
pub async fn load_suite(path: &Path) -> ConfigResult<TestSuite> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

    let is_json = path.extension().and_then(|s| s.to_str()) == Some("json");
    let suite = if is_json {
        serde_json::from_str(&content).map_err(|source| ConfigError::JsonParse {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        parse_suite(&content).map_err(|source| ConfigError::YamlParse {
            path: path.to_path_buf(),
            source,
        })?
    };

    validate(&suite).map_err(|reason| ConfigError::InvalidSuite {
        path: path.to_path_buf(),
        reason,
    })?;
    debug!(path = %path.display(), cases = suite.processes.len(), "suite loaded");
    Ok(suite)
}

/// Parses suite YAML without validating it.
pub fn parse_suite(content: &str) -> Result<TestSuite, serde_yaml::Error> {
    serde_yaml::from_str(content)
}

fn validate(suite: &TestSuite) -> Result<(), String> {
    if suite.processes.is_empty() {
        return Err("no test cases under processes".to_string());
    }
    for (name, case) in &suite.processes {
        if case.process.class.trim().is_empty() {
            return Err(format!("case '{name}' has an empty process class"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const SUITE: &str = r#"
test: echo
processes:
  echo:
    process:
      name: echo back
      class: internal:echo
    message:
      request:
        value: 1
    result:
      value: 1
"#;

    #[tokio::test]
    async fn test_load_yaml_suite() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("process.suite.yaml");
        fs::write(&path, SUITE).expect("Failed to write suite");

        let suite = load_suite(&path).await.unwrap();
        assert_eq!(suite.selected_cases(), vec!["echo".to_string()]);
        assert_eq!(suite.processes["echo"].process.class, "internal:echo");
    }

    #[tokio::test]
    async fn test_load_json_suite() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("suite.json");
        fs::write(
            &path,
            r#"{"processes": {"e": {"process": {"class": "internal:echo"}, "message": {}}}}"#,
        )
        .expect("Failed to write suite");

        let suite = load_suite(&path).await.unwrap();
        assert!(suite.processes["e"].result.is_none());
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        let err = load_suite(&dir.path().join("absent.yaml")).await.unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));
    }

    #[tokio::test]
    async fn test_invalid_yaml() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "processes: [unclosed").expect("Failed to write suite");
        let err = load_suite(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::YamlParse { .. }));
    }

    #[tokio::test]
    async fn test_empty_suite_rejected() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("empty.yaml");
        fs::write(&path, "test: nothing\n").expect("Failed to write suite");
        let err = load_suite(&path).await.unwrap_err();
        assert!(err.to_string().contains("no test cases"));
    }
}
