use std::path::{Path, PathBuf};

/// Client data directory (~/.docchat), overridable with `DOCCHAT_DATA_DIR`
pub fn docchat_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("DOCCHAT_DATA_DIR") {
        return PathBuf::from(dir);
    }
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
        .join(".docchat")
}

/// config.json path
pub fn config_json_path() -> PathBuf {
    docchat_dir().join("config.json")
}

/// Persisted credential + cached profile
pub fn credentials_json_path(data_dir: &Path) -> PathBuf {
    data_dir.join("credentials.json")
}

/// Load a JSON file
pub fn load_config_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    if !path.exists() {
        return Err(format!("Config file not found: {}", path.display()));
    }
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read config: {e}"))?;
    serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {e}"))
}

/// Save a JSON file, creating parent directories
pub fn save_config_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| format!("Failed to create directory: {e}"))?;
    }
    let content = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize config: {e}"))?;
    std::fs::write(path, content).map_err(|e| format!("Failed to write config: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn json_round_trip_creates_parent_dirs() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("values.json");
        let mut values = HashMap::new();
        values.insert("auth_token".to_string(), "abc".to_string());

        save_config_json(&path, &values).expect("save");
        let loaded: HashMap<String, String> = load_config_json(&path).expect("load");

        assert_eq!(loaded.get("auth_token").map(String::as_str), Some("abc"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().expect("tempdir");
        let result: Result<HashMap<String, String>, _> =
            load_config_json(&dir.path().join("absent.json"));
        assert!(result.is_err());
    }
}
