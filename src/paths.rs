use std::path::PathBuf;

/// Overrides the data directory, for portable installs and tests.
pub const DATA_DIR_ENV: &str = "CHROMAPICKER_DATA_DIR";

pub const VENDOR_DIR: &str = "Archtoys";
pub const PRODUCT_DIR: &str = "ChromaPicker";

pub const SETTINGS_FILE: &str = "Settings.json";
pub const HISTORY_FILE: &str = "History.json";

/// Per-user directory holding the settings and history documents.
///
/// Without a platform data directory this falls back to `./ChromaPicker`.
pub fn data_dir() -> PathBuf {
    resolve(std::env::var(DATA_DIR_ENV).ok(), dirs::data_dir())
}

fn resolve(override_dir: Option<String>, platform_dir: Option<PathBuf>) -> PathBuf {
    match (override_dir, platform_dir) {
        (Some(dir), _) if !dir.is_empty() => PathBuf::from(dir),
        (_, Some(dir)) => dir.join(VENDOR_DIR).join(PRODUCT_DIR),
        _ => PathBuf::from(PRODUCT_DIR),
    }
}

pub fn settings_path() -> PathBuf {
    data_dir().join(SETTINGS_FILE)
}

pub fn history_path() -> PathBuf {
    data_dir().join(HISTORY_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_platform_dir() {
        let dir = resolve(Some("/tmp/portable".into()), Some("/home/u/.local/share".into()));
        assert_eq!(dir, PathBuf::from("/tmp/portable"));
    }

    #[test]
    fn empty_override_is_ignored() {
        let dir = resolve(Some(String::new()), Some(PathBuf::from("/data")));
        assert_eq!(dir, PathBuf::from("/data/Archtoys/ChromaPicker"));
    }

    #[test]
    fn missing_data_dir_falls_back_to_working_dir() {
        assert_eq!(resolve(None, None), PathBuf::from("ChromaPicker"));
    }
}
