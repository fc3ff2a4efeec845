use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Small per-user settings that survive between sessions.
pub trait PreferenceStore {
    /// Last selected dog, if one was saved and can be read.
    fn active_dog_id(&self) -> Option<String>;

    fn set_active_dog_id(&mut self, dog_id: &str) -> io::Result<()>;
}

#[derive(Serialize, Deserialize, Debug, Default)]
struct Preferences {
    #[serde(default)]
    active_dog_id: Option<String>,
}

/// Preferences kept as `prefs.json`.
#[derive(Debug, Clone)]
pub struct FilePreferences {
    path: PathBuf,
}

impl FilePreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FilePreferences { path: path.into() }
    }

    /// Preferences stored in the same directory as the database file.
    pub fn beside(db_path: &Path) -> Self {
        let mut p = db_path.to_path_buf();
        p.pop();
        p.push("prefs.json");
        FilePreferences::new(p)
    }

    fn load(&self) -> Preferences {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }
}

impl PreferenceStore for FilePreferences {
    fn active_dog_id(&self) -> Option<String> {
        self.load().active_dog_id
    }

    fn set_active_dog_id(&mut self, dog_id: &str) -> io::Result<()> {
        let mut prefs = self.load();
        prefs.active_dog_id = Some(dog_id.to_string());
        let s = serde_json::to_string_pretty(&prefs)?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, s)
    }
}
