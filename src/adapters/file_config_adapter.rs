//! INI file configuration adapter.

use crate::domain::error::FearGreedError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

/// Pipeline settings parsed from an INI file. Section and key names are
/// case-insensitive; every lookup is optional.
pub struct FileConfigAdapter {
    ini: Ini,
}

impl FileConfigAdapter {
    /// Loads `path`; an unreadable or malformed file is a `ConfigParse` error
    /// naming the file.
    pub fn from_file(path: &Path) -> Result<Self, FearGreedError> {
        let mut ini = Ini::new();
        ini.load(path)
            .map_err(|reason| config_parse_error(&path.display().to_string(), reason))?;
        Ok(Self { ini })
    }

    /// Parses INI text held in memory. `origin` names it in errors.
    pub fn from_string(content: &str, origin: &str) -> Result<Self, FearGreedError> {
        let mut ini = Ini::new();
        ini.read(content.to_owned())
            .map_err(|reason| config_parse_error(origin, reason))?;
        Ok(Self { ini })
    }
}

fn config_parse_error(file: &str, reason: String) -> FearGreedError {
    FearGreedError::ConfigParse {
        file: file.to_owned(),
        reason,
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.ini.get(section, key)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.ini
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }
}
