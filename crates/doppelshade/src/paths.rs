use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories_next::ProjectDirs;

pub const ENV_CONFIG_DIR: &str = "DOPPELSHADE_CONFIG_DIR";

const QUALIFIER: &str = "org";
const ORGANISATION: &str = "Doppelshade";
const APPLICATION: &str = "doppelshade";

#[derive(Debug, Clone)]
pub struct AppPaths {
    config_dir: PathBuf,
}

impl AppPaths {
    pub fn discover() -> Result<Self> {
        if let Some(config_dir) = env_override(ENV_CONFIG_DIR) {
            return Ok(Self { config_dir });
        }
        let project_dirs = ProjectDirs::from(QUALIFIER, ORGANISATION, APPLICATION)
            .ok_or_else(|| anyhow!("failed to determine user directories"))?;
        Ok(Self {
            config_dir: project_dirs.config_dir().to_path_buf(),
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn stage_file(&self) -> PathBuf {
        self.config_dir.join("stage.toml")
    }
}

fn env_override(var: &str) -> Option<PathBuf> {
    env::var_os(var)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_file_lives_in_config_dir() {
        let paths = AppPaths {
            config_dir: PathBuf::from("/tmp/doppelshade"),
        };
        assert_eq!(
            paths.stage_file(),
            PathBuf::from("/tmp/doppelshade/stage.toml")
        );
    }
}
