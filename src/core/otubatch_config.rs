use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;


#[derive(Error, Debug)]
pub enum OtubatchConfigError {
  #[error("Filesystem error: {0}")]
  FilesystemError(#[from] std::io::Error),
  #[error("Could not find .otubatch directory")]
  OtubatchDirNotFound,
  #[error("Config Error: {0}")]
  ConfyError(#[from] confy::ConfyError),
  #[error("Otubatch config not found")]
  OtubatchConfigNotFound,
}

#[derive(Serialize, Deserialize, Default, Clone)]
pub struct OtubatchConfig {
  /// Default scheduler kind ("slurm" or "pbs")
  pub scheduler: Option<String>,
  /// Directory of user templates overriding the built-in ones
  pub templates_dir: Option<PathBuf>,
}

/// Initializes the .otubatch directory at the specified path:
/// - Creates the .otubatch directory
/// - Initializes the otubatch.conf configuration file
pub fn init_otubatch_dir(path: &PathBuf) -> Result<(), OtubatchConfigError> {
  let path = path.join(".otubatch");
  std::fs::create_dir_all(&path)?;
  init_otubatch_config_local(&path)?;
  Ok(())
}

/// Searches for the .otubatch directory starting from the current working
/// directory and moving up the directory tree until it finds it or reaches
/// the user's home directory.
pub fn get_otubatch_dir() -> Result<PathBuf, OtubatchConfigError> {
  let home = dirs::home_dir().unwrap_or(PathBuf::from("/"));
  let start = std::env::current_dir()?;
  let mut dir = start.clone();

  loop {
    let candidate = dir.join(".otubatch");
    if candidate.is_dir() {
      return Ok(candidate);
    }
    // Stop if we reach the home directory
    if dir == home {
      break;
    }
    // Stop if we reach the root directory
    if !dir.pop() {
      break;
    }
  }

  Err(OtubatchConfigError::OtubatchDirNotFound)
}

pub fn get_otubatch_config_global() -> Result<OtubatchConfig, OtubatchConfigError> {
  let config: OtubatchConfig = confy::load("otubatch", "config")?;
  Ok(config)
}

pub fn get_otubatch_config_local(path: &PathBuf) -> Result<OtubatchConfig, OtubatchConfigError> {
  if !path.join("otubatch.conf").is_file() {
    return Err(OtubatchConfigError::OtubatchConfigNotFound);
  }
  let config: OtubatchConfig = confy::load_path(path.join("otubatch.conf"))?;
  Ok(config)
}

pub fn init_otubatch_config_global() -> Result<(), OtubatchConfigError> {
  let cfg_path = confy::get_configuration_file_path("otubatch", "config")?;
  if !cfg_path.exists() {
    let config = OtubatchConfig::default();
    confy::store("otubatch", "config", config)?;
    println!("Created global configuration file at '{:?}'", cfg_path);
  }
  Ok(())
}

pub fn init_otubatch_config_local(path: &PathBuf) -> Result<(), OtubatchConfigError> {
  let config = OtubatchConfig::default();
  confy::store_path(path.join("otubatch.conf"), config)?;
  Ok(())
}

pub fn set_otubatch_config_global(config: &OtubatchConfig) -> Result<(), OtubatchConfigError> {
  confy::store("otubatch", "config", config)?;
  Ok(())
}

pub fn set_otubatch_config_local(
  path: &PathBuf,
  config: &OtubatchConfig,
) -> Result<(), OtubatchConfigError> {
  confy::store_path(path.join("otubatch.conf"), config)?;
  Ok(())
}
