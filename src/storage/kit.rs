use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::kit::KitConfig;

pub fn save(kit: &KitConfig, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let data = serde_yaml::to_string(kit)?;
    fs::write(path, data).with_context(|| format!("writing {}", path.display()))
}

/// Reads a YAML kit file. Relative sample locators are resolved against the
/// directory holding the kit file.
pub fn open(path: impl AsRef<Path>) -> Result<KitConfig> {
    let path = path.as_ref();
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut kit: KitConfig =
        serde_yaml::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
    kit.validate().with_context(|| format!("invalid kit {}", path.display()))?;

    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        for locator in kit.samples.values_mut() {
            if Path::new(locator.as_str()).is_relative() {
                *locator = dir.join(locator.as_str()).to_string_lossy().into_owned();
            }
        }
    }
    Ok(kit)
}
