use crate::model::{validate_page_config, PageConfig};
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "formset.yaml";

/// Resolve the page description: explicit path, then `FORMSET_TUI_CONFIG`, then discovery of
/// `formset.yaml` in CWD, `CWD/.tui` and `<ancestor>/.tui`.
pub fn resolve_config_path(arg: Option<String>) -> Result<PathBuf> {
    if let Some(p) = arg {
        return Ok(PathBuf::from(p));
    }
    if let Ok(p) = std::env::var("FORMSET_TUI_CONFIG") {
        return Ok(PathBuf::from(p));
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    discover_from(&cwd).ok_or_else(|| {
        anyhow!(
            "No page config found. Pass a path, set FORMSET_TUI_CONFIG, or place {CONFIG_FILE} in CWD/.tui and ancestors"
        )
    })
}

pub(crate) fn discover_from(start: &Path) -> Option<PathBuf> {
    let candidates = [
        start.join(CONFIG_FILE),
        start.join(".tui").join(CONFIG_FILE),
    ];
    if let Some(p) = candidates.iter().find(|p| p.exists()) {
        return Some(p.clone());
    }
    let mut cur = start;
    while let Some(parent) = cur.parent() {
        let p = parent.join(".tui").join(CONFIG_FILE);
        if p.exists() {
            return Some(p);
        }
        cur = parent;
    }
    None
}

pub fn read_page_config(path: &Path) -> Result<PageConfig> {
    let s = fs::read_to_string(path).with_context(|| format!("reading {path:?}"))?;
    let cfg: PageConfig = serde_yaml::from_str(&s).map_err(|e| {
        if let Some(loc) = e.location() {
            anyhow!("{}:{}:{}: {}", path.display(), loc.line(), loc.column(), e)
        } else {
            anyhow!("{}: {}", path.display(), e)
        }
    })?;
    validate_page_config(&cfg).map_err(|e| anyhow!("{}: {}", path.display(), e))?;
    Ok(cfg)
}

pub fn load_page_config(arg: Option<String>) -> Result<(PathBuf, PageConfig)> {
    let path = resolve_config_path(arg)?;
    let cfg = read_page_config(&path)?;
    Ok((path, cfg))
}

#[cfg(test)]
mod loader_tests;
