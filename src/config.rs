use anyhow::Result;
use std::path::PathBuf;

use crate::gate::AccessGate;

pub(crate) const DATA_DIR_ENV: &str = "KITTI_DATA_DIR";
pub(crate) const EDIT_DIGEST_ENV: &str = "KITTI_EDIT_DIGEST";
const DATA_DIR_FLAG: &str = "--data-dir";

/// Process-wide settings. Everything has a default; nothing is required.
#[derive(Debug)]
pub(crate) struct Settings {
    pub(crate) data_dir: PathBuf,
    pub(crate) gate: AccessGate,
}

impl Settings {
    /// Resolve settings from the raw process arguments and an environment
    /// lookup. `--data-dir <path>` wins over `KITTI_DATA_DIR`, which wins over
    /// the platform data directory. Returns the arguments with the flag removed.
    pub(crate) fn resolve<F>(args: Vec<String>, env: F) -> Result<(Self, Vec<String>)>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut rest = Vec::with_capacity(args.len());
        let mut flag_dir = None;
        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            if arg == DATA_DIR_FLAG {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("{DATA_DIR_FLAG} needs a path"))?;
                flag_dir = Some(value);
            } else if let Some(value) = arg.strip_prefix("--data-dir=") {
                flag_dir = Some(value.to_string());
            } else {
                rest.push(arg);
            }
        }

        let data_dir = match flag_dir.or_else(|| env(DATA_DIR_ENV).filter(|v| !v.is_empty())) {
            Some(dir) => PathBuf::from(expand_home(&dir, &env)),
            None => default_data_dir()?,
        };

        let gate = match env(EDIT_DIGEST_ENV).filter(|v| !v.is_empty()) {
            Some(digest) => AccessGate::with_digest(&digest)?,
            None => AccessGate::default(),
        };

        Ok((Self { data_dir, gate }, rest))
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "kitti", "Kitti")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(proj_dirs.data_dir().to_path_buf())
}

pub(crate) fn expand_home<F>(path: &str, env: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(rest) = path.strip_prefix("~/") {
        let home = env("HOME").unwrap_or_else(|| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
