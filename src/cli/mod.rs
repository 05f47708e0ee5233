//! Command implementations

pub mod entries;
pub mod format;
pub mod projects;
pub mod recent;
pub mod sessions;
pub mod show;

use anyhow::Result;

use crate::browser::Browser;
use crate::store::RecordSource;

/// Canonical project path for a command-line argument: a listed project's path
/// or display name, otherwise the argument canonicalized as a working directory.
pub fn project_path<S: RecordSource>(browser: &Browser<S>, arg: &str) -> Result<String> {
    let projects = browser.projects()?;
    let found = projects
        .iter()
        .find(|p| p.canonical_path == arg)
        .or_else(|| projects.iter().find(|p| p.display_name == arg));

    Ok(match found {
        Some(project) => project.canonical_path.clone(),
        None => browser.canonicalize(arg),
    })
}
