//! Repository path naming policies.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

/// How repositories are laid out under the storage root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathLayout {
    /// `<vcs>/<scheme>/<host>/<path>`, readable by humans.
    #[default]
    Flat,
    /// `aa/bb/<rest of sha256>`, fixed depth regardless of the URL.
    Hashed,
}

impl PathLayout {
    /// Storage path of a repository, relative to the storage root.
    pub fn repository_path(self, vcs_type: &str, clone_url: &Url) -> PathBuf {
        match self {
            PathLayout::Flat => flat_repository_path(vcs_type, clone_url),
            PathLayout::Hashed => hashed_repository_path(vcs_type, clone_url),
        }
    }
}

impl fmt::Display for PathLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathLayout::Flat => write!(f, "flat"),
            PathLayout::Hashed => write!(f, "hashed"),
        }
    }
}

/// Human-readable layout. Userinfo, query and fragment are not part of it.
pub fn flat_repository_path(vcs_type: &str, clone_url: &Url) -> PathBuf {
    let mut path = PathBuf::from(component(vcs_type));
    path.push(component(clone_url.scheme()));

    let host = match (clone_url.host_str(), clone_url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => "_".to_string(),
    };
    path.push(component(&host));

    for segment in clone_url.path().split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            continue;
        }
        path.push(component(segment));
    }
    path
}

/// Fixed-depth layout keyed by the hash of the VCS type and clone URL.
pub fn hashed_repository_path(vcs_type: &str, clone_url: &Url) -> PathBuf {
    let digest = Sha256::digest(format!("{vcs_type}:{}", clone_url.as_str()).as_bytes());
    let hash = hex::encode(digest);

    let mut path = PathBuf::from(&hash[..2]);
    path.push(&hash[2..4]);
    path.push(&hash[4..]);
    path
}

/// Makes a string safe to use as a single path component.
fn component(raw: &str) -> String {
    match raw {
        "" | "." | ".." => "_".to_string(),
        _ => raw.replace(['/', '\\', '\0'], "_"),
    }
}
