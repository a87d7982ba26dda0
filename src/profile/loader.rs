//! Profile loading.
//!
//! Loading priority (first hit wins):
//! - explicit `--profile` path
//! - `docx2chapters.toml` in the working directory
//! - `<config dir>/docx2chapters/profile.toml`
//! - the profile embedded in the binary

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::schema::{Profile, ProfileFile};
use crate::config::Config;

/// File name looked up in the working directory
pub const WORKSPACE_PROFILE: &str = "docx2chapters.toml";

const EMBEDDED_PROFILE: &str = include_str!("../../resources/default-profile.toml");

/// Where the active profile came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileSource {
    BuiltIn,
    UserGlobal(PathBuf),
    Workspace(PathBuf),
    Explicit(PathBuf),
}

impl ProfileSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ProfileSource::BuiltIn => None,
            ProfileSource::UserGlobal(p)
            | ProfileSource::Workspace(p)
            | ProfileSource::Explicit(p) => Some(p),
        }
    }
}

/// A validated profile together with its origin
#[derive(Debug, Clone)]
pub struct LoadedProfile {
    pub profile: Profile,
    pub source: ProfileSource,
    /// Directory relative profile paths are resolved against
    pub base_dir: PathBuf,
}

impl LoadedProfile {
    /// Resolve a path from the profile against the profile's directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

/// Finds and parses the profile to use for a run
#[derive(Debug, Clone)]
pub struct ProfileLoader {
    explicit: Option<PathBuf>,
    /// Candidate files in priority order
    candidates: Vec<ProfileSource>,
}

impl ProfileLoader {
    /// Create a loader following the standard discovery order
    pub fn new(config: &Config) -> Result<Self> {
        let mut candidates = Vec::new();

        // Current workspace directory: ./docx2chapters.toml
        let workspace = std::env::current_dir()?.join(WORKSPACE_PROFILE);
        candidates.push(ProfileSource::Workspace(workspace));

        // User global directory: ~/.config/docx2chapters/profile.toml
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(ProfileSource::UserGlobal(
                config_dir.join("docx2chapters").join("profile.toml"),
            ));
        }

        Ok(Self {
            explicit: config.profile_path.clone(),
            candidates,
        })
    }

    /// Loader that only knows the embedded profile plus an optional explicit file
    pub fn with_explicit(explicit: Option<PathBuf>) -> Self {
        Self {
            explicit,
            candidates: Vec::new(),
        }
    }

    /// The profile shipped with the binary
    pub fn embedded() -> Result<Profile> {
        let file: ProfileFile =
            toml::from_str(EMBEDDED_PROFILE).context("Failed to parse built-in profile TOML")?;
        Profile::try_from(file)
    }

    /// Resolve the profile to use
    pub fn load(&self) -> Result<LoadedProfile> {
        let base = Self::embedded()?;

        if let Some(path) = &self.explicit {
            return Self::load_file(base, path, ProfileSource::Explicit(path.clone()));
        }

        for candidate in &self.candidates {
            if let Some(path) = candidate.path() {
                if path.is_file() {
                    return Self::load_file(base, path, candidate.clone());
                }
            }
        }

        log::debug!("Using built-in profile");
        base.validate()?;
        Ok(LoadedProfile {
            profile: base,
            source: ProfileSource::BuiltIn,
            base_dir: std::env::current_dir()?,
        })
    }

    fn load_file(base: Profile, path: &Path, source: ProfileSource) -> Result<LoadedProfile> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile file: {}", path.display()))?;
        let file: ProfileFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse profile TOML: {}", path.display()))?;

        let profile = base.overlay(file);
        profile
            .validate()
            .with_context(|| format!("Invalid profile: {}", path.display()))?;

        log::info!("Loaded profile {}", path.display());

        let base_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => std::env::current_dir()?,
        };

        Ok(LoadedProfile {
            profile,
            source,
            base_dir,
        })
    }
}
