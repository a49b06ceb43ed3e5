//! Loader for RON content files at startup.

use ron::Options;
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::data::{DataFile, PlayerProfileDef, SCHEMA_VERSION};
use super::registry::ContentRegistry;
use super::validation::{ValidationError, validate_content};

pub const PLAYER_FILE: &str = "player.ron";

/// Error type for content loading failures.
#[derive(Debug, Error)]
pub enum ContentLoadError {
    #[error("Failed to load {file}: IO error: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to load {file}: Parse error: {source}")]
    Parse {
        file: String,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("{file}: unsupported schema_version {found}, expected {expected}")]
    Schema {
        file: String,
        found: u32,
        expected: u32,
    },
    #[error("{file}: duplicate profile id '{id}'")]
    DuplicateId { file: String, id: String },
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Create RON options with extensions enabled for more flexible parsing.
fn ron_options() -> Options {
    Options::default().with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME)
}

/// Parse the contents of a RON file containing a DataFile<T> wrapper.
pub fn parse_data_file<T>(contents: &str, file: &str) -> Result<Vec<T>, ContentLoadError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let data: DataFile<T> =
        ron_options()
            .from_str(contents)
            .map_err(|source| ContentLoadError::Parse {
                file: file.to_string(),
                source,
            })?;

    if data.schema_version != SCHEMA_VERSION {
        return Err(ContentLoadError::Schema {
            file: file.to_string(),
            found: data.schema_version,
            expected: SCHEMA_VERSION,
        });
    }

    Ok(data.items)
}

/// Load a RON file containing a DataFile<T> wrapper.
fn load_data_file<T>(path: &Path) -> Result<Vec<T>, ContentLoadError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let file = path.display().to_string();
    let contents = fs::read_to_string(path).map_err(|source| ContentLoadError::Io {
        file: file.clone(),
        source,
    })?;
    parse_data_file(&contents, &file)
}

/// Build a registry from parsed profiles, rejecting duplicate ids.
pub fn registry_from_profiles(
    profiles: Vec<PlayerProfileDef>,
    file: &str,
) -> Result<ContentRegistry, ContentLoadError> {
    let mut registry = ContentRegistry::default();
    for profile in profiles {
        if registry.profiles.contains_key(&profile.id) {
            return Err(ContentLoadError::DuplicateId {
                file: file.to_string(),
                id: profile.id,
            });
        }
        registry.profiles.insert(profile.id.clone(), profile);
    }
    Ok(registry)
}

/// Load all content from assets/data/*.ron into a ContentRegistry.
pub fn load_all_content(base_path: &Path) -> Result<ContentRegistry, ContentLoadError> {
    let path = base_path.join(PLAYER_FILE);
    let profiles = load_data_file::<PlayerProfileDef>(&path)?;
    registry_from_profiles(profiles, &path.display().to_string())
}

/// Load and validate content. Every problem found is returned, not just
/// the first.
pub fn load_validated(base_path: &Path) -> Result<ContentRegistry, Vec<ContentLoadError>> {
    let registry = load_all_content(base_path).map_err(|e| vec![e])?;
    let errors = validate_content(&registry);
    if errors.is_empty() {
        Ok(registry)
    } else {
        Err(errors.into_iter().map(ContentLoadError::from).collect())
    }
}
