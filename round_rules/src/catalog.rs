use std::{
    collections::HashMap,
    env, fs,
    hash::Hash,
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Errors raised while reading one of the JSON-backed catalogs.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse {catalog}: {source}")]
    Parse {
        catalog: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to read {catalog} from {path:?}: {source}")]
    Read {
        catalog: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("duplicate {catalog} id `{id}`")]
    DuplicateId { catalog: &'static str, id: String },
}

/// Where a catalog was loaded from; `None` means the compiled-in data.
#[derive(Debug, Clone, Default)]
pub struct CatalogSource {
    path: Option<PathBuf>,
}

impl CatalogSource {
    pub fn builtin() -> Self {
        Self { path: None }
    }

    pub fn file(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_builtin(&self) -> bool {
        self.path.is_none()
    }
}

pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(
    catalog: &'static str,
    input: &str,
) -> Result<T, CatalogError> {
    serde_json::from_str(input).map_err(|source| CatalogError::Parse { catalog, source })
}

pub(crate) fn read_file(catalog: &'static str, path: &Path) -> Result<String, CatalogError> {
    fs::read_to_string(path).map_err(|source| CatalogError::Read {
        catalog,
        path: path.to_path_buf(),
        source,
    })
}

/// Builds an id → position index, rejecting duplicate ids.
pub(crate) fn unique_index<K, T>(
    catalog: &'static str,
    items: &[T],
    key: impl Fn(&T) -> &K,
) -> Result<HashMap<K, usize>, CatalogError>
where
    K: Clone + Eq + Hash + ToString,
{
    let mut index = HashMap::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let id = key(item);
        if index.insert(id.clone(), idx).is_some() {
            return Err(CatalogError::DuplicateId {
                catalog,
                id: id.to_string(),
            });
        }
    }
    Ok(index)
}

/// Loads a catalog from the file named by `env_var`, falling back to the
/// compiled-in copy when the variable is unset or the file cannot be used.
pub(crate) fn load_from_env<T>(
    catalog: &'static str,
    env_var: &str,
    from_file: impl Fn(&Path) -> Result<T, CatalogError>,
    builtin: impl FnOnce() -> T,
) -> (T, CatalogSource) {
    if let Some(path) = env::var(env_var).ok().map(PathBuf::from) {
        match from_file(&path) {
            Ok(loaded) => {
                tracing::info!(
                    target: "round_rules::catalog",
                    catalog,
                    path = %path.display(),
                    "catalog.loaded=file"
                );
                return (loaded, CatalogSource::file(path));
            }
            Err(err) => {
                tracing::warn!(
                    target: "round_rules::catalog",
                    catalog,
                    path = %path.display(),
                    error = %err,
                    "catalog.load_failed"
                );
            }
        }
    }

    let loaded = builtin();
    tracing::info!(target: "round_rules::catalog", catalog, "catalog.loaded=builtin");
    (loaded, CatalogSource::builtin())
}
