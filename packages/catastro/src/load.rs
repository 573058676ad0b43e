//! Builds a [`DatasetStore`] from remote URLs or a local directory.

use std::path::Path;
use std::sync::Arc;

use avm_catastro_models::{DatasetKind, DatasetSource};

use crate::progress::ProgressCallback;
use crate::store::{Collections, DatasetStore};
use crate::{CatastroError, fetch, parse};

/// Fetches every source over HTTP and builds the store.
///
/// # Errors
///
/// Returns [`CatastroError`] if any download fails after retries or any
/// collection cannot be parsed. A failed dataset aborts the whole load.
pub async fn load_remote(
    client: &reqwest::Client,
    sources: &[DatasetSource],
    progress: Arc<dyn ProgressCallback>,
) -> Result<DatasetStore, CatastroError> {
    progress.set_total(sources.len() as u64);
    let mut collections = Collections::default();

    for (idx, source) in sources.iter().enumerate() {
        progress.set_message(format!(
            "Cargando {} ({}/{})",
            source.name,
            idx + 1,
            sources.len()
        ));
        log::info!("Fetching {} from {}", source.kind, source.url);

        let text = fetch::fetch_text(client, &source.url).await?;
        add_collection(&mut collections, source.kind, &text)?;
        progress.inc(1);
    }

    progress.finish("Datos cargados".to_string());
    DatasetStore::new(collections)
}

/// Reads every source's `file_name` from `dir` and builds the store.
///
/// # Errors
///
/// Returns [`CatastroError`] if a file cannot be read or parsed.
pub fn load_dir(
    dir: &Path,
    sources: &[DatasetSource],
    progress: &dyn ProgressCallback,
) -> Result<DatasetStore, CatastroError> {
    progress.set_total(sources.len() as u64);
    let mut collections = Collections::default();

    for source in sources {
        let path = dir.join(&source.file_name);
        progress.set_message(format!("Leyendo {}", path.display()));
        log::info!("Reading {} from {}", source.kind, path.display());

        let text = std::fs::read_to_string(&path)?;
        add_collection(&mut collections, source.kind, &text)?;
        progress.inc(1);
    }

    progress.finish("Datos cargados".to_string());
    DatasetStore::new(collections)
}

/// Parses one collection's text and appends its records.
///
/// # Errors
///
/// Returns [`CatastroError`] if the text is not a `GeoJSON`
/// `FeatureCollection`.
pub fn add_collection(
    collections: &mut Collections,
    kind: DatasetKind,
    text: &str,
) -> Result<(), CatastroError> {
    let features = parse::feature_collection(kind, text)?;
    let total = features.len();

    let parsed = match kind {
        DatasetKind::Localities => {
            let records = parse::localities(&features);
            let n = records.len();
            collections.localities.extend(records);
            n
        }
        DatasetKind::ZoningAreas => {
            let records = parse::zoning_areas(&features);
            let n = records.len();
            collections.zoning_areas.extend(records);
            n
        }
        DatasetKind::Blocks => {
            let records = parse::blocks(&features);
            let n = records.len();
            collections.blocks.extend(records);
            n
        }
        DatasetKind::Transit => {
            let records = parse::point_sites(&features, "id_combi_acceso");
            let n = records.len();
            collections.transit.extend(records);
            n
        }
        DatasetKind::Schools => {
            let records = parse::point_sites(&features, "id_com_colegios");
            let n = records.len();
            collections.schools.extend(records);
            n
        }
    };

    if parsed < total {
        log::warn!("{kind}: kept {parsed} of {total} features");
    } else {
        log::info!("{kind}: parsed {parsed} features");
    }

    Ok(())
}
