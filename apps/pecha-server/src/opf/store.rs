//! OPF store
//!
//! Typed access to the documents of a pecha on top of a pluggable
//! [`OpfBackend`]. Layout of a pecha tree:
//!
//! ```text
//! {pecha}/{pecha}.opf/meta.yml
//! {pecha}/{pecha}.opf/index.yml
//! {pecha}/{pecha}.opf/base/{base}.txt
//! {pecha}/{pecha}.opf/layers/{base}/{Layer}.yml
//! {pecha}/{pecha}.opf/hfml/{work_id}/v{vol:03}.txt
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::S3Config;
use crate::error::{AppError, Result};

use super::backend::{LocalOpfBackend, OpfBackend, S3OpfBackend};
use super::types::{LayerKind, PaginationLayer, PechaIndex, PechaMeta};

/// Directory holding texts saved from the proofreading UI
const SAVED_TEXTS_DIR: &str = "pedurma/saved";

/// Layer directory name of a volume, e.g. `v001`
pub fn volume_dir(vol: u32) -> String {
    format!("v{:03}", vol)
}

/// Main OPF store with pluggable backends
#[derive(Clone)]
pub struct OpfStore {
    backend: Arc<dyn OpfBackend>,
}

impl OpfStore {
    pub fn new(backend: impl OpfBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Create with local filesystem storage
    pub fn with_local_storage(base_path: PathBuf) -> Self {
        Self::new(LocalOpfBackend::new(base_path))
    }

    /// Create with S3 storage
    pub async fn with_s3_storage(config: &S3Config) -> Result<Self> {
        Ok(Self::new(S3OpfBackend::new(config).await?))
    }

    fn opf_dir(pecha_id: &str) -> Result<String> {
        let pecha_id = path_segment(pecha_id)?;
        Ok(format!("{}/{}.opf", pecha_id, pecha_id))
    }

    async fn read_string(&self, key: &str) -> Result<String> {
        let data = self.backend.read(key).await?;
        Ok(String::from_utf8(data)?)
    }

    async fn read_yaml<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<T> {
        let data = self.backend.read(key).await?;
        Ok(serde_yaml::from_slice(&data)?)
    }

    async fn write_yaml<T: serde::Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let yaml = serde_yaml::to_string(value)?;
        self.backend.write(key, yaml.as_bytes()).await?;
        Ok(())
    }

    /// Load `meta.yml`
    pub async fn load_meta(&self, pecha_id: &str) -> Result<PechaMeta> {
        let key = format!("{}/meta.yml", Self::opf_dir(pecha_id)?);
        self.read_yaml(&key).await
    }

    /// Load `index.yml`
    pub async fn load_index(&self, pecha_id: &str) -> Result<PechaIndex> {
        let key = format!("{}/index.yml", Self::opf_dir(pecha_id)?);
        self.read_yaml(&key).await
    }

    fn pagination_key(pecha_id: &str, vol: u32) -> Result<String> {
        Ok(format!(
            "{}/layers/{}/{}",
            Self::opf_dir(pecha_id)?,
            volume_dir(vol),
            LayerKind::Pagination.file_name()
        ))
    }

    /// Load the pagination layer of a volume
    pub async fn load_pagination(&self, pecha_id: &str, vol: u32) -> Result<PaginationLayer> {
        let key = Self::pagination_key(pecha_id, vol)?;
        let layer: PaginationLayer = self.read_yaml(&key).await?;
        tracing::debug!(
            pecha_id = %pecha_id,
            vol = vol,
            pages = layer.annotations.len(),
            "Loaded pagination layer"
        );
        Ok(layer)
    }

    /// Overwrite the pagination layer of a volume
    pub async fn save_pagination(
        &self,
        pecha_id: &str,
        vol: u32,
        layer: &PaginationLayer,
    ) -> Result<()> {
        let key = Self::pagination_key(pecha_id, vol)?;
        self.write_yaml(&key, layer).await?;
        tracing::info!(pecha_id = %pecha_id, vol = vol, "Saved pagination layer");
        Ok(())
    }

    /// Serialized HFML of a work, one entry per volume in ascending order
    pub async fn load_text_volumes(&self, pecha_id: &str, work_id: &str) -> Result<Vec<(u32, String)>> {
        let dir = format!("{}/hfml/{}", Self::opf_dir(pecha_id)?, path_segment(work_id)?);

        let mut volumes: Vec<(u32, String)> = self
            .backend
            .list(&dir)
            .await?
            .into_iter()
            .filter_map(|name| parse_volume_file(&name).map(|vol| (vol, name)))
            .collect();
        volumes.sort_by_key(|(vol, _)| *vol);

        let mut texts = Vec::with_capacity(volumes.len());
        for (vol, name) in volumes {
            let text = self.read_string(&format!("{}/{}", dir, name)).await?;
            texts.push((vol, text));
        }

        if texts.is_empty() {
            return Err(AppError::NotFound(format!(
                "No serialized text for {} in {}",
                work_id, pecha_id
            )));
        }

        Ok(texts)
    }

    /// Store the serialized HFML of one volume of a work
    pub async fn write_text_volume(
        &self,
        pecha_id: &str,
        work_id: &str,
        vol: u32,
        hfml: &str,
    ) -> Result<()> {
        let key = format!(
            "{}/hfml/{}/{}.txt",
            Self::opf_dir(pecha_id)?,
            path_segment(work_id)?,
            volume_dir(vol)
        );
        self.backend.write(&key, hfml.as_bytes()).await?;
        Ok(())
    }

    /// Read a base text
    pub async fn read_base(&self, pecha_id: &str, base_name: &str) -> Result<String> {
        let key = format!("{}/base/{}.txt", Self::opf_dir(pecha_id)?, path_segment(base_name)?);
        self.read_string(&key).await
    }

    /// Create or overwrite a base text
    pub async fn write_base(&self, pecha_id: &str, base_name: &str, content: &str) -> Result<()> {
        let key = format!("{}/base/{}.txt", Self::opf_dir(pecha_id)?, path_segment(base_name)?);
        self.backend.write(&key, content.as_bytes()).await?;
        tracing::info!(pecha_id = %pecha_id, base = %base_name, "Saved base text");
        Ok(())
    }

    fn layer_key(pecha_id: &str, base_name: &str, layer: LayerKind) -> Result<String> {
        Ok(format!(
            "{}/layers/{}/{}",
            Self::opf_dir(pecha_id)?,
            path_segment(base_name)?,
            layer.file_name()
        ))
    }

    /// Read any annotation layer as a generic document
    pub async fn read_layer(
        &self,
        pecha_id: &str,
        base_name: &str,
        layer: LayerKind,
    ) -> Result<serde_json::Value> {
        let key = Self::layer_key(pecha_id, base_name, layer)?;
        self.read_yaml(&key).await
    }

    /// Create or overwrite an annotation layer
    pub async fn write_layer(
        &self,
        pecha_id: &str,
        base_name: &str,
        layer: LayerKind,
        content: &serde_json::Value,
    ) -> Result<()> {
        let key = Self::layer_key(pecha_id, base_name, layer)?;
        self.write_yaml(&key, content).await?;
        tracing::info!(pecha_id = %pecha_id, base = %base_name, layer = %layer, "Saved layer");
        Ok(())
    }

    /// Base names of a pecha with the layers present for each
    pub async fn components(&self, pecha_id: &str) -> Result<BTreeMap<String, Vec<LayerKind>>> {
        let opf_dir = Self::opf_dir(pecha_id)?;
        if !self.backend.exists(&format!("{}/meta.yml", opf_dir)).await {
            return Err(AppError::NotFound(format!("Pecha not found: {}", pecha_id)));
        }

        let mut components: BTreeMap<String, Vec<LayerKind>> = BTreeMap::new();

        for name in self.backend.list(&format!("{}/base", opf_dir)).await? {
            if let Some(base) = name.strip_suffix(".txt") {
                components.entry(base.to_string()).or_default();
            }
        }

        for base in self.backend.list(&format!("{}/layers", opf_dir)).await? {
            let layers = self
                .backend
                .list(&format!("{}/layers/{}", opf_dir, base))
                .await?
                .iter()
                .filter_map(|name| name.strip_suffix(".yml"))
                .filter_map(|stem| stem.parse::<LayerKind>().ok())
                .collect::<Vec<_>>();
            components.entry(base).or_default().extend(layers);
        }

        Ok(components)
    }

    /// Persist a text saved from the proofreading UI, one object per volume
    pub async fn save_text(&self, text_id: &str, vol: u32, content: &str) -> Result<()> {
        let key = format!(
            "{}/{}/{}.txt",
            SAVED_TEXTS_DIR,
            path_segment(text_id)?,
            volume_dir(vol)
        );
        self.backend.write(&key, content.as_bytes()).await?;
        Ok(())
    }

    /// Read back a saved text volume
    #[cfg(test)]
    pub async fn read_saved_text(&self, text_id: &str, vol: u32) -> Result<String> {
        let key = format!(
            "{}/{}/{}.txt",
            SAVED_TEXTS_DIR,
            path_segment(text_id)?,
            volume_dir(vol)
        );
        self.read_string(&key).await
    }
}

/// Reject identifiers that would escape their directory
fn path_segment(name: &str) -> Result<&str> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
    {
        return Err(AppError::BadRequest(format!("Invalid identifier: {:?}", name)));
    }
    Ok(name)
}

/// `v003.txt` -> 3
fn parse_volume_file(name: &str) -> Option<u32> {
    name.strip_suffix(".txt")?.strip_prefix('v')?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opf::types::{PageRecord, Span};
    use tempfile::TempDir;

    fn setup_store() -> (TempDir, OpfStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = OpfStore::with_local_storage(temp_dir.path().to_path_buf());
        (temp_dir, store)
    }

    #[tokio::test]
    async fn test_pagination_round_trip() {
        let (_dir, store) = setup_store();

        let mut layer = PaginationLayer::default();
        layer
            .annotations
            .insert("u1".to_string(), PageRecord::new("1a", Span { start: 0, end: 10 }));

        store.save_pagination("P000001", 1, &layer).await.unwrap();
        let loaded = store.load_pagination("P000001", 1).await.unwrap();
        assert_eq!(loaded, layer);
    }

    #[tokio::test]
    async fn test_missing_pagination_is_not_found() {
        let (_dir, store) = setup_store();

        let result = store.load_pagination("P000001", 7).await;
        assert!(matches!(
            result,
            Err(AppError::Storage(crate::error::StorageError::ObjectNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_text_volumes_are_ordered() {
        let (_dir, store) = setup_store();

        store.write_text_volume("P000001", "D1118", 10, "[1a]\nten").await.unwrap();
        store.write_text_volume("P000001", "D1118", 2, "[1a]\ntwo").await.unwrap();

        let volumes = store.load_text_volumes("P000001", "D1118").await.unwrap();
        let vols: Vec<u32> = volumes.iter().map(|(vol, _)| *vol).collect();
        assert_eq!(vols, vec![2, 10]);
        assert_eq!(volumes[0].1, "[1a]\ntwo");

        let missing = store.load_text_volumes("P000001", "D0001").await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_components() {
        let (dir, store) = setup_store();

        std::fs::create_dir_all(dir.path().join("P000001/P000001.opf")).unwrap();
        std::fs::write(dir.path().join("P000001/P000001.opf/meta.yml"), "work_id: W1\n").unwrap();

        store.write_base("P000001", "v001", "ཀ་ཁ་ག").await.unwrap();
        store.write_base("P000001", "v002", "ང་").await.unwrap();
        store
            .write_layer(
                "P000001",
                "v001",
                LayerKind::Pagination,
                &serde_json::json!({"annotations": {}}),
            )
            .await
            .unwrap();
        store
            .write_layer(
                "P000001",
                "v001",
                LayerKind::Durchen,
                &serde_json::json!({"annotations": {}}),
            )
            .await
            .unwrap();

        let components = store.components("P000001").await.unwrap();
        assert_eq!(components["v001"], vec![LayerKind::Durchen, LayerKind::Pagination]);
        assert!(components["v002"].is_empty());

        assert_eq!(store.read_base("P000001", "v001").await.unwrap(), "ཀ་ཁ་ག");
        assert!(matches!(
            store.components("P999999").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let (_dir, store) = setup_store();

        assert!(matches!(
            store.load_meta("../etc").await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            store.read_base("P000001", "..").await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_parse_volume_file() {
        assert_eq!(parse_volume_file("v001.txt"), Some(1));
        assert_eq!(parse_volume_file("v120.txt"), Some(120));
        assert_eq!(parse_volume_file("notes.txt"), None);
        assert_eq!(parse_volume_file("v001.yml"), None);
    }
}
