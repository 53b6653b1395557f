//! OPF document types
//!
//! Typed views of the YAML documents inside a `{pecha}.opf` tree. Every
//! document keeps the fields it does not model in an `extra` map so that a
//! load/overwrite cycle never drops data written by other tools.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Fields of a YAML mapping that are not modelled explicitly
pub type ExtraFields = BTreeMap<String, serde_yaml::Value>;

/// Character offsets of an annotation inside the base text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// A single page of a volume's pagination layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Folio and side, e.g. `12b`
    #[serde(default)]
    pub page_index: String,
    #[serde(default)]
    pub span: Span,
    /// Identifier of the durchen page annotating this page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_ref: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl PageRecord {
    pub fn new(page_index: impl Into<String>, span: Span) -> Self {
        Self {
            page_index: page_index.into(),
            span,
            ..Default::default()
        }
    }
}

/// `layers/v{vol:03}/Pagination.yml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaginationLayer {
    #[serde(flatten)]
    pub extra: ExtraFields,
    #[serde(default)]
    pub annotations: BTreeMap<String, PageRecord>,
}

impl PaginationLayer {
    /// Find the record whose `page_index` equals `page_index`
    pub fn find_by_page_index(&self, page_index: &str) -> Option<(&str, &PageRecord)> {
        self.annotations
            .iter()
            .find(|(_, record)| record.page_index == page_index)
            .map(|(id, record)| (id.as_str(), record))
    }

    /// Identifier of the record at `page_index`
    pub fn page_id(&self, page_index: &str) -> Option<&str> {
        self.find_by_page_index(page_index).map(|(id, _)| id)
    }

    /// Set `note_ref` on the record at `page_index`.
    ///
    /// Returns `false` when no record carries that page index.
    pub fn set_note_ref(&mut self, page_index: &str, note_ref: &str) -> bool {
        match self
            .annotations
            .values_mut()
            .find(|record| record.page_index == page_index)
        {
            Some(record) => {
                record.note_ref = Some(note_ref.to_string());
                true
            }
            None => false,
        }
    }
}

/// `meta.yml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PechaMeta {
    #[serde(default)]
    pub work_id: String,
    /// Offset added to the volume number to obtain the BDRC image group
    #[serde(default)]
    pub img_grp_offset: i64,
    /// Image group prefix, e.g. `I1PD`
    #[serde(default)]
    pub pref: String,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Location of a text inside one volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeSpan {
    pub vol: u32,
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
}

/// Entry of `index.yml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextInfo {
    pub work_id: String,
    #[serde(default)]
    pub span: Vec<VolumeSpan>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl TextInfo {
    /// Distinct volumes covered by the text, ascending
    pub fn volumes(&self) -> Vec<u32> {
        let mut vols: Vec<u32> = self.span.iter().map(|s| s.vol).collect();
        vols.sort_unstable();
        vols.dedup();
        vols
    }
}

/// `index.yml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PechaIndex {
    #[serde(flatten)]
    pub extra: ExtraFields,
    #[serde(default)]
    pub annotations: BTreeMap<String, TextInfo>,
}

impl PechaIndex {
    /// Resolve a work id to its index identifier and entry
    pub fn find_text(&self, work_id: &str) -> Option<(&str, &TextInfo)> {
        self.annotations
            .iter()
            .find(|(_, text)| text.work_id == work_id)
            .map(|(id, text)| (id.as_str(), text))
    }
}

/// Known annotation layer names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LayerKind {
    Archaic,
    Author,
    BookTitle,
    Chapter,
    Citation,
    Correction,
    Durchen,
    ErrorCandidate,
    Footnote,
    Pagination,
    Peydurma,
    Sabche,
    SubTitle,
    Tsawa,
    Yigchung,
}

impl LayerKind {
    pub const ALL: [LayerKind; 15] = [
        LayerKind::Archaic,
        LayerKind::Author,
        LayerKind::BookTitle,
        LayerKind::Chapter,
        LayerKind::Citation,
        LayerKind::Correction,
        LayerKind::Durchen,
        LayerKind::ErrorCandidate,
        LayerKind::Footnote,
        LayerKind::Pagination,
        LayerKind::Peydurma,
        LayerKind::Sabche,
        LayerKind::SubTitle,
        LayerKind::Tsawa,
        LayerKind::Yigchung,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LayerKind::Archaic => "Archaic",
            LayerKind::Author => "Author",
            LayerKind::BookTitle => "BookTitle",
            LayerKind::Chapter => "Chapter",
            LayerKind::Citation => "Citation",
            LayerKind::Correction => "Correction",
            LayerKind::Durchen => "Durchen",
            LayerKind::ErrorCandidate => "ErrorCandidate",
            LayerKind::Footnote => "Footnote",
            LayerKind::Pagination => "Pagination",
            LayerKind::Peydurma => "Peydurma",
            LayerKind::Sabche => "Sabche",
            LayerKind::SubTitle => "SubTitle",
            LayerKind::Tsawa => "Tsawa",
            LayerKind::Yigchung => "Yigchung",
        }
    }

    /// File name of the layer inside `layers/{base}/`
    pub fn file_name(&self) -> String {
        format!("{}.yml", self.as_str())
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LayerKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown layer: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGINATION_YML: &str = r#"
id: 5a3d1e2f
annotation_type: Pagination
revision: '00001'
annotations:
  u1:
    page_index: 10a
    page_info: null
    imgnum: 19
    span:
      start: 0
      end: 120
    note_ref: null
  u2:
    page_index: 12a
    span:
      start: 121
      end: 300
"#;

    #[test]
    fn test_pagination_layer_keeps_unknown_fields() {
        let layer: PaginationLayer = serde_yaml::from_str(PAGINATION_YML).unwrap();
        assert_eq!(layer.annotations.len(), 2);
        assert_eq!(layer.annotations["u1"].page_index, "10a");
        assert_eq!(layer.annotations["u1"].note_ref, None);
        assert!(layer.annotations["u1"].extra.contains_key("imgnum"));
        assert!(layer.extra.contains_key("annotation_type"));

        let yaml = serde_yaml::to_string(&layer).unwrap();
        let reloaded: PaginationLayer = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(layer, reloaded);
    }

    #[test]
    fn test_set_note_ref() {
        let mut layer: PaginationLayer = serde_yaml::from_str(PAGINATION_YML).unwrap();
        assert!(layer.set_note_ref("12a", "u1"));
        assert_eq!(layer.annotations["u2"].note_ref.as_deref(), Some("u1"));
        assert!(!layer.set_note_ref("99b", "u1"));
        assert_eq!(layer.page_id("10a"), Some("u1"));
        assert_eq!(layer.page_id("7a"), None);
    }

    #[test]
    fn test_index_lookup_and_volumes() {
        let index: PechaIndex = serde_yaml::from_str(
            r#"
annotations:
  t1:
    work_id: D1118
    span:
      - {vol: 3, start: 0, end: 10}
      - {vol: 2, start: 50, end: 90}
      - {vol: 3, start: 20, end: 30}
"#,
        )
        .unwrap();

        let (id, text) = index.find_text("D1118").unwrap();
        assert_eq!(id, "t1");
        assert_eq!(text.volumes(), vec![2, 3]);
        assert!(index.find_text("D0001").is_none());
    }

    #[test]
    fn test_layer_kind_parse() {
        assert_eq!("Pagination".parse::<LayerKind>().unwrap(), LayerKind::Pagination);
        assert_eq!(LayerKind::Durchen.file_name(), "Durchen.yml");
        assert!("pagination".parse::<LayerKind>().is_err());
    }
}
