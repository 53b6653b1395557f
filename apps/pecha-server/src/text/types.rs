//! Wire types for assembled texts

use serde::{Deserialize, Serialize};

/// A page of body text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Pagination record identifier, empty when the page is not in the layer
    pub id: String,
    pub page_no: i64,
    /// Page text including its page and line markers
    pub content: String,
    pub name: String,
    pub vol: String,
    #[serde(default)]
    pub image_link: Option<String>,
    /// Identifier of the notes page referencing this page
    #[serde(default)]
    pub note_ref: Option<String>,
}

/// A page of the durchen (notes) section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotesPage {
    pub id: String,
    pub page_no: i64,
    pub content: String,
    pub name: String,
    pub vol: String,
    #[serde(default)]
    pub image_link: Option<String>,
}

impl From<Page> for NotesPage {
    fn from(page: Page) -> Self {
        Self {
            id: page.id,
            page_no: page.page_no,
            content: page.content,
            name: page.name,
            vol: page.vol,
            image_link: page.image_link,
        }
    }
}

/// A work assembled across its volumes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    pub id: String,
    pub pages: Vec<Page>,
    #[serde(default)]
    pub notes: Option<Vec<NotesPage>>,
}
