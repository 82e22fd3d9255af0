// ABOUTME: Serde data models for the reader API responses
// ABOUTME: Tolerant parsing with optional fields and rendering defaults

use serde::{Deserialize, Serialize};

pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_AUTHOR: &str = "Unknown";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagList {
    #[serde(default)]
    pub tags: Vec<TagEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagEntry {
    pub id: String,
}

impl TagEntry {
    /// Label name for `user/-/label/<name>` ids, `None` for folders and states.
    pub fn label_name(&self) -> Option<&str> {
        self.id.rsplit_once("/label/").map(|(_, name)| name)
    }
}


#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamContents {
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub continuation: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub published: Option<i64>,
    #[serde(default)]
    pub summary: Option<ItemContent>,
    #[serde(default)]
    pub content: Option<ItemContent>,
    #[serde(default)]
    pub alternate: Vec<Link>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemContent {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Link {
    #[serde(default)]
    pub href: Option<String>,
}

impl Item {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    pub fn author(&self) -> &str {
        self.author.as_deref().unwrap_or(DEFAULT_AUTHOR)
    }

    pub fn published(&self) -> i64 {
        self.published.unwrap_or(0)
    }

    /// HTML body. Some services only fill `content` for full-text feeds.
    pub fn body_html(&self) -> &str {
        self.summary
            .as_ref()
            .and_then(|s| s.content.as_deref())
            .or_else(|| self.content.as_ref().and_then(|c| c.content.as_deref()))
            .unwrap_or("")
    }

    pub fn url(&self) -> &str {
        self.alternate
            .first()
            .and_then(|link| link.href.as_deref())
            .unwrap_or("")
    }
}
