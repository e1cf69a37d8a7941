//! Typed views over cached catalog snapshots.
//!
//! Unknown fields are kept in `extra` so a decoded record can be written back
//! without losing whatever the server embedded at fetch time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

type Extra = serde_json::Map<String, serde_json::Value>;

/// Category reference embedded in tricks and subcategories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub slug: String,
}

/// Subcategory reference embedded in a trick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubcategoryRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_category: Option<CategoryRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trick {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub difficulty_level: Option<i32>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub subcategory: Option<SubcategoryRef>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Trick {
    pub fn category_slug(&self) -> Option<&str> {
        self.subcategory
            .as_ref()
            .and_then(|s| s.master_category.as_ref())
            .map(|c| c.slug.as_str())
    }
}

/// Top-level ("master") category with its nested subcategories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_category: Option<CategoryRef>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A user's XP total as cached for offline display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProgressRecord {
    pub user_id: String,
    pub total_xp: u64,
    pub updated_at: DateTime<Utc>,
}
