//! Named cache collections and read filters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A named collection in the local cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CacheCollection {
    #[serde(rename = "tricks")]
    Tricks,
    #[serde(rename = "categories")]
    Categories,
    #[serde(rename = "subcategories")]
    Subcategories,
    #[serde(rename = "userProgress")]
    UserProgress,
    #[serde(rename = "metadata")]
    Metadata,
}

impl CacheCollection {
    pub const ALL: [CacheCollection; 5] = [
        CacheCollection::Tricks,
        CacheCollection::Categories,
        CacheCollection::Subcategories,
        CacheCollection::UserProgress,
        CacheCollection::Metadata,
    ];

    /// Name used for storage and across the C ABI.
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheCollection::Tricks => "tricks",
            CacheCollection::Categories => "categories",
            CacheCollection::Subcategories => "subcategories",
            CacheCollection::UserProgress => "userProgress",
            CacheCollection::Metadata => "metadata",
        }
    }

    /// JSON pointer of the primary key inside a record of this collection.
    pub fn key_path(&self) -> &'static str {
        match self {
            CacheCollection::Tricks
            | CacheCollection::Categories
            | CacheCollection::Subcategories => "/id",
            CacheCollection::UserProgress => "/user_id",
            CacheCollection::Metadata => "/key",
        }
    }

    /// JSON pointer of the category slug index column, if the collection has one.
    pub fn category_slug_path(&self) -> Option<&'static str> {
        match self {
            CacheCollection::Tricks => Some("/subcategory/master_category/slug"),
            CacheCollection::Subcategories => Some("/master_category/slug"),
            _ => None,
        }
    }

    /// JSON pointer of the subcategory slug index column, if the collection has one.
    pub fn subcategory_slug_path(&self) -> Option<&'static str> {
        match self {
            CacheCollection::Tricks => Some("/subcategory/slug"),
            CacheCollection::Subcategories => Some("/slug"),
            _ => None,
        }
    }
}

impl fmt::Display for CacheCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown cache collection: {0}")]
pub struct ParseCollectionError(pub String);

impl FromStr for CacheCollection {
    type Err = ParseCollectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CacheCollection::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ParseCollectionError(s.to_string()))
    }
}

/// Secondary-index filter for cached reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "slug", rename_all = "snake_case")]
pub enum CacheFilter {
    CategorySlug(String),
    SubcategorySlug(String),
}

impl CacheFilter {
    pub fn slug(&self) -> &str {
        match self {
            CacheFilter::CategorySlug(s) | CacheFilter::SubcategorySlug(s) => s,
        }
    }
}
