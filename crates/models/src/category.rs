//! The closed set of media categories.
//!
//! Parsing is exact: `"album"` is a category, `"Album"`, `"albums"`, `" album"`
//! and `"albumstrailingtext"` are not.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[sea_orm(string_value = "album")]
    Album,
    #[sea_orm(string_value = "book")]
    Book,
    #[sea_orm(string_value = "movie")]
    Movie,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Album, Category::Book, Category::Movie];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Album => "album",
            Category::Book => "book",
            Category::Movie => "movie",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        match raw {
            "album" => Ok(Category::Album),
            "book" => Ok(Category::Book),
            "movie" => Ok(Category::Movie),
            other => Err(ModelError::Validation(format!(
                "invalid category {other:?}; expected one of album, book, movie"
            ))),
        }
    }
}
