use std::collections::{BTreeMap, HashMap};

use models::{work::NewWork, Category};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::ServiceError;

pub type Work = models::work::Model;
pub type Vote = models::vote::Model;

pub const UPVOTED: &str = "Successfully upvoted!";
pub const ALREADY_VOTED: &str = "Could not upvote: you have already voted for this work";
pub const NO_SUCH_WORK: &str = "Could not upvote: no such work";

/// Raw create/update input. Every field is optional here so that a missing
/// field becomes a validation error rather than a deserialization failure.
///
/// The optional work fields are `Option<Option<_>>`: `None` when the key is
/// absent, `Some(None)` for an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkPayload {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub creator: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<Option<i32>>,
    pub category: Option<String>,
}

/// Only called when the key is present, so a `null` becomes `Some(None)`.
fn present<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

impl WorkPayload {
    fn required(&self) -> Result<(String, Category), ServiceError> {
        let title = self.title.as_deref().ok_or_else(|| ServiceError::Validation("title required".into()))?;
        models::work::validate_title(title)?;
        let raw = self.category.as_deref().ok_or_else(|| ServiceError::Validation("category required".into()))?;
        let category = Category::parse(raw)?;
        Ok((title.to_string(), category))
    }

    /// Validate as a brand-new work.
    pub fn validate(&self) -> Result<NewWork, ServiceError> {
        let (title, category) = self.required()?;
        Ok(NewWork {
            title,
            creator: self.creator.clone().flatten(),
            description: self.description.clone().flatten(),
            publication_year: self.publication_year.flatten(),
            category,
        })
    }

    /// Validate as an update of `existing`: title and category are required
    /// as on create. Optional fields that were not sent keep their value; an
    /// explicit `null` clears them.
    pub fn merge(&self, existing: &Work) -> Result<NewWork, ServiceError> {
        let (title, category) = self.required()?;
        Ok(NewWork {
            title,
            creator: self.creator.clone().unwrap_or_else(|| existing.creator.clone()),
            description: self.description.clone().unwrap_or_else(|| existing.description.clone()),
            publication_year: self.publication_year.unwrap_or(existing.publication_year),
            category,
        })
    }
}

/// Where a mutating operation sends the client next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Root,
    Works,
    Work(i32),
}

impl Destination {
    pub fn path(&self) -> String {
        match self {
            Destination::Root => "/".to_string(),
            Destination::Works => "/works".to_string(),
            Destination::Work(id) => format!("/works/{id}"),
        }
    }
}

/// Redirect plus flash message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub destination: Destination,
    pub message: String,
}

impl Outcome {
    pub fn new(destination: Destination, message: impl Into<String>) -> Self {
        Self { destination, message: message.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedWork {
    #[serde(flatten)]
    pub work: Work,
    pub votes: u64,
}

/// Landing page content: the most-voted work and the top of each category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Landing {
    pub spotlight: Option<RankedWork>,
    pub top: BTreeMap<Category, Vec<RankedWork>>,
}

impl Landing {
    /// Order is vote count descending, then id ascending. Every category is
    /// present in `top`, possibly empty.
    pub fn rank(works: Vec<Work>, tally: &HashMap<i32, u64>, top_n: usize) -> Self {
        let mut ranked: Vec<RankedWork> = works
            .into_iter()
            .map(|work| {
                let votes = tally.get(&work.id).copied().unwrap_or(0);
                RankedWork { work, votes }
            })
            .collect();
        ranked.sort_by(|a, b| b.votes.cmp(&a.votes).then(a.work.id.cmp(&b.work.id)));

        let spotlight = ranked.first().cloned();
        let mut top: BTreeMap<Category, Vec<RankedWork>> = Category::ALL.iter().map(|c| (*c, Vec::new())).collect();
        for rw in ranked {
            let bucket = top.entry(rw.work.category).or_default();
            if bucket.len() < top_n {
                bucket.push(rw);
            }
        }
        Self { spotlight, top }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkDetail {
    pub work: Work,
    pub vote_count: u64,
    pub votes: Vec<Vote>,
}

/// Data backing the new/edit forms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkForm {
    pub work: Option<Work>,
    pub categories: Vec<Category>,
}

impl WorkForm {
    pub fn new(work: Option<Work>) -> Self {
        Self { work, categories: Category::ALL.to_vec() }
    }
}
