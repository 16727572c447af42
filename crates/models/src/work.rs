use sea_orm::{entity::prelude::*, Set, DatabaseConnection, ActiveModelTrait, EntityTrait, QueryOrder, PaginatorTrait};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, vote, Category};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "work")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub creator: Option<String>,
    pub description: Option<String>,
    pub publication_year: Option<i32>,
    pub category: Category,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Vote }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Vote => Entity::has_many(vote::Entity).into() }
    }
}

impl Related<vote::Entity> for Entity {
    fn to() -> RelationDef { Relation::Vote.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// A fully validated set of work fields, ready to be written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewWork {
    pub title: String,
    pub creator: Option<String>,
    pub description: Option<String>,
    pub publication_year: Option<i32>,
    pub category: Category,
}

pub fn validate_title(title: &str) -> Result<(), errors::ModelError> {
    if title.trim().is_empty() {
        return Err(errors::ModelError::Validation("title required".into()));
    }
    if title.len() > 256 {
        return Err(errors::ModelError::Validation("title too long (<=256)".into()));
    }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, input: &NewWork) -> Result<Model, errors::ModelError> {
    validate_title(&input.title)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        title: Set(input.title.clone()),
        creator: Set(input.creator.clone()),
        description: Set(input.description.clone()),
        publication_year: Set(input.publication_year),
        category: Set(input.category),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Overwrite every field of work `id`.
pub async fn replace(db: &DatabaseConnection, id: i32, input: &NewWork) -> Result<Model, errors::ModelError> {
    validate_title(&input.title)?;
    let mut found: ActiveModel = Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?
        .ok_or_else(|| errors::ModelError::NotFound(format!("work {id}")))?
        .into();
    found.title = Set(input.title.clone());
    found.creator = Set(input.creator.clone());
    found.description = Set(input.description.clone());
    found.publication_year = Set(input.publication_year);
    found.category = Set(input.category);
    found.updated_at = Set(Utc::now().into());
    found.update(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn list(db: &DatabaseConnection) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find().order_by_asc(Column::Id).all(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn count(db: &DatabaseConnection) -> Result<u64, errors::ModelError> {
    Entity::find().count(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Hard delete; votes go with it through the FK cascade.
pub async fn hard_delete(db: &DatabaseConnection, id: i32) -> Result<bool, errors::ModelError> {
    let res = Entity::delete_by_id(id).exec(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(res.rows_affected > 0)
}
