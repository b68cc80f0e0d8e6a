//! Diesel row structs for the `trails` table.
//!
//! Internal to the persistence adapter; the domain only sees [`Trail`].

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{Trail, TrailSnapshot};

use super::schema::trails;

/// Row read from `trails`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = trails)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TrailRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub image_path: Option<String>,
    pub media: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub ai_caption: Option<String>,
    pub ai_tags: Vec<String>,
    pub ai_analyzed_at: Option<DateTime<Utc>>,
}

impl From<TrailRow> for TrailSnapshot {
    fn from(row: TrailRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            location: row.location,
            image_path: row.image_path,
            media: row.media,
            created_at: row.created_at,
            updated_at: row.updated_at,
            ai_caption: row.ai_caption,
            ai_tags: row.ai_tags,
            ai_analyzed_at: row.ai_analyzed_at,
        }
    }
}

/// Insertable row borrowed from a domain trail.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = trails)]
pub(crate) struct NewTrailRow<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub location: &'a str,
    pub image_path: Option<&'a str>,
    pub media: &'a [String],
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub ai_caption: Option<&'a str>,
    pub ai_tags: &'a [String],
    pub ai_analyzed_at: Option<DateTime<Utc>>,
}

impl<'a> From<&'a Trail> for NewTrailRow<'a> {
    fn from(trail: &'a Trail) -> Self {
        Self {
            id: trail.id().as_str(),
            title: trail.title(),
            description: trail.description(),
            location: trail.location(),
            image_path: trail.image_path(),
            media: trail.media(),
            created_at: trail.created_at(),
            updated_at: trail.updated_at(),
            ai_caption: trail.ai_caption(),
            ai_tags: trail.ai_tags(),
            ai_analyzed_at: trail.ai_analyzed_at(),
        }
    }
}

/// Changeset for a full replace. `None` columns are written as `NULL`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = trails)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct TrailChangeset<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub location: &'a str,
    pub image_path: Option<&'a str>,
    pub media: &'a [String],
    pub updated_at: DateTime<Utc>,
    pub ai_caption: Option<&'a str>,
    pub ai_tags: &'a [String],
    pub ai_analyzed_at: Option<DateTime<Utc>>,
}

impl<'a> From<&'a Trail> for TrailChangeset<'a> {
    fn from(trail: &'a Trail) -> Self {
        Self {
            title: trail.title(),
            description: trail.description(),
            location: trail.location(),
            image_path: trail.image_path(),
            media: trail.media(),
            updated_at: trail.updated_at(),
            ai_caption: trail.ai_caption(),
            ai_tags: trail.ai_tags(),
            ai_analyzed_at: trail.ai_analyzed_at(),
        }
    }
}
