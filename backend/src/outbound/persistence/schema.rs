//! Diesel table definitions for the PostgreSQL schema.
//!
//! Must match `backend/migrations` exactly; regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Trail documents keyed by trail identifier.
    trails (id) {
        /// Primary key: the trail identifier.
        id -> Text,
        title -> Text,
        description -> Text,
        location -> Text,
        /// Object key of the cover image inside the media container.
        image_path -> Nullable<Text>,
        media -> Array<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        ai_caption -> Nullable<Text>,
        ai_tags -> Array<Text>,
        ai_analyzed_at -> Nullable<Timestamptz>,
    }
}
