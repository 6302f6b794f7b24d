//! Key-value entry model.
//!
//! One row per logical key (`anandwanUser`, `volunteers`, `donations`,
//! `contacts`, and `session:<id>` for visitor sessions). Values are opaque
//! MessagePack blobs; decoding them is the job of [`crate::LocalStore`].

use sea_orm::entity::prelude::*;

/// Sea-ORM entity model representing one durable key.
///
/// | Column     | Type                 | Description                         |
/// |------------|----------------------|-------------------------------------|
/// | key        | TEXT (Primary Key)   | Logical key                         |
/// | value      | BLOB                 | MessagePack encoded value           |
/// | updated_at | TIMESTAMPTZ          | Time of the last write              |
/// | expires_at | TIMESTAMPTZ NULL     | Entry reads as absent after this    |
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "kv_entry")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub key: String,

    pub value: Vec<u8>,

    pub updated_at: DateTimeWithTimeZone,

    pub expires_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    pub fn is_live(&self, now: DateTimeWithTimeZone) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
