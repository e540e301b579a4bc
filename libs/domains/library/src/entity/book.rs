use sea_orm::entity::prelude::*;

/// Sea-ORM entity for the books table.
///
/// Each event owns exactly one book row, so the owning event id is the
/// primary key. Book ids come from the producing system and may repeat
/// across events.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub library_event_id: i32,
    pub id: i32,
    pub name: String,
    pub author: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::library_event::Entity",
        from = "Column::LibraryEventId",
        to = "super::library_event::Column::Id"
    )]
    LibraryEvent,
}

impl Related<super::library_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LibraryEvent.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
