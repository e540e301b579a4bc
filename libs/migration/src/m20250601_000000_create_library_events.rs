use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create library_events table
        manager
            .create_table(
                Table::create()
                    .table(LibraryEvents::Table)
                    .if_not_exists()
                    .col(pk_auto(LibraryEvents::Id))
                    .col(string(LibraryEvents::EventType))
                    .to_owned(),
            )
            .await?;

        // Create books table. Each event owns exactly one book row, so the
        // owning event id is the primary key. Book ids come from the
        // producing system and may repeat across events.
        manager
            .create_table(
                Table::create()
                    .table(Books::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Books::LibraryEventId)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(integer(Books::Id))
                    .col(string(Books::Name))
                    .col(string(Books::Author))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_books_library_event_id")
                            .from(Books::Table, Books::LibraryEventId)
                            .to(LibraryEvents::Table, LibraryEvents::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Books::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(LibraryEvents::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum LibraryEvents {
    Table,
    Id,
    EventType,
}

#[derive(DeriveIden)]
enum Books {
    Table,
    Id,
    Name,
    Author,
    LibraryEventId,
}
