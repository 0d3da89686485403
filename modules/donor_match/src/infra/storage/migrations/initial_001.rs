use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Donors::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Donors::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Donors::Name).string().not_null())
                    .col(ColumnDef::new(Donors::BloodGroup).string_len(3).not_null())
                    .col(ColumnDef::new(Donors::Location).string().not_null())
                    .col(
                        ColumnDef::new(Donors::Contact)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Donors::Available)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Donors::LastDonation).timestamp_with_time_zone().null())
                    .col(
                        ColumnDef::new(Donors::Points)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Donors::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_donors_blood_group")
                    .table(Donors::Table)
                    .col(Donors::BloodGroup)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BloodRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BloodRequests::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BloodRequests::BloodGroup)
                            .string_len(3)
                            .not_null(),
                    )
                    .col(ColumnDef::new(BloodRequests::Location).string().not_null())
                    .col(ColumnDef::new(BloodRequests::Hospital).string().not_null())
                    .col(
                        ColumnDef::new(BloodRequests::Urgency)
                            .string_len(16)
                            .not_null()
                            .default("normal"),
                    )
                    .col(
                        ColumnDef::new(BloodRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BloodRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Donors::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Donors {
    Table,
    Id,
    Name,
    BloodGroup,
    Location,
    Contact,
    Available,
    LastDonation,
    Points,
    CreatedAt,
}

#[derive(DeriveIden)]
enum BloodRequests {
    Table,
    Id,
    BloodGroup,
    Location,
    Hospital,
    Urgency,
    CreatedAt,
}
