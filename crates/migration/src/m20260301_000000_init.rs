//! Initial schema migration - creates all tables from scratch.
//!
//! - `users`: authentication and profile
//! - `trips`: shared trips owned by users
//! - `itinerary_days`: one record per calendar day of a trip
//! - `trip_invites`: email invitations, one per (trip, email)
//! - `expenses`: day-scoped ledger entries with soft delete
//! - `allocations`: per-participant payer/split shares of an expense
//! - `notes`: free-text notes on a day
//! - `checklist_items`: tickable items on a day

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
    Email,
    DisplayName,
    Avatar,
}

#[derive(Iden)]
enum Trips {
    Table,
    Id,
    Name,
    Destination,
    OwnerId,
    StartDate,
    EndDate,
    Currency,
    Archived,
    Shared,
}

#[derive(Iden)]
enum ItineraryDays {
    Table,
    Id,
    TripId,
    DayNumber,
    Date,
    Title,
    Location,
}

#[derive(Iden)]
enum TripInvites {
    Table,
    Id,
    TripId,
    Email,
    Status,
    GuestName,
    GuestAvatar,
    CreatedAt,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    TripId,
    DayId,
    AmountMinor,
    Description,
    Category,
    OccurredAt,
    DisplayOrder,
    CreatedBy,
    DeletedAt,
}

#[derive(Iden)]
enum Allocations {
    Table,
    Id,
    ExpenseId,
    Side,
    ParticipantKind,
    ParticipantId,
    AmountMinor,
}

#[derive(Iden)]
enum Notes {
    Table,
    Id,
    TripId,
    DayId,
    Body,
    CreatedAt,
}

#[derive(Iden)]
enum ChecklistItems {
    Table,
    Id,
    TripId,
    DayId,
    Label,
    Done,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::DisplayName).string())
                    .col(ColumnDef::new(Users::Avatar).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-email-unique")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Trips
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Trips::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Trips::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Trips::Name).string().not_null())
                    .col(ColumnDef::new(Trips::Destination).string())
                    .col(ColumnDef::new(Trips::OwnerId).string().not_null())
                    .col(ColumnDef::new(Trips::StartDate).date())
                    .col(ColumnDef::new(Trips::EndDate).date())
                    .col(
                        ColumnDef::new(Trips::Currency)
                            .string()
                            .not_null()
                            .default("USD"),
                    )
                    .col(
                        ColumnDef::new(Trips::Archived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Trips::Shared)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-trips-owner_id")
                            .from(Trips::Table, Trips::OwnerId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Itinerary days
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ItineraryDays::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ItineraryDays::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ItineraryDays::TripId).string().not_null())
                    .col(
                        ColumnDef::new(ItineraryDays::DayNumber)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ItineraryDays::Date).date())
                    .col(ColumnDef::new(ItineraryDays::Title).string())
                    .col(ColumnDef::new(ItineraryDays::Location).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-itinerary_days-trip_id")
                            .from(ItineraryDays::Table, ItineraryDays::TripId)
                            .to(Trips::Table, Trips::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-itinerary_days-trip_id-day_number")
                    .table(ItineraryDays::Table)
                    .col(ItineraryDays::TripId)
                    .col(ItineraryDays::DayNumber)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Trip invites
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(TripInvites::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TripInvites::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TripInvites::TripId).string().not_null())
                    .col(ColumnDef::new(TripInvites::Email).string().not_null())
                    .col(
                        ColumnDef::new(TripInvites::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(TripInvites::GuestName).string())
                    .col(ColumnDef::new(TripInvites::GuestAvatar).string())
                    .col(
                        ColumnDef::new(TripInvites::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-trip_invites-trip_id")
                            .from(TripInvites::Table, TripInvites::TripId)
                            .to(Trips::Table, Trips::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-trip_invites-trip_id-email-unique")
                    .table(TripInvites::Table)
                    .col(TripInvites::TripId)
                    .col(TripInvites::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Expenses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::TripId).string().not_null())
                    .col(ColumnDef::new(Expenses::DayId).string().not_null())
                    .col(
                        ColumnDef::new(Expenses::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::Description).string().not_null())
                    .col(ColumnDef::new(Expenses::Category).string())
                    .col(ColumnDef::new(Expenses::OccurredAt).timestamp().not_null())
                    .col(
                        ColumnDef::new(Expenses::DisplayOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Expenses::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Expenses::DeletedAt).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-trip_id")
                            .from(Expenses::Table, Expenses::TripId)
                            .to(Trips::Table, Trips::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-day_id")
                            .from(Expenses::Table, Expenses::DayId)
                            .to(ItineraryDays::Table, ItineraryDays::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-trip_id-occurred_at")
                    .table(Expenses::Table)
                    .col(Expenses::TripId)
                    .col(Expenses::OccurredAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-day_id-display_order")
                    .table(Expenses::Table)
                    .col(Expenses::DayId)
                    .col(Expenses::DisplayOrder)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Allocations
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Allocations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Allocations::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Allocations::ExpenseId).string().not_null())
                    .col(ColumnDef::new(Allocations::Side).string().not_null())
                    .col(
                        ColumnDef::new(Allocations::ParticipantKind)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Allocations::ParticipantId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Allocations::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-allocations-expense_id")
                            .from(Allocations::Table, Allocations::ExpenseId)
                            .to(Expenses::Table, Expenses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-allocations-expense_id")
                    .table(Allocations::Table)
                    .col(Allocations::ExpenseId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Notes
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Notes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Notes::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Notes::TripId).string().not_null())
                    .col(ColumnDef::new(Notes::DayId).string().not_null())
                    .col(ColumnDef::new(Notes::Body).string().not_null())
                    .col(ColumnDef::new(Notes::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-notes-day_id")
                            .from(Notes::Table, Notes::DayId)
                            .to(ItineraryDays::Table, ItineraryDays::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-notes-day_id")
                    .table(Notes::Table)
                    .col(Notes::DayId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. Checklist items
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ChecklistItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChecklistItems::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ChecklistItems::TripId).string().not_null())
                    .col(ColumnDef::new(ChecklistItems::DayId).string().not_null())
                    .col(ColumnDef::new(ChecklistItems::Label).string().not_null())
                    .col(
                        ColumnDef::new(ChecklistItems::Done)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-checklist_items-day_id")
                            .from(ChecklistItems::Table, ChecklistItems::DayId)
                            .to(ItineraryDays::Table, ItineraryDays::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-checklist_items-day_id")
                    .table(ChecklistItems::Table)
                    .col(ChecklistItems::DayId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(ChecklistItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Notes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Allocations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TripInvites::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ItineraryDays::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Trips::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
