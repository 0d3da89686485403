//! SeaORM-backed implementations of the domain repository ports.
//!
//! Generic over `C: ConnectionTrait`, so it can be built on a
//! `DatabaseConnection` or on a transaction.

use anyhow::Context;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr,
};
use uuid::Uuid;

use crate::contract::model::{BloodRequest, Donor};
use crate::domain::repo::{BloodRequestRepository, DonorRepository, DuplicateContact};
use crate::infra::storage::entity::{blood_request, donor};
use crate::infra::storage::mapper::{
    donor_from_row, donor_to_active, request_from_row, request_to_active,
};

/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> DonorRepository for SeaOrmRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Donor>> {
        let found = donor::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("donor find_by_id failed")?;
        found.map(donor_from_row).transpose()
    }

    async fn contact_exists(&self, contact: &str) -> anyhow::Result<bool> {
        let count = donor::Entity::find()
            .filter(donor::Column::Contact.eq(contact))
            .count(&self.conn)
            .await
            .context("contact_exists failed")?;
        Ok(count > 0)
    }

    async fn insert(&self, d: Donor) -> anyhow::Result<()> {
        match donor_to_active(d).insert(&self.conn).await {
            Ok(_) => Ok(()),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(DuplicateContact.into())
            }
            Err(e) => Err(anyhow::Error::new(e).context("donor insert failed")),
        }
    }

    async fn list(&self, limit: u32, offset: u32) -> anyhow::Result<Vec<Donor>> {
        let rows = donor::Entity::find()
            .order_by_asc(donor::Column::CreatedAt)
            .order_by_asc(donor::Column::Id)
            .limit(u64::from(limit))
            .offset(u64::from(offset))
            .all(&self.conn)
            .await
            .context("donor list failed")?;
        rows.into_iter().map(donor_from_row).collect()
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Donor>> {
        let rows = donor::Entity::find()
            .order_by_asc(donor::Column::CreatedAt)
            .order_by_asc(donor::Column::Id)
            .all(&self.conn)
            .await
            .context("donor list_all failed")?;
        rows.into_iter().map(donor_from_row).collect()
    }

    async fn set_availability(&self, id: Uuid, available: bool) -> anyhow::Result<bool> {
        let res = donor::Entity::update_many()
            .col_expr(donor::Column::Available, Expr::value(available))
            .filter(donor::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("set_availability failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn compare_and_update_donation(
        &self,
        previous: &Donor,
        updated: &Donor,
    ) -> anyhow::Result<bool> {
        let last_donation_matches = match previous.last_donation {
            Some(at) => donor::Column::LastDonation.eq(at),
            None => donor::Column::LastDonation.is_null(),
        };

        let res = donor::Entity::update_many()
            .col_expr(donor::Column::Points, Expr::value(i64::from(updated.points)))
            .col_expr(donor::Column::LastDonation, Expr::value(updated.last_donation))
            .filter(donor::Column::Id.eq(previous.id))
            .filter(donor::Column::Points.eq(i64::from(previous.points)))
            .filter(last_donation_matches)
            .exec(&self.conn)
            .await
            .context("compare_and_update_donation failed")?;
        Ok(res.rows_affected > 0)
    }
}

#[async_trait::async_trait]
impl<C> BloodRequestRepository for SeaOrmRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<BloodRequest>> {
        let found = blood_request::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("request find_by_id failed")?;
        found.map(request_from_row).transpose()
    }

    async fn insert(&self, r: BloodRequest) -> anyhow::Result<()> {
        let _ = request_to_active(r)
            .insert(&self.conn)
            .await
            .context("request insert failed")?;
        Ok(())
    }

    async fn list(&self) -> anyhow::Result<Vec<BloodRequest>> {
        let rows = blood_request::Entity::find()
            .order_by_desc(blood_request::Column::CreatedAt)
            .order_by_asc(blood_request::Column::Id)
            .all(&self.conn)
            .await
            .context("request list failed")?;
        rows.into_iter().map(request_from_row).collect()
    }
}
