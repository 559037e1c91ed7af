//! Carts Repository

use async_trait::async_trait;
use checkout::PromotionCode;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::{
    database::{Db, try_get_u32},
    domain::{
        carts::{
            errors::CartsServiceError,
            models::{Cart, CartLine, CartOwner, CartUuid},
            store::CartStore,
        },
        catalog::models::ProductUuid,
    },
};

const GET_CART_SQL: &str = include_str!("../sql/get_cart.sql");
const GET_CART_LINES_SQL: &str = include_str!("../sql/get_cart_lines.sql");
const ENSURE_CART_SQL: &str = include_str!("../sql/ensure_cart.sql");
const ADD_CART_LINE_QUANTITY_SQL: &str = include_str!("../sql/add_cart_line_quantity.sql");
const SET_CART_LINE_QUANTITY_SQL: &str = include_str!("../sql/set_cart_line_quantity.sql");
const DELETE_CART_LINE_SQL: &str = include_str!("../sql/delete_cart_line.sql");
const DELETE_CART_SQL: &str = include_str!("../sql/delete_cart.sql");
const SET_CART_PROMOTION_CODE_SQL: &str = include_str!("../sql/set_cart_promotion_code.sql");

/// Durable carts in `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgCartStore {
    db: Db,
}

impl PgCartStore {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    async fn ensure_cart(
        tx: &mut Transaction<'_, Postgres>,
        owner: &CartOwner,
    ) -> Result<CartUuid, sqlx::Error> {
        let uuid: Uuid = query_scalar(ENSURE_CART_SQL)
            .bind(CartUuid::new().into_uuid())
            .bind(owner.key())
            .fetch_one(&mut **tx)
            .await?;

        Ok(CartUuid::from_uuid(uuid))
    }
}

fn quantity_param(quantity: u32) -> Result<i32, CartsServiceError> {
    i32::try_from(quantity).map_err(|_overflow| CartsServiceError::InvalidQuantity)
}

#[async_trait]
impl CartStore for PgCartStore {
    #[tracing::instrument(name = "carts.store.load", skip(self), fields(owner = %owner), err)]
    async fn load(&self, owner: &CartOwner) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let header = query(GET_CART_SQL)
            .bind(owner.key())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(header) = header else {
            tx.commit().await?;

            return Ok(Cart::empty(owner.clone()));
        };

        let uuid: Uuid = header.try_get("uuid")?;
        let promotion_code: Option<String> = header.try_get("promotion_code")?;

        let lines = query_as::<Postgres, CartLine>(GET_CART_LINES_SQL)
            .bind(uuid)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Cart {
            uuid: Some(CartUuid::from_uuid(uuid)),
            owner: owner.clone(),
            lines,
            promotion_code: promotion_code.and_then(|code| PromotionCode::parse(&code).ok()),
        })
    }

    #[tracing::instrument(
        name = "carts.store.add_quantity",
        skip(self),
        fields(owner = %owner, product_uuid = %product),
        err
    )]
    async fn add_quantity(
        &self,
        owner: &CartOwner,
        product: ProductUuid,
        quantity: u32,
        max_quantity: u32,
    ) -> Result<Option<u32>, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let cart = Self::ensure_cart(&mut tx, owner).await?;

        let updated: Option<i32> = query_scalar(ADD_CART_LINE_QUANTITY_SQL)
            .bind(cart.into_uuid())
            .bind(product.into_uuid())
            .bind(quantity_param(quantity)?)
            .bind(quantity_param(max_quantity)?)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(updated) = updated else {
            tx.rollback().await?;

            return Ok(None);
        };

        tx.commit().await?;

        Ok(u32::try_from(updated).ok())
    }

    #[tracing::instrument(
        name = "carts.store.set_quantity",
        skip(self),
        fields(owner = %owner, product_uuid = %product),
        err
    )]
    async fn set_quantity(
        &self,
        owner: &CartOwner,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<bool, CartsServiceError> {
        let rows_affected = query(SET_CART_LINE_QUANTITY_SQL)
            .bind(owner.key())
            .bind(product.into_uuid())
            .bind(quantity_param(quantity)?)
            .execute(self.db.pool())
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    #[tracing::instrument(
        name = "carts.store.remove_line",
        skip(self),
        fields(owner = %owner, product_uuid = %product),
        err
    )]
    async fn remove_line(
        &self,
        owner: &CartOwner,
        product: ProductUuid,
    ) -> Result<(), CartsServiceError> {
        query(DELETE_CART_LINE_SQL)
            .bind(owner.key())
            .bind(product.into_uuid())
            .execute(self.db.pool())
            .await?;

        Ok(())
    }

    #[tracing::instrument(name = "carts.store.clear", skip(self), fields(owner = %owner), err)]
    async fn clear(&self, owner: &CartOwner) -> Result<(), CartsServiceError> {
        query(DELETE_CART_SQL)
            .bind(owner.key())
            .execute(self.db.pool())
            .await?;

        Ok(())
    }

    #[tracing::instrument(
        name = "carts.store.set_promotion_code",
        skip(self, code),
        fields(owner = %owner),
        err
    )]
    async fn set_promotion_code(
        &self,
        owner: &CartOwner,
        code: Option<PromotionCode>,
    ) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin().await?;

        if code.is_some() {
            Self::ensure_cart(&mut tx, owner).await?;
        }

        query(SET_CART_PROMOTION_CODE_SQL)
            .bind(owner.key())
            .bind(code.as_ref().map(PromotionCode::as_str))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for CartLine {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            quantity: try_get_u32(row, "quantity")?,
            added_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
