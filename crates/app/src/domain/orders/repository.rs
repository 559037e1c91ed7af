//! Order Ledger Repository

use std::time::Duration;

use async_trait::async_trait;
use checkout::{FulfillmentStatus, PaymentStatus};
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{
    FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar,
    types::Json,
};
use tracing::debug;
use uuid::Uuid;

use crate::{
    database::{Db, try_get_parsed, try_get_u32},
    domain::{
        catalog::models::{ProductStatus, ProductUuid},
        identity::UserUuid,
        orders::{
            errors::LedgerError,
            ledger::OrderLedger,
            models::{Order, OrderLine, OrderLineUuid, OrderUuid},
        },
        promotions::models::PromotionUuid,
    },
};

const LOCK_PRODUCTS_SQL: &str = include_str!("sql/lock_products.sql");
const DECREMENT_STOCK_SQL: &str = include_str!("sql/decrement_stock.sql");
const GET_PRODUCT_STATUS_SQL: &str = include_str!("sql/get_product_status.sql");
const INCREMENT_PROMOTION_USAGE_SQL: &str = include_str!("sql/increment_promotion_usage.sql");
const GET_PROMOTION_USAGE_SQL: &str = include_str!("sql/get_promotion_usage.sql");
const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");
const CREATE_ORDER_LINE_SQL: &str = include_str!("sql/create_order_line.sql");
const GET_ORDER_SQL: &str = include_str!("sql/get_order.sql");
const GET_ORDER_BY_NUMBER_SQL: &str = include_str!("sql/get_order_by_number.sql");
const GET_ORDER_BY_IDEMPOTENCY_KEY_SQL: &str =
    include_str!("sql/get_order_by_idempotency_key.sql");
const LIST_ORDERS_FOR_USER_SQL: &str = include_str!("sql/list_orders_for_user.sql");
const LIST_ORDERS_SQL: &str = include_str!("sql/list_orders.sql");
const GET_ORDER_LINES_SQL: &str = include_str!("sql/get_order_lines.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("sql/update_order_status.sql");
const UPDATE_ORDER_PAYMENT_STATUS_SQL: &str = include_str!("sql/update_order_payment_status.sql");

#[derive(Debug, Clone)]
pub struct PgOrderLedger {
    db: Db,
    lock_timeout: Duration,
}

impl PgOrderLedger {
    #[must_use]
    pub fn new(db: Db, lock_timeout: Duration) -> Self {
        Self { db, lock_timeout }
    }

    async fn decrement_stock(
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<(), LedgerError> {
        let quantity = i32::try_from(quantity)
            .map_err(|_overflow| LedgerError::InsufficientStock { product })?;

        let rows_affected = query(DECREMENT_STOCK_SQL)
            .bind(product.into_uuid())
            .bind(quantity)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        if rows_affected == 1 {
            return Ok(());
        }

        let status: Option<String> = query_scalar(GET_PRODUCT_STATUS_SQL)
            .bind(product.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        match status.as_deref() {
            Some(status) if status == ProductStatus::Active.as_str() => {
                Err(LedgerError::InsufficientStock { product })
            }
            _ => Err(LedgerError::ProductUnavailable { product }),
        }
    }

    async fn redeem_promotion(
        tx: &mut Transaction<'_, Postgres>,
        promotion: PromotionUuid,
        order: &Order,
    ) -> Result<(), LedgerError> {
        let rows_affected = query(INCREMENT_PROMOTION_USAGE_SQL)
            .bind(promotion.into_uuid())
            .bind(SqlxTimestamp::from(order.created_at))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        if rows_affected == 1 {
            return Ok(());
        }

        let exhausted: Option<bool> = query_scalar(GET_PROMOTION_USAGE_SQL)
            .bind(promotion.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        if exhausted == Some(true) {
            Err(LedgerError::UsageLimitReached)
        } else {
            Err(LedgerError::PromotionUnavailable)
        }
    }

    async fn insert_order(
        tx: &mut Transaction<'_, Postgres>,
        order: &Order,
    ) -> Result<(), LedgerError> {
        query(CREATE_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(&order.order_number)
            .bind(&order.idempotency_key)
            .bind(&order.owner_key)
            .bind(order.user_uuid.map(UserUuid::into_uuid))
            .bind(&order.email)
            .bind(order.status.as_str())
            .bind(order.payment_status.as_str())
            .bind(order.subtotal)
            .bind(order.discount)
            .bind(order.tax)
            .bind(order.shipping)
            .bind(order.total)
            .bind(Json(&order.shipping_address))
            .bind(Json(&order.billing_address))
            .bind(order.promotion_uuid.map(PromotionUuid::into_uuid))
            .bind(order.promotion_code.as_ref().map(|code| code.as_str()))
            .bind(order.payment_reference.as_deref())
            .bind(SqlxTimestamp::from(order.created_at))
            .bind(SqlxTimestamp::from(order.updated_at))
            .execute(&mut **tx)
            .await?;

        for line in &order.lines {
            let quantity = i32::try_from(line.quantity).map_err(|_overflow| {
                LedgerError::InsufficientStock {
                    product: line.product_uuid,
                }
            })?;

            query(CREATE_ORDER_LINE_SQL)
                .bind(line.uuid.into_uuid())
                .bind(order.uuid.into_uuid())
                .bind(line.product_uuid.into_uuid())
                .bind(&line.product_name)
                .bind(line.sku.as_deref())
                .bind(line.unit_price)
                .bind(quantity)
                .bind(line.line_total())
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }

    async fn fetch_one_by(&self, sql: &str, keys: &[&str]) -> Result<Option<Order>, LedgerError> {
        let mut tx = self.db.begin().await?;

        let mut select = query_as::<Postgres, Order>(sql);

        for key in keys {
            select = select.bind(*key);
        }

        let order = select.fetch_optional(&mut *tx).await?;

        let order = match order {
            Some(order) => Some(Self::with_lines(&mut tx, order).await?),
            None => None,
        };

        tx.commit().await?;

        Ok(order)
    }

    async fn fetch_by_uuid(
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Option<Order>, LedgerError> {
        let order = query_as::<Postgres, Order>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        match order {
            Some(order) => Ok(Some(Self::with_lines(tx, order).await?)),
            None => Ok(None),
        }
    }

    async fn fetch_all_with_lines(
        tx: &mut Transaction<'_, Postgres>,
        orders: Vec<Order>,
    ) -> Result<Vec<Order>, LedgerError> {
        let mut with_lines = Vec::with_capacity(orders.len());

        for order in orders {
            with_lines.push(Self::with_lines(tx, order).await?);
        }

        Ok(with_lines)
    }

    async fn with_lines(
        tx: &mut Transaction<'_, Postgres>,
        mut order: Order,
    ) -> Result<Order, LedgerError> {
        order.lines = query_as::<Postgres, OrderLine>(GET_ORDER_LINES_SQL)
            .bind(order.uuid.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        Ok(order)
    }
}

#[async_trait]
impl OrderLedger for PgOrderLedger {
    #[tracing::instrument(
        name = "orders.ledger.commit",
        skip(self, order),
        fields(order_uuid = %order.uuid, order_number = %order.order_number),
        err
    )]
    async fn commit(&self, order: &Order) -> Result<Order, LedgerError> {
        let mut tx = self.db.begin_locking_transaction(self.lock_timeout).await?;

        let mut lines: Vec<&OrderLine> = order.lines.iter().collect();

        lines.sort_by_key(|line| line.product_uuid);

        let products: Vec<Uuid> = lines
            .iter()
            .map(|line| line.product_uuid.into_uuid())
            .collect();

        query(LOCK_PRODUCTS_SQL)
            .bind(&products)
            .fetch_all(&mut *tx)
            .await?;

        for line in lines {
            Self::decrement_stock(&mut tx, line.product_uuid, line.quantity).await?;
        }

        Self::insert_order(&mut tx, order).await?;

        if let Some(promotion) = order.promotion_uuid {
            Self::redeem_promotion(&mut tx, promotion, order).await?;
        }

        tx.commit().await?;

        debug!("committed order");

        Ok(order.clone())
    }

    async fn find_by_idempotency_key(
        &self,
        owner_key: &str,
        key: &str,
    ) -> Result<Option<Order>, LedgerError> {
        self.fetch_one_by(GET_ORDER_BY_IDEMPOTENCY_KEY_SQL, &[owner_key, key])
            .await
    }

    async fn get(&self, order: OrderUuid) -> Result<Option<Order>, LedgerError> {
        let mut tx = self.db.begin().await?;

        let order = Self::fetch_by_uuid(&mut tx, order).await?;

        tx.commit().await?;

        Ok(order)
    }

    async fn find_by_number(&self, number: &str) -> Result<Option<Order>, LedgerError> {
        self.fetch_one_by(GET_ORDER_BY_NUMBER_SQL, &[number]).await
    }

    async fn list_for_user(&self, user: UserUuid) -> Result<Vec<Order>, LedgerError> {
        let mut tx = self.db.begin().await?;

        let orders = query_as::<Postgres, Order>(LIST_ORDERS_FOR_USER_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut *tx)
            .await?;

        let orders = Self::fetch_all_with_lines(&mut tx, orders).await?;

        tx.commit().await?;

        Ok(orders)
    }

    async fn list_orders(
        &self,
        status: Option<FulfillmentStatus>,
    ) -> Result<Vec<Order>, LedgerError> {
        let mut tx = self.db.begin().await?;

        let orders = query_as::<Postgres, Order>(LIST_ORDERS_SQL)
            .bind(status.map(FulfillmentStatus::as_str))
            .fetch_all(&mut *tx)
            .await?;

        let orders = Self::fetch_all_with_lines(&mut tx, orders).await?;

        tx.commit().await?;

        Ok(orders)
    }

    #[tracing::instrument(name = "orders.ledger.update_status", skip(self), err)]
    async fn update_status(
        &self,
        order: OrderUuid,
        from: FulfillmentStatus,
        to: FulfillmentStatus,
    ) -> Result<Option<Order>, LedgerError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = query(UPDATE_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(from.as_str())
            .bind(to.as_str())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            tx.rollback().await?;

            return Ok(None);
        }

        let updated = Self::fetch_by_uuid(&mut tx, order).await?;

        tx.commit().await?;

        Ok(updated)
    }

    #[tracing::instrument(name = "orders.ledger.update_payment_status", skip(self), err)]
    async fn update_payment_status(
        &self,
        order: OrderUuid,
        status: PaymentStatus,
    ) -> Result<Option<Order>, LedgerError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = query(UPDATE_ORDER_PAYMENT_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let updated = if rows_affected == 0 {
            None
        } else {
            Self::fetch_by_uuid(&mut tx, order).await?
        };

        tx.commit().await?;

        Ok(updated)
    }
}

impl<'r> FromRow<'r, PgRow> for Order {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let promotion_code: Option<String> = row.try_get("promotion_code")?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            order_number: row.try_get("order_number")?,
            idempotency_key: row.try_get("idempotency_key")?,
            owner_key: row.try_get("owner_key")?,
            user_uuid: row
                .try_get::<Option<Uuid>, _>("user_uuid")?
                .map(UserUuid::from_uuid),
            email: row.try_get("email")?,
            status: try_get_parsed(row, "status")?,
            payment_status: try_get_parsed(row, "payment_status")?,
            subtotal: row.try_get("subtotal")?,
            discount: row.try_get("discount")?,
            tax: row.try_get("tax")?,
            shipping: row.try_get("shipping")?,
            total: row.try_get("total")?,
            shipping_address: row.try_get::<Json<_>, _>("shipping_address")?.0,
            billing_address: row.try_get::<Json<_>, _>("billing_address")?.0,
            promotion_uuid: row
                .try_get::<Option<Uuid>, _>("promotion_uuid")?
                .map(PromotionUuid::from_uuid),
            promotion_code: promotion_code
                .map(|code| code.parse())
                .transpose()
                .map_err(|e| sqlx::Error::ColumnDecode {
                    index: "promotion_code".to_string(),
                    source: Box::new(e),
                })?,
            payment_reference: row.try_get("payment_reference")?,
            lines: Vec::new(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderLine {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OrderLineUuid::from_uuid(row.try_get("uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            product_name: row.try_get("product_name")?,
            sku: row.try_get("sku")?,
            unit_price: row.try_get("unit_price")?,
            quantity: try_get_u32(row, "quantity")?,
        })
    }
}
