//! Catalog Repository

use async_trait::async_trait;
use sqlx::{FromRow, Postgres, Row, postgres::PgRow, query_as};

use crate::{
    database::{Db, try_get_parsed, try_get_u32},
    domain::catalog::{
        errors::CatalogError,
        gateway::CatalogGateway,
        models::{CatalogProduct, ProductUuid},
    },
};

const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");

#[derive(Debug, Clone)]
pub struct PgCatalogGateway {
    db: Db,
}

impl PgCatalogGateway {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogGateway for PgCatalogGateway {
    #[tracing::instrument(name = "catalog.get_product", skip(self), fields(product_uuid = %product), err)]
    async fn get_product(&self, product: ProductUuid) -> Result<CatalogProduct, CatalogError> {
        let product = query_as::<Postgres, CatalogProduct>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_one(self.db.pool())
            .await?;

        Ok(product)
    }
}

impl<'r> FromRow<'r, PgRow> for CatalogProduct {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            sku: row.try_get("sku")?,
            price: row.try_get("price")?,
            stock_quantity: try_get_u32(row, "stock_quantity")?,
            status: try_get_parsed(row, "status")?,
        })
    }
}
