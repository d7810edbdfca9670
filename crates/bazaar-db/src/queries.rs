use anyhow::Result;
use rusqlite::{Row, types::ToSql};

use bazaar_types::ids::UserId;
use bazaar_types::product::{Product, ProductDraft, ProductFilter, ProductStatus, ProductSummary};

use crate::Database;

impl Database {
    /// Insert a completed draft as `pending`. Returns the assigned id.
    pub fn insert_product(&self, draft: &ProductDraft) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO products (name, price, description, image_url, creator_name, creator_id, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'pending')",
                rusqlite::params![
                    draft.name,
                    draft.price,
                    draft.description,
                    draft.image_url,
                    draft.creator_name,
                    draft.creator_id.0,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Set status to approved. Returns whether a row was affected, which is
    /// the truthful found/not-found signal (no check-then-act race).
    /// Approving an already-approved product succeeds again.
    pub fn approve_product(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let affected = conn.execute(
                "UPDATE products SET status = 'approved' WHERE id = ?1",
                [id],
            )?;
            Ok(affected > 0)
        })
    }

    /// Hard-delete a product row. Irreversible; returns whether a row existed.
    pub fn delete_product(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM products WHERE id = ?1", [id])?;
            Ok(affected > 0)
        })
    }

    pub fn get_product(&self, id: i64) -> Result<Option<Product>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, price, description, image_url, creator_name, creator_id, status
                 FROM products WHERE id = ?1",
            )?;
            let row = stmt.query_row([id], map_product);
            match row {
                Ok(product) => Ok(Some(product)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Filtered storefront listing. Only approved rows are ever eligible;
    /// the filter parts are AND-combined onto the base query.
    pub fn list_approved(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        self.with_conn(|conn| {
            let mut sql = String::from(
                "SELECT id, name, price, description, image_url, creator_name, creator_id, status
                 FROM products WHERE status = 'approved'",
            );
            let mut params: Vec<Box<dyn ToSql>> = Vec::new();

            if let Some(q) = filter.q.as_deref().filter(|q| !q.is_empty()) {
                sql.push_str(" AND name LIKE ?");
                params.push(Box::new(format!("%{}%", q)));
            }
            if let Some(min) = filter.min_price {
                sql.push_str(" AND price >= ?");
                params.push(Box::new(min));
            }
            if let Some(max) = filter.max_price {
                sql.push_str(" AND price <= ?");
                params.push(Box::new(max));
            }

            let mut stmt = conn.prepare(&sql)?;
            let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
            let rows = stmt
                .query_map(param_refs.as_slice(), map_product)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// id/name/price of every approved product, for `!listproducts`.
    pub fn list_approved_summaries(&self) -> Result<Vec<ProductSummary>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, price FROM products WHERE status = 'approved'")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(ProductSummary {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        price: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn map_product(row: &Row<'_>) -> rusqlite::Result<Product> {
    let status: Option<String> = row.get(7)?;
    Ok(Product {
        id: row.get(0)?,
        name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        price: row.get::<_, Option<f64>>(2)?.unwrap_or_default(),
        description: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        image_url: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        creator_name: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        creator_id: UserId(row.get::<_, Option<i64>>(6)?.unwrap_or_default()),
        // Rows that predate the status column count as pending, never visible
        status: status
            .as_deref()
            .and_then(ProductStatus::parse)
            .unwrap_or(ProductStatus::Pending),
    })
}
