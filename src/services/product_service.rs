use async_trait::async_trait;
use sqlx::mysql::MySqlConnection;
use sqlx::Connection;

use crate::error::{Error, ErrorKind, Result};
use crate::models::product::{NewProduct, Product};

/// Data access contract for the `productos` table.
///
/// Handlers only see this trait, so the backing database can be swapped for
/// a test double.
#[async_trait]
pub trait ProductStore {
    /// Inserts a row and returns the entity with its assigned id.
    async fn create(&mut self, product: NewProduct) -> Result<Product>;

    /// Returns every row, or only those whose name contains `name`.
    async fn get_all(&mut self, name: Option<&str>) -> Result<Vec<Product>>;

    async fn find_by_id(&mut self, id: i64) -> Result<Product>;

    /// Overwrites every field of the row matching `id`.
    async fn update_by_id(&mut self, id: i64, product: NewProduct) -> Result<Product>;

    async fn remove(&mut self, id: i64) -> Result<()>;

    /// Deletes every row and returns how many were removed.
    async fn remove_all(&mut self) -> Result<u64>;

    /// Releases the underlying resources; further operations fail.
    async fn close(&mut self) -> Result<()>;
}

/// [`ProductStore`] over a single MySQL connection. Every operation executes
/// exactly one statement; no transaction spans more than one.
pub struct MySqlProductService {
    conn: Option<MySqlConnection>,
}

impl MySqlProductService {
    /// Opens the connection. Called once at startup.
    pub async fn connect(url: &str) -> Result<Self> {
        let conn = MySqlConnection::connect(url).await?;
        Ok(MySqlProductService { conn: Some(conn) })
    }

    fn conn(&mut self) -> Result<&mut MySqlConnection> {
        self.conn
            .as_mut()
            .ok_or_else(|| Error::new(ErrorKind::Query, "connection is closed"))
    }
}

#[async_trait]
impl ProductStore for MySqlProductService {
    async fn create(&mut self, product: NewProduct) -> Result<Product> {
        let result =
            sqlx::query("INSERT INTO productos (name, description, price, stock) VALUES (?, ?, ?, ?)")
                .bind(&product.name)
                .bind(&product.description)
                .bind(product.price)
                .bind(product.stock)
                .execute(self.conn()?)
                .await?;

        let created = product.into_product(result.last_insert_id() as i64);
        log::info!("Created: {} - {}", created.name, created.id);
        Ok(created)
    }

    async fn get_all(&mut self, name: Option<&str>) -> Result<Vec<Product>> {
        // The filter always goes through a bound parameter, never string
        // interpolation.
        let products = match name {
            Some(name) => {
                sqlx::query_as::<_, Product>(
                    "SELECT id, name, description, price, stock FROM productos WHERE name LIKE ?",
                )
                .bind(format!("%{}%", name))
                .fetch_all(self.conn()?)
                .await?
            }
            None => {
                sqlx::query_as::<_, Product>(
                    "SELECT id, name, description, price, stock FROM productos",
                )
                .fetch_all(self.conn()?)
                .await?
            }
        };

        Ok(products)
    }

    async fn find_by_id(&mut self, id: i64) -> Result<Product> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, description, price, stock FROM productos WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.conn()?)
        .await?;

        product.ok_or_else(|| ErrorKind::NotFound.into())
    }

    async fn update_by_id(&mut self, id: i64, product: NewProduct) -> Result<Product> {
        let result = sqlx::query(
            "UPDATE productos SET name = ?, description = ?, price = ?, stock = ? WHERE id = ?",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.stock)
        .bind(id)
        .execute(self.conn()?)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ErrorKind::NotFound.into());
        }

        let updated = product.into_product(id);
        log::info!("Updated: {} - {}", updated.name, updated.id);
        Ok(updated)
    }

    async fn remove(&mut self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM productos WHERE id = ?")
            .bind(id)
            .execute(self.conn()?)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ErrorKind::NotFound.into());
        }

        log::info!("Deleted: {}", id);
        Ok(())
    }

    async fn remove_all(&mut self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM productos")
            .execute(self.conn()?)
            .await?;

        let deleted = result.rows_affected();
        log::info!("Deleted all: {} rows", deleted);
        Ok(deleted)
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::models::product::NewProduct;
    use crate::services::testing::MemoryProductStore;

    use super::ProductStore;

    fn pen() -> NewProduct {
        NewProduct {
            name: "Pen".to_owned(),
            description: Some("Blue".to_owned()),
            price: 1.5,
            stock: 100,
        }
    }

    fn notebook() -> NewProduct {
        NewProduct {
            name: "Notebook".to_owned(),
            description: None,
            price: 3.0,
            stock: 20,
        }
    }

    #[tokio::test]
    async fn create_then_find_by_id_roundtrips() {
        let mut store = MemoryProductStore::new();
        let created = store.create(pen()).await.unwrap();

        let found = store.find_by_id(created.id).await.unwrap();
        assert_eq!(created, found);
    }

    #[tokio::test]
    async fn remove_then_find_by_id_is_not_found() {
        let mut store = MemoryProductStore::new();
        let created = store.create(pen()).await.unwrap();

        store.remove(created.id).await.unwrap();
        let err = store.find_by_id(created.id).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn update_missing_id_is_not_found() {
        let mut store = MemoryProductStore::new();
        let err = store.update_by_id(99, pen()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn filtered_get_all_is_a_subset() {
        let mut store = MemoryProductStore::new();
        store.create(pen()).await.unwrap();
        store.create(notebook()).await.unwrap();

        let all = store.get_all(None).await.unwrap();
        let filtered = store.get_all(Some("Pen")).await.unwrap();

        assert_eq!(2, all.len());
        assert_eq!(1, filtered.len());
        assert!(filtered.iter().all(|p| p.name.contains("Pen")));
        assert!(filtered.iter().all(|p| all.contains(p)));
    }

    #[tokio::test]
    async fn remove_all_empties_the_store() {
        let mut store = MemoryProductStore::new();
        store.create(pen()).await.unwrap();
        store.create(notebook()).await.unwrap();

        assert_eq!(2, store.remove_all().await.unwrap());
        assert!(store.get_all(None).await.unwrap().is_empty());
    }
}
