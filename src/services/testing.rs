use async_trait::async_trait;

use crate::error::{Error, ErrorKind, Result};
use crate::models::product::{NewProduct, Product};

use super::product_service::ProductStore;

/// In-memory stand-in for the MySQL store, used by handler tests.
pub struct MemoryProductStore {
    rows: Vec<Product>,
    next_id: i64,
    /// When set, every operation fails with a query error.
    pub fail: bool,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        MemoryProductStore {
            rows: Vec::new(),
            next_id: 1,
            fail: false,
        }
    }

    fn check(&self) -> Result<()> {
        if self.fail {
            Err(Error::new(ErrorKind::Query, "simulated database failure"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn create(&mut self, product: NewProduct) -> Result<Product> {
        self.check()?;
        let created = product.into_product(self.next_id);
        self.next_id += 1;
        self.rows.push(created.clone());
        Ok(created)
    }

    async fn get_all(&mut self, name: Option<&str>) -> Result<Vec<Product>> {
        self.check()?;
        Ok(match name {
            Some(filter) => self
                .rows
                .iter()
                .filter(|p| p.name.contains(filter))
                .cloned()
                .collect(),
            None => self.rows.clone(),
        })
    }

    async fn find_by_id(&mut self, id: i64) -> Result<Product> {
        self.check()?;
        self.rows
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| ErrorKind::NotFound.into())
    }

    async fn update_by_id(&mut self, id: i64, product: NewProduct) -> Result<Product> {
        self.check()?;
        match self.rows.iter_mut().find(|p| p.id == id) {
            Some(row) => {
                *row = product.into_product(id);
                Ok(row.clone())
            }
            None => Err(ErrorKind::NotFound.into()),
        }
    }

    async fn remove(&mut self, id: i64) -> Result<()> {
        self.check()?;
        let before = self.rows.len();
        self.rows.retain(|p| p.id != id);
        if self.rows.len() == before {
            Err(ErrorKind::NotFound.into())
        } else {
            Ok(())
        }
    }

    async fn remove_all(&mut self) -> Result<u64> {
        self.check()?;
        let deleted = self.rows.len() as u64;
        self.rows.clear();
        Ok(deleted)
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
