use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::{Category, CategoryId, CategoryListPayload};
use crate::transport::Transport;

#[derive(Debug, Clone)]
pub struct CategoriesRepository {
    transport: Transport,
}

#[derive(Serialize)]
struct CreateCategory<'a> {
    name: &'a str,
}

impl CategoriesRepository {
    pub const fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// All categories of the signed-in user, whatever shape the server used.
    pub async fn list(&self) -> Result<Vec<Category>> {
        let payload: Option<CategoryListPayload> = self.transport.get("/categories", &[]).await?;
        Ok(CategoryListPayload::into_categories(payload))
    }

    pub async fn create(&self, name: &str) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("category name required"));
        }
        self.transport
            .post("/categories", &CreateCategory { name })
            .await
    }

    /// Deletes the category. The server moves its notes to uncategorized.
    pub async fn delete(&self, id: CategoryId) -> Result<()> {
        let _: Option<Value> = self.transport.delete(&format!("/categories/{id}")).await?;
        Ok(())
    }
}
