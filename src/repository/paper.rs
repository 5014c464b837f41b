use crate::backend::{Order, Query, ScoutClient};
use crate::error::Result;
use crate::models::Paper;
use crate::types::Table;

/// Read access to the full `papers` collection
#[derive(Debug, Clone)]
pub struct PaperRepository {
    client: ScoutClient,
}

impl PaperRepository {
    pub fn new(client: ScoutClient) -> Self {
        Self { client }
    }

    /// Every paper, newest publication first; undated papers come last
    pub async fn list(&self) -> Result<Vec<Paper>> {
        let query = Query::all().order(Order::desc("publication_date").nulls_last());
        let token = self.client.access_token();
        let rows = self
            .client
            .backend()
            .data()
            .select(Table::Papers, &query, token.as_deref())
            .await?;

        let papers = rows
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<Paper>, _>>()?;
        tracing::debug!(count = papers.len(), "papers loaded");
        Ok(papers)
    }
}
