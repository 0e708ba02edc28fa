//! Page context provider protocol.

use async_trait::async_trait;

use crate::error::AnalysisError;
use crate::types::PageContext;

/// Supplies the scraped metrics of the page under analysis.
#[async_trait]
pub trait PageContextProvider: Send + Sync {
    async fn page_context(&self) -> Result<PageContext, AnalysisError>;
}
