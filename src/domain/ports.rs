use crate::domain::model::{RankBoards, RankSnapshot};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Returns `false` when the file did not exist.
    fn remove_file(&self, path: &str) -> impl std::future::Future<Output = Result<bool>> + Send;
    /// Paths (relative to the storage root) of the files directly under `dir`.
    fn list_files(&self, dir: &str)
        -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<RankBoards>;
    async fn transform(&self, boards: RankBoards) -> Result<RankSnapshot>;
    async fn load(&self, snapshot: RankSnapshot) -> Result<String>;
}
