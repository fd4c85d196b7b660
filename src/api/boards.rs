//! Board endpoints.

use crate::error::Result;
use crate::models::{Board, NewBoard, Phase};
use crate::transport::AuthHttpClient;

use super::{expect_success, json_body, parse_json};

/// Typed access to `/boards`.
pub struct BoardsApi<'a> {
    http: &'a AuthHttpClient,
}

impl<'a> BoardsApi<'a> {
    pub(crate) fn new(http: &'a AuthHttpClient) -> Self {
        Self { http }
    }

    /// List all boards visible to the collaborator.
    pub async fn list(&self) -> Result<Vec<Board>> {
        parse_json(self.http.get("/boards").await?).await
    }

    /// Fetch a single board.
    pub async fn get(&self, id: &str) -> Result<Board> {
        parse_json(self.http.get(&format!("/boards/{}", id)).await?).await
    }

    /// Create a board.
    pub async fn create(&self, board: &NewBoard) -> Result<Board> {
        let body = json_body(board)?;
        parse_json(self.http.post_json("/boards", &body).await?).await
    }

    /// Delete a board.
    pub async fn delete(&self, id: &str) -> Result<()> {
        expect_success(self.http.delete(&format!("/boards/{}", id)).await?).await
    }

    /// List the phases of a board, in position order.
    pub async fn phases(&self, board_id: &str) -> Result<Vec<Phase>> {
        parse_json(self.http.get(&format!("/boards/{}/phases", board_id)).await?).await
    }
}
