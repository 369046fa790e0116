//! Token provider backed by static configuration.
//!
//! The hosted session provider lives outside this core; in headless runs a
//! long-lived token from the environment stands in for it.

use crate::ports::token::TokenProvider;
use async_trait::async_trait;
use std::error::Error;

pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn bearer_token(&self) -> Result<String, Box<dyn Error + Send + Sync>> {
        Ok(self.token.clone())
    }
}
