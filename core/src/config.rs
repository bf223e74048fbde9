//! Client configuration.
//!
//! The configuration is read-only once a `RestClient` is constructed and is
//! shared by every request the client issues.

use serde::Deserialize;
use uuid::Uuid;

use crate::multipart::DEFAULT_BOUNDARY;

/// How multipart boundaries are chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryStrategy {
    /// Every multipart request uses the same token.
    Fixed(String),
    /// Every multipart request draws a fresh random token.
    #[default]
    PerRequest,
}

impl BoundaryStrategy {
    /// A fixed strategy using `DEFAULT_BOUNDARY`.
    pub fn fixed_default() -> Self {
        BoundaryStrategy::Fixed(DEFAULT_BOUNDARY.to_string())
    }

    pub fn boundary(&self) -> String {
        match self {
            BoundaryStrategy::Fixed(token) => token.clone(),
            BoundaryStrategy::PerRequest => format!("rest-core-{}", Uuid::new_v4().simple()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RestClientConfig {
    pub boundary: BoundaryStrategy,
}

impl RestClientConfig {
    pub fn with_boundary(mut self, boundary: BoundaryStrategy) -> Self {
        self.boundary = boundary;
        self
    }
}
