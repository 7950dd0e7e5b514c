//! In-memory [`BulkLoader`] that records what it was given

use super::BulkLoader;
use crate::dimensions::FrameSpec;
use crate::error::{IngestError, Result};
use async_trait::async_trait;
use std::sync::Mutex;

/// A fact as received by [`MemoryLoader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadedFact {
    Bit {
        dimension: String,
        column: u64,
        row: u64,
    },
    Value {
        dimension: String,
        field: String,
        column: u64,
        value: i64,
    },
}

impl LoadedFact {
    pub fn column(&self) -> u64 {
        match self {
            LoadedFact::Bit { column, .. } | LoadedFact::Value { column, .. } => *column,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    schema: Vec<FrameSpec>,
    facts: Vec<LoadedFact>,
    closed: bool,
}

#[derive(Debug, Default)]
pub struct MemoryLoader {
    state: Mutex<State>,
    fail_close: bool,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// A loader whose `close` fails, as an unreachable index would.
    pub fn failing_close() -> Self {
        Self {
            fail_close: true,
            ..Self::default()
        }
    }

    pub fn facts(&self) -> Vec<LoadedFact> {
        self.lock().facts.clone()
    }

    pub fn schema(&self) -> Vec<FrameSpec> {
        self.lock().schema.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A panic while holding the lock cannot leave State half-written.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, fact: LoadedFact) -> Result<()> {
        let mut state = self.lock();
        if state.closed {
            return Err(IngestError::Loader {
                status: 0,
                message: "loader already closed".to_string(),
            });
        }
        state.facts.push(fact);
        Ok(())
    }
}

#[async_trait]
impl BulkLoader for MemoryLoader {
    async fn provision(&self, schema: &[FrameSpec]) -> Result<()> {
        self.lock().schema = schema.to_vec();
        Ok(())
    }

    async fn add_bit(&self, dimension: &str, column: u64, row: u64) -> Result<()> {
        self.push(LoadedFact::Bit {
            dimension: dimension.to_string(),
            column,
            row,
        })
    }

    async fn add_value(&self, dimension: &str, field: &str, column: u64, value: i64) -> Result<()> {
        self.push(LoadedFact::Value {
            dimension: dimension.to_string(),
            field: field.to_string(),
            column,
            value,
        })
    }

    async fn close(&self) -> Result<()> {
        self.lock().closed = true;
        if self.fail_close {
            return Err(IngestError::Loader {
                status: 503,
                message: "index unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::Fact;

    #[tokio::test]
    async fn test_load_records_facts() {
        let loader = MemoryLoader::new();
        loader
            .load(&[Fact::bit("gender", 4, 2), Fact::value("age_i", 4, 31)])
            .await
            .unwrap();

        assert_eq!(
            loader.facts(),
            vec![
                LoadedFact::Bit {
                    dimension: "gender".into(),
                    column: 4,
                    row: 2
                },
                LoadedFact::Value {
                    dimension: "age_i".into(),
                    field: "age_i".into(),
                    column: 4,
                    value: 31
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_rejects_facts_after_close() {
        let loader = MemoryLoader::new();
        loader.close().await.unwrap();
        assert!(loader.is_closed());
        assert!(loader.add_bit("gender", 1, 1).await.is_err());
    }
}
