//! Story resolution
//!
//! A story is identified by its running order number. Rows without one (or
//! with 0) fall back to the hash of the raw title cell.

use crate::columns::{Field, Row};
use crate::error::{ImportError, ImportResult};
use crate::graph::EntityGraph;
use crate::registry::{StoryDraft, TempId};
use roistot_common::db::NewStory;

/// Identity of a row's story, computed before anything is registered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryKey {
    pub hash: String,
    pub order_num: Option<i32>,
}

impl EntityGraph {
    pub(crate) fn story_key(&self, row: &Row<'_>) -> ImportResult<StoryKey> {
        let raw = row.trimmed(Field::StoryOrderNum);
        let order_num = if raw.is_empty() {
            None
        } else {
            let parsed: i32 = raw.parse().map_err(|_| ImportError::Parse {
                row: row.number(),
                column: Field::StoryOrderNum.key(),
                value: raw.to_string(),
            })?;
            Some(parsed).filter(|n| *n != 0)
        };

        let hash = match order_num {
            Some(n) => self.hasher.hash(&n.to_string()),
            None => {
                let title = row.value(Field::StoryTitle);
                if title.trim().is_empty() {
                    return Err(ImportError::MissingTitle {
                        row: row.number(),
                        column: Field::StoryTitle.key(),
                    });
                }
                self.hasher.hash(title)
            }
        };

        Ok(StoryKey { hash, order_num })
    }

    /// Existing story for `key`, or a newly registered one
    pub(crate) fn load_story(&mut self, key: StoryKey) -> TempId {
        let StoryKey { hash, order_num } = key;
        let (entry, _) = self.stories.find_or_add(&self.ids, hash.clone(), || {
            StoryDraft::new(NewStory { hash, order_num })
        });
        entry.id
    }
}
