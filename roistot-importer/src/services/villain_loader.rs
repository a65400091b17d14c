//! Villain resolution
//!
//! A villain is matched by the dataset's own villain id when the row has
//! one, otherwise by the hash of all its name and appearance cells. Each
//! villain gets one appearance record per story; repeat encounters merge
//! their multi-valued cells into the existing records.

use crate::columns::{Field, Row};
use crate::graph::EntityGraph;
use crate::registry::{merge_unique, StoryVillainLink, TempId};
use roistot_common::db::NewVillain;
use tracing::debug;

/// Cells hashed when the row has no villain id, in this order
const IDENTITY_FIELDS: [Field; 7] = [
    Field::Ranks,
    Field::FirstNames,
    Field::LastName,
    Field::Nicknames,
    Field::Aliases,
    Field::Roles,
    Field::Destiny,
];

/// Split a `;`-separated cell, dropping blank values
pub fn split_values(cell: &str) -> Vec<String> {
    cell.split(';')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

impl EntityGraph {
    pub(crate) fn load_villain(&mut self, story: TempId, row: &Row<'_>) {
        let villain_id = row.trimmed(Field::VillainId);
        let blank = IDENTITY_FIELDS.iter().all(|field| row.trimmed(*field).is_empty());
        if blank && villain_id.is_empty() {
            return;
        }

        let hash = if villain_id.is_empty() {
            let composite: String = IDENTITY_FIELDS.iter().map(|field| row.value(*field)).collect();
            self.hasher.hash(&composite)
        } else {
            self.hasher.hash(villain_id)
        };

        let villain = self.resolve_villain(hash, row);
        self.link_villain(villain, story, row);
    }

    fn resolve_villain(&mut self, hash: String, row: &Row<'_>) -> TempId {
        let ranks = split_values(row.value(Field::Ranks));
        let first_names = split_values(row.value(Field::FirstNames));
        let last_name = row.trimmed(Field::LastName);

        match self.villains.find_by_key_mut(&hash) {
            Some(entry) => {
                merge_unique(&mut entry.item.ranks, &ranks);
                merge_unique(&mut entry.item.first_names, &first_names);
                if entry.item.last_name.is_empty() && !last_name.is_empty() {
                    entry.item.last_name = last_name.to_string();
                }
                entry.id
            }
            None => {
                let item = NewVillain {
                    hash: hash.clone(),
                    ranks,
                    first_names,
                    last_name: last_name.to_string(),
                };
                let id = self.villains.add(&self.ids, hash, item).id;
                debug!(row = row.number(), villain = %id, "Villain registered");
                id
            }
        }
    }

    fn link_villain(&mut self, villain: TempId, story: TempId, row: &Row<'_>) {
        let hash = self.hasher.hash(&format!("{}:{}", villain, story));
        let nicknames = split_values(row.value(Field::Nicknames));
        let aliases = split_values(row.value(Field::Aliases));
        let roles = split_values(row.value(Field::Roles));
        let destinies = split_values(row.value(Field::Destiny));

        match self.story_villains.find_by_key_mut(&hash) {
            Some(entry) => {
                let link = &mut entry.item;
                merge_unique(&mut link.nicknames, &nicknames);
                merge_unique(&mut link.aliases, &aliases);
                merge_unique(&mut link.roles, &roles);
                merge_unique(&mut link.destinies, &destinies);
            }
            None => {
                let link = StoryVillainLink {
                    villain,
                    story,
                    hash: hash.clone(),
                    nicknames,
                    aliases,
                    roles,
                    destinies,
                };
                self.story_villains.add(&self.ids, hash, link);
            }
        }
    }
}
