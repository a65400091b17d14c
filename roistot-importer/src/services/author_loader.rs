//! Author resolution
//!
//! Author cells hold `;`-separated names, each either `Last, First` or a
//! bare first name. Authors are shared across stories and roles; the role
//! flags on the author record accumulate.

use crate::columns::{Field, Row};
use crate::graph::EntityGraph;
use crate::registry::TempId;
use roistot_common::db::{AuthorRole, NewAuthor};
use tracing::debug;

/// Column crediting each role
pub const ROLE_COLUMNS: [(AuthorRole, Field); 3] = [
    (AuthorRole::Writer, Field::StoryWrittenBy),
    (AuthorRole::Drawer, Field::StoryDrawnBy),
    (AuthorRole::Inventor, Field::StoryInventedBy),
];

/// Author name as written in the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorName {
    pub first: String,
    pub last: String,
}

/// Split an author cell into names, skipping blank entries
pub fn parse_author_names(cell: &str) -> Vec<AuthorName> {
    cell.split(';')
        .filter(|token| !token.trim().is_empty())
        .map(|token| {
            let parts: Vec<&str> = token.split(',').collect();
            match parts.as_slice() {
                [first] => AuthorName {
                    first: first.trim().to_string(),
                    last: String::new(),
                },
                [last, rest @ ..] => AuthorName {
                    first: rest.join(" ").trim().to_string(),
                    last: last.trim().to_string(),
                },
                [] => AuthorName {
                    first: String::new(),
                    last: String::new(),
                },
            }
        })
        .collect()
}

fn set_role(author: &mut NewAuthor, role: AuthorRole) {
    match role {
        AuthorRole::Writer => author.is_writer = true,
        AuthorRole::Drawer => author.is_drawer = true,
        AuthorRole::Inventor => author.is_inventor = true,
    }
}

impl EntityGraph {
    pub(crate) fn load_authors(&mut self, story: TempId, row: &Row<'_>) {
        for (role, field) in ROLE_COLUMNS {
            for name in parse_author_names(row.value(field)) {
                let author = self.resolve_author(name, role);
                if let Some(draft) = self.stories.get_mut(story) {
                    if draft.item.attach(role, author) {
                        debug!(row = row.number(), story = %story, author = %author, role = role.as_str(), "Author credited");
                    }
                }
            }
        }
    }

    fn resolve_author(&mut self, name: AuthorName, role: AuthorRole) -> TempId {
        // "JohnDoe" and "Doe, John" share a hash, so they are one author
        let hash = self.hasher.hash(&format!("{}{}", name.first, name.last));
        let (entry, _) = self.authors.find_or_add(&self.ids, hash.clone(), || NewAuthor {
            hash,
            first_name: name.first,
            last_name: name.last,
            is_writer: false,
            is_drawer: false,
            is_inventor: false,
        });
        set_role(&mut entry.item, role);
        entry.id
    }
}
