//! Registry item shapes that reference other entries by temporary id

use super::TempId;
use roistot_common::db::{AuthorRole, NewStory};

/// Story being assembled, with its credited authors per role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryDraft {
    pub story: NewStory,
    pub writers: Vec<TempId>,
    pub drawers: Vec<TempId>,
    pub inventors: Vec<TempId>,
}

impl StoryDraft {
    pub fn new(story: NewStory) -> Self {
        Self {
            story,
            writers: Vec::new(),
            drawers: Vec::new(),
            inventors: Vec::new(),
        }
    }

    pub fn authors(&self, role: AuthorRole) -> &[TempId] {
        match role {
            AuthorRole::Writer => &self.writers,
            AuthorRole::Drawer => &self.drawers,
            AuthorRole::Inventor => &self.inventors,
        }
    }

    /// Credit `author` in `role`; returns false if already credited
    pub fn attach(&mut self, role: AuthorRole, author: TempId) -> bool {
        let authors = match role {
            AuthorRole::Writer => &mut self.writers,
            AuthorRole::Drawer => &mut self.drawers,
            AuthorRole::Inventor => &mut self.inventors,
        };
        if authors.contains(&author) {
            return false;
        }
        authors.push(author);
        true
    }
}

/// Story printed in a publication under a title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryPublicationLink {
    pub story: TempId,
    pub publication: TempId,
    pub title: String,
}

/// Villain's appearance in a story
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryVillainLink {
    pub villain: TempId,
    pub story: TempId,
    pub hash: String,
    pub nicknames: Vec<String>,
    pub aliases: Vec<String>,
    pub roles: Vec<String>,
    pub destinies: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_by_role_without_duplicates() {
        let mut draft = StoryDraft::new(NewStory { hash: "h".to_string(), order_num: Some(1) });

        assert!(draft.attach(AuthorRole::Writer, TempId(2)));
        assert!(!draft.attach(AuthorRole::Writer, TempId(2)));
        assert!(draft.attach(AuthorRole::Inventor, TempId(2)));

        assert_eq!(draft.authors(AuthorRole::Writer), &[TempId(2)]);
        assert!(draft.authors(AuthorRole::Drawer).is_empty());
        assert_eq!(draft.inventors, vec![TempId(2)]);
    }
}
