//! Database records
//!
//! Each persisted table has two shapes: a `New*` row as handed to bulk
//! create (identity is the content hash, the run's version is added by the
//! store), and the stored record carrying the durable `id`.
//!
//! Nullable and multi-valued columns are decoded field by field; list
//! columns are stored as JSON arrays in TEXT.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::bulk::SqlValue;

/// One import run; every row written by the run references it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Role an author has in a story
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorRole {
    Writer,
    Drawer,
    Inventor,
}

impl AuthorRole {
    pub const ALL: [AuthorRole; 3] = [AuthorRole::Writer, AuthorRole::Drawer, AuthorRole::Inventor];

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorRole::Writer => "writer",
            AuthorRole::Drawer => "drawer",
            AuthorRole::Inventor => "inventor",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == tag)
    }
}

/// Publication series an issue belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PublicationKind {
    /// Regular numbered issue (also used for reprint runs)
    Regular,
    /// "Maxi-Tex" special
    Maxi,
    /// "Suuralbumi" special
    SuurAlbum,
    /// Any other special publication
    OtherSpecial,
    /// Chronicle reprint ("Kronikka")
    Chronicle,
    /// Library reprint ("Kirjasto")
    Library,
    /// Italian regular numbered issue
    ItalianRegular,
    /// Italian special publication
    ItalianSpecial,
}

impl PublicationKind {
    pub const ALL: [PublicationKind; 8] = [
        PublicationKind::Regular,
        PublicationKind::Maxi,
        PublicationKind::SuurAlbum,
        PublicationKind::OtherSpecial,
        PublicationKind::Chronicle,
        PublicationKind::Library,
        PublicationKind::ItalianRegular,
        PublicationKind::ItalianSpecial,
    ];

    /// Canonical tag, stored in `publications.type` and fed into the content hash
    pub fn tag(&self) -> &'static str {
        match self {
            PublicationKind::Regular => "perus",
            PublicationKind::Maxi => "maxi",
            PublicationKind::SuurAlbum => "suur",
            PublicationKind::OtherSpecial => "muu_erikois",
            PublicationKind::Chronicle => "kronikka",
            PublicationKind::Library => "kirjasto",
            PublicationKind::ItalianRegular => "italia_perus",
            PublicationKind::ItalianSpecial => "italia_erikois",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

/// Row shape accepted by bulk create
pub trait EncodeRow {
    const TABLE: &'static str;
    /// Column names, excluding the trailing `version` column the store appends
    const COLUMNS: &'static [&'static str];

    fn encode(&self) -> Result<Vec<SqlValue>>;
}

/// Stored record decoded from a full table row
pub trait DecodeRow: Sized {
    const TABLE: &'static str;
    /// Comma-separated select list matching `decode`
    const SELECT: &'static str;

    fn decode(row: &SqliteRow) -> Result<Self>;
}

/// Stored entity with a durable id and an identifying content hash
pub trait Hashed {
    fn id(&self) -> i64;
    fn hash(&self) -> &str;
}

fn encode_list(values: &[String]) -> Result<SqlValue> {
    Ok(SqlValue::Text(serde_json::to_string(values)?))
}

fn decode_list(row: &SqliteRow, column: &str) -> Result<Vec<String>> {
    let raw: Option<String> = row.try_get(column)?;
    match raw {
        Some(json) if !json.is_empty() => Ok(serde_json::from_str(&json)?),
        _ => Ok(Vec::new()),
    }
}

fn decode_role(row: &SqliteRow, column: &str) -> Result<AuthorRole> {
    let tag: String = row.try_get(column)?;
    AuthorRole::from_tag(&tag)
        .ok_or_else(|| Error::Internal(format!("Unknown author role in database: {}", tag)))
}

macro_rules! impl_hashed {
    ($($ty:ty),*) => {
        $(impl Hashed for $ty {
            fn id(&self) -> i64 {
                self.id
            }
            fn hash(&self) -> &str {
                &self.hash
            }
        })*
    };
}

// ============================================================================
// Authors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthor {
    pub hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_writer: bool,
    pub is_drawer: bool,
    pub is_inventor: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub id: i64,
    pub hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_writer: bool,
    pub is_drawer: bool,
    pub is_inventor: bool,
}

impl EncodeRow for NewAuthor {
    const TABLE: &'static str = "authors";
    const COLUMNS: &'static [&'static str] =
        &["hash", "first_name", "last_name", "is_writer", "is_drawer", "is_inventor"];

    fn encode(&self) -> Result<Vec<SqlValue>> {
        Ok(vec![
            self.hash.as_str().into(),
            self.first_name.as_str().into(),
            self.last_name.as_str().into(),
            self.is_writer.into(),
            self.is_drawer.into(),
            self.is_inventor.into(),
        ])
    }
}

impl DecodeRow for Author {
    const TABLE: &'static str = "authors";
    const SELECT: &'static str = "id, hash, first_name, last_name, is_writer, is_drawer, is_inventor";

    fn decode(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            hash: row.try_get("hash")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            is_writer: row.try_get("is_writer")?,
            is_drawer: row.try_get("is_drawer")?,
            is_inventor: row.try_get("is_inventor")?,
        })
    }
}

// ============================================================================
// Publications
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPublication {
    pub hash: String,
    pub kind: PublicationKind,
    pub year: Option<i32>,
    pub issue: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Publication {
    pub id: i64,
    pub hash: String,
    pub kind: PublicationKind,
    pub year: Option<i32>,
    pub issue: String,
}

impl EncodeRow for NewPublication {
    const TABLE: &'static str = "publications";
    const COLUMNS: &'static [&'static str] = &["hash", "type", "year", "issue"];

    fn encode(&self) -> Result<Vec<SqlValue>> {
        Ok(vec![
            self.hash.as_str().into(),
            self.kind.tag().into(),
            self.year.map(i64::from).into(),
            self.issue.as_str().into(),
        ])
    }
}

impl DecodeRow for Publication {
    const TABLE: &'static str = "publications";
    const SELECT: &'static str = "id, hash, type, year, issue";

    fn decode(row: &SqliteRow) -> Result<Self> {
        let tag: String = row.try_get("type")?;
        let kind = PublicationKind::from_tag(&tag)
            .ok_or_else(|| Error::Internal(format!("Unknown publication type in database: {}", tag)))?;
        Ok(Self {
            id: row.try_get("id")?,
            hash: row.try_get("hash")?,
            kind,
            year: row.try_get("year")?,
            issue: row.try_get("issue")?,
        })
    }
}

// ============================================================================
// Stories
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStory {
    pub hash: String,
    pub order_num: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Story {
    pub id: i64,
    pub hash: String,
    pub order_num: Option<i32>,
}

impl EncodeRow for NewStory {
    const TABLE: &'static str = "stories";
    const COLUMNS: &'static [&'static str] = &["hash", "order_num"];

    fn encode(&self) -> Result<Vec<SqlValue>> {
        Ok(vec![self.hash.as_str().into(), self.order_num.map(i64::from).into()])
    }
}

impl DecodeRow for Story {
    const TABLE: &'static str = "stories";
    const SELECT: &'static str = "id, hash, order_num";

    fn decode(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            hash: row.try_get("hash")?,
            order_num: row.try_get("order_num")?,
        })
    }
}

/// Author credited on a story in one role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStoryAuthor {
    pub story: i64,
    pub author: i64,
    pub role: AuthorRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryAuthor {
    pub id: i64,
    pub story: i64,
    pub author: i64,
    pub role: AuthorRole,
}

impl EncodeRow for NewStoryAuthor {
    const TABLE: &'static str = "authors_in_stories";
    const COLUMNS: &'static [&'static str] = &["story", "author", "type"];

    fn encode(&self) -> Result<Vec<SqlValue>> {
        Ok(vec![self.story.into(), self.author.into(), self.role.as_str().into()])
    }
}

impl DecodeRow for StoryAuthor {
    const TABLE: &'static str = "authors_in_stories";
    const SELECT: &'static str = "id, story, author, type";

    fn decode(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            story: row.try_get("story")?,
            author: row.try_get("author")?,
            role: decode_role(row, "type")?,
        })
    }
}

/// Story appearing in a publication under a given title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStoryPublication {
    pub story: i64,
    pub publication: i64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryPublication {
    pub id: i64,
    pub story: i64,
    pub publication: i64,
    pub title: String,
}

impl EncodeRow for NewStoryPublication {
    const TABLE: &'static str = "stories_in_publications";
    const COLUMNS: &'static [&'static str] = &["story", "publication", "title"];

    fn encode(&self) -> Result<Vec<SqlValue>> {
        Ok(vec![self.story.into(), self.publication.into(), self.title.as_str().into()])
    }
}

impl DecodeRow for StoryPublication {
    const TABLE: &'static str = "stories_in_publications";
    const SELECT: &'static str = "id, story, publication, title";

    fn decode(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            story: row.try_get("story")?,
            publication: row.try_get("publication")?,
            title: row.try_get("title")?,
        })
    }
}

// ============================================================================
// Villains
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVillain {
    pub hash: String,
    pub ranks: Vec<String>,
    pub first_names: Vec<String>,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Villain {
    pub id: i64,
    pub hash: String,
    pub ranks: Vec<String>,
    pub first_names: Vec<String>,
    pub last_name: String,
}

impl EncodeRow for NewVillain {
    const TABLE: &'static str = "villains";
    const COLUMNS: &'static [&'static str] = &["hash", "ranks", "first_names", "last_name"];

    fn encode(&self) -> Result<Vec<SqlValue>> {
        Ok(vec![
            self.hash.as_str().into(),
            encode_list(&self.ranks)?,
            encode_list(&self.first_names)?,
            self.last_name.as_str().into(),
        ])
    }
}

impl DecodeRow for Villain {
    const TABLE: &'static str = "villains";
    const SELECT: &'static str = "id, hash, ranks, first_names, last_name";

    fn decode(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            hash: row.try_get("hash")?,
            ranks: decode_list(row, "ranks")?,
            first_names: decode_list(row, "first_names")?,
            last_name: row.try_get("last_name")?,
        })
    }
}

/// Villain's appearance in one story
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStoryVillain {
    pub villain: i64,
    pub story: i64,
    pub hash: String,
    pub nicknames: Vec<String>,
    pub aliases: Vec<String>,
    pub roles: Vec<String>,
    pub destinies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryVillain {
    pub id: i64,
    pub villain: i64,
    pub story: i64,
    pub hash: String,
    pub nicknames: Vec<String>,
    pub aliases: Vec<String>,
    pub roles: Vec<String>,
    pub destinies: Vec<String>,
}

impl EncodeRow for NewStoryVillain {
    const TABLE: &'static str = "villains_in_stories";
    const COLUMNS: &'static [&'static str] =
        &["villain", "story", "hash", "nicknames", "aliases", "roles", "destiny"];

    fn encode(&self) -> Result<Vec<SqlValue>> {
        Ok(vec![
            self.villain.into(),
            self.story.into(),
            self.hash.as_str().into(),
            encode_list(&self.nicknames)?,
            encode_list(&self.aliases)?,
            encode_list(&self.roles)?,
            encode_list(&self.destinies)?,
        ])
    }
}

impl DecodeRow for StoryVillain {
    const TABLE: &'static str = "villains_in_stories";
    const SELECT: &'static str = "id, villain, story, hash, nicknames, aliases, roles, destiny";

    fn decode(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            villain: row.try_get("villain")?,
            story: row.try_get("story")?,
            hash: row.try_get("hash")?,
            nicknames: decode_list(row, "nicknames")?,
            aliases: decode_list(row, "aliases")?,
            roles: decode_list(row, "roles")?,
            destinies: decode_list(row, "destiny")?,
        })
    }
}

impl_hashed!(Author, Publication, Story, Villain, StoryVillain);
