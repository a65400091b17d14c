//! Column mapping
//!
//! The source table labels its columns in Finnish. The header row is mapped
//! once to canonical fields; cells are then looked up by field. Lookups never
//! fail: a field missing from the dataset or a row shorter than the header
//! both read as an empty cell.

use std::collections::HashMap;
use tracing::{debug, warn};

/// Canonical field of the source table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Ranks,
    FirstNames,
    LastName,
    Nicknames,
    Aliases,
    Roles,
    Destiny,
    StoryTitle,
    StoryWrittenBy,
    StoryDrawnBy,
    StoryInventedBy,
    PubYear,
    PubFrom,
    PubTo,
    RepubYear,
    RepubFrom,
    RepubTo,
    PubSpecial,
    PubKronikka,
    PubKirjasto,
    ItalyYear,
    ItalyPubFrom,
    ItalyPubTo,
    ItalyPubSpecial,
    ItalyStoryTitle,
    StoryOrderNum,
    VillainId,
}

impl Field {
    /// Canonical key, used in log and error messages
    pub fn key(&self) -> &'static str {
        match self {
            Field::Ranks => "ranks",
            Field::FirstNames => "first_names",
            Field::LastName => "last_name",
            Field::Nicknames => "nicknames",
            Field::Aliases => "aliases",
            Field::Roles => "roles",
            Field::Destiny => "destiny",
            Field::StoryTitle => "story_title",
            Field::StoryWrittenBy => "story_written_by",
            Field::StoryDrawnBy => "story_drawn_by",
            Field::StoryInventedBy => "story_invented_by",
            Field::PubYear => "pub_year",
            Field::PubFrom => "pub_from",
            Field::PubTo => "pub_to",
            Field::RepubYear => "repub_year",
            Field::RepubFrom => "repub_from",
            Field::RepubTo => "repub_to",
            Field::PubSpecial => "pub_special",
            Field::PubKronikka => "pub_kronikka",
            Field::PubKirjasto => "pub_kirjasto",
            Field::ItalyYear => "italy_year",
            Field::ItalyPubFrom => "italy_pub_from",
            Field::ItalyPubTo => "italy_pub_to",
            Field::ItalyPubSpecial => "italy_pub_special",
            Field::ItalyStoryTitle => "italy_story_title",
            Field::StoryOrderNum => "story_order_num",
            Field::VillainId => "villain_id",
        }
    }
}

/// Header label → field table of the source spreadsheet
pub const DEFAULT_COLUMNS: &[(&str, Field)] = &[
    ("Arvo", Field::Ranks),
    ("Etunimi", Field::FirstNames),
    ("Sukunimi", Field::LastName),
    ("Lempinimi/Intiaaninimi", Field::Nicknames),
    ("Salanimi/Alias", Field::Aliases),
    ("Rooli", Field::Roles),
    ("Kohtalo", Field::Destiny),
    ("Tarina", Field::StoryTitle),
    ("Kertoi", Field::StoryWrittenBy),
    ("Piirsi", Field::StoryDrawnBy),
    ("Käsikirjoitti/Ideoi", Field::StoryInventedBy),
    ("Vuosi", Field::PubYear),
    ("Alkaen", Field::PubFrom),
    ("Päättyen", Field::PubTo),
    ("UVuosi", Field::RepubYear),
    ("Ualkaen", Field::RepubFrom),
    ("Upäättyen", Field::RepubTo),
    ("Erikoisjulkaisu", Field::PubSpecial),
    ("Kronikka", Field::PubKronikka),
    ("Kirjasto", Field::PubKirjasto),
    ("Italian vuosi", Field::ItalyYear),
    ("Italian alkunumero", Field::ItalyPubFrom),
    ("Italian päättymisnumero", Field::ItalyPubTo),
    ("Italian erikoisjulkaisu", Field::ItalyPubSpecial),
    ("Italian tarina", Field::ItalyStoryTitle),
    ("Järjestysluku", Field::StoryOrderNum),
    ("Sama numero, sama roisto", Field::VillainId),
];

/// Field → column index for one dataset
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    indexes: HashMap<Field, usize>,
}

impl ColumnMap {
    /// Map a header row using the default label table
    pub fn new<S: AsRef<str>>(header: &[S]) -> Self {
        Self::with_labels(header, DEFAULT_COLUMNS)
    }

    /// Map a header row using a custom label table
    ///
    /// Unknown labels are skipped. When a label repeats, the last column wins.
    pub fn with_labels<S: AsRef<str>>(header: &[S], labels: &[(&str, Field)]) -> Self {
        let mut indexes = HashMap::new();
        for (index, label) in header.iter().enumerate() {
            let label = label.as_ref().trim();
            match labels.iter().find(|(l, _)| *l == label) {
                Some((_, field)) => {
                    indexes.insert(*field, index);
                }
                None if label.is_empty() => {}
                None => warn!(column = index, label, "Unknown header label ignored"),
            }
        }
        debug!(mapped = indexes.len(), columns = header.len(), "Header mapped");
        Self { indexes }
    }

    pub fn index_of(&self, field: Field) -> Option<usize> {
        self.indexes.get(&field).copied()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.indexes.contains_key(&field)
    }

    /// Cell of `field` in `cells`, or "" when absent
    pub fn value<'c, S: AsRef<str>>(&self, cells: &'c [S], field: Field) -> &'c str {
        match self.index_of(field) {
            Some(index) => cells.get(index).map(|c| c.as_ref()).unwrap_or(""),
            None => "",
        }
    }
}

/// One data row bound to the dataset's column map
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a ColumnMap,
    cells: &'a [String],
    index: usize,
}

impl<'a> Row<'a> {
    pub fn new(columns: &'a ColumnMap, cells: &'a [String], index: usize) -> Self {
        Self { columns, cells, index }
    }

    /// Raw cell value, "" when the column is missing or the row is short
    pub fn value(&self, field: Field) -> &'a str {
        if let Some(index) = self.columns.index_of(field) {
            if index >= self.cells.len() {
                debug!(row = self.number(), field = field.key(), "Short row, no value");
            }
        }
        self.columns.value(self.cells, field)
    }

    /// Trimmed cell value
    pub fn trimmed(&self, field: Field) -> &'a str {
        self.value(field).trim()
    }

    /// 1-based position among the data rows, as reported in errors
    pub fn number(&self) -> usize {
        self.index + 1
    }
}
