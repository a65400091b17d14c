//! Publication resolution
//!
//! Each row can place its story in up to eight kinds of publication. Range
//! kinds (regular, reprint, Italian regular) expand an issue range into one
//! publication per issue; label kinds (specials, chronicle, library) are a
//! single publication named by a free-text cell.
//!
//! The title cells list one title per publication the story appeared in,
//! separated by `;`. Passes with data take the next title in order: the
//! regular, reprint, special, chronicle and library passes share
//! `story_title`, the Italian passes share `italy_story_title`.
//!
//! **Algorithm:**
//! 1. Plan every pass of the row, parsing all numeric cells
//! 2. Register the planned publications, reusing existing ones by hash
//! 3. Link the story to each publication once

use crate::columns::{Field, Row};
use crate::error::{ImportError, ImportResult};
use crate::graph::EntityGraph;
use crate::issues::{issues_between, parse_issue_number, IssueRangeError};
use crate::registry::{StoryPublicationLink, TempId};
use roistot_common::db::{NewPublication, PublicationKind};
use roistot_common::ContentHasher;
use tracing::debug;

/// Columns feeding one range pass
#[derive(Debug, Clone, Copy)]
pub struct RangePass {
    pub kind: PublicationKind,
    pub year: Field,
    pub from: Field,
    pub to: Field,
}

pub const REGULAR: RangePass = RangePass {
    kind: PublicationKind::Regular,
    year: Field::PubYear,
    from: Field::PubFrom,
    to: Field::PubTo,
};

/// Reprints run in the regular series
pub const REPRINT: RangePass = RangePass {
    kind: PublicationKind::Regular,
    year: Field::RepubYear,
    from: Field::RepubFrom,
    to: Field::RepubTo,
};

pub const ITALIAN_REGULAR: RangePass = RangePass {
    kind: PublicationKind::ItalianRegular,
    year: Field::ItalyYear,
    from: Field::ItalyPubFrom,
    to: Field::ItalyPubTo,
};

/// Special publication kind named by its label
pub fn classify_special(label: &str) -> PublicationKind {
    let lower = label.to_lowercase();
    if lower.contains("suuralbumi") {
        PublicationKind::SuurAlbum
    } else if lower.contains("maxi-tex") {
        PublicationKind::Maxi
    } else {
        PublicationKind::OtherSpecial
    }
}

/// Publication a row links its story to, before registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPublication {
    pub publication: NewPublication,
    pub title: String,
}

/// Successive titles of one title cell
struct TitleSlots<'a> {
    field: Field,
    titles: Vec<&'a str>,
    next: usize,
}

impl<'a> TitleSlots<'a> {
    fn new(row: &Row<'a>, field: Field) -> Self {
        Self {
            field,
            titles: row.value(field).split(';').map(str::trim).collect(),
            next: 0,
        }
    }

    /// Title of the next pass; an absent or blank slot falls back to the first title
    fn take(&mut self, row: &Row<'_>) -> ImportResult<String> {
        let slot = self.next;
        self.next += 1;

        let first = self.titles.first().copied().filter(|t| !t.is_empty());
        self.titles
            .get(slot)
            .copied()
            .filter(|t| !t.is_empty())
            .or(first)
            .map(str::to_string)
            .ok_or(ImportError::MissingTitle {
                row: row.number(),
                column: self.field.key(),
            })
    }
}

fn range_publication(hasher: &ContentHasher, kind: PublicationKind, year: i32, number: u32) -> NewPublication {
    NewPublication {
        hash: hasher.hash(&format!("{}{}{}", kind.tag(), year, number)),
        kind,
        year: Some(year),
        issue: number.to_string(),
    }
}

fn label_publication(hasher: &ContentHasher, kind: PublicationKind, label: &str) -> NewPublication {
    NewPublication {
        hash: hasher.hash(&format!("{}{}", kind.tag(), label)),
        kind,
        year: None,
        issue: label.to_string(),
    }
}

impl EntityGraph {
    /// Every publication the row links its story to
    pub(crate) fn plan_publications(&self, row: &Row<'_>) -> ImportResult<Vec<PlannedPublication>> {
        let mut planned = Vec::new();
        let mut titles = TitleSlots::new(row, Field::StoryTitle);
        let mut italian_titles = TitleSlots::new(row, Field::ItalyStoryTitle);

        self.plan_range(row, REGULAR, &mut titles, &mut planned)?;
        self.plan_range(row, REPRINT, &mut titles, &mut planned)?;
        self.plan_range(row, ITALIAN_REGULAR, &mut italian_titles, &mut planned)?;
        self.plan_label(row, Field::PubSpecial, classify_special, &mut titles, &mut planned)?;
        self.plan_label(
            row,
            Field::ItalyPubSpecial,
            |_| PublicationKind::ItalianSpecial,
            &mut italian_titles,
            &mut planned,
        )?;
        self.plan_label(row, Field::PubKronikka, |_| PublicationKind::Chronicle, &mut titles, &mut planned)?;
        self.plan_label(row, Field::PubKirjasto, |_| PublicationKind::Library, &mut titles, &mut planned)?;

        Ok(planned)
    }

    fn plan_range(
        &self,
        row: &Row<'_>,
        pass: RangePass,
        titles: &mut TitleSlots<'_>,
        planned: &mut Vec<PlannedPublication>,
    ) -> ImportResult<()> {
        let year = row.trimmed(pass.year);
        let from = row.trimmed(pass.from);
        let to = row.trimmed(pass.to);
        if year.is_empty() || from.is_empty() || to.is_empty() {
            return Ok(());
        }

        let parse_error = |field: Field, value: &str| ImportError::Parse {
            row: row.number(),
            column: field.key(),
            value: value.to_string(),
        };
        let year_value: i32 = year.parse().map_err(|_| parse_error(pass.year, year))?;
        let from_number = parse_issue_number(from).ok_or_else(|| parse_error(pass.from, from))?;
        let to_number = parse_issue_number(to).ok_or_else(|| parse_error(pass.to, to))?;
        if year_value == 0 {
            return Ok(());
        }

        let issues = issues_between(from_number, to_number, year_value).map_err(|e| match e {
            IssueRangeError::UnknownAnnualCount { year } => ImportError::UnknownAnnualCount {
                row: row.number(),
                year,
            },
            IssueRangeError::NumberOutOfRange { number } if number == from_number => parse_error(pass.from, from),
            IssueRangeError::NumberOutOfRange { .. } => parse_error(pass.to, to),
            IssueRangeError::StartPastAnnualCount { .. } => parse_error(pass.from, from),
            IssueRangeError::YearOutOfRange { .. } => parse_error(pass.year, year),
        })?;
        if issues.is_empty() {
            return Ok(());
        }

        let title = titles.take(row)?;
        for issue in issues {
            planned.push(PlannedPublication {
                publication: range_publication(&self.hasher, pass.kind, issue.year, issue.number),
                title: title.clone(),
            });
        }
        Ok(())
    }

    fn plan_label(
        &self,
        row: &Row<'_>,
        field: Field,
        kind_of: impl Fn(&str) -> PublicationKind,
        titles: &mut TitleSlots<'_>,
        planned: &mut Vec<PlannedPublication>,
    ) -> ImportResult<()> {
        let label = row.trimmed(field);
        if label.is_empty() {
            return Ok(());
        }

        planned.push(PlannedPublication {
            publication: label_publication(&self.hasher, kind_of(label), label),
            title: titles.take(row)?,
        });
        Ok(())
    }

    /// Register planned publications and link them to `story`
    pub(crate) fn load_publications(&mut self, story: TempId, planned: Vec<PlannedPublication>) {
        for PlannedPublication { publication, title } in planned {
            let (entry, created) =
                self.publications
                    .find_or_add(&self.ids, publication.hash.clone(), || publication);
            let publication = entry.id;
            if created {
                debug!(publication = %publication, kind = entry.item.kind.tag(), issue = %entry.item.issue, "Publication registered");
            }

            self.story_publications.find_or_add(&self.ids, (story, publication), || {
                StoryPublicationLink {
                    story,
                    publication,
                    title,
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::ColumnMap;

    const HEADER: &[&str] = &[
        "Järjestysluku",
        "Tarina",
        "Vuosi",
        "Alkaen",
        "Päättyen",
        "UVuosi",
        "Ualkaen",
        "Upäättyen",
        "Erikoisjulkaisu",
        "Kronikka",
        "Kirjasto",
        "Italian tarina",
        "Italian vuosi",
        "Italian alkunumero",
        "Italian päättymisnumero",
        "Italian erikoisjulkaisu",
    ];

    struct Cells<'a> {
        order: &'a str,
        title: &'a str,
        regular: (&'a str, &'a str, &'a str),
        reprint: (&'a str, &'a str, &'a str),
        special: &'a str,
        chronicle: &'a str,
        library: &'a str,
        italy_title: &'a str,
        italian: (&'a str, &'a str, &'a str),
        italy_special: &'a str,
    }

    impl Default for Cells<'_> {
        fn default() -> Self {
            Cells {
                order: "1",
                title: "",
                regular: ("", "", ""),
                reprint: ("", "", ""),
                special: "",
                chronicle: "",
                library: "",
                italy_title: "",
                italian: ("", "", ""),
                italy_special: "",
            }
        }
    }

    impl Cells<'_> {
        fn to_vec(&self) -> Vec<String> {
            [
                self.order,
                self.title,
                self.regular.0,
                self.regular.1,
                self.regular.2,
                self.reprint.0,
                self.reprint.1,
                self.reprint.2,
                self.special,
                self.chronicle,
                self.library,
                self.italy_title,
                self.italian.0,
                self.italian.1,
                self.italian.2,
                self.italy_special,
            ]
            .iter()
            .map(|c| c.to_string())
            .collect()
        }
    }

    fn plan(graph: &EntityGraph, cells: &Cells<'_>) -> ImportResult<Vec<PlannedPublication>> {
        let columns = ColumnMap::new(HEADER);
        let cells = cells.to_vec();
        graph.plan_publications(&Row::new(&columns, &cells, 0))
    }

    fn summary(planned: &[PlannedPublication]) -> Vec<(PublicationKind, Option<i32>, String, String)> {
        planned
            .iter()
            .map(|p| {
                (
                    p.publication.kind,
                    p.publication.year,
                    p.publication.issue.clone(),
                    p.title.clone(),
                )
            })
            .collect()
    }

    #[test]
    fn test_regular_range_with_rollover() {
        let graph = EntityGraph::new(ContentHasher::default());
        let planned = plan(&graph, &Cells {
            title: "Episode 5",
            regular: ("1978", "11", "2"),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(planned.len(), 4);
        assert!(planned.iter().all(|p| p.title == "Episode 5"));
        assert!(planned.iter().all(|p| p.publication.kind == PublicationKind::Regular));
        let issues: Vec<(Option<i32>, &str)> = planned
            .iter()
            .map(|p| (p.publication.year, p.publication.issue.as_str()))
            .collect();
        assert_eq!(
            issues,
            vec![(Some(1978), "11"), (Some(1978), "12"), (Some(1979), "1"), (Some(1979), "2")]
        );
        assert_eq!(planned[2].publication.hash, graph.hasher().hash("perus19791"));
    }

    #[test]
    fn test_titles_taken_in_pass_order() {
        let graph = EntityGraph::new(ContentHasher::default());
        let planned = plan(&graph, &Cells {
            title: "Alku; Uusinta; Erikois; Kronikka; Kirjasto",
            regular: ("1980", "3", "3"),
            reprint: ("1990", "7", "7"),
            special: "Maxi-Tex 4",
            chronicle: "Kronikka 2",
            library: "Kirjasto 9",
            italy_title: "Inizio; Speciale",
            italian: ("1975", "1", "1"),
            italy_special: "Almanacco 1990",
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            summary(&planned),
            vec![
                (PublicationKind::Regular, Some(1980), "3".to_string(), "Alku".to_string()),
                (PublicationKind::Regular, Some(1990), "7".to_string(), "Uusinta".to_string()),
                (PublicationKind::ItalianRegular, Some(1975), "1".to_string(), "Inizio".to_string()),
                (PublicationKind::Maxi, None, "Maxi-Tex 4".to_string(), "Erikois".to_string()),
                (PublicationKind::ItalianSpecial, None, "Almanacco 1990".to_string(), "Speciale".to_string()),
                (PublicationKind::Chronicle, None, "Kronikka 2".to_string(), "Kronikka".to_string()),
                (PublicationKind::Library, None, "Kirjasto 9".to_string(), "Kirjasto".to_string()),
            ]
        );
    }

    #[test]
    fn test_missing_title_slot_falls_back_to_first() {
        let graph = EntityGraph::new(ContentHasher::default());
        let planned = plan(&graph, &Cells {
            title: "Ainoa",
            regular: ("1980", "1", "1"),
            special: "Tex Suuralbumi 3",
            ..Default::default()
        })
        .unwrap();

        assert_eq!(planned[1].publication.kind, PublicationKind::SuurAlbum);
        assert_eq!(planned[1].title, "Ainoa");
    }

    #[test]
    fn test_pass_with_data_needs_a_title() {
        let graph = EntityGraph::new(ContentHasher::default());
        let err = plan(&graph, &Cells {
            special: "Tex-erikoisalbumi",
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ImportError::MissingTitle { row: 1, column: "story_title" }));
    }

    #[test]
    fn test_incomplete_or_zero_year_range_is_skipped() {
        let graph = EntityGraph::new(ContentHasher::default());
        let planned = plan(&graph, &Cells {
            title: "T",
            regular: ("1980", "1", ""),
            reprint: ("0", "1", "2"),
            ..Default::default()
        })
        .unwrap();
        assert!(planned.is_empty());
    }

    #[test]
    fn test_issue_cells_with_suffixes() {
        let graph = EntityGraph::new(ContentHasher::default());
        let planned = plan(&graph, &Cells {
            title: "T",
            regular: ("1985", "4/5", "6 (osa)"),
            ..Default::default()
        })
        .unwrap();
        let issues: Vec<&str> = planned.iter().map(|p| p.publication.issue.as_str()).collect();
        assert_eq!(issues, vec!["4", "5", "6"]);
    }

    #[test]
    fn test_non_numeric_cells_are_parse_errors() {
        let graph = EntityGraph::new(ContentHasher::default());
        let err = plan(&graph, &Cells {
            title: "T",
            regular: ("vuosi", "1", "2"),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ImportError::Parse { column: "pub_year", .. }));

        let err = plan(&graph, &Cells {
            title: "T",
            reprint: ("1990", "1", "x"),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ImportError::Parse { column: "repub_to", .. }));
    }

    #[test]
    fn test_wrap_in_unknown_year_is_rejected() {
        let graph = EntityGraph::new(ContentHasher::default());
        let err = plan(&graph, &Cells {
            title: "T",
            regular: ("1969", "10", "2"),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ImportError::UnknownAnnualCount { row: 1, year: 1969 }));
    }

    #[test]
    fn test_out_of_range_issue_cells_are_parse_errors() {
        let graph = EntityGraph::new(ContentHasher::default());
        let err = plan(&graph, &Cells {
            title: "T",
            regular: ("1980", "4294967295", "4294967290"),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ImportError::Parse { column: "pub_from", .. }));

        let err = plan(&graph, &Cells {
            title: "T",
            regular: ("1980", "1", "4000000000"),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ImportError::Parse { column: "pub_to", .. }));

        let err = plan(&graph, &Cells {
            title: "T",
            reprint: ("2147483647", "16", "17"),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ImportError::Parse { column: "repub_year", .. }));

        let err = plan(&graph, &Cells {
            title: "T",
            regular: ("1978", "20", "2"),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ImportError::Parse { row: 1, column: "pub_from", .. }));
    }

    #[test]
    fn test_classify_special() {
        assert_eq!(classify_special("TEX SUURALBUMI 12"), PublicationKind::SuurAlbum);
        assert_eq!(classify_special("Maxi-Tex 3"), PublicationKind::Maxi);
        assert_eq!(classify_special("Tex-vuosialbumi"), PublicationKind::OtherSpecial);
    }

    #[test]
    fn test_shared_publication_links_each_story_once() {
        let mut graph = EntityGraph::new(ContentHasher::default());
        let first = graph.load_story(crate::services::StoryKey { hash: "a".to_string(), order_num: Some(1) });
        let second = graph.load_story(crate::services::StoryKey { hash: "b".to_string(), order_num: Some(2) });

        let cells = Cells {
            title: "T",
            special: "Maxi-Tex 1",
            ..Default::default()
        };
        for story in [first, second, first] {
            let planned = plan(&graph, &cells).unwrap();
            graph.load_publications(story, planned);
        }

        assert_eq!(graph.publications().len(), 1);
        assert_eq!(graph.story_publications().len(), 2);
        let publication = graph.publications().entries()[0].id;
        assert!(graph.story_publications().find_by_key(&(first, publication)).is_some());
        assert!(graph.story_publications().find_by_key(&(second, publication)).is_some());
    }
}
