//! Tabular ingestion and export.
//!
//! Input is a `source,target,type` CSV. Identifiers keep their namespace
//! prefixes (`u: `, `r: `) as opaque names; the model distinguishes users
//! from repositories structurally, not by prefix. Rows whose type is outside
//! the interaction vocabulary are dropped with a warning — `FollowEvent`
//! rows among them, since follows are always derived, never ingested.
//! Export adds a numeric `weight` column.

use crate::edge_list::{EdgeList, Interaction};
use crate::error::DatasetError;
use crate::event::{EventKind, INTERACTION_WEIGHT};
use crate::universe::Universe;
use std::io::{Read, Write};
use std::path::Path;

/// A seed edge list together with the universe it fixes.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// User/repo universe in order of first appearance
    pub universe: Universe,
    /// The observed interactions
    pub edges: EdgeList,
}

/// Read a seed edge list from a CSV file, fixing the user/repo universe
/// from the rows kept.
///
/// # Errors
/// - I/O or CSV-level failures
/// - [`DatasetError::MissingColumn`] when the header lacks `source`,
///   `target`, or `type`
/// - [`DatasetError::Empty`] when every row was filtered out
pub fn read_edge_list(path: impl AsRef<Path>) -> Result<Dataset, DatasetError> {
    let file = std::fs::File::open(path.as_ref())?;
    read_edge_list_from(file)
}

/// Reader-generic ingestion; see [`read_edge_list`].
pub fn read_edge_list_from(reader: impl Read) -> Result<Dataset, DatasetError> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or(DatasetError::MissingColumn(name))
    };
    let source_col = column("source")?;
    let target_col = column("target")?;
    let type_col = column("type")?;

    let mut universe = Universe::default();
    let mut interactions = Vec::new();
    let mut dropped = 0usize;

    for record in csv_reader.records() {
        let record = record?;
        let raw_kind = &record[type_col];
        match EventKind::parse(raw_kind) {
            Some(kind) if kind.is_interaction() => {
                let user = universe.insert_user(&record[source_col]);
                let repo = universe.insert_repo(&record[target_col]);
                interactions.push(Interaction::new(user, repo, kind));
            }
            _ => {
                dropped += 1;
                tracing::warn!(
                    kind = raw_kind,
                    line = record.position().map_or(0, |p| p.line()),
                    "dropping row with non-interaction event type"
                );
            }
        }
    }

    if interactions.is_empty() {
        return Err(DatasetError::Empty);
    }
    if dropped > 0 {
        tracing::warn!(dropped, kept = interactions.len(), "filtered input rows");
    }

    Ok(Dataset {
        universe,
        edges: EdgeList::from_interactions(interactions),
    })
}

/// Write a completed edge list as `source,target,type,weight` CSV.
///
/// Interactions carry the fixed sentinel weight, follows their similarity.
pub fn write_edge_list(
    path: impl AsRef<Path>,
    edges: &EdgeList,
    universe: &Universe,
) -> Result<(), DatasetError> {
    let file = std::fs::File::create(path.as_ref())?;
    write_edge_list_to(file, edges, universe)
}

/// Writer-generic export; see [`write_edge_list`].
pub fn write_edge_list_to(
    writer: impl Write,
    edges: &EdgeList,
    universe: &Universe,
) -> Result<(), DatasetError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["source", "target", "type", "weight"])?;

    let sentinel = INTERACTION_WEIGHT.to_string();
    for interaction in edges.interactions() {
        csv_writer.write_record([
            universe.user_name(interaction.user),
            universe.repo_name(interaction.repo),
            interaction.kind.as_str(),
            sentinel.as_str(),
        ])?;
    }
    for follow in edges.follows() {
        let weight = follow.weight.to_string();
        csv_writer.write_record([
            universe.user_name(follow.source),
            universe.user_name(follow.target),
            EventKind::Follow.as_str(),
            weight.as_str(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge_list::FollowEdge;
    use crate::universe::UserId;
    use pretty_assertions::assert_eq;

    const SEED: &str = "source,target,type\n\
                        u: alice,r: core,PushEvent\n\
                        u: bob,r: docs,WatchEvent\n\
                        u: alice,r: docs,ForkEvent\n";

    #[test]
    fn ingestion_fixes_universe_in_appearance_order() {
        let dataset = read_edge_list_from(SEED.as_bytes()).unwrap();
        assert_eq!(dataset.universe.user_count(), 2);
        assert_eq!(dataset.universe.repo_count(), 2);
        assert_eq!(dataset.universe.user_name(UserId(0)), "u: alice");
        assert_eq!(dataset.edges.interaction_count(), 3);
    }

    #[test]
    fn out_of_vocabulary_rows_are_filtered_not_fatal() {
        let input = "source,target,type\n\
                     u: alice,r: core,PushEvent\n\
                     u: bob,r: core,IssueCommentEvent\n\
                     u: carol,u: alice,FollowEvent\n";
        let dataset = read_edge_list_from(input.as_bytes()).unwrap();
        assert_eq!(dataset.edges.interaction_count(), 1);
        // filtered rows contribute nothing to the universe
        assert_eq!(dataset.universe.user_count(), 1);
    }

    #[test]
    fn all_rows_filtered_is_an_error() {
        let input = "source,target,type\nu: a,u: b,FollowEvent\n";
        assert!(matches!(
            read_edge_list_from(input.as_bytes()),
            Err(DatasetError::Empty)
        ));
    }

    #[test]
    fn missing_column_is_reported() {
        let input = "source,target\nu: a,r: b\n";
        assert!(matches!(
            read_edge_list_from(input.as_bytes()),
            Err(DatasetError::MissingColumn("type"))
        ));
    }

    #[test]
    fn export_carries_sentinel_and_similarity_weights() {
        let dataset = read_edge_list_from(SEED.as_bytes()).unwrap();
        let mut edges = dataset.edges.clone();
        edges.set_follows(vec![FollowEdge {
            source: UserId(1),
            target: UserId(0),
            weight: 0.25,
        }]);

        let mut buffer = Vec::new();
        write_edge_list_to(&mut buffer, &edges, &dataset.universe).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("source,target,type,weight"));
        assert_eq!(lines.next(), Some("u: alice,r: core,PushEvent,2"));
        assert!(text.contains("u: bob,u: alice,FollowEvent,0.25"));
    }

    #[test]
    fn export_round_trips_through_ingestion() {
        let dataset = read_edge_list_from(SEED.as_bytes()).unwrap();

        let mut buffer = Vec::new();
        write_edge_list_to(&mut buffer, &dataset.edges, &dataset.universe).unwrap();
        let again = read_edge_list_from(buffer.as_slice()).unwrap();

        assert_eq!(again.edges.interactions(), dataset.edges.interactions());
        assert_eq!(again.universe, dataset.universe);
    }
}
