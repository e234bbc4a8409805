#![allow(clippy::uninlined_format_args)]

use kvgraph::primitives::kv::MemStore;
use kvgraph::storage::{Cardinality, PropertyMap, TxState};
use kvgraph::types::{Directionality, EdgeDirection, VertexId};
use kvgraph::{Graph, GraphError, GraphOptions, Result};

fn open() -> (MemStore, Graph<MemStore>) {
    let store = MemStore::new();
    let graph = Graph::open(store.clone(), GraphOptions::new("tx")).unwrap();
    (store, graph)
}

fn name(value: &str) -> PropertyMap {
    PropertyMap::from([("name".to_string(), value.to_string())])
}

#[test]
fn committed_vertex_is_visible_to_other_sessions() -> Result<()> {
    let (_store, graph) = open();
    let mut writer = graph.session()?;
    let id = graph.add_vertex(&mut writer, "Person", &name("bob"), None)?;
    assert_eq!(writer.state(), TxState::Open);
    writer.commit()?;
    assert_eq!(writer.state(), TxState::Closed);

    let mut reader = graph.session()?;
    let vertex = graph.vertex(&mut reader, id)?;
    assert_eq!(vertex.label, "Person");
    assert_eq!(graph.property_map(&mut reader, id)?, name("bob"));
    Ok(())
}

#[test]
fn uncommitted_writes_stay_private() -> Result<()> {
    let (_store, graph) = open();
    let mut writer = graph.session()?;
    let id = graph.add_vertex(&mut writer, "Person", &name("bob"), None)?;

    let mut reader = graph.session()?;
    assert!(matches!(graph.vertex(&mut reader, id), Err(GraphError::NotFound(_))));
    assert!(graph.vertex(&mut writer, id).is_ok());
    Ok(())
}

#[test]
fn rollback_discards_everything() -> Result<()> {
    let (store, graph) = open();
    let mut session = graph.session()?;
    let a = graph.add_vertex(&mut session, "Person", &name("a"), None)?;
    let b = graph.add_vertex(&mut session, "Person", &name("b"), None)?;
    graph.add_edge(&mut session, a, b, "knows", Directionality::Directed, &PropertyMap::new())?;
    session.rollback();
    assert_eq!(session.state(), TxState::Closed);
    assert_eq!(store.table_len("tx_vertexTable"), Some(0));
    assert!(matches!(graph.vertex(&mut session, a), Err(GraphError::NotFound(_))));
    Ok(())
}

#[test]
fn dropping_a_session_rolls_back() -> Result<()> {
    let (store, graph) = open();
    {
        let mut session = graph.session()?;
        graph.add_vertex(&mut session, "Person", &name("a"), None)?;
    }
    assert_eq!(store.table_len("tx_vertexTable"), Some(0));
    Ok(())
}

#[test]
fn conflicting_commit_leaves_store_unchanged() -> Result<()> {
    let (_store, graph) = open();
    let mut setup = graph.session()?;
    let v = graph.add_vertex(&mut setup, "Person", &name("start"), None)?;
    setup.commit()?;

    let mut first = graph.session()?;
    let mut second = graph.session()?;
    graph.set_property(&mut first, v, Cardinality::Single, "name", "first", &[])?;
    graph.set_property(&mut second, v, Cardinality::Single, "name", "second", &[])?;
    let w = graph.add_vertex(&mut second, "Person", &name("extra"), None)?;
    first.commit()?;
    assert!(matches!(second.commit(), Err(GraphError::TransactionConflict)));

    let mut check = graph.session()?;
    assert_eq!(graph.property_map(&mut check, v)?, name("first"));
    assert!(matches!(graph.vertex(&mut check, w), Err(GraphError::NotFound(_))));
    Ok(())
}

#[test]
fn session_is_reusable_after_conflict() -> Result<()> {
    let (_store, graph) = open();
    let mut setup = graph.session()?;
    let v = graph.add_vertex(&mut setup, "Person", &name("start"), None)?;
    setup.commit()?;

    let mut loser = graph.session()?;
    graph.property_map(&mut loser, v)?;
    graph.set_property(&mut loser, v, Cardinality::Single, "name", "late", &[])?;
    let mut winner = graph.session()?;
    graph.set_property(&mut winner, v, Cardinality::Single, "name", "early", &[])?;
    winner.commit()?;
    assert!(loser.commit().unwrap_err().is_conflict());

    graph.set_property(&mut loser, v, Cardinality::Single, "name", "retried", &[])?;
    loser.commit()?;
    assert_eq!(graph.property_map(&mut loser, v)?, name("retried"));
    Ok(())
}

#[test]
fn transact_retries_conflicts() -> Result<()> {
    let (_store, graph) = open();
    let mut setup = graph.session()?;
    let v = graph.add_vertex(&mut setup, "Counter", &name("0"), None)?;
    setup.commit()?;

    let mut attempts = 0;
    graph.transact(|session| {
        attempts += 1;
        let current = graph.property_map(session, v)?;
        if attempts == 1 {
            // Another writer slips in between our read and our commit.
            let mut rival = graph.session()?;
            graph.set_property(&mut rival, v, Cardinality::Single, "name", "rival", &[])?;
            rival.commit()?;
        }
        let next = format!("{}+", current["name"]);
        graph.set_property(session, v, Cardinality::Single, "name", next.as_str(), &[])?;
        Ok(())
    })?;
    assert_eq!(attempts, 2);
    let mut check = graph.session()?;
    assert_eq!(graph.property_map(&mut check, v)?, name("rival+"));
    Ok(())
}

#[test]
fn transact_gives_up_after_the_retry_budget() -> Result<()> {
    let store = MemStore::new();
    let graph = Graph::open(store, GraphOptions::new("tx").max_tx_retries(2))?;
    let mut setup = graph.session()?;
    let v = graph.add_vertex(&mut setup, "Counter", &PropertyMap::new(), None)?;
    setup.commit()?;

    let mut attempts = 0;
    let err = graph
        .transact(|session| {
            attempts += 1;
            graph.property_map(session, v)?;
            let mut rival = graph.session()?;
            graph.set_property(&mut rival, v, Cardinality::Single, "k", format!("{attempts}"), &[])?;
            rival.commit()?;
            graph.set_property(session, v, Cardinality::Single, "k", "mine", &[])?;
            Ok(())
        })
        .unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(attempts, 3);
    Ok(())
}

#[test]
fn transact_does_not_retry_other_errors() {
    let (_store, graph) = open();
    let mut attempts = 0;
    let err = graph
        .transact(|session| {
            attempts += 1;
            graph.vertex(session, VertexId::from(1u64))
        })
        .unwrap_err();
    assert!(matches!(err, GraphError::NotFound(_)));
    assert_eq!(attempts, 1);
}

#[test]
fn unavailable_store_is_fatal() -> Result<()> {
    let (store, graph) = open();
    let mut session = graph.session()?;
    let v = graph.add_vertex(&mut session, "Person", &PropertyMap::new(), None)?;
    store.set_available(false);
    assert!(matches!(
        graph.vertex_edges(&mut session, v, &EdgeDirection::ALL, &[]),
        Err(GraphError::StorageUnavailable(_))
    ));
    assert!(matches!(session.commit(), Err(GraphError::StorageUnavailable(_))));
    assert!(matches!(graph.session(), Err(GraphError::StorageUnavailable(_))));

    store.set_available(true);
    let mut session = graph.session()?;
    assert!(matches!(graph.vertex(&mut session, v), Err(GraphError::NotFound(_))));
    Ok(())
}

#[test]
fn each_session_has_its_own_connection() -> Result<()> {
    let (store, graph) = open();
    let before = store.connections_opened();
    let _a = graph.session()?;
    let _b = graph.session()?;
    assert_eq!(store.connections_opened(), before + 2);
    Ok(())
}
