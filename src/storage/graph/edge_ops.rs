use std::collections::HashMap;

use tracing::debug;

use super::Graph;
use crate::primitives::kv::{KvStore, KvTransaction};
use crate::storage::session::Session;
use crate::storage::types::{parse_edge_args, Direction, ElementArg, NeighborHint, PropertyMap, Vertex};
use crate::storage::{edge_list, keys, label_index, props};
use crate::types::{Directionality, EdgeDirection, EdgeId, GraphError, Result, VertexId};

/// Writes staged by `add_edge`, one value per key.
#[derive(Default)]
struct PendingWrites(Vec<(Vec<u8>, Vec<u8>)>);

impl PendingWrites {
    fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.0
            .iter()
            .find(|(k, _)| k.as_slice() == key)
            .map(|(_, v)| v.as_slice())
    }

    fn put(&mut self, key: Vec<u8>, value: Vec<u8>) {
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }
}

impl<S: KvStore> Graph<S> {
    /// Adds an edge between two existing vertices.
    ///
    /// A directed edge is recorded in `out`'s OUT list and `in_`'s IN list;
    /// an undirected edge in both endpoints' UNDIRECTED lists. Repeating the
    /// call records a parallel edge.
    pub fn add_edge(
        &self,
        session: &mut Session<'_, S>,
        out: VertexId,
        in_: VertexId,
        label: &str,
        directionality: Directionality,
        props: &PropertyMap,
    ) -> Result<EdgeId> {
        self.check_session(session)?;
        if label.is_empty() {
            return Err(GraphError::invalid("edge label can not be empty"));
        }
        if props.keys().any(String::is_empty) {
            return Err(GraphError::invalid("property key can not be empty"));
        }
        if label.len() > usize::from(u16::MAX) {
            return Err(GraphError::invalid(format!(
                "edge label too long ({} bytes, max {})",
                label.len(),
                u16::MAX
            )));
        }
        let blob = props::serialize(props)?;
        self.require_label(session, out)?;
        self.require_label(session, in_)?;
        let (out_dir, in_dir) = match directionality {
            Directionality::Directed => (EdgeDirection::Out, EdgeDirection::In),
            Directionality::Undirected => (EdgeDirection::Undirected, EdgeDirection::Undirected),
        };
        // Both sides are encoded before anything is buffered.
        let mut pending = PendingWrites::default();
        self.stage_edge(session, &mut pending, out, label, out_dir, in_, &blob)?;
        self.stage_edge(session, &mut pending, in_, label, in_dir, out, &blob)?;
        let tx = session.tx()?;
        for (key, value) in &pending.0 {
            tx.write(self.vertex_table, key, value)?;
        }
        let edge = EdgeId::new(out, in_, label, directionality);
        debug!(edge = %edge, "graph.add_edge");
        Ok(edge)
    }

    /// [`Graph::add_edge`] with properties from a flat key/value argument list.
    pub fn add_edge_with_args(
        &self,
        session: &mut Session<'_, S>,
        out: VertexId,
        in_: VertexId,
        label: &str,
        directionality: Directionality,
        args: &[ElementArg],
    ) -> Result<EdgeId> {
        let props = parse_edge_args(args)?;
        self.add_edge(session, out, in_, label, directionality, &props)
    }

    #[allow(clippy::too_many_arguments)]
    fn stage_edge(
        &self,
        session: &mut Session<'_, S>,
        pending: &mut PendingWrites,
        vertex: VertexId,
        label: &str,
        dir: EdgeDirection,
        neighbor: VertexId,
        blob: &[u8],
    ) -> Result<()> {
        let table = self.vertex_table;
        let tx = session.tx()?;
        let list_key = keys::edge_list(vertex, label, dir);
        let existing = match pending.get(&list_key) {
            Some(staged) => Some(staged.to_vec()),
            None => tx.read(table, &list_key)?,
        };
        let list = edge_list::append(existing.as_deref(), neighbor, blob)?;
        if existing.is_none() {
            let index_key = keys::edge_labels(vertex);
            let index = match pending.get(&index_key) {
                Some(staged) => Some(staged.to_vec()),
                None => tx.read(table, &index_key)?,
            };
            if let Some(updated) = label_index::insert(index.as_deref(), label)? {
                pending.put(index_key, updated);
            }
        }
        pending.put(list_key, list);
        Ok(())
    }

    /// Resolves `ids`, or sweeps every edge when `ids` is empty.
    ///
    /// An explicit id resolves when its out vertex's list (OUT, or UNDIRECTED
    /// for undirected edges) holds a record for the in vertex.
    pub fn edges(&self, session: &mut Session<'_, S>, ids: &[EdgeId]) -> Result<Vec<EdgeId>> {
        if ids.is_empty() {
            return self.all_edges(session);
        }
        self.check_session(session)?;
        let mut out = Vec::with_capacity(ids.len());
        for edge in ids {
            let dir = match edge.directionality() {
                Directionality::Directed => EdgeDirection::Out,
                Directionality::Undirected => EdgeDirection::Undirected,
            };
            let key = keys::edge_list(edge.out_vertex(), edge.label(), dir);
            let found = match session.tx()?.read(self.vertex_table, &key)? {
                Some(list) => edge_list::contains(&list, edge.in_vertex())?,
                None => false,
            };
            if !found {
                return Err(GraphError::not_found("edge", edge));
            }
            out.push(edge.clone());
        }
        Ok(out)
    }

    /// Every directed edge, found through its out vertex.
    ///
    /// Shares the vertex sweep's cost. Undirected edges are not listed.
    pub fn all_edges(&self, session: &mut Session<'_, S>) -> Result<Vec<EdgeId>> {
        let vertices = self.all_vertices(session)?;
        let mut out = Vec::new();
        for vertex in vertices {
            out.extend(self.vertex_edges(session, vertex.id, &[EdgeDirection::Out], &[])?);
        }
        debug!(found = out.len(), "graph.edges.sweep");
        Ok(out)
    }

    /// Edge labels in use at `vertex`, in first-use order.
    pub fn edge_labels(&self, session: &mut Session<'_, S>, vertex: VertexId) -> Result<Vec<String>> {
        self.check_session(session)?;
        match session.tx()?.read(self.vertex_table, &keys::edge_labels(vertex))? {
            Some(blob) => label_index::deserialize(&blob),
            None => Ok(Vec::new()),
        }
    }

    /// Neighbor ids for each `(label, direction)` list, newest first.
    fn neighbor_records(
        &self,
        session: &mut Session<'_, S>,
        vertex: VertexId,
        directions: &[EdgeDirection],
        labels: &[&str],
    ) -> Result<Vec<(String, EdgeDirection, VertexId)>> {
        self.check_session(session)?;
        let labels: Vec<String> = if labels.is_empty() {
            self.edge_labels(session, vertex)?
        } else {
            labels.iter().map(|l| (*l).to_owned()).collect()
        };
        let mut out = Vec::new();
        for label in &labels {
            for dir in directions {
                let key = keys::edge_list(vertex, label, *dir);
                let Some(list) = session.tx()?.read(self.vertex_table, &key)? else {
                    continue;
                };
                for neighbor in edge_list::neighbor_ids(&list)? {
                    out.push((label.clone(), *dir, neighbor));
                }
            }
        }
        Ok(out)
    }

    /// Edges incident to `vertex` in the given directions.
    ///
    /// With no `labels`, every label in the vertex's edge-label index is
    /// scanned. A missing list means no edges of that kind.
    pub fn vertex_edges(
        &self,
        session: &mut Session<'_, S>,
        vertex: VertexId,
        directions: &[EdgeDirection],
        labels: &[&str],
    ) -> Result<Vec<EdgeId>> {
        let records = self.neighbor_records(session, vertex, directions, labels)?;
        Ok(records
            .into_iter()
            .map(|(label, dir, neighbor)| match dir {
                EdgeDirection::Out => EdgeId::new(vertex, neighbor, label, Directionality::Directed),
                EdgeDirection::In => EdgeId::new(neighbor, vertex, label, Directionality::Directed),
                EdgeDirection::Undirected => {
                    EdgeId::new(vertex, neighbor, label, Directionality::Undirected)
                }
            })
            .collect())
    }

    /// Vertices adjacent to `vertex`, one entry per edge record.
    ///
    /// Each distinct neighbor's label is read once.
    pub fn vertex_neighbors(
        &self,
        session: &mut Session<'_, S>,
        vertex: VertexId,
        directions: &[EdgeDirection],
        labels: &[&str],
    ) -> Result<Vec<Vertex>> {
        let records = self.neighbor_records(session, vertex, directions, labels)?;
        let mut resolved: HashMap<VertexId, String> = HashMap::new();
        let mut out = Vec::with_capacity(records.len());
        for (_, _, neighbor) in records {
            let label = match resolved.get(&neighbor) {
                Some(label) => label.clone(),
                None => {
                    let label = self.require_label(session, neighbor)?;
                    resolved.insert(neighbor, label.clone());
                    label
                }
            };
            out.push(Vertex { id: neighbor, label });
        }
        Ok(out)
    }

    /// [`Graph::vertex_neighbors`] keeping only neighbors whose label the
    /// hint expects.
    ///
    /// Labels already known to the session are not read again. An empty
    /// hint keeps every neighbor.
    pub fn vertex_neighbors_hinted(
        &self,
        session: &mut Session<'_, S>,
        vertex: VertexId,
        directions: &[EdgeDirection],
        labels: &[&str],
        hint: &NeighborHint,
    ) -> Result<Vec<Vertex>> {
        let records = self.neighbor_records(session, vertex, directions, labels)?;
        let mut out = Vec::with_capacity(records.len());
        let mut skipped_reads = 0usize;
        for (_, _, neighbor) in records {
            let label = match session.cached_label(neighbor) {
                Some(label) => {
                    skipped_reads += 1;
                    label.to_owned()
                }
                None => self.require_label(session, neighbor)?,
            };
            if hint.labels().is_empty() || hint.accepts(&label) {
                out.push(Vertex { id: neighbor, label });
            }
        }
        debug!(vertex = %vertex, kept = out.len(), skipped_reads, "graph.neighbors.hinted");
        Ok(out)
    }

    /// Endpoint vertices of `edge`.
    pub fn edge_vertices(
        &self,
        session: &mut Session<'_, S>,
        edge: &EdgeId,
        direction: Direction,
    ) -> Result<Vec<Vertex>> {
        let mut out = Vec::with_capacity(2);
        if direction.includes_out() {
            out.push(self.vertex(session, edge.out_vertex())?);
        }
        if direction.includes_in() {
            out.push(self.vertex(session, edge.in_vertex())?);
        }
        Ok(out)
    }

    /// Edge removal is not supported.
    pub fn remove_edge(&self, _session: &mut Session<'_, S>, _edge: &EdgeId) -> Result<()> {
        Err(GraphError::Unsupported("edge removal"))
    }

    /// Edge properties are not readable.
    pub fn edge_properties(
        &self,
        _session: &mut Session<'_, S>,
        _edge: &EdgeId,
        _keys: &[&str],
    ) -> Result<PropertyMap> {
        Err(GraphError::Unsupported("edge properties"))
    }

    /// Edge properties are not writable.
    pub fn set_edge_property(
        &self,
        _session: &mut Session<'_, S>,
        _edge: &EdgeId,
        _key: &str,
        _value: &str,
    ) -> Result<()> {
        Err(GraphError::Unsupported("edge properties"))
    }
}
