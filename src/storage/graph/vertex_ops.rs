use tracing::{debug, warn};

use super::Graph;
use crate::primitives::kv::{KvStore, KvTransaction};
use crate::storage::session::Session;
use crate::storage::types::{parse_vertex_args, ElementArg, PropertyMap, Vertex};
use crate::storage::{keys, props};
use crate::types::{GraphError, Result, VertexId};

impl<S: KvStore> Graph<S> {
    /// Creates a vertex and returns its id.
    ///
    /// Without `id` the vertex gets a system-assigned id from a shard
    /// counter. A caller-supplied id must lie outside the system id space and
    /// must not name an existing vertex.
    pub fn add_vertex(
        &self,
        session: &mut Session<'_, S>,
        label: &str,
        props: &PropertyMap,
        id: Option<VertexId>,
    ) -> Result<VertexId> {
        self.check_session(session)?;
        if label.is_empty() {
            return Err(GraphError::invalid("label can not be empty"));
        }
        if props.keys().any(String::is_empty) {
            return Err(GraphError::invalid("property key can not be empty"));
        }
        let blob = props::serialize(props)?;
        let id = match id {
            Some(id) => {
                if id.is_system() {
                    return Err(GraphError::invalid(format!(
                        "user supplied vertex id {id} lies in the system-assigned id space"
                    )));
                }
                if let Some(existing) = self.read_label(session, id)? {
                    warn!(vertex = %id, label = %existing, "graph.add_vertex.id_collision");
                    return Err(GraphError::invalid(format!("vertex {id} already exists")));
                }
                id
            }
            None => self.ids.allocate(session.conn()?)?.vertex_id(),
        };
        let tx = session.tx()?;
        tx.write(self.vertex_table, &keys::vertex_label(id), label.as_bytes())?;
        tx.write(self.vertex_table, &keys::vertex_props(id), &blob)?;
        session.cache_label(id, label);
        debug!(vertex = %id, label, props = props.len(), "graph.add_vertex");
        Ok(id)
    }

    /// [`Graph::add_vertex`] over a flat key/value argument list.
    pub fn add_vertex_with_args(
        &self,
        session: &mut Session<'_, S>,
        args: &[ElementArg],
    ) -> Result<VertexId> {
        let parsed = parse_vertex_args(args)?;
        self.add_vertex(session, &parsed.label, &parsed.props, parsed.id)
    }

    /// Resolves one vertex.
    pub fn vertex(&self, session: &mut Session<'_, S>, id: VertexId) -> Result<Vertex> {
        self.check_session(session)?;
        let label = self.require_label(session, id)?;
        Ok(Vertex { id, label })
    }

    /// Resolves `ids` in order, or sweeps every vertex when `ids` is empty.
    pub fn vertices(&self, session: &mut Session<'_, S>, ids: &[VertexId]) -> Result<Vec<Vertex>> {
        if ids.is_empty() {
            return self.all_vertices(session);
        }
        ids.iter().map(|id| self.vertex(session, *id)).collect()
    }

    /// Every vertex with a system-assigned id.
    ///
    /// Probes each counter value from 1 to the current high-water mark of
    /// every shard, so the cost grows with the number of ids ever issued.
    /// Vertices with caller-supplied ids are not reachable this way.
    pub fn all_vertices(&self, session: &mut Session<'_, S>) -> Result<Vec<Vertex>> {
        self.check_session(session)?;
        let mut out = Vec::new();
        for shard in 0..self.ids.shards() {
            let high = self.ids.high_water(session.conn()?, shard)?;
            for counter in 1..=high {
                let id = VertexId::system(u64::from(shard), counter)?;
                if let Some(label) = self.read_label(session, id)? {
                    out.push(Vertex { id, label });
                }
            }
        }
        debug!(found = out.len(), "graph.vertices.sweep");
        Ok(out)
    }

    /// Vertex removal is not supported.
    pub fn remove_vertex(&self, _session: &mut Session<'_, S>, _id: VertexId) -> Result<()> {
        Err(GraphError::Unsupported("vertex removal"))
    }
}
