use tracing::debug;

use super::Graph;
use crate::primitives::kv::{KvStore, KvTransaction};
use crate::storage::session::Session;
use crate::storage::types::{Cardinality, ElementArg, PropertyMap, VertexProperty};
use crate::storage::{keys, props};
use crate::types::{GraphError, Result, VertexId};

impl<S: KvStore> Graph<S> {
    /// Full property map of an existing vertex.
    pub fn property_map(&self, session: &mut Session<'_, S>, vertex: VertexId) -> Result<PropertyMap> {
        self.check_session(session)?;
        self.require_label(session, vertex)?;
        self.read_props(session, vertex)
    }

    /// Properties of `vertex` for `keys`, or all of them in key order when
    /// `keys` is empty. A requested key the vertex lacks is `NotFound`.
    pub fn properties(
        &self,
        session: &mut Session<'_, S>,
        vertex: VertexId,
        keys: &[&str],
    ) -> Result<Vec<VertexProperty>> {
        let map = self.property_map(session, vertex)?;
        if keys.is_empty() {
            return Ok(map
                .into_iter()
                .map(|(key, value)| VertexProperty { vertex, key, value })
                .collect());
        }
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            let value = map.get(*key).cloned().ok_or_else(|| {
                GraphError::NotFound(format!("property {key:?} on vertex {vertex}"))
            })?;
            out.push(VertexProperty {
                vertex,
                key: (*key).to_owned(),
                value,
            });
        }
        Ok(out)
    }

    /// Sets a single-valued string property, replacing any previous value.
    ///
    /// Only [`Cardinality::Single`] is supported, and properties carry no
    /// meta-properties.
    pub fn set_property(
        &self,
        session: &mut Session<'_, S>,
        vertex: VertexId,
        cardinality: Cardinality,
        key: &str,
        value: impl Into<ElementArg>,
        meta: &[ElementArg],
    ) -> Result<VertexProperty> {
        self.check_session(session)?;
        if cardinality != Cardinality::Single {
            return Err(GraphError::Unsupported("multi-valued properties"));
        }
        if !meta.is_empty() {
            return Err(GraphError::Unsupported("meta-properties"));
        }
        if key.is_empty() {
            return Err(GraphError::invalid("property key can not be empty"));
        }
        let value = match value.into() {
            ElementArg::Str(s) => s,
            _ => {
                return Err(GraphError::invalid(format!(
                    "property {key:?} must have a string value"
                )))
            }
        };
        self.require_label(session, vertex)?;
        let mut map = self.read_props(session, vertex)?;
        map.insert(key.to_owned(), value.clone());
        let blob = props::serialize(&map)?;
        session
            .tx()?
            .write(self.vertex_table, &keys::vertex_props(vertex), &blob)?;
        debug!(vertex = %vertex, key, "graph.set_property");
        Ok(VertexProperty {
            vertex,
            key: key.to_owned(),
            value,
        })
    }

    /// Property removal is not supported.
    pub fn remove_property(
        &self,
        _session: &mut Session<'_, S>,
        _vertex: VertexId,
        _key: &str,
    ) -> Result<()> {
        Err(GraphError::Unsupported("property removal"))
    }

    fn read_props(&self, session: &mut Session<'_, S>, vertex: VertexId) -> Result<PropertyMap> {
        match session.tx()?.read(self.vertex_table, &keys::vertex_props(vertex))? {
            Some(blob) => props::deserialize(&blob),
            None => Ok(PropertyMap::new()),
        }
    }
}
