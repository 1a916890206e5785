//! An undirected social graph over named nodes.
//!
//! Node names are interned to dense [`NodeId`]s in first-seen order. The adjacency lists are
//! stored in a `Vec` indexed by `NodeId` and grow as new names are seen, so lookups never need
//! to hash a string once a name has been resolved.
//!
//! The graph is built once from an edge list before the simulation starts and is read-only
//! afterwards.

use std::fmt::{self, Display};

use indexmap::IndexSet;

/// A dense identifier for a node of a [`Graph`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The position of this node in insertion order.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The underlying storage type representing the neighbors of one node
pub type AdjacencyList = IndexSet<NodeId>;

static EMPTY_ADJACENCY: std::sync::LazyLock<AdjacencyList> =
    std::sync::LazyLock::new(AdjacencyList::new);

#[derive(Default, Debug, Clone)]
pub struct Graph {
    /// Node names; the position of a name is its `NodeId`.
    names: IndexSet<String>,
    /// The backing storage vector for the adjacency lists.
    adjacency_lists: Vec<AdjacencyList>,
    edge_count: usize,
}

impl Graph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from `(node_a, node_b)` pairs.
    pub fn from_edges<I, A, B>(edges: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: AsRef<str>,
        B: AsRef<str>,
    {
        let mut graph = Self::new();
        for (a, b) in edges {
            graph.add_edge(a.as_ref(), b.as_ref());
        }
        graph
    }

    /// Returns the id for `name`, adding it as an isolated node if it has not been seen.
    pub fn add_node(&mut self, name: &str) -> NodeId {
        if let Some(index) = self.names.get_index_of(name) {
            return NodeId(index);
        }
        let (index, _) = self.names.insert_full(name.to_string());
        self.adjacency_lists.push(AdjacencyList::new());
        NodeId(index)
    }

    /// Inserts the symmetric adjacency `a <-> b`. Inserting the same pair again (in either order)
    /// changes nothing. A self-loop is recorded once.
    pub fn add_edge(&mut self, a: &str, b: &str) {
        let a = self.add_node(a);
        let b = self.add_node(b);
        let inserted = self.adjacency_lists[a.0].insert(b);
        self.adjacency_lists[b.0].insert(a);
        if inserted {
            self.edge_count += 1;
        }
    }

    #[must_use]
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.names.get_index_of(name).map(NodeId)
    }

    /// The name of `node`, or `None` if the id does not belong to this graph.
    #[must_use]
    pub fn name(&self, node: NodeId) -> Option<&str> {
        self.names.get_index(node.0).map(String::as_str)
    }

    /// The neighbors of the node called `name`. Unknown names have no neighbors.
    #[must_use]
    pub fn neighbors(&self, name: &str) -> Vec<&str> {
        match self.node_id(name) {
            Some(node) => self
                .neighbor_ids(node)
                .iter()
                .filter_map(|&neighbor| self.name(neighbor))
                .collect(),
            None => Vec::new(),
        }
    }

    /// The neighbors of `node`, in edge insertion order. Unknown ids have no neighbors.
    #[must_use]
    pub fn neighbor_ids(&self, node: NodeId) -> &AdjacencyList {
        self.adjacency_lists.get(node.0).unwrap_or(&EMPTY_ADJACENCY)
    }

    #[must_use]
    pub fn degree(&self, node: NodeId) -> usize {
        self.neighbor_ids(node).len()
    }

    /// All node names in first-seen order.
    pub fn vertices(&self) -> impl ExactSizeIterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// All node ids in first-seen order.
    pub fn node_ids(&self) -> impl ExactSizeIterator<Item = NodeId> {
        (0..self.names.len()).map(NodeId)
    }

    /// The number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The number of distinct undirected edges, self-loops included.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }
}
