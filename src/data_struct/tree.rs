/// Index of a node inside a [`Tree`] arena.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Node<T> {
    value: T,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Rooted multi-way tree stored as an arena of nodes.
///
/// Nodes refer to their parent and children by index, so the tree never owns
/// reference cycles. Nodes are never removed.
#[derive(Debug)]
pub struct Tree<T> {
    nodes: Vec<Node<T>>,
}

impl<T> Tree<T> {
    pub fn new(root_value: T) -> Self {
        Tree {
            nodes: vec![Node {
                value: root_value,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn add_child(&mut self, parent: NodeId, value: T) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            value,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn value(&self, node: NodeId) -> &T {
        &self.nodes[node.0].value
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// Leaves in left-to-right order.
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut worklist = vec![self.root()];
        while let Some(node) = worklist.pop() {
            let children = self.children(node);
            if children.is_empty() {
                leaves.push(node);
                continue;
            }
            // reversed so the leftmost child is visited first
            worklist.extend(children.iter().rev());
        }
        leaves
    }
}
