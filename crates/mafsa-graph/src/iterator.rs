use crate::graph::Graph;
use crate::node::NodeId;

/// Leniwy iterator po wszystkich napisach akceptowanych przez graf,
/// w porządku leksykograficznym.
///
/// Iterator trzyma na stosie pary (węzeł, prefiks) i rozwija je dopiero przy
/// kolejnych wywołaniach `next`. Porządek leksykograficzny wymaga, aby etykiety
/// wychodzące z każdego węzła były wolne od prefiksów, co graf zachowuje.
pub struct AcceptedStrings<'a> {
    graph: &'a Graph,
    stack: Vec<(NodeId, String)>,
}

impl<'a> AcceptedStrings<'a> {
    pub fn new(graph: &'a Graph) -> Self {
        AcceptedStrings::from_node(graph, graph.root(), String::new())
    }

    /// Iteruje po napisach osiągalnych z `node`, poprzedzonych przez `prefix`.
    pub fn from_node(graph: &'a Graph, node: NodeId, prefix: String) -> Self {
        AcceptedStrings { graph, stack: vec![(node, prefix)] }
    }
}

impl<'a> Iterator for AcceptedStrings<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while let Some((id, prefix)) = self.stack.pop() {
            let Some(node) = self.graph.node(id) else {
                continue;
            };
            for (label, &child) in node.out_edges().iter().rev() {
                self.stack.push((child, format!("{prefix}{label}")));
            }
            if node.is_accept() {
                return Some(prefix);
            }
        }
        None
    }
}
