use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;

use crate::error::{GraphError, Result};
use crate::node::{HalfEdge, Label, Node, NodeId};
use crate::traversal::{GraphTraversal, GraphVisitor, Outgoing};

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Acykliczny graf z etykietowanymi krawędziami, przechowywany w arenie.
///
/// Graf jest jedynym właścicielem węzłów. Węzły są adresowane przez [`NodeId`],
/// a zwolniony slot zwiększa swoją generację, dzięki czemu nieaktualne uchwyty
/// są wykrywane zamiast wskazywać na nowy węzeł.
///
/// Korzeń istnieje przez cały czas życia grafu. Każdy inny węzeł jest usuwany
/// w chwili, gdy traci ostatnią krawędź wchodzącą, a usunięcie przenosi się
/// kaskadowo na dzieci, które przez to zostały osierocone.
///
/// Klonowanie tworzy głęboką kopię o identycznych uchwytach.
#[derive(Debug, Clone)]
pub struct Graph {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    num_nodes: usize,
    num_edges: usize,
    num_accept: usize,
    label_counts: BTreeMap<Label, usize>,
}

/// Podsumowanie rozmiaru grafu, przekazywane dalej do kodera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GraphStats {
    pub num_nodes: usize,
    pub num_edges: usize,
    pub num_accept: usize,
    pub num_labels: usize,
}

impl fmt::Display for GraphStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "węzły: {}, krawędzie: {}, akceptujące: {}, etykiety: {}",
            self.num_nodes, self.num_edges, self.num_accept, self.num_labels
        )
    }
}

impl Default for Graph {
    fn default() -> Self {
        Graph::new()
    }
}

impl Graph {
    /// Tworzy graf zawierający jedynie nieakceptujący korzeń.
    pub fn new() -> Self {
        Graph {
            slots: vec![Slot { generation: 0, node: Some(Node::new()) }],
            free: Vec::new(),
            root: NodeId::new(0, 0),
            num_nodes: 1,
            num_edges: 0,
            num_accept: 0,
            label_counts: BTreeMap::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    pub fn num_accept(&self) -> usize {
        self.num_accept
    }

    /// Liczba krawędzi dla każdej etykiety występującej w grafie.
    pub fn label_counts(&self) -> &BTreeMap<Label, usize> {
        &self.label_counts
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            num_nodes: self.num_nodes,
            num_edges: self.num_edges,
            num_accept: self.num_accept,
            num_labels: self.label_counts.len(),
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_ref())
    }

    /// Jak [`Graph::node`], ale nieaktualny uchwyt jest błędem.
    pub fn try_node(&self, id: NodeId) -> Result<&Node> {
        self.node(id).ok_or(GraphError::InvalidNode(id))
    }

    /// Żywe węzły w kolejności rosnących indeksów slotów.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.node
                .as_ref()
                .map(|node| (NodeId::new(index as u32, slot.generation), node))
        })
    }

    /// Tworzy nowy węzeł i dołącza go krawędzią `label` wychodzącą z `source`.
    ///
    /// Istniejąca krawędź o tej samej etykiecie jest zastępowana, a jej dawny
    /// cel usuwany, jeśli stał się sierotą.
    pub fn add_child(&mut self, source: NodeId, label: &str) -> Result<NodeId> {
        self.try_node(source)?;
        let child = self.allocate();
        self.link(source, label, child);
        Ok(child)
    }

    /// Dołącza istniejący węzeł `dest` krawędzią `label` wychodzącą z `source`.
    ///
    /// Ponowne dodanie identycznej krawędzi nic nie zmienia.
    pub fn add_edge(&mut self, source: NodeId, dest: NodeId, label: &str) -> Result<()> {
        self.try_node(source)?;
        self.try_node(dest)?;
        self.link(source, label, dest);
        Ok(())
    }

    /// Usuwa krawędź `label` wychodzącą z `source` (w obu kierunkach).
    /// Osierocony cel krawędzi jest usuwany kaskadowo.
    pub fn remove_edge(&mut self, source: NodeId, label: &str) -> Result<()> {
        let dest = self
            .try_node(source)?
            .follow(label)
            .ok_or_else(|| GraphError::EdgeNotFound { label: label.to_string(), node: source })?;
        self.detach(source, label);
        self.collect_orphan(dest);
        Ok(())
    }

    /// Usuwa węzeł wraz ze wszystkimi incydentnymi krawędziami.
    pub fn remove_node(&mut self, node: NodeId) -> Result<()> {
        if node == self.root {
            return Err(GraphError::RootRemoval);
        }
        self.try_node(node)?;
        self.delete_cascade(node);
        Ok(())
    }

    pub fn set_accept(&mut self, node: NodeId, accept: bool) -> Result<()> {
        let current = self.try_node(node)?.is_accept();
        if current != accept {
            if let Some(n) = self.node_mut(node) {
                n.set_accept(accept);
            }
            if accept {
                self.num_accept += 1;
            } else {
                self.num_accept -= 1;
            }
        }
        Ok(())
    }

    /// Sprawdza spójność struktury: dwukierunkowość krawędzi, liczniki
    /// zbiorcze oraz osiągalność każdego węzła z korzenia.
    pub fn validate(&self) -> Result<()> {
        if !self.contains(self.root) {
            return Err(GraphError::CorruptedGraph("brak korzenia".to_string()));
        }

        let mut live = 0;
        let mut edges = 0;
        let mut accept = 0;
        let mut labels: BTreeMap<Label, usize> = BTreeMap::new();

        for (id, node) in self.nodes() {
            live += 1;
            if node.is_accept() {
                accept += 1;
            }
            for (label, &target) in node.out_edges() {
                let target_node = self.node(target).ok_or_else(|| {
                    GraphError::CorruptedGraph(format!("krawędź {id} -'{label}'-> {target} prowadzi do usuniętego węzła"))
                })?;
                if !target_node.has_in_edge(label, id) {
                    return Err(GraphError::CorruptedGraph(format!(
                        "krawędź {id} -'{label}'-> {target} nie ma odpowiednika wchodzącego"
                    )));
                }
                edges += 1;
                *labels.entry(label.clone()).or_insert(0) += 1;
            }
            for (label, source) in node.in_edges() {
                let consistent = self
                    .node(*source)
                    .map_or(false, |s| s.has_out_edge(label, id));
                if !consistent {
                    return Err(GraphError::CorruptedGraph(format!(
                        "krawędź wchodząca {source} -'{label}'-> {id} nie ma odpowiednika wychodzącego"
                    )));
                }
            }
            if id != self.root && node.in_degree() == 0 {
                return Err(GraphError::CorruptedGraph(format!("węzeł {id} jest osierocony")));
            }
        }

        if live != self.num_nodes || edges != self.num_edges || accept != self.num_accept {
            return Err(GraphError::CorruptedGraph(format!(
                "liczniki ({}, {}, {}) nie zgadzają się ze stanem ({live}, {edges}, {accept})",
                self.num_nodes, self.num_edges, self.num_accept
            )));
        }
        if labels != self.label_counts {
            return Err(GraphError::CorruptedGraph("nieaktualne liczniki etykiet".to_string()));
        }

        let mut counter = ReachableCounter::default();
        GraphTraversal::new(self).breadth_first_search::<Outgoing, _>(self.root, &mut counter)?;
        if counter.count != live {
            return Err(GraphError::CorruptedGraph(format!(
                "z korzenia osiągalnych jest {} z {live} węzłów",
                counter.count
            )));
        }
        Ok(())
    }

    /// Sprawdza, czy dwa grafy są izomorficzne, tzn. różnią się co najwyżej
    /// uchwytami węzłów.
    pub fn is_isomorphic(&self, other: &Graph) -> bool {
        if self.num_nodes != other.num_nodes
            || self.num_edges != other.num_edges
            || self.num_accept != other.num_accept
        {
            return false;
        }

        let mut forward: HashMap<NodeId, NodeId> = HashMap::new();
        let mut backward: HashMap<NodeId, NodeId> = HashMap::new();
        let mut queue = VecDeque::new();
        forward.insert(self.root, other.root);
        backward.insert(other.root, self.root);
        queue.push_back((self.root, other.root));

        while let Some((a, b)) = queue.pop_front() {
            let (Some(na), Some(nb)) = (self.node(a), other.node(b)) else {
                return false;
            };
            if na.is_accept() != nb.is_accept() || na.out_degree() != nb.out_degree() {
                return false;
            }
            for ((la, &ca), (lb, &cb)) in na.out_edges().iter().zip(nb.out_edges()) {
                if la != lb {
                    return false;
                }
                match (forward.get(&ca), backward.get(&cb)) {
                    (Some(&mapped), _) if mapped != cb => return false,
                    (None, Some(_)) => return false,
                    (Some(_), _) => {}
                    (None, None) => {
                        forward.insert(ca, cb);
                        backward.insert(cb, ca);
                        queue.push_back((ca, cb));
                    }
                }
            }
        }
        forward.len() == self.num_nodes
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_mut())
    }

    fn allocate(&mut self) -> NodeId {
        self.num_nodes += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(Node::new());
            return NodeId::new(index, slot.generation);
        }
        self.slots.push(Slot { generation: 0, node: Some(Node::new()) });
        NodeId::new((self.slots.len() - 1) as u32, 0)
    }

    fn release(&mut self, id: NodeId) {
        let Some(slot) = self.slots.get_mut(id.index()) else {
            return;
        };
        if slot.generation != id.generation() {
            return;
        }
        if let Some(node) = slot.node.take() {
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index() as u32);
            self.num_nodes -= 1;
            if node.is_accept() {
                self.num_accept -= 1;
            }
        }
    }

    /// Oba końce muszą być żywe.
    fn link(&mut self, source: NodeId, label: &str, dest: NodeId) {
        let previous = self.node(source).and_then(|n| n.follow(label));
        if previous == Some(dest) {
            return;
        }
        if previous.is_some() {
            self.detach(source, label);
        }
        self.attach(source, label, dest);
        // Dawny cel usuwamy dopiero po dołączeniu nowego, bo `dest` może być
        // jego potomkiem.
        if let Some(old) = previous {
            self.collect_orphan(old);
        }
    }

    fn attach(&mut self, source: NodeId, label: &str, dest: NodeId) {
        if let Some(n) = self.node_mut(source) {
            n.add_out_edge(label, dest);
        }
        if let Some(n) = self.node_mut(dest) {
            n.add_in_edge(label, source);
        }
        self.num_edges += 1;
        *self.label_counts.entry(label.to_string()).or_insert(0) += 1;
    }

    fn detach(&mut self, source: NodeId, label: &str) -> Option<NodeId> {
        let dest = self.node_mut(source)?.remove_out_edge(label)?;
        if let Some(n) = self.node_mut(dest) {
            n.remove_in_edge(label, source);
        }
        self.num_edges -= 1;
        if let Some(count) = self.label_counts.get_mut(label) {
            *count -= 1;
            if *count == 0 {
                self.label_counts.remove(label);
            }
        }
        Some(dest)
    }

    fn collect_orphan(&mut self, id: NodeId) {
        if id != self.root && self.node(id).map_or(false, |n| n.in_degree() == 0) {
            self.delete_cascade(id);
        }
    }

    fn delete_cascade(&mut self, start: NodeId) {
        let mut worklist = vec![start];
        while let Some(id) = worklist.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            let incoming: Vec<HalfEdge> = node.in_edges().iter().cloned().collect();
            let outgoing: Vec<HalfEdge> = node
                .out_edges()
                .iter()
                .map(|(label, &child)| (label.clone(), child))
                .collect();

            for (label, parent) in incoming {
                self.detach(parent, &label);
            }
            for (label, child) in outgoing {
                self.detach(id, &label);
                if child != self.root && self.node(child).map_or(false, |n| n.in_degree() == 0) {
                    worklist.push(child);
                }
            }
            self.release(id);
        }
    }
}

#[derive(Default)]
struct ReachableCounter {
    count: usize,
}

impl GraphVisitor for ReachableCounter {
    fn visit_node(&mut self, _graph: &Graph, _node: NodeId) {
        self.count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    /// root -c-> n1 -a-> n2 -t-> n3 (akceptujący), n2 -r-> n3
    fn cat_car() -> (Graph, [NodeId; 3]) {
        let mut g = Graph::new();
        let root = g.root();
        let c = g.add_child(root, "c").unwrap();
        let a = g.add_child(c, "a").unwrap();
        let t = g.add_child(a, "t").unwrap();
        g.set_accept(t, true).unwrap();
        g.add_edge(a, t, "r").unwrap();
        (g, [c, a, t])
    }

    #[test]
    fn test_new_graph_has_only_root() {
        let g = Graph::new();
        assert_eq!(g.num_nodes(), 1);
        assert_eq!(g.num_edges(), 0);
        assert_eq!(g.num_accept(), 0);
        assert!(g.contains(g.root()));
        assert!(g.label_counts().is_empty());
        g.validate().unwrap();
    }

    #[test]
    fn test_counts_follow_mutations() {
        let (g, [_, a, t]) = cat_car();
        assert_eq!(g.num_nodes(), 4);
        assert_eq!(g.num_edges(), 4);
        assert_eq!(g.num_accept(), 1);
        assert_eq!(g.label_counts().get("r"), Some(&1));
        assert_eq!(g.node(t).unwrap().in_degree(), 2);
        assert!(g.node(t).unwrap().has_in_edge("r", a));
        g.validate().unwrap();
    }

    #[test]
    fn test_remove_edge_keeps_shared_child() {
        let (mut g, [_, a, t]) = cat_car();
        g.remove_edge(a, "r").unwrap();
        assert!(g.contains(t));
        assert_eq!(g.num_edges(), 3);
        assert_eq!(g.label_counts().get("r"), None);
        g.validate().unwrap();
    }

    #[test]
    fn test_remove_edge_cascades_to_orphans() {
        let (mut g, [c, a, t]) = cat_car();
        let root = g.root();
        g.remove_edge(root, "c").unwrap();
        assert!(!g.contains(c));
        assert!(!g.contains(a));
        assert!(!g.contains(t));
        assert_eq!(g.num_nodes(), 1);
        assert_eq!(g.num_edges(), 0);
        assert_eq!(g.num_accept(), 0);
        assert!(g.label_counts().is_empty());
        g.validate().unwrap();
    }

    #[test]
    fn test_remove_missing_edge_is_error_without_effect() {
        let (mut g, [c, _, _]) = cat_car();
        assert_matches!(g.remove_edge(c, "x"), Err(GraphError::EdgeNotFound { ref label, node }) if label == "x" && node == c);
        assert_eq!(g.num_edges(), 4);
    }

    #[test]
    fn test_stale_handle_is_rejected() {
        let (mut g, [c, a, _]) = cat_car();
        let root = g.root();
        g.remove_edge(root, "c").unwrap();

        // Slot zostaje ponownie użyty, ale z nową generacją.
        let fresh = g.add_child(root, "x").unwrap();
        assert_ne!(fresh, c);
        assert_ne!(fresh, a);

        assert_matches!(g.add_child(a, "q"), Err(GraphError::InvalidNode(id)) if id == a);
        assert_matches!(g.set_accept(c, true), Err(GraphError::InvalidNode(_)));
        assert_matches!(g.add_edge(root, c, "y"), Err(GraphError::InvalidNode(_)));
        assert_eq!(g.num_nodes(), 2);
        assert_eq!(g.num_edges(), 1);
        g.validate().unwrap();
    }

    #[test]
    fn test_root_cannot_be_removed() {
        let mut g = Graph::new();
        let root = g.root();
        assert_matches!(g.remove_node(root), Err(GraphError::RootRemoval));
    }

    #[test]
    fn test_remove_node_detaches_all_edges() {
        let (mut g, [c, a, t]) = cat_car();
        g.remove_node(a).unwrap();
        assert!(g.contains(c));
        assert!(!g.contains(t));
        assert_eq!(g.node(c).unwrap().out_degree(), 0);
        assert_eq!(g.num_edges(), 1);
        g.validate().unwrap();
    }

    #[test]
    fn test_add_edge_replaces_same_label() {
        let (mut g, [c, a, t]) = cat_car();
        // c -a-> t zastępuje c -a-> a; `a` traci jedyną krawędź wchodzącą.
        g.add_edge(c, t, "a").unwrap();
        assert!(!g.contains(a));
        assert!(g.contains(t));
        assert_eq!(g.node(t).unwrap().in_degree(), 1);
        assert_eq!(g.num_edges(), 2);
        g.validate().unwrap();
    }

    #[test]
    fn test_add_identical_edge_is_noop() {
        let (mut g, [c, a, _]) = cat_car();
        g.add_edge(c, a, "a").unwrap();
        assert_eq!(g.num_edges(), 4);
        assert_eq!(g.label_counts().get("a"), Some(&1));
        g.validate().unwrap();
    }

    #[test]
    fn test_long_chain_removal_does_not_recurse() {
        let mut g = Graph::new();
        let mut current = g.root();
        for _ in 0..100_000 {
            current = g.add_child(current, "x").unwrap();
        }
        let root = g.root();
        g.remove_edge(root, "x").unwrap();
        assert_eq!(g.num_nodes(), 1);
        assert_eq!(g.num_edges(), 0);
    }

    #[test]
    fn test_clone_is_isomorphic() {
        let (g, [_, a, _]) = cat_car();
        let mut copy = g.clone();
        assert!(g.is_isomorphic(&copy));

        copy.remove_edge(a, "r").unwrap();
        assert!(!g.is_isomorphic(&copy));
    }

    #[test]
    fn test_isomorphism_ignores_handles() {
        let mut g1 = Graph::new();
        let r1 = g1.root();
        let x = g1.add_child(r1, "x").unwrap();
        g1.remove_edge(r1, "x").unwrap();
        assert!(!g1.contains(x));
        let a1 = g1.add_child(r1, "a").unwrap();
        g1.set_accept(a1, true).unwrap();

        let mut g2 = Graph::new();
        let r2 = g2.root();
        let a2 = g2.add_child(r2, "a").unwrap();
        g2.set_accept(a2, true).unwrap();

        assert_ne!(a1, a2);
        assert!(g1.is_isomorphic(&g2));

        g2.set_accept(a2, false).unwrap();
        assert!(!g1.is_isomorphic(&g2));
    }

    #[test]
    fn test_stats_display() {
        let (g, _) = cat_car();
        let stats = g.stats();
        assert_eq!(stats, GraphStats { num_nodes: 4, num_edges: 4, num_accept: 1, num_labels: 4 });
        assert_eq!(stats.to_string(), "węzły: 4, krawędzie: 4, akceptujące: 1, etykiety: 4");
    }
}
