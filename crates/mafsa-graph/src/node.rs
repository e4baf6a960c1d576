use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::Bound;

/// Etykieta krawędzi. Podczas budowy automatu jest to pojedynczy znak,
/// po kompakcji może to być dłuższy napis.
pub type Label = String;

/// Krawędź widziana z jednego końca: (etykieta, węzeł po drugiej stronie).
pub type HalfEdge = (Label, NodeId);

/// Uchwyt węzła w arenie grafu.
///
/// Składa się z indeksu slotu i generacji slotu. Po usunięciu węzła generacja
/// slotu rośnie, więc stary uchwyt nigdy nie wskaże nowego węzła.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        NodeId { index, generation }
    }

    /// Indeks slotu w arenie.
    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generation == 0 {
            write!(f, "n{}", self.index)
        } else {
            write!(f, "n{}@{}", self.index, self.generation)
        }
    }
}

/// Węzeł grafu z flagą akceptacji i dwukierunkowymi, etykietowanymi krawędziami.
///
/// Węzeł sam nie pilnuje spójności krawędzi. Każda krawędź wychodząca musi mieć
/// odpowiadającą jej krawędź wchodzącą w węźle docelowym, o co dba [`Graph`](crate::graph::Graph),
/// jedyne miejsce, w którym węzły są modyfikowane.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    accept: bool,
    out_edges: BTreeMap<Label, NodeId>,
    in_edges: BTreeSet<HalfEdge>,
}

impl Node {
    pub(crate) fn new() -> Self {
        Node::default()
    }

    pub fn is_accept(&self) -> bool {
        self.accept
    }

    /// Liczba krawędzi wchodzących.
    pub fn in_degree(&self) -> usize {
        self.in_edges.len()
    }

    /// Liczba krawędzi wychodzących.
    pub fn out_degree(&self) -> usize {
        self.out_edges.len()
    }

    pub fn has_out_label(&self, label: &str) -> bool {
        self.out_edges.contains_key(label)
    }

    pub fn has_out_edge(&self, label: &str, target: NodeId) -> bool {
        self.follow(label) == Some(target)
    }

    pub fn has_in_edge(&self, label: &str, source: NodeId) -> bool {
        self.in_edges.contains(&(label.to_string(), source))
    }

    /// Zwraca węzeł docelowy krawędzi wychodzącej o podanej etykiecie.
    pub fn follow(&self, label: &str) -> Option<NodeId> {
        self.out_edges.get(label).copied()
    }

    /// Krawędzie wychodzące, uporządkowane rosnąco według etykiet.
    pub fn out_edges(&self) -> &BTreeMap<Label, NodeId> {
        &self.out_edges
    }

    /// Krawędzie wchodzące, uporządkowane według etykiety, a potem uchwytu źródła.
    pub fn in_edges(&self) -> &BTreeSet<HalfEdge> {
        &self.in_edges
    }

    /// Krawędź wychodząca o leksykograficznie największej etykiecie.
    pub fn last_out_edge(&self) -> Option<(&str, NodeId)> {
        self.out_edges
            .iter()
            .next_back()
            .map(|(label, &child)| (label.as_str(), child))
    }

    /// Najdłuższa etykieta krawędzi wychodzącej będąca prefiksem `input`.
    ///
    /// Długość kandydata rośnie (po granicach znaków) dopóki istnieje etykieta
    /// zaczynająca się od kandydata. Zwracany jest najdłuższy kandydat, który
    /// jest dokładnie etykietą. Brak dopasowania długości jednego znaku kończy
    /// poszukiwania od razu.
    pub fn longest_prefix_edge(&self, input: &str) -> Option<(&str, NodeId)> {
        let mut best = None;
        let ends = input
            .char_indices()
            .skip(1)
            .map(|(i, _)| i)
            .chain(std::iter::once(input.len()));
        for end in ends {
            if end == 0 {
                break;
            }
            let candidate = &input[..end];
            let mut range = self
                .out_edges
                .range::<str, _>((Bound::Included(candidate), Bound::Unbounded));
            match range.next() {
                Some((label, &child)) if label.starts_with(candidate) => {
                    if label.len() == candidate.len() {
                        best = Some((label.as_str(), child));
                    }
                }
                _ => break,
            }
        }
        best
    }

    pub(crate) fn set_accept(&mut self, accept: bool) {
        self.accept = accept;
    }

    pub(crate) fn add_out_edge(&mut self, label: &str, target: NodeId) {
        self.out_edges.insert(label.to_string(), target);
    }

    pub(crate) fn remove_out_edge(&mut self, label: &str) -> Option<NodeId> {
        self.out_edges.remove(label)
    }

    pub(crate) fn add_in_edge(&mut self, label: &str, source: NodeId) {
        self.in_edges.insert((label.to_string(), source));
    }

    pub(crate) fn remove_in_edge(&mut self, label: &str, source: NodeId) -> bool {
        self.in_edges.remove(&(label.to_string(), source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(index: u32) -> NodeId {
        NodeId::new(index, 0)
    }

    #[test]
    fn test_new_node_is_empty() {
        let node = Node::new();
        assert!(!node.is_accept());
        assert_eq!(node.in_degree(), 0);
        assert_eq!(node.out_degree(), 0);
        assert!(node.last_out_edge().is_none());
    }

    #[test]
    fn test_out_edges_are_ordered_by_label() {
        let mut node = Node::new();
        node.add_out_edge("t", id(3));
        node.add_out_edge("c", id(1));
        node.add_out_edge("r", id(2));

        let labels: Vec<&str> = node.out_edges().keys().map(|l| l.as_str()).collect();
        assert_eq!(labels, vec!["c", "r", "t"]);
        assert_eq!(node.last_out_edge(), Some(("t", id(3))));
        assert!(node.has_out_edge("r", id(2)));
        assert!(!node.has_out_edge("r", id(3)));
    }

    #[test]
    fn test_in_edges_with_same_label_from_different_sources() {
        let mut node = Node::new();
        node.add_in_edge("a", id(1));
        node.add_in_edge("a", id(2));
        node.add_in_edge("b", id(1));
        assert_eq!(node.in_degree(), 3);
        assert!(node.has_in_edge("a", id(2)));
        assert!(!node.has_in_edge("b", id(2)));

        assert!(node.remove_in_edge("a", id(2)));
        assert!(!node.remove_in_edge("a", id(2)));
        assert_eq!(node.in_degree(), 2);
    }

    #[test]
    fn test_longest_prefix_edge_prefers_longest_label() {
        let mut node = Node::new();
        node.add_out_edge("a", id(1));
        node.add_out_edge("ab", id(2));
        node.add_out_edge("abd", id(3));

        assert_eq!(node.longest_prefix_edge("abc"), Some(("ab", id(2))));
        assert_eq!(node.longest_prefix_edge("abde"), Some(("abd", id(3))));
        assert_eq!(node.longest_prefix_edge("a"), Some(("a", id(1))));
        assert_eq!(node.longest_prefix_edge("x"), None);
        assert_eq!(node.longest_prefix_edge(""), None);
    }

    #[test]
    fn test_longest_prefix_edge_without_single_char_label() {
        // Po kompakcji krawędź "ab" istnieje bez krawędzi "a".
        let mut node = Node::new();
        node.add_out_edge("ab", id(1));
        node.add_out_edge("ac", id(2));

        assert_eq!(node.longest_prefix_edge("ab"), Some(("ab", id(1))));
        assert_eq!(node.longest_prefix_edge("acx"), Some(("ac", id(2))));
        assert_eq!(node.longest_prefix_edge("a"), None);
        assert_eq!(node.longest_prefix_edge("ad"), None);
    }

    #[test]
    fn test_longest_prefix_edge_multibyte_labels() {
        let mut node = Node::new();
        node.add_out_edge("ż", id(1));
        node.add_out_edge("żó", id(2));

        assert_eq!(node.longest_prefix_edge("żółw"), Some(("żó", id(2))));
        assert_eq!(node.longest_prefix_edge("ża"), Some(("ż", id(1))));
    }
}
