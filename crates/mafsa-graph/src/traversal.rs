use std::collections::{HashSet, VecDeque};

use crate::error::Result;
use crate::graph::Graph;
use crate::node::{Label, Node, NodeId};

/// Rodzaj wyniku dopasowania sekwencji w grafie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Cała sekwencja została dopasowana i kończy się w węźle akceptującym.
    ExactMatch,
    NoMatch,
    /// Sekwencja jest prefiksem co najmniej jednego napisu w grafie.
    SequenceIsAPrefix,
    /// Graf akceptuje prefiks sekwencji, ale nie całą sekwencję.
    AutomatonIsAPrefix,
}

/// Szczegółowy wynik operacji dopasowania sekwencji.
///
/// `index` to liczba dopasowanych bajtów sekwencji, a `node` to węzeł,
/// w którym dopasowanie się zatrzymało.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    pub kind: MatchKind,
    pub index: usize,
    pub node: NodeId,
}

/// "Odwiedzający" węzły i krawędzie podczas przechodzenia grafu.
///
/// Wszystkie metody mają domyślne implementacje, więc wystarczy nadpisać
/// potrzebne. Krawędź jest zawsze podawana w kierunku przechodzenia:
/// od węzła, z którego przyszliśmy, do sąsiada.
pub trait GraphVisitor {
    fn setup(&mut self, _graph: &Graph) {}

    /// Węzeł, dla którego zwrócono `false`, nie jest odwiedzany ani rozwijany.
    fn should_visit_node(&mut self, _graph: &Graph, _node: NodeId) -> bool {
        true
    }

    fn visit_node(&mut self, _graph: &Graph, _node: NodeId) {}

    fn should_visit_edge(&mut self, _graph: &Graph, _from: NodeId, _label: &str, _to: NodeId) -> bool {
        true
    }

    fn visit_edge(&mut self, _graph: &Graph, _from: NodeId, _label: &str, _to: NodeId) {}

    fn finish(&mut self, _graph: &Graph) {}
}

/// Kierunek przechodzenia: które krawędzie węzła są rozwijane i w jakiej kolejności.
pub trait Direction {
    /// Zwraca pary (etykieta, sąsiad) w kolejności odwiedzania.
    fn edges(node: &Node) -> Vec<(Label, NodeId)>;
}

/// Krawędzie wychodzące, rosnąco według etykiet.
pub struct Outgoing;

/// Krawędzie wychodzące, malejąco według etykiet.
pub struct OutgoingReversed;

/// Krawędzie wchodzące (przechodzenie w stronę korzenia).
pub struct Incoming;

impl Direction for Outgoing {
    fn edges(node: &Node) -> Vec<(Label, NodeId)> {
        node.out_edges().iter().map(|(l, &n)| (l.clone(), n)).collect()
    }
}

impl Direction for OutgoingReversed {
    fn edges(node: &Node) -> Vec<(Label, NodeId)> {
        node.out_edges().iter().rev().map(|(l, &n)| (l.clone(), n)).collect()
    }
}

impl Direction for Incoming {
    fn edges(node: &Node) -> Vec<(Label, NodeId)> {
        node.in_edges().iter().cloned().collect()
    }
}

/// Przechodzenie ścieżek z akumulatorem przenoszonym wzdłuż każdej gałęzi.
///
/// Akumulator jest wartością: każda krawędź tworzy nową wartość na podstawie
/// akumulatora węzła źródłowego, więc gałęzie nie współdzielą stanu.
pub trait PathVisitor {
    type Acc: Clone;

    fn should_follow(&mut self, _graph: &Graph, _from: NodeId, _label: &str, _to: NodeId) -> bool {
        true
    }

    fn extend(&mut self, acc: &Self::Acc, label: &str, to: NodeId) -> Self::Acc;

    /// Wywoływane po dotarciu do węzła. `false` kończy daną gałąź.
    fn visit(&mut self, graph: &Graph, node: NodeId, acc: &Self::Acc) -> bool;
}

/// Przechodzenie grafu z jawnym stosem lub kolejką, nigdy przez rekurencję.
pub struct GraphTraversal<'a> {
    graph: &'a Graph,
}

impl<'a> GraphTraversal<'a> {
    pub fn new(graph: &'a Graph) -> Self {
        GraphTraversal { graph }
    }

    /// Przeszukiwanie w głąb od `start`.
    ///
    /// Węzły osiągalne wieloma ścieżkami są odwiedzane wielokrotnie.
    pub fn depth_first_search<D: Direction, V: GraphVisitor>(&self, start: NodeId, visitor: &mut V) -> Result<()> {
        self.graph.try_node(start)?;
        visitor.setup(self.graph);

        let mut stack: Vec<(Option<(NodeId, Label)>, NodeId)> = vec![(None, start)];
        while let Some((via, node)) = stack.pop() {
            if !self.enter(visitor, via, node) {
                continue;
            }
            let Some(n) = self.graph.node(node) else {
                continue;
            };
            // Odwrotna kolejność na stosie daje odwiedzanie w kolejności kierunku.
            for (label, next) in D::edges(n).into_iter().rev() {
                stack.push((Some((node, label)), next));
            }
        }

        visitor.finish(self.graph);
        Ok(())
    }

    /// Przeszukiwanie wszerz od `start`; każdy węzeł jest odwiedzany co najwyżej raz.
    pub fn breadth_first_search<D: Direction, V: GraphVisitor>(&self, start: NodeId, visitor: &mut V) -> Result<()> {
        self.graph.try_node(start)?;
        visitor.setup(self.graph);

        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut queue: VecDeque<(Option<(NodeId, Label)>, NodeId)> = VecDeque::new();
        queue.push_back((None, start));
        while let Some((via, node)) = queue.pop_front() {
            if visited.contains(&node) {
                continue;
            }
            if !self.enter(visitor, via, node) {
                continue;
            }
            visited.insert(node);
            let Some(n) = self.graph.node(node) else {
                continue;
            };
            for (label, next) in D::edges(n) {
                if !visited.contains(&next) {
                    queue.push_back((Some((node, label)), next));
                }
            }
        }

        visitor.finish(self.graph);
        Ok(())
    }

    /// Przechodzi wszystkie ścieżki zaczynające się w `start`, przenosząc
    /// akumulator `init` rozszerzany na każdej krawędzi.
    pub fn walk_paths<D: Direction, V: PathVisitor>(&self, start: NodeId, init: V::Acc, visitor: &mut V) -> Result<()> {
        self.graph.try_node(start)?;

        let mut stack = vec![(init, start)];
        while let Some((acc, node)) = stack.pop() {
            if !visitor.visit(self.graph, node, &acc) {
                continue;
            }
            let Some(n) = self.graph.node(node) else {
                continue;
            };
            for (label, next) in D::edges(n).into_iter().rev() {
                if visitor.should_follow(self.graph, node, &label, next) {
                    let extended = visitor.extend(&acc, &label, next);
                    stack.push((extended, next));
                }
            }
        }
        Ok(())
    }

    /// Dopasowuje `sequence` od korzenia, wybierając w każdym węźle
    /// najdłuższą etykietę będącą prefiksem pozostałej części sekwencji.
    pub fn perfect_match(&self, sequence: &str) -> Result<MatchResult> {
        let mut node = self.graph.root();
        let mut index = 0;

        while index < sequence.len() {
            let current = self.graph.try_node(node)?;
            let rest = &sequence[index..];
            match current.longest_prefix_edge(rest) {
                Some((label, next)) => {
                    index += label.len();
                    node = next;
                }
                None => {
                    let kind = if has_label_starting_with(current, rest) {
                        MatchKind::SequenceIsAPrefix
                    } else if current.is_accept() {
                        MatchKind::AutomatonIsAPrefix
                    } else {
                        MatchKind::NoMatch
                    };
                    return Ok(MatchResult { kind, index, node });
                }
            }
        }

        let current = self.graph.try_node(node)?;
        let kind = if current.is_accept() {
            MatchKind::ExactMatch
        } else if current.out_degree() > 0 {
            MatchKind::SequenceIsAPrefix
        } else {
            MatchKind::NoMatch
        };
        Ok(MatchResult { kind, index, node })
    }

    fn enter<V: GraphVisitor>(&self, visitor: &mut V, via: Option<(NodeId, Label)>, node: NodeId) -> bool {
        if let Some((from, label)) = via {
            if !visitor.should_visit_edge(self.graph, from, &label, node) {
                return false;
            }
            visitor.visit_edge(self.graph, from, &label, node);
        }
        if !visitor.should_visit_node(self.graph, node) {
            return false;
        }
        visitor.visit_node(self.graph, node);
        true
    }
}

/// Czy któraś etykieta wychodząca z węzła jest dłuższa od `prefix` i od niego się zaczyna.
fn has_label_starting_with(node: &Node, prefix: &str) -> bool {
    node.out_edges()
        .range::<str, _>((std::ops::Bound::Included(prefix), std::ops::Bound::Unbounded))
        .next()
        .map_or(false, |(label, _)| label.starts_with(prefix))
}
