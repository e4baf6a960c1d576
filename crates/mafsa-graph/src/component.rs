use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::error::Result;
use crate::graph::Graph;
use crate::node::{Label, NodeId};
use crate::traversal::{GraphTraversal, Outgoing, PathVisitor};

/// Spójny (bez względu na kierunek krawędzi) podzbiór wybranych węzłów
/// razem z jego brzegiem.
///
/// `upstream` to węzły spoza komponentu z krawędzią do któregoś z jego węzłów,
/// `downstream` to węzły spoza komponentu, do których prowadzi krawędź
/// z komponentu. Liczniki etykiet obejmują wszystkie krawędzie wchodzące do
/// węzłów komponentu oraz krawędzie wychodzące poza komponent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedComponent {
    members: BTreeSet<NodeId>,
    upstream: BTreeSet<NodeId>,
    downstream: BTreeSet<NodeId>,
    label_counts: BTreeMap<Label, usize>,
    num_edges: usize,
}

impl ConnectedComponent {
    /// Wyznacza brzeg i liczniki etykiet dla podanych węzłów.
    /// Uchwyty nieobecne w grafie są pomijane.
    pub fn new(graph: &Graph, members: BTreeSet<NodeId>) -> Self {
        let members: BTreeSet<NodeId> = members.into_iter().filter(|&m| graph.contains(m)).collect();
        let mut upstream = BTreeSet::new();
        let mut downstream = BTreeSet::new();
        let mut label_counts: BTreeMap<Label, usize> = BTreeMap::new();

        for node in members.iter().filter_map(|&m| graph.node(m)) {
            for (label, parent) in node.in_edges() {
                *label_counts.entry(label.clone()).or_insert(0) += 1;
                if !members.contains(parent) {
                    upstream.insert(*parent);
                }
            }
            for (label, child) in node.out_edges() {
                if !members.contains(child) {
                    *label_counts.entry(label.clone()).or_insert(0) += 1;
                    downstream.insert(*child);
                }
            }
        }

        let num_edges = label_counts.values().sum();
        ConnectedComponent { members, upstream, downstream, label_counts, num_edges }
    }

    pub fn members(&self) -> &BTreeSet<NodeId> {
        &self.members
    }

    pub fn upstream(&self) -> &BTreeSet<NodeId> {
        &self.upstream
    }

    pub fn downstream(&self) -> &BTreeSet<NodeId> {
        &self.downstream
    }

    pub fn label_counts(&self) -> &BTreeMap<Label, usize> {
        &self.label_counts
    }

    /// Liczba krawędzi incydentnych z komponentem.
    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.members.contains(&node)
    }

    pub fn is_upstream(&self, node: NodeId) -> bool {
        self.upstream.contains(&node)
    }

    pub fn is_downstream(&self, node: NodeId) -> bool {
        self.downstream.contains(&node)
    }
}

/// Dzieli żywe węzły z `candidates` na rozłączne komponenty spójne.
///
/// Komponenty są tworzone w kolejności najmniejszego jeszcze nieprzydzielonego
/// uchwytu, a sąsiedzi są zbierani przez krawędzie w obu kierunkach, ale tylko
/// w obrębie kandydatów.
pub fn make_connected_components(graph: &Graph, candidates: &BTreeSet<NodeId>) -> Vec<ConnectedComponent> {
    let mut remaining: BTreeSet<NodeId> = candidates.iter().copied().filter(|&c| graph.contains(c)).collect();
    let mut components = Vec::new();

    while let Some(first) = remaining.pop_first() {
        let mut members = BTreeSet::from([first]);
        let mut queue = VecDeque::from([first]);

        while let Some(id) = queue.pop_front() {
            let Some(node) = graph.node(id) else {
                continue;
            };
            let parents = node.in_edges().iter().map(|(_, p)| *p);
            let children = node.out_edges().values().copied();
            for neighbour in parents.chain(children) {
                if remaining.remove(&neighbour) {
                    members.insert(neighbour);
                    queue.push_back(neighbour);
                }
            }
        }

        components.push(ConnectedComponent::new(graph, members));
    }
    components
}

/// Ścieżka od węzła `upstream` przez komponent do węzła `downstream`,
/// z etykietą będącą złączeniem etykiet kolejnych krawędzi.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransitivePath {
    pub source: NodeId,
    pub destination: NodeId,
    pub label: Label,
}

/// Zbiera ścieżki przechodnie komponentu, startując kolejno z każdego
/// węzła `upstream`.
///
/// Z węzła startowego rozwijane są tylko krawędzie prowadzące do komponentu,
/// z węzłów komponentu krawędzie do komponentu lub do `downstream`.
/// Gałąź kończy się w pierwszym osiągniętym węźle `downstream`.
pub struct TransitivePathVisitor<'c> {
    component: &'c ConnectedComponent,
    start: Option<NodeId>,
    paths: BTreeSet<TransitivePath>,
}

impl<'c> TransitivePathVisitor<'c> {
    pub fn new(component: &'c ConnectedComponent) -> Self {
        TransitivePathVisitor { component, start: None, paths: BTreeSet::new() }
    }

    /// Przechodzi wszystkie ścieżki zaczynające się w `start`.
    pub fn walk_from(&mut self, graph: &Graph, start: NodeId) -> Result<()> {
        self.start = Some(start);
        let result = GraphTraversal::new(graph).walk_paths::<Outgoing, _>(start, String::new(), self);
        self.start = None;
        result
    }

    pub fn paths(&self) -> &BTreeSet<TransitivePath> {
        &self.paths
    }

    pub fn into_paths(self) -> BTreeSet<TransitivePath> {
        self.paths
    }
}

impl<'c> PathVisitor for TransitivePathVisitor<'c> {
    type Acc = String;

    fn should_follow(&mut self, _graph: &Graph, from: NodeId, _label: &str, to: NodeId) -> bool {
        if Some(from) == self.start {
            self.component.contains(to)
        } else {
            self.component.contains(from) && (self.component.contains(to) || self.component.is_downstream(to))
        }
    }

    fn extend(&mut self, acc: &String, label: &str, _to: NodeId) -> String {
        let mut extended = String::with_capacity(acc.len() + label.len());
        extended.push_str(acc);
        extended.push_str(label);
        extended
    }

    fn visit(&mut self, _graph: &Graph, node: NodeId, acc: &String) -> bool {
        match self.start {
            Some(start) if node != start && self.component.is_downstream(node) => {
                self.paths.insert(TransitivePath { source: start, destination: node, label: acc.clone() });
                false
            }
            _ => true,
        }
    }
}

/// Wszystkie ścieżki przechodnie komponentu, bez powtórzeń.
pub fn get_transitive_paths(graph: &Graph, component: &ConnectedComponent) -> Result<BTreeSet<TransitivePath>> {
    let mut visitor = TransitivePathVisitor::new(component);
    for &start in component.upstream() {
        visitor.walk_from(graph, start)?;
    }
    Ok(visitor.into_paths())
}
