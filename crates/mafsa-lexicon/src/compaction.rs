use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tracing::{debug, info};

use mafsa_graph::{get_transitive_paths, make_connected_components, ConnectedComponent, Graph, Label, NodeId, TransitivePath};

use crate::error::Result;

/// Etap kompakcji leksykonu. Kompakcja na poziomie jest stanem końcowym.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompactionState {
    #[default]
    Uncompacted,
    LongEdgesCompacted,
    LevelCompacted(usize),
}

impl CompactionState {
    pub fn is_compacted(&self) -> bool {
        *self != CompactionState::Uncompacted
    }
}

/// Rodzaj przebiegu kompakcji.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompactionPass {
    LongEdges,
    Level(usize),
}

impl fmt::Display for CompactionPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompactionPass::LongEdges => write!(f, "długie krawędzie"),
            CompactionPass::Level(level) => write!(f, "poziom {}", level),
        }
    }
}

/// Podsumowanie jednego przebiegu kompakcji.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactionReport {
    pub pass: CompactionPass,
    pub components_considered: usize,
    pub components_committed: usize,
    pub nodes_before: usize,
    pub nodes_after: usize,
    pub edges_before: usize,
    pub edges_after: usize,
    pub labels_before: usize,
    pub labels_after: usize,
}

impl CompactionReport {
    fn start(pass: CompactionPass, graph: &Graph) -> Self {
        CompactionReport {
            pass,
            components_considered: 0,
            components_committed: 0,
            nodes_before: graph.num_nodes(),
            nodes_after: graph.num_nodes(),
            edges_before: graph.num_edges(),
            edges_after: graph.num_edges(),
            labels_before: graph.label_counts().len(),
            labels_after: graph.label_counts().len(),
        }
    }

    fn finish(mut self, graph: &Graph) -> Self {
        self.nodes_after = graph.num_nodes();
        self.edges_after = graph.num_edges();
        self.labels_after = graph.label_counts().len();
        self
    }

    /// Raport przebiegu, który nic nie zmienił.
    pub fn unchanged(pass: CompactionPass, graph: &Graph) -> Self {
        CompactionReport::start(pass, graph)
    }
}

impl fmt::Display for CompactionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "kompakcja ({}): komponenty {}/{}, węzły {} -> {}, krawędzie {} -> {}, etykiety {} -> {}",
            self.pass,
            self.components_committed,
            self.components_considered,
            self.nodes_before,
            self.nodes_after,
            self.edges_before,
            self.edges_after,
            self.labels_before,
            self.labels_after
        )
    }
}

/// Przebiegi kompakcji działające bezpośrednio na grafie.
///
/// Każdy przebieg zastępuje komponenty wybranych węzłów bezpośrednimi
/// krawędziami od `upstream` do `downstream`, z etykietami będącymi złączeniem
/// etykiet na ścieżkach. Węzły akceptujące nigdy nie są kandydatami, więc język
/// grafu się nie zmienia.
pub struct Compactor<'g> {
    graph: &'g mut Graph,
}

impl<'g> Compactor<'g> {
    pub fn new(graph: &'g mut Graph) -> Self {
        Compactor { graph }
    }

    /// Zwija łańcuchy węzłów o jednej krawędzi wchodzącej i jednej wychodzącej
    /// w pojedyncze krawędzie.
    pub fn compact_long_edges(&mut self) -> Result<CompactionReport> {
        let mut report = CompactionReport::start(CompactionPass::LongEdges, self.graph);
        let candidates = self.select(|node_in, node_out| node_in == 1 && node_out == 1);
        let components = make_connected_components(self.graph, &candidates);
        report.components_considered = components.len();

        for component in &components {
            let paths = get_transitive_paths(self.graph, component)?;
            self.commit(component, &paths)?;
            report.components_committed += 1;
        }

        let report = report.finish(self.graph);
        info!("{}", report);
        Ok(report)
    }

    /// Kompakcja komponentów o stopniach mniejszych niż `level`.
    ///
    /// Komponent jest zastępowany, gdy zysk na etykietach znikających z grafu
    /// nie jest mniejszy od liczby nowych etykiet, które wprowadzi. Wynik
    /// liczony jest względem bieżących liczników grafu, a więc uwzględnia
    /// komponenty zastąpione wcześniej w tym samym przebiegu.
    pub fn compact_level(&mut self, level: usize) -> Result<CompactionReport> {
        let mut report = CompactionReport::start(CompactionPass::Level(level), self.graph);
        let candidates = self.select(|node_in, node_out| {
            node_in > 0 && node_out > 0 && node_in < level && node_out < level && (node_in == 1 || node_out == 1)
        });
        let components = make_connected_components(self.graph, &candidates);
        report.components_considered = components.len();

        for component in &components {
            let paths = get_transitive_paths(self.graph, component)?;
            let score = score_component(self.graph.label_counts(), component, &paths);
            debug!(
                "komponent: węzły {}, upstream {}, downstream {}, ścieżki {}, wynik {}",
                component.len(),
                component.upstream().len(),
                component.downstream().len(),
                paths.len(),
                score
            );
            if score >= 0 {
                self.commit(component, &paths)?;
                report.components_committed += 1;
            }
        }

        let report = report.finish(self.graph);
        info!("{}", report);
        Ok(report)
    }

    fn select<F>(&self, by_degree: F) -> BTreeSet<NodeId>
    where
        F: Fn(usize, usize) -> bool,
    {
        self.graph
            .nodes()
            .filter(|(_, node)| !node.is_accept() && by_degree(node.in_degree(), node.out_degree()))
            .map(|(id, _)| id)
            .collect()
    }

    /// Dodaje ścieżki jako krawędzie, a następnie odcina komponent od `upstream`.
    /// Węzły komponentu są usuwane kaskadowo.
    fn commit(&mut self, component: &ConnectedComponent, paths: &BTreeSet<TransitivePath>) -> Result<()> {
        for path in paths {
            self.graph.add_edge(path.source, path.destination, &path.label)?;
        }
        for &source in component.upstream() {
            let labels: Vec<Label> = match self.graph.node(source) {
                Some(node) => node
                    .out_edges()
                    .iter()
                    .filter(|(_, child)| component.contains(**child))
                    .map(|(label, _)| label.clone())
                    .collect(),
                None => continue,
            };
            for label in labels {
                self.graph.remove_edge(source, &label)?;
            }
        }
        Ok(())
    }
}

/// +1 za każdą etykietę, której wszystkie wystąpienia w grafie należą do
/// komponentu, -1 za każdą nową etykietę ścieżki nieobecną w grafie.
pub fn score_component(
    label_counts: &BTreeMap<Label, usize>,
    component: &ConnectedComponent,
    paths: &BTreeSet<TransitivePath>,
) -> i64 {
    let removed = component
        .label_counts()
        .iter()
        .filter(|(label, count)| label_counts.get(*label) == Some(*count))
        .count() as i64;
    let added = paths
        .iter()
        .map(|p| p.label.as_str())
        .filter(|label| !label_counts.contains_key(*label))
        .collect::<BTreeSet<&str>>()
        .len() as i64;
    removed - added
}

#[cfg(test)]
mod tests {
    use super::*;
    use mafsa_graph::AcceptedStrings;

    fn strings(g: &Graph) -> Vec<String> {
        AcceptedStrings::new(g).collect()
    }

    /// root -a-> n1 -b-> n2 -c-> n3 (akceptujący)
    fn chain() -> Graph {
        let mut g = Graph::new();
        let root = g.root();
        let n1 = g.add_child(root, "a").unwrap();
        let n2 = g.add_child(n1, "b").unwrap();
        let n3 = g.add_child(n2, "c").unwrap();
        g.set_accept(n3, true).unwrap();
        g
    }

    #[test]
    fn test_long_edges_collapse_chain() {
        let mut g = chain();
        let report = Compactor::new(&mut g).compact_long_edges().unwrap();

        assert_eq!(g.num_nodes(), 2);
        assert_eq!(g.num_edges(), 1);
        assert_eq!(g.label_counts().keys().collect::<Vec<_>>(), vec!["abc"]);
        assert_eq!(strings(&g), vec!["abc"]);
        assert_eq!(report.components_considered, 1);
        assert_eq!(report.components_committed, 1);
        assert_eq!((report.nodes_before, report.nodes_after), (4, 2));
        g.validate().unwrap();
    }

    #[test]
    fn test_long_edges_keep_accept_nodes() {
        // "ab" i "abc": węzeł po "ab" jest akceptujący i musi zostać.
        let mut g = chain();
        let root = g.root();
        let n2 = g.nodes().find(|(_, n)| n.has_out_label("c")).map(|(id, _)| id).unwrap();
        g.set_accept(n2, true).unwrap();
        Compactor::new(&mut g).compact_long_edges().unwrap();

        assert_eq!(strings(&g), vec!["ab", "abc"]);
        assert!(g.node(root).unwrap().has_out_label("ab"));
        assert_eq!(g.num_nodes(), 3);
        g.validate().unwrap();
    }

    #[test]
    fn test_score_counts_distinct_new_labels() {
        // root -x-> m, m -p-> d1, m -q-> d2; wszystkie etykiety są unikalne.
        let mut g = Graph::new();
        let root = g.root();
        let m = g.add_child(root, "x").unwrap();
        let d1 = g.add_child(m, "p").unwrap();
        let d2 = g.add_child(m, "q").unwrap();
        g.set_accept(d1, true).unwrap();
        g.set_accept(d2, true).unwrap();

        let component = ConnectedComponent::new(&g, BTreeSet::from([m]));
        let paths = get_transitive_paths(&g, &component).unwrap();
        // Znikają x, p, q (+3), dochodzą xp i xq (-2).
        assert_eq!(score_component(g.label_counts(), &component, &paths), 1);
    }

    #[test]
    fn test_score_ignores_labels_shared_outside_component() {
        let mut g = Graph::new();
        let root = g.root();
        let m = g.add_child(root, "a").unwrap();
        let d = g.add_child(m, "b").unwrap();
        g.set_accept(d, true).unwrap();
        let other = g.add_child(root, "b").unwrap();
        g.add_edge(other, d, "a").unwrap();

        let component = ConnectedComponent::new(&g, BTreeSet::from([m]));
        let paths = get_transitive_paths(&g, &component).unwrap();
        // "a" i "b" występują też poza komponentem; "ab" jest nowa.
        assert_eq!(score_component(g.label_counts(), &component, &paths), -1);
    }

    #[test]
    fn test_level_compaction_skips_negative_components() {
        let mut g = Graph::new();
        let root = g.root();
        let m = g.add_child(root, "a").unwrap();
        let d = g.add_child(m, "b").unwrap();
        g.set_accept(d, true).unwrap();
        let other = g.add_child(root, "b").unwrap();
        g.add_edge(other, d, "a").unwrap();
        let before = g.clone();

        let report = Compactor::new(&mut g).compact_level(3).unwrap();
        assert_eq!(report.components_committed, 0);
        assert!(g.is_isomorphic(&before));
    }

    #[test]
    fn test_level_compaction_merges_fan_out() {
        // root -x-> m, m -p-> d1, m -q-> d2; m ma stopnie (1, 2).
        let mut g = Graph::new();
        let root = g.root();
        let m = g.add_child(root, "x").unwrap();
        let d1 = g.add_child(m, "p").unwrap();
        let d2 = g.add_child(m, "q").unwrap();
        g.set_accept(d1, true).unwrap();
        g.set_accept(d2, true).unwrap();

        let report = Compactor::new(&mut g).compact_level(3).unwrap();
        assert_eq!(report.components_committed, 1);
        assert!(!g.contains(m));
        assert_eq!(strings(&g), vec!["xp", "xq"]);
        assert_eq!(g.num_edges(), 2);
        g.validate().unwrap();
    }

    #[test]
    fn test_level_compaction_sees_labels_freed_by_earlier_components() {
        // root -x-> m1 -a-> d1, root -y-> m2 -a-> d2, d1 -y-> d2.
        // Dopiero po zastąpieniu m1 etykieta "a" zostaje wyłącznie przy m2.
        let mut g = Graph::new();
        let root = g.root();
        let m1 = g.add_child(root, "x").unwrap();
        let d1 = g.add_child(m1, "a").unwrap();
        let m2 = g.add_child(root, "y").unwrap();
        let d2 = g.add_child(m2, "a").unwrap();
        g.set_accept(d1, true).unwrap();
        g.set_accept(d2, true).unwrap();
        g.add_edge(d1, d2, "y").unwrap();

        let second = ConnectedComponent::new(&g, BTreeSet::from([m2]));
        let paths = get_transitive_paths(&g, &second).unwrap();
        assert_eq!(score_component(g.label_counts(), &second, &paths), -1);

        let report = Compactor::new(&mut g).compact_level(3).unwrap();
        assert_eq!(report.components_considered, 2);
        assert_eq!(report.components_committed, 2);
        assert!(!g.contains(m1));
        assert!(!g.contains(m2));
        assert_eq!(g.label_counts().get("a"), None);
        assert_eq!(strings(&g), vec!["xa", "xay", "ya"]);
        assert_eq!((g.num_nodes(), g.num_edges()), (3, 3));
        g.validate().unwrap();
    }

    #[test]
    fn test_report_display() {
        let g = chain();
        let report = CompactionReport::unchanged(CompactionPass::Level(2), &g);
        assert_eq!(
            report.to_string(),
            "kompakcja (poziom 2): komponenty 0/0, węzły 4 -> 4, krawędzie 3 -> 3, etykiety 3 -> 3"
        );
    }
}
