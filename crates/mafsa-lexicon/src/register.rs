use std::collections::HashMap;

use mafsa_graph::{Graph, Label, Node, NodeId};

use crate::error::Result;

/// Klucz równoważności węzłów: flaga akceptacji i uporządkowana lista krawędzi
/// wychodzących. Dwa węzły o tym samym kluczu mają ten sam prawy język,
/// o ile ich dzieci są już kanoniczne.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RightLanguageKey {
    accept: bool,
    edges: Vec<(Label, NodeId)>,
}

impl RightLanguageKey {
    pub fn of(node: &Node) -> Self {
        RightLanguageKey {
            accept: node.is_accept(),
            edges: node.out_edges().iter().map(|(l, &c)| (l.clone(), c)).collect(),
        }
    }
}

/// Rejestr kanonicznych węzłów używany przy minimalizacji.
///
/// Klucz węzła jest zapamiętywany w chwili rejestracji, więc węzeł zmieniany
/// w grafie musi najpierw zostać wyrejestrowany. Pilnuje tego [`Register::edit`].
#[derive(Debug, Clone, Default)]
pub struct Register {
    canonical: HashMap<RightLanguageKey, NodeId>,
    keys: HashMap<NodeId, RightLanguageKey>,
}

/// Dowód wyrejestrowania węzła na czas modyfikacji.
/// Należy go oddać przez [`Register::checkin`].
#[must_use]
#[derive(Debug)]
pub struct Unregistered {
    node: NodeId,
    was_registered: bool,
}

impl Register {
    pub fn new() -> Self {
        Register::default()
    }

    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }

    pub fn clear(&mut self) {
        self.canonical.clear();
        self.keys.clear();
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.keys.contains_key(&node)
    }

    /// Zarejestrowany węzeł równoważny `node` (może to być sam `node`).
    pub fn find(&self, graph: &Graph, node: NodeId) -> Result<Option<NodeId>> {
        let key = RightLanguageKey::of(graph.try_node(node)?);
        Ok(self.canonical.get(&key).copied())
    }

    /// Rejestruje `node` jako kanoniczny reprezentant swojej klasy.
    pub fn insert(&mut self, graph: &Graph, node: NodeId) -> Result<()> {
        let key = RightLanguageKey::of(graph.try_node(node)?);
        self.remove(node);
        if let Some(previous) = self.canonical.insert(key.clone(), node) {
            self.keys.remove(&previous);
        }
        self.keys.insert(node, key);
        Ok(())
    }

    pub fn remove(&mut self, node: NodeId) -> bool {
        match self.keys.remove(&node) {
            Some(key) => {
                if self.canonical.get(&key) == Some(&node) {
                    self.canonical.remove(&key);
                }
                true
            }
            None => false,
        }
    }

    pub fn checkout(&mut self, node: NodeId) -> Unregistered {
        let was_registered = self.remove(node);
        Unregistered { node, was_registered }
    }

    /// Ponownie rejestruje węzeł, o ile był zarejestrowany i nadal nie ma
    /// w rejestrze innego węzła równoważnego.
    pub fn checkin(&mut self, graph: &Graph, token: Unregistered) -> Result<()> {
        if !token.was_registered || !graph.contains(token.node) {
            return Ok(());
        }
        if self.find(graph, token.node)?.is_none() {
            self.insert(graph, token.node)?;
        }
        Ok(())
    }

    /// Wykonuje `f` na grafie z węzłem `node` wyrejestrowanym na czas zmiany.
    pub fn edit<T, F>(&mut self, graph: &mut Graph, node: NodeId, f: F) -> Result<T>
    where
        F: FnOnce(&mut Graph) -> mafsa_graph::Result<T>,
    {
        let token = self.checkout(node);
        let result = f(graph);
        self.checkin(graph, token)?;
        Ok(result?)
    }
}
