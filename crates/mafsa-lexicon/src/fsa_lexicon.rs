use std::collections::BTreeSet;
use std::io::BufRead;
use std::time::Instant;

use tracing::{debug, info, trace};

use mafsa_graph::traversal::{GraphTraversal, MatchKind, MatchResult, Outgoing, PathVisitor};
use mafsa_graph::{AcceptedStrings, Graph, GraphStats, NodeId};

use crate::build_options::BuildOptions;
use crate::compaction::{CompactionPass, CompactionReport, CompactionState, Compactor};
use crate::error::{LexiconError, Result};
use crate::lexicon_trait::Lexicon;
use crate::register::Register;

/// Leksykon w postaci minimalnego acyklicznego automatu skończonego.
///
/// Napisy muszą być dodawane w porządku leksykograficznym; automat jest
/// minimalizowany na bieżąco przy pomocy rejestru węzłów kanonicznych.
/// Po [`FsaLexicon::finalize`] automat jest minimalny i można go skompaktować.
#[derive(Debug, Clone, Default)]
pub struct FsaLexicon {
    graph: Graph,
    register: Register,
    size: usize,
    last: Option<String>,
    finalized: bool,
    compaction: CompactionState,
}

impl FsaLexicon {
    pub fn new() -> Self {
        FsaLexicon::default()
    }

    /// Buduje leksykon z dowolnie uporządkowanych napisów (sortuje je i usuwa
    /// powtórzenia). Zwrócony leksykon nie jest sfinalizowany.
    pub fn from_unsorted<I, S>(strings: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sorted: BTreeSet<String> = strings.into_iter().map(|s| s.as_ref().to_string()).collect();
        let mut lexicon = FsaLexicon::new();
        for s in &sorted {
            lexicon.add_string(s)?;
        }
        Ok(lexicon)
    }

    /// Buduje, finalizuje i kompaktuje leksykon z linii strumienia zgodnie z opcjami.
    pub fn build<R: BufRead>(reader: R, options: &BuildOptions) -> Result<Self> {
        let trim = options.trim_input()?;
        let skip_empty = options.skip_empty()?;
        let sort = options.sort_input()?;
        let level = options.compaction_level()?;

        let start = Instant::now();
        let mut lexicon = FsaLexicon::new();
        let mut pending = BTreeSet::new();
        for line in reader.lines() {
            let line = line?;
            let line = line.strip_suffix('\r').unwrap_or(&line);
            let word = if trim { line.trim() } else { line };
            if skip_empty && word.is_empty() {
                continue;
            }
            if sort {
                pending.insert(word.to_string());
            } else {
                lexicon.add_string(word)?;
            }
        }
        for word in &pending {
            lexicon.add_string(word)?;
        }
        debug!("Wczytano {} napisów w {:?}", lexicon.size, start.elapsed());

        lexicon.finalize()?;
        lexicon.compact(level)?;
        Ok(lexicon)
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn stats(&self) -> GraphStats {
        self.graph.stats()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn compaction_state(&self) -> CompactionState {
        self.compaction
    }

    /// Leniwy iterator po napisach leksykonu, w porządku leksykograficznym.
    pub fn iter(&self) -> AcceptedStrings<'_> {
        AcceptedStrings::new(&self.graph)
    }

    /// Wynik dopasowania napisu, wraz z miejscem, w którym dopasowanie się zatrzymało.
    pub fn lookup(&self, s: &str) -> Result<MatchResult> {
        Ok(GraphTraversal::new(&self.graph).perfect_match(s)?)
    }

    /// Kończy budowę: minimalizuje ostatnią gałąź i zwalnia rejestr.
    /// Kolejne wywołania nic nie robią.
    pub fn finalize(&mut self) -> Result<()> {
        if self.finalized {
            return Ok(());
        }
        let root = self.graph.root();
        if self.graph.try_node(root)?.out_degree() > 0 {
            self.replace_or_register(root)?;
        }
        self.register.clear();
        self.finalized = true;
        info!("Sfinalizowano leksykon: {} napisów, {}", self.size, self.graph.stats());
        Ok(())
    }

    /// Kompaktuje graf. Poziom 0 nic nie robi, poziom 1 zwija tylko długie
    /// krawędzie, poziomy od 2 dodatkowo łączą komponenty o stopniach
    /// mniejszych niż `level`. Po kompakcji na dowolnym poziomie kolejne
    /// wywołania nic nie zmieniają.
    pub fn compact(&mut self, level: usize) -> Result<Vec<CompactionReport>> {
        if !self.finalized {
            return Err(LexiconError::NotFinalized);
        }
        if level == 0 || matches!(self.compaction, CompactionState::LevelCompacted(_)) {
            return Ok(Vec::new());
        }

        let mut reports = Vec::new();
        if self.compaction == CompactionState::Uncompacted {
            reports.push(self.compact_long_edges()?);
        }
        if level >= 2 {
            reports.push(Compactor::new(&mut self.graph).compact_level(level)?);
        }
        self.compaction = CompactionState::LevelCompacted(level);
        Ok(reports)
    }

    /// Zwija łańcuchy węzłów nieakceptujących o stopniach (1, 1) w pojedyncze krawędzie.
    pub fn compact_long_edges(&mut self) -> Result<CompactionReport> {
        if !self.finalized {
            return Err(LexiconError::NotFinalized);
        }
        if self.compaction != CompactionState::Uncompacted {
            return Ok(CompactionReport::unchanged(CompactionPass::LongEdges, &self.graph));
        }
        let report = Compactor::new(&mut self.graph).compact_long_edges()?;
        self.compaction = CompactionState::LongEdgesCompacted;
        Ok(report)
    }

    /// Minimalizuje łańcuch ostatnich krawędzi zaczynający się w `node`,
    /// od najgłębszego węzła w górę.
    fn replace_or_register(&mut self, node: NodeId) -> Result<()> {
        let mut chain = Vec::new();
        let mut current = node;
        while let Some((label, child)) = self.graph.try_node(current)?.last_out_edge() {
            if self.register.contains(child) {
                break;
            }
            chain.push((current, label.to_string(), child));
            current = child;
        }

        for (parent, label, child) in chain.into_iter().rev() {
            match self.register.find(&self.graph, child)? {
                Some(canonical) if canonical != child => {
                    trace!("Scalanie {} z {} (krawędź '{}' z {})", child, canonical, label, parent);
                    self.register
                        .edit(&mut self.graph, parent, |g| g.add_edge(parent, canonical, &label))?;
                }
                Some(_) => {}
                None => self.register.insert(&self.graph, child)?,
            }
        }
        Ok(())
    }

    fn ensure_extendable(&self) -> Result<()> {
        if self.compaction.is_compacted() {
            return Err(LexiconError::AlreadyCompacted);
        }
        if self.finalized {
            return Err(LexiconError::AlreadyFinalized);
        }
        Ok(())
    }
}

impl Lexicon for FsaLexicon {
    fn add_string(&mut self, s: &str) -> Result<()> {
        self.ensure_extendable()?;
        if self.has_string(s) {
            return Ok(());
        }
        if let Some(previous) = &self.last {
            if s < previous.as_str() {
                return Err(LexiconError::UnsortedInput { previous: previous.clone(), current: s.to_string() });
            }
        }

        let mut current = self.graph.root();
        for c in s.chars() {
            let label = c.to_string();
            let node = self.graph.try_node(current)?;
            current = match node.follow(&label) {
                Some(next) => next,
                None => {
                    if node.out_degree() > 0 {
                        self.replace_or_register(current)?;
                    }
                    let parent = current;
                    self.register.edit(&mut self.graph, parent, |g| g.add_child(parent, &label))?
                }
            };
        }
        let last = current;
        self.register.edit(&mut self.graph, last, |g| g.set_accept(last, true))?;

        self.size += 1;
        self.last = Some(s.to_string());
        Ok(())
    }

    fn has_string(&self, s: &str) -> bool {
        GraphTraversal::new(&self.graph)
            .perfect_match(s)
            .map_or(false, |m| m.kind == MatchKind::ExactMatch)
    }

    fn size(&self) -> usize {
        self.size
    }

    fn dump_strings(&self) -> BTreeSet<String> {
        let mut visitor = AcceptStringVisitor::default();
        let root = self.graph.root();
        match GraphTraversal::new(&self.graph).walk_paths::<Outgoing, _>(root, String::new(), &mut visitor) {
            Ok(()) => visitor.strings,
            Err(_) => BTreeSet::new(),
        }
    }
}

/// Zbiera napisy prowadzące od punktu startowego do węzłów akceptujących.
#[derive(Debug, Default)]
pub struct AcceptStringVisitor {
    pub strings: BTreeSet<String>,
}

impl PathVisitor for AcceptStringVisitor {
    type Acc = String;

    fn extend(&mut self, acc: &String, label: &str, _to: NodeId) -> String {
        let mut extended = acc.clone();
        extended.push_str(label);
        extended
    }

    fn visit(&mut self, graph: &Graph, node: NodeId, acc: &String) -> bool {
        if graph.node(node).map_or(false, |n| n.is_accept()) {
            self.strings.insert(acc.clone());
        }
        true
    }
}
