//! Testy właściwości: leksykon oparty na automacie musi zawierać dokładnie te
//! same napisy co leksykon zbiorowy, przed kompakcją i po niej.

use std::collections::BTreeSet;

use mafsa_lexicon::{FsaLexicon, Lexicon, SetLexicon};
use proptest::prelude::*;

/// Krótkie słowa nad małym alfabetem, żeby wymusić wspólne prefiksy i sufiksy.
fn word_strategy() -> impl Strategy<Value = String> {
    "[abc]{0,8}"
}

fn dict_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(word_strategy(), 1..=40)
}

fn unicode_dict_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[aąćżź]{1,6}", 1..=20)
}

proptest! {
    #[test]
    fn prop_fsa_agrees_with_set(words in dict_strategy(), probes in prop::collection::vec(word_strategy(), 0..20)) {
        let mut fsa = FsaLexicon::from_unsorted(&words).unwrap();
        fsa.finalize().unwrap();
        let set: SetLexicon = words.iter().collect();

        prop_assert!(fsa.same_strings(&set));
        for probe in probes.iter().chain(words.iter()) {
            prop_assert_eq!(fsa.has_string(probe), set.has_string(probe));
        }
        prop_assert!(fsa.graph().validate().is_ok());
    }

    #[test]
    fn prop_compaction_preserves_language(words in dict_strategy(), level in 0usize..=5, probes in prop::collection::vec(word_strategy(), 0..20)) {
        let expected: BTreeSet<String> = words.iter().cloned().collect();
        let mut fsa = FsaLexicon::from_unsorted(&words).unwrap();
        fsa.finalize().unwrap();
        let before = fsa.stats();
        fsa.compact(level).unwrap();

        prop_assert_eq!(fsa.dump_strings(), expected.clone());
        prop_assert_eq!(fsa.iter().collect::<BTreeSet<_>>(), expected.clone());
        for probe in probes.iter().chain(words.iter()) {
            prop_assert_eq!(fsa.has_string(probe), expected.contains(probe));
        }
        prop_assert!(fsa.stats().num_nodes <= before.num_nodes);
        prop_assert!(fsa.graph().validate().is_ok());
    }

    #[test]
    fn prop_minimal_graph_has_no_equivalent_nodes(words in unicode_dict_strategy()) {
        let mut fsa = FsaLexicon::from_unsorted(&words).unwrap();
        fsa.finalize().unwrap();

        // W automacie minimalnym żadne dwa węzły nie mają tej samej flagi
        // akceptacji i tych samych krawędzi wychodzących.
        let mut seen = BTreeSet::new();
        for (_, node) in fsa.graph().nodes() {
            let key = (node.is_accept(), node.out_edges().clone());
            prop_assert!(seen.insert(key));
        }
    }

    #[test]
    fn prop_compact_is_idempotent(words in dict_strategy(), level in 1usize..=4) {
        let mut fsa = FsaLexicon::from_unsorted(&words).unwrap();
        fsa.finalize().unwrap();
        fsa.compact(level).unwrap();
        let once = fsa.graph().clone();
        fsa.compact(level).unwrap();
        prop_assert!(fsa.graph().is_isomorphic(&once));
    }
}
