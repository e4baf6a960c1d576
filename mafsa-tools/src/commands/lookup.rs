use std::io::{self, Write};

use mafsa_graph::MatchKind;
use mafsa_lexicon::FsaLexicon;

use crate::InputArgs;

pub fn run(args: &InputArgs, words: &[String]) -> anyhow::Result<()> {
    let lexicon = super::load_lexicon(args)?;
    let stdout = io::stdout();
    write_lookups(&lexicon, words, &mut stdout.lock())?;
    Ok(())
}

/// Dla każdego słowa wypisuje linię `słowo<TAB>wynik`.
pub fn write_lookups<W: Write>(lexicon: &FsaLexicon, words: &[String], out: &mut W) -> anyhow::Result<()> {
    for word in words {
        let result = lexicon.lookup(word)?;
        let verdict = match result.kind {
            MatchKind::ExactMatch => "jest",
            MatchKind::SequenceIsAPrefix => "prefiks",
            MatchKind::AutomatonIsAPrefix => "brak (dłuższe niż słowo w leksykonie)",
            MatchKind::NoMatch => "brak",
        };
        writeln!(out, "{}\t{}", word, verdict)?;
    }
    Ok(())
}
