use std::collections::BTreeSet;

use crate::error::Result;
use crate::lexicon_trait::Lexicon;

/// Leksykon przechowujący napisy wprost w zbiorze.
///
/// Nie ma wymagań co do kolejności dodawania. Służy jako wzorzec przy
/// sprawdzaniu leksykonu opartego na automacie.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetLexicon {
    strings: BTreeSet<String>,
}

impl SetLexicon {
    pub fn new() -> Self {
        SetLexicon::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.strings.iter().map(|s| s.as_str())
    }
}

impl Lexicon for SetLexicon {
    fn add_string(&mut self, s: &str) -> Result<()> {
        self.strings.insert(s.to_string());
        Ok(())
    }

    fn has_string(&self, s: &str) -> bool {
        self.strings.contains(s)
    }

    fn size(&self) -> usize {
        self.strings.len()
    }

    fn dump_strings(&self) -> BTreeSet<String> {
        self.strings.clone()
    }
}

impl<S: AsRef<str>> FromIterator<S> for SetLexicon {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        SetLexicon { strings: iter.into_iter().map(|s| s.as_ref().to_string()).collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_add_and_query() {
        let mut lexicon = SetLexicon::new();
        lexicon.add_string("kot").unwrap();
        lexicon.add_string("ala").unwrap();
        lexicon.add_string("kot").unwrap();

        assert_eq!(lexicon.size(), 2);
        assert!(lexicon.has_string("ala"));
        assert!(!lexicon.has_string("ko"));
        assert_eq!(lexicon.iter().collect::<Vec<_>>(), vec!["ala", "kot"]);
    }

    #[test]
    fn test_load_strips_carriage_returns() {
        let lexicon = SetLexicon::load(Cursor::new("ma\r\nkota\n")).unwrap();
        assert_eq!(lexicon.dump_strings(), BTreeSet::from(["ma".to_string(), "kota".to_string()]));
    }

    #[test]
    fn test_dump_writes_one_string_per_line() {
        let lexicon: SetLexicon = ["b", "a", "c"].into_iter().collect();
        let mut out = Vec::new();
        lexicon.dump(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a\nb\nc\n");
    }

    #[test]
    fn test_same_strings() {
        let a: SetLexicon = ["x", "y"].into_iter().collect();
        let b: SetLexicon = ["y", "x"].into_iter().collect();
        let c: SetLexicon = ["x"].into_iter().collect();
        assert!(a.same_strings(&b));
        assert!(!a.same_strings(&c));
    }
}
