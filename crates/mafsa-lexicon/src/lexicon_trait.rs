use std::collections::BTreeSet;
use std::io::{BufRead, Write};

use crate::error::Result;

/// Skończony zbiór napisów, budowany przyrostowo.
///
/// Wspólny interfejs dla leksykonu opartego na automacie i dla prostego
/// leksykonu referencyjnego, dzięki czemu można porównywać ich zawartość.
pub trait Lexicon {
    /// Dodaje napis do leksykonu. Ponowne dodanie tego samego napisu nic nie zmienia.
    fn add_string(&mut self, s: &str) -> Result<()>;

    fn has_string(&self, s: &str) -> bool;

    /// Liczba różnych napisów w leksykonie.
    fn size(&self) -> usize;

    /// Wszystkie napisy leksykonu, w porządku leksykograficznym.
    fn dump_strings(&self) -> BTreeSet<String>;

    /// Dodaje kolejne linie strumienia jako napisy. Końcowe `\r` jest usuwane.
    fn add_file<R: BufRead>(&mut self, reader: R) -> Result<()>
    where
        Self: Sized,
    {
        for line in reader.lines() {
            let line = line?;
            self.add_string(line.strip_suffix('\r').unwrap_or(&line))?;
        }
        Ok(())
    }

    /// Zapisuje wszystkie napisy, po jednym w linii.
    fn dump<W: Write>(&self, writer: &mut W) -> Result<()>
    where
        Self: Sized,
    {
        for s in self.dump_strings() {
            writeln!(writer, "{}", s)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Tworzy nowy leksykon z linii strumienia.
    fn load<R: BufRead>(reader: R) -> Result<Self>
    where
        Self: Sized + Default,
    {
        let mut lexicon = Self::default();
        lexicon.add_file(reader)?;
        Ok(lexicon)
    }

    /// Czy oba leksykony zawierają dokładnie te same napisy.
    fn same_strings<L: Lexicon>(&self, other: &L) -> bool
    where
        Self: Sized,
    {
        self.size() == other.size() && self.dump_strings() == other.dump_strings()
    }
}
