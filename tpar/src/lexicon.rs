//! Term vocabularies and their shared cache.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use Result;

/// Frequency-annotated term vocabulary.
///
/// Maps terms to dense identifiers and back. The text format is one entry
/// per line, the term and its frequency separated by the last space on the
/// line. Identifiers are assigned in file order, so a map written in
/// descending frequency order gives the most frequent terms the lowest
/// identifiers.
pub struct TermFrequencyMap {
    terms: Vec<String>,
    frequencies: Vec<u64>,
    indices: HashMap<String, usize>,
}

impl TermFrequencyMap {
    /// Read a term/frequency map.
    ///
    /// Entries with a frequency below `min_frequency` are dropped, as are
    /// entries once `max_entries` terms have been read (`0` means
    /// unlimited).
    pub fn from_buf_read<R>(read: R, min_frequency: u64, max_entries: usize) -> Result<Self>
    where
        R: BufRead,
    {
        let mut terms = Vec::new();
        let mut frequencies = Vec::new();
        let mut indices = HashMap::new();

        for (lineno, line) in read.lines().enumerate() {
            let line = line?;
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }

            let mut parts = line.rsplitn(2, ' ');
            let freq_str = parts.next().expect("rsplitn yields at least one part");
            let term = parts.next().ok_or_else(|| {
                format_err!("line {}: missing frequency in entry: {}", lineno + 1, line)
            })?;
            let frequency: u64 = freq_str.parse().map_err(|_| {
                format_err!("line {}: invalid frequency: {}", lineno + 1, freq_str)
            })?;

            if frequency < min_frequency {
                continue;
            }

            if max_entries > 0 && terms.len() == max_entries {
                continue;
            }

            match indices.entry(term.to_owned()) {
                Entry::Occupied(_) => bail!("line {}: duplicate term: {}", lineno + 1, term),
                Entry::Vacant(entry) => {
                    entry.insert(terms.len());
                }
            }

            terms.push(term.to_owned());
            frequencies.push(frequency);
        }

        Ok(TermFrequencyMap {
            terms,
            frequencies,
            indices,
        })
    }

    pub fn from_path<P>(path: P, min_frequency: u64, max_entries: usize) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path.as_ref()).map_err(|e| {
            format_err!("cannot open term map {}: {}", path.as_ref().display(), e)
        })?;
        TermFrequencyMap::from_buf_read(BufReader::new(file), min_frequency, max_entries)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Look up the identifier of a term.
    pub fn lookup(&self, term: &str) -> Option<usize> {
        self.indices.get(term).cloned()
    }

    /// Look up the term with the given identifier.
    pub fn term(&self, id: usize) -> Option<&str> {
        self.terms.get(id).map(String::as_str)
    }

    pub fn frequency(&self, id: usize) -> Option<u64> {
        self.frequencies.get(id).cloned()
    }
}

/// Cache of term maps, keyed by file path.
///
/// Term maps are loaded once and shared read-only between every component
/// that uses them. The cache is an explicit object constructed by the
/// application and passed by reference wherever a vocabulary is loaded;
/// maps are released when the last `Arc` holding them is dropped.
#[derive(Default)]
pub struct LexiconCache {
    maps: Mutex<HashMap<PathBuf, Arc<TermFrequencyMap>>>,
}

impl LexiconCache {
    pub fn new() -> Self {
        LexiconCache::default()
    }

    /// Return the map loaded from `path`, reading it on the first request.
    pub fn load<P>(&self, path: P) -> Result<Arc<TermFrequencyMap>>
    where
        P: AsRef<Path>,
    {
        let mut maps = self.maps.lock().expect("lexicon cache lock poisoned");

        if let Some(map) = maps.get(path.as_ref()) {
            return Ok(map.clone());
        }

        let map = Arc::new(TermFrequencyMap::from_path(path.as_ref(), 0, 0)?);
        maps.insert(path.as_ref().to_owned(), map.clone());

        Ok(map)
    }
}
