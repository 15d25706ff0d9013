use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use conllx::{HeadProjectivizer, Projectivize, ReadSentence};
use tpar::batch::SentenceSource;
use tpar::sentence::{Sentence, TokenBuilder};
use tpar::Result;

/// A rewindable sentence source over a CoNLL-X corpus file.
///
/// Rewinding reopens the file, so an epoch always replays the corpus in
/// its original order.
pub struct ConllxSource {
    path: PathBuf,
    reader: conllx::Reader<BufReader<File>>,
    projectivizer: Option<HeadProjectivizer>,
}

impl ConllxSource {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let reader = Self::reader(path.as_ref())?;
        Ok(ConllxSource {
            path: path.as_ref().to_owned(),
            reader,
            projectivizer: None,
        })
    }

    /// Projectivize non-projective sentences while reading.
    pub fn with_projectivization(mut self) -> Self {
        self.projectivizer = Some(HeadProjectivizer::new());
        self
    }

    fn reader(path: &Path) -> Result<conllx::Reader<BufReader<File>>> {
        let file = File::open(path)
            .map_err(|e| format_err!("cannot open corpus {}: {}", path.display(), e))?;
        Ok(conllx::Reader::new(BufReader::new(file)))
    }
}

impl SentenceSource for ConllxSource {
    fn read_sentence(&mut self) -> Result<Option<Sentence>> {
        let sentence = match self.reader.read_sentence()? {
            Some(sentence) => sentence,
            None => return Ok(None),
        };

        let sentence = match self.projectivizer {
            Some(ref projectivizer) => projectivizer.projectivize(&sentence)?,
            None => sentence,
        };

        Ok(Some(convert_sentence(&sentence)))
    }

    fn rewind(&mut self) -> Result<()> {
        self.reader = Self::reader(&self.path)?;
        Ok(())
    }
}

fn convert_sentence(sentence: &conllx::Sentence) -> Sentence {
    let mut tokens = Vec::with_capacity(sentence.len());

    for token in sentence {
        let mut builder = TokenBuilder::new(token.form()).pos(token.pos().unwrap_or("_"));
        if let Some(head) = token.head() {
            builder = builder.head(head);
        }
        if let Some(head_rel) = token.head_rel() {
            builder = builder.head_rel(head_rel);
        }
        tokens.push(builder.token());
    }

    Sentence::new(tokens)
}
