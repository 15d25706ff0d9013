//! Shared test fixtures.

use std::sync::Arc;

use lexicon::TermFrequencyMap;
use sentence::{Sentence, TokenBuilder};
use task::TaskContext;

lazy_static! {
    static ref LABELS: Arc<TermFrequencyMap> = Arc::new(
        TermFrequencyMap::from_buf_read(
            "ROOT 50\nSUBJ 40\nOBJ 30\nDET 60\nATTR 20\n-PUNCT- 50\n".as_bytes(),
            0,
            0
        ).unwrap()
    );
}

pub fn labels() -> Arc<TermFrequencyMap> {
    LABELS.clone()
}

pub fn label(name: &str) -> usize {
    LABELS.lookup(name).expect("unknown test label")
}

/// *Die kleine Katze jagt den Hund .*
pub fn test_sentence() -> Sentence {
    Sentence::new(vec![
        TokenBuilder::new("Die").pos("ART").head(3).head_rel("DET").token(),
        TokenBuilder::new("kleine")
            .pos("ADJA")
            .head(3)
            .head_rel("ATTR")
            .token(),
        TokenBuilder::new("Katze")
            .pos("NN")
            .head(4)
            .head_rel("SUBJ")
            .token(),
        TokenBuilder::new("jagt")
            .pos("VVFIN")
            .head(0)
            .head_rel("ROOT")
            .token(),
        TokenBuilder::new("den").pos("ART").head(6).head_rel("DET").token(),
        TokenBuilder::new("Hund")
            .pos("NN")
            .head(4)
            .head_rel("OBJ")
            .token(),
        TokenBuilder::new(".")
            .pos("$.")
            .head(4)
            .head_rel("-PUNCT-")
            .token(),
    ])
}

pub fn trivial_sentence() -> Sentence {
    Sentence::new(vec![TokenBuilder::new("Ja")
        .pos("PTKANT")
        .head(0)
        .head_rel("ROOT")
        .token()])
}

/// A task context wired to the vocabularies under `testdata/`.
pub fn task_context() -> TaskContext {
    let mut context = TaskContext::new();
    context.set_param("transition_system", "arc-standard");
    context.set_param("parser_embedding_names", "words;tags;labels");
    context.set_param("parser_embedding_dims", "64;32;32");
    context.set_param(
        "parser_features",
        "stack(0) stack(1) stack(2) buffer(0) buffer(1);\
         stack(0) stack(1) buffer(0);\
         stack(0).ldep(0) stack(0).rdep(0)",
    );
    context.set_input("word-map", "testdata/words.txt");
    context.set_input("tag-map", "testdata/tags.txt");
    context.set_input("label-map", "testdata/labels.txt");
    context
}
