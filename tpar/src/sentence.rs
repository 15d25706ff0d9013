//! Sentence and token value types.

use std::ops::Deref;

/// A token with its gold-standard annotations.
///
/// Heads are 1-based token identifiers; head `0` is the artificial root
/// node. A token without a head annotation has `head() == None`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Token {
    form: String,
    pos: String,
    head: Option<usize>,
    head_rel: Option<String>,
}

impl Token {
    pub fn new<F, P>(form: F, pos: P) -> Self
    where
        F: Into<String>,
        P: Into<String>,
    {
        TokenBuilder::new(form).pos(pos).token()
    }

    pub fn form(&self) -> &str {
        &self.form
    }

    pub fn pos(&self) -> &str {
        &self.pos
    }

    pub fn head(&self) -> Option<usize> {
        self.head
    }

    pub fn head_rel(&self) -> Option<&str> {
        self.head_rel.as_ref().map(String::as_str)
    }

    pub fn set_head(&mut self, head: Option<usize>) {
        self.head = head;
    }

    pub fn set_head_rel<S>(&mut self, head_rel: Option<S>)
    where
        S: Into<String>,
    {
        self.head_rel = head_rel.map(Into::into);
    }
}

/// Builder for `Token`s.
pub struct TokenBuilder(Token);

impl TokenBuilder {
    pub fn new<S>(form: S) -> Self
    where
        S: Into<String>,
    {
        TokenBuilder(Token {
            form: form.into(),
            pos: String::new(),
            head: None,
            head_rel: None,
        })
    }

    pub fn pos<S>(mut self, pos: S) -> Self
    where
        S: Into<String>,
    {
        self.0.pos = pos.into();
        self
    }

    pub fn head(mut self, head: usize) -> Self {
        self.0.head = Some(head);
        self
    }

    pub fn head_rel<S>(mut self, head_rel: S) -> Self
    where
        S: Into<String>,
    {
        self.0.head_rel = Some(head_rel.into());
        self
    }

    pub fn token(self) -> Token {
        self.0
    }
}

/// An ordered sequence of tokens.
///
/// Sentences are owned by the corpus source that produced them and treated
/// as immutable while a parser state refers to them.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Sentence(Vec<Token>);

impl Sentence {
    pub fn new(tokens: Vec<Token>) -> Self {
        Sentence(tokens)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.0
    }

    pub fn tokens_mut(&mut self) -> &mut [Token] {
        &mut self.0
    }
}

impl Deref for Sentence {
    type Target = [Token];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::{Sentence, TokenBuilder};

    #[test]
    fn builds_tokens() {
        let token = TokenBuilder::new("Gurken")
            .pos("NN")
            .head(2)
            .head_rel("SUBJ")
            .token();

        assert_eq!(token.form(), "Gurken");
        assert_eq!(token.pos(), "NN");
        assert_eq!(token.head(), Some(2));
        assert_eq!(token.head_rel(), Some("SUBJ"));
    }

    #[test]
    fn sentence_derefs_to_tokens() {
        let sentence = Sentence::new(vec![
            TokenBuilder::new("Es").pos("PPER").head(2).token(),
            TokenBuilder::new("regnet").pos("VVFIN").head(0).token(),
        ]);

        assert_eq!(sentence.len(), 2);
        assert_eq!(sentence[1].form(), "regnet");
    }
}
