use std::str::FromStr;

use Error;

/// Which tokens count towards the accuracy of a finished parse.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TokenScoring {
    /// Score every token.
    All,
    /// Skip tokens whose tag consists of punctuation only.
    Default,
    /// Skip tokens whose surface form consists of punctuation only.
    Conllx,
    /// Like `Conllx`, additionally skipping parenthesis tokens.
    IgnoreParens,
}

impl TokenScoring {
    /// Should the token be scored?
    pub fn score_token(&self, form: &str, tag: &str) -> bool {
        match *self {
            TokenScoring::All => true,
            TokenScoring::Default => !is_punctuation(tag),
            TokenScoring::Conllx => !is_punctuation(form),
            TokenScoring::IgnoreParens => !is_punctuation(form) && !is_parenthesis(form),
        }
    }
}

impl FromStr for TokenScoring {
    type Err = Error;

    fn from_str(scoring: &str) -> Result<Self, Self::Err> {
        match scoring {
            "" => Ok(TokenScoring::All),
            "default" => Ok(TokenScoring::Default),
            "conllx" => Ok(TokenScoring::Conllx),
            "ignore_parens" => Ok(TokenScoring::IgnoreParens),
            _ => bail!("unknown scoring type: {}", scoring),
        }
    }
}

fn is_punctuation(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_punctuation_char)
}

fn is_punctuation_char(c: char) -> bool {
    match c {
        '„' | '“' | '”' | '‘' | '’' | '–' | '—' | '…' | '«' | '»' | '¡' | '¿' | '、' | '。'
        | '，' | '；' | '：' | '？' | '！' => true,
        _ => c.is_ascii_punctuation(),
    }
}

fn is_parenthesis(s: &str) -> bool {
    match s {
        "(" | ")" | "[" | "]" | "{" | "}" | "-LRB-" | "-RRB-" | "-LSB-" | "-RSB-" | "-LCB-"
        | "-RCB-" => true,
        _ => false,
    }
}
