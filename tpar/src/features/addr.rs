use pest::iterators::Pair;
use pest::Parser;

use system::ParserState;
use Result;

#[derive(Parser)]
#[grammar = "features/address.pest"]
struct AddressParser;

/// Where an address starts looking for a token.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Source {
    Stack,
    Buffer,
}

/// Navigation from an addressed token to one of its inferred dependents.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Dep {
    /// The n-th dependent to the left of the token, leftmost first.
    Left(usize),
    /// The n-th dependent to the right of the token, rightmost first.
    Right(usize),
}

/// A token address relative to a parser state.
///
/// Addresses are written as e.g. `stack(1)`, `buffer(0)`, or
/// `stack(0).ldep(0)`: a source with an offset, optionally followed by
/// dependent navigation steps.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AddressedValue {
    pub source: Source,
    pub index: usize,
    pub deps: Vec<Dep>,
}

impl AddressedValue {
    /// Resolve the address to a token of the given state.
    pub fn resolve(&self, state: &ParserState) -> Option<usize> {
        let mut token = match self.source {
            Source::Stack => state.stack(self.index),
            Source::Buffer => state.input(self.index),
        }?;

        for dep in &self.deps {
            token = match *dep {
                Dep::Left(n) => left_dependent(state, token, n),
                Dep::Right(n) => right_dependent(state, token, n),
            }?;
        }

        Some(token)
    }
}

fn left_dependent(state: &ParserState, head: usize, n: usize) -> Option<usize> {
    (1..head)
        .filter(|&token| state.head(token) == Some(head))
        .nth(n)
}

fn right_dependent(state: &ParserState, head: usize, n: usize) -> Option<usize> {
    (head + 1..state.n_tokens() + 1)
        .rev()
        .filter(|&token| state.head(token) == Some(head))
        .nth(n)
}

/// Parse a whitespace-separated list of feature addresses.
pub fn parse_addresses(template: &str) -> Result<Vec<AddressedValue>> {
    let mut pairs = AddressParser::parse(Rule::addrs, template)
        .map_err(|e| format_err!("cannot parse feature addresses:\n{}", e))?;

    let mut addrs = Vec::new();
    for pair in pairs.next().expect("parser yields a top-level pair").into_inner() {
        match pair.as_rule() {
            Rule::addr => addrs.push(parse_addr(pair)?),
            Rule::EOI => (),
            rule => unreachable!("unexpected rule: {:?}", rule),
        }
    }

    Ok(addrs)
}

fn parse_addr(pair: Pair<Rule>) -> Result<AddressedValue> {
    let mut inner = pair.into_inner();

    let source = inner.next().expect("address without a source");
    let source = match source
        .into_inner()
        .next()
        .expect("source without a variant")
        .as_rule()
    {
        Rule::stack => Source::Stack,
        Rule::buffer => Source::Buffer,
        rule => unreachable!("unexpected source: {:?}", rule),
    };

    let index = parse_index(inner.next().expect("address without an index"))?;

    let mut deps = Vec::new();
    for dep in inner {
        let dep = dep.into_inner().next().expect("dependent without a variant");
        let rule = dep.as_rule();
        let index = parse_index(dep.into_inner().next().expect("dependent without an index"))?;
        deps.push(match rule {
            Rule::ldep => Dep::Left(index),
            Rule::rdep => Dep::Right(index),
            rule => unreachable!("unexpected dependent: {:?}", rule),
        });
    }

    Ok(AddressedValue {
        source,
        index,
        deps,
    })
}

fn parse_index(pair: Pair<Rule>) -> Result<usize> {
    pair.as_str()
        .parse()
        .map_err(|_| format_err!("feature address index too large: {}", pair.as_str()))
}

#[cfg(test)]
mod tests {
    use super::{parse_addresses, AddressedValue, Dep, Source};

    #[test]
    fn parses_plain_addresses() {
        let addrs = parse_addresses("stack(0) buffer(2)").unwrap();
        assert_eq!(
            addrs,
            vec![
                AddressedValue {
                    source: Source::Stack,
                    index: 0,
                    deps: vec![],
                },
                AddressedValue {
                    source: Source::Buffer,
                    index: 2,
                    deps: vec![],
                },
            ]
        );
    }

    #[test]
    fn parses_dependent_navigation() {
        let addrs = parse_addresses("stack(1).ldep(0).rdep(2)").unwrap();
        assert_eq!(
            addrs,
            vec![AddressedValue {
                source: Source::Stack,
                index: 1,
                deps: vec![Dep::Left(0), Dep::Right(2)],
            }]
        );
    }

    #[test]
    fn parses_the_empty_template() {
        assert_eq!(parse_addresses("").unwrap(), vec![]);
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(parse_addresses("stack(").is_err());
        assert!(parse_addresses("queue(0)").is_err());
        assert!(parse_addresses("stack(0).parent(1)").is_err());
        assert!(parse_addresses("stack(0) or so").is_err());
    }
}
