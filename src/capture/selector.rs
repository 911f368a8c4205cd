//! Small CSS-like selectors: `tag.class[attr][attr="v"][attr*="v"]`,
//! optionally chained with descendant combinators (whitespace).

use crate::errors::{AppError, AppResult};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Read access to an element, enough to evaluate a selector.
pub trait ElementView {
    fn tag(&self) -> &str;
    fn attr(&self, name: &str) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrMatch {
    Present,
    Equals(String),
    Contains(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Compound {
    tag: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, AttrMatch)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    // left to right; every step is a descendant of the previous one
    chain: Vec<Compound>,
}

fn compound_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<tag>[A-Za-z][A-Za-z0-9-]*|\*)?(?P<rest>.*)$").expect("valid regex")
    })
}

fn part_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"\.(?P<class>[A-Za-z0-9_-]+)|\[\s*(?P<name>[A-Za-z0-9_:-]+)\s*(?:(?P<op>\*?=)\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<bare>[A-Za-z0-9_-]+))\s*)?\]"#,
        )
        .expect("valid regex")
    })
}

/// Split on whitespace that is not inside `[...]`.
fn split_steps(s: &str) -> Vec<&str> {
    let mut steps = Vec::new();
    let mut depth = 0usize;
    let mut start = None;

    for (i, ch) in s.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                if let Some(st) = start.take() {
                    steps.push(&s[st..i]);
                }
                continue;
            }
            _ => {}
        }
        if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(st) = start {
        steps.push(&s[st..]);
    }
    steps
}

fn parse_compound(step: &str, source: &str) -> AppResult<Compound> {
    let invalid = || AppError::InvalidSelector(source.to_string());

    let caps = compound_re().captures(step).ok_or_else(invalid)?;
    let mut compound = Compound {
        tag: caps
            .name("tag")
            .map(|m| m.as_str().to_ascii_lowercase())
            .filter(|t| t != "*"),
        ..Compound::default()
    };

    let rest = caps.name("rest").map(|m| m.as_str()).unwrap_or("");
    let mut pos = 0;
    for m in part_re().captures_iter(rest) {
        let whole = m.get(0).ok_or_else(invalid)?;
        if whole.start() != pos {
            return Err(invalid());
        }
        pos = whole.end();

        if let Some(class) = m.name("class") {
            compound.classes.push(class.as_str().to_string());
            continue;
        }

        let name = m.name("name").ok_or_else(invalid)?.as_str().to_ascii_lowercase();
        let value = m
            .name("dq")
            .or_else(|| m.name("sq"))
            .or_else(|| m.name("bare"))
            .map(|v| v.as_str().to_string());

        let matcher = match (m.name("op").map(|o| o.as_str()), value) {
            (None, _) => AttrMatch::Present,
            (Some("="), Some(v)) => AttrMatch::Equals(v),
            (Some("*="), Some(v)) => AttrMatch::Contains(v),
            _ => return Err(invalid()),
        };
        compound.attrs.push((name, matcher));
    }

    if pos != rest.len() {
        return Err(invalid());
    }
    if compound.tag.is_none() && compound.classes.is_empty() && compound.attrs.is_empty() {
        // a bare "*" is allowed, an empty step is not
        if !step.starts_with('*') {
            return Err(invalid());
        }
    }

    Ok(compound)
}

impl Compound {
    fn matches<E: ElementView + ?Sized>(&self, el: &E) -> bool {
        if let Some(tag) = &self.tag
            && !el.tag().eq_ignore_ascii_case(tag)
        {
            return false;
        }

        if !self.classes.is_empty() {
            let classes = el.attr("class").unwrap_or("");
            if !self
                .classes
                .iter()
                .all(|c| classes.split_whitespace().any(|have| have == c))
            {
                return false;
            }
        }

        self.attrs.iter().all(|(name, m)| match (el.attr(name), m) {
            (None, _) => false,
            (Some(_), AttrMatch::Present) => true,
            (Some(v), AttrMatch::Equals(want)) => v == want,
            (Some(v), AttrMatch::Contains(want)) => !want.is_empty() && v.contains(want.as_str()),
        })
    }
}

impl Selector {
    pub fn parse(source: &str) -> AppResult<Self> {
        let steps = split_steps(source.trim());
        if steps.is_empty() {
            return Err(AppError::InvalidSelector(source.to_string()));
        }

        let chain = steps
            .into_iter()
            .map(|s| parse_compound(s, source))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            source: source.trim().to_string(),
            chain,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Does `el` match, given its ancestors from the nearest outward?
    pub fn matches<'a, E, I>(&self, el: &E, ancestors: I) -> bool
    where
        E: ElementView + ?Sized + 'a,
        I: IntoIterator<Item = &'a E>,
    {
        let Some((last, outer)) = self.chain.split_last() else {
            return false;
        };
        if !last.matches(el) {
            return false;
        }

        // descendant combinators only: greedy right-to-left matching is exact
        let mut pending = outer.iter().rev().peekable();
        for anc in ancestors {
            match pending.peek() {
                Some(step) if step.matches(anc) => {
                    pending.next();
                }
                Some(_) => {}
                None => break,
            }
        }
        pending.peek().is_none()
    }
}

impl FromStr for Selector {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
