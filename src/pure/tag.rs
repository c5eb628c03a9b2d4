//! The tag matcher: pure predicates over a client's identifying strings and
//! window type, with AND-chains and top-level OR, per the matcher engine.

use bitflags::bitflags;
use regex::Regex;

bitflags! {
    /// Which fields of a client a [Matcher] consults.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MatchField: u8 {
        const NAME     = 0b0000_0001;
        const INSTANCE = 0b0000_0010;
        const CLASS    = 0b0000_0100;
        const ROLE     = 0b0000_1000;
        const TYPE     = 0b0001_0000;
    }
}

/// The minimal view of a client a matcher needs. Kept separate from
/// `core::registry::Client` so this module stays free of a `Registry`
/// dependency and is unit-testable in isolation.
#[derive(Debug, Clone, Default)]
pub struct MatchSubject {
    pub name: String,
    pub instance: String,
    pub class: String,
    pub role: String,
    /// The window type name (`normal`, `dialog`, ...), compared as a string
    /// against the matcher's regex when [MatchField::TYPE] is set.
    pub window_type: String,
}

/// A single predicate, optionally chained to another matcher via `and_chain`
/// to express `AND`. A list of top-level matchers (those not reached only
/// via another matcher's chain) expresses `OR`.
#[derive(Debug, Clone)]
pub struct Matcher {
    pub fields: MatchField,
    pub regex: Option<Regex>,
    pub and_chain: Option<Box<Matcher>>,
}

impl Matcher {
    /// Build a matcher against a single field with the given pattern.
    pub fn new(fields: MatchField, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            fields,
            regex: Some(Regex::new(pattern)?),
            and_chain: None,
        })
    }

    /// Chain another matcher that must also pass (`AND`).
    pub fn and(mut self, next: Matcher) -> Self {
        self.and_chain = Some(Box::new(next));
        self
    }

    /// A matcher with neither a regex nor the type flag set is ill-formed
    /// and never matches, per the matcher engine's edge case.
    fn is_well_formed(&self) -> bool {
        self.regex.is_some() || self.fields.contains(MatchField::TYPE)
    }

    fn field_matches(&self, subject: &MatchSubject) -> bool {
        if !self.is_well_formed() {
            return false;
        }

        let Some(re) = &self.regex else {
            return self.fields.contains(MatchField::TYPE);
        };

        let mut any_field_checked = false;
        let mut any_checked_pass = false;

        for (flag, value) in [
            (MatchField::NAME, &subject.name),
            (MatchField::INSTANCE, &subject.instance),
            (MatchField::CLASS, &subject.class),
            (MatchField::ROLE, &subject.role),
            (MatchField::TYPE, &subject.window_type),
        ] {
            if self.fields.contains(flag) {
                any_field_checked = true;
                any_checked_pass |= re.is_match(value);
            }
        }

        any_field_checked && any_checked_pass
    }

    /// Walk this matcher's AND-chain; every link must pass.
    fn chain_matches(&self, subject: &MatchSubject) -> bool {
        if !self.field_matches(subject) {
            return false;
        }
        match &self.and_chain {
            Some(next) => next.chain_matches(subject),
            None => true,
        }
    }
}

/// `check(tag, client)`: any top-level matcher whose AND-chain fully passes
/// makes the tag apply (top-level `OR`).
pub fn check(matchers: &[Matcher], subject: &MatchSubject) -> bool {
    matchers.iter().any(|m| m.chain_matches(subject))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn subject(instance: &str, class: &str) -> MatchSubject {
        MatchSubject {
            instance: instance.to_string(),
            class: class.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn single_field_match() {
        let m = Matcher::new(MatchField::INSTANCE, "^xterm$").unwrap();
        assert!(check(&[m.clone()], &subject("xterm", "XTerm")));
        assert!(!check(&[m], &subject("urxvt", "URxvt")));
    }

    #[test]
    fn and_chain_requires_every_link() {
        let inner = Matcher::new(MatchField::CLASS, "^XTerm$").unwrap();
        let outer = Matcher::new(MatchField::INSTANCE, "^xterm$")
            .unwrap()
            .and(inner);

        assert!(check(&[outer.clone()], &subject("xterm", "XTerm")));
        assert!(!check(&[outer], &subject("xterm", "URxvt")));
    }

    #[test]
    fn top_level_list_is_or() {
        let a = Matcher::new(MatchField::INSTANCE, "^xterm$").unwrap();
        let b = Matcher::new(MatchField::INSTANCE, "^urxvt$").unwrap();
        assert!(check(&[a, b], &subject("urxvt", "URxvt")));
    }

    #[test]
    fn ill_formed_matcher_never_matches() {
        let m = Matcher {
            fields: MatchField::INSTANCE,
            regex: None,
            and_chain: None,
        };
        assert!(!check(&[m], &subject("xterm", "XTerm")));
    }

    #[test]
    fn multi_field_matcher_is_or_across_fields() {
        let m = Matcher::new(MatchField::NAME | MatchField::INSTANCE, "^xterm$").unwrap();
        let s = MatchSubject {
            name: "xterm".into(),
            instance: "urxvt".into(),
            ..Default::default()
        };
        assert!(check(&[m], &s));
    }

    #[test]
    fn multi_field_matcher_fails_when_no_field_matches() {
        let m = Matcher::new(MatchField::NAME | MatchField::INSTANCE, "^xterm$").unwrap();
        let s = subject("urxvt", "URxvt");
        assert!(!check(&[m], &s));
    }

    #[test]
    fn retag_is_deterministic() {
        let m = Matcher::new(MatchField::INSTANCE, "^xterm$").unwrap();
        let s = subject("xterm", "XTerm");
        let first = check(&[m.clone()], &s);
        let second = check(&[m], &s);
        assert_eq!(first, second);
    }

    #[quickcheck]
    fn a_single_field_matcher_against_a_literal_pattern_only_matches_that_field(
        name: String,
        instance: String,
    ) -> bool {
        let pattern = regex::escape(&instance);
        let Ok(m) = Matcher::new(MatchField::INSTANCE, &format!("^{pattern}$")) else {
            return true;
        };
        let s = MatchSubject {
            name,
            instance: instance.clone(),
            ..Default::default()
        };
        check(&[m], &s) == true
    }

    #[quickcheck]
    fn multi_field_matcher_matches_iff_at_least_one_selected_field_matches(
        name: String,
        instance: String,
        class: String,
    ) -> bool {
        let pattern = regex::escape(&instance);
        let Ok(re) = Regex::new(&format!("^{pattern}$")) else {
            return true;
        };
        let m = Matcher {
            fields: MatchField::NAME | MatchField::INSTANCE | MatchField::CLASS,
            regex: Some(re.clone()),
            and_chain: None,
        };
        let s = MatchSubject {
            name: name.clone(),
            instance: instance.clone(),
            class: class.clone(),
            ..Default::default()
        };
        let expected = re.is_match(&name) || re.is_match(&instance) || re.is_match(&class);
        check(&[m], &s) == expected
    }
}
