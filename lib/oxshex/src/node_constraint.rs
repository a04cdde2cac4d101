//! Node constraint checks: node kind, datatype, facets and value sets.
//!
//! Each component of a [`NodeConstraint`] is checked on its own and every failing component
//! is reported, so a node failing both its datatype and a pattern gets two diagnostics.

use crate::error::ShexValidationError;
use crate::limits::ValidationLimitError;
use crate::model::{NodeConstraint, NumericFacet, StringFacet, ValueSetValue};
use crate::result::DiagnosticKind;
use oxrdf::{Literal, Term};
use oxsdatatypes::{
    Boolean, Date, DateTime, DayTimeDuration, Decimal, Double, Duration, Float, GDay, GMonth,
    GMonthDay, GYear, GYearMonth, Integer, Time, YearMonthDuration,
};
use regex::{Regex, RegexBuilder};
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::str::FromStr;

/// A failing node constraint component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ComponentFailure {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl ComponentFailure {
    fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Compiles a pattern facet with its `i`, `m`, `s` and `x` flags.
pub(crate) fn compile_pattern(pattern: &str, flags: Option<&str>) -> Result<Regex, String> {
    let mut builder = RegexBuilder::new(pattern);
    for flag in flags.unwrap_or_default().chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            _ => return Err(format!("unsupported regex flag '{flag}'")),
        };
    }
    builder.build().map_err(|e| e.to_string())
}

/// Compiled pattern facets of a validation run.
#[derive(Debug)]
pub(crate) struct RegexCache {
    max_length: usize,
    cache: FxHashMap<(String, Option<String>), Regex>,
}

impl RegexCache {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            cache: FxHashMap::default(),
        }
    }

    pub fn get(
        &mut self,
        pattern: &str,
        flags: Option<&str>,
    ) -> Result<&Regex, ShexValidationError> {
        if pattern.len() > self.max_length {
            return Err(ValidationLimitError::RegexTooLong {
                length: pattern.len(),
                limit: self.max_length,
            }
            .into());
        }
        let key = (pattern.to_owned(), flags.map(ToOwned::to_owned));
        if !self.cache.contains_key(&key) {
            // Patterns are checked when the schema is analyzed so this only fails on
            // schemas built around the analyzer.
            let regex = compile_pattern(pattern, flags).map_err(|e| {
                ShexValidationError::internal(format!("Invalid regex pattern '{pattern}': {e}"))
            })?;
            self.cache.insert(key.clone(), regex);
        }
        self.cache
            .get(&key)
            .ok_or_else(|| ShexValidationError::internal("regex cache miss"))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.cache.len()
    }
}

/// Checks every component of `constraint` on `node`.
pub(crate) fn check_node_constraint(
    node: &Term,
    constraint: &NodeConstraint,
    regexes: &mut RegexCache,
) -> Result<Vec<ComponentFailure>, ShexValidationError> {
    let mut failures = Vec::new();

    if let Some(node_kind) = &constraint.node_kind {
        if !node_kind.matches(node) {
            failures.push(ComponentFailure::new(
                DiagnosticKind::NodeKind,
                format!("Node {node} is not of kind {node_kind}"),
            ));
        }
    }

    if let Some(datatype) = &constraint.datatype {
        match node {
            Term::Literal(literal) if literal.datatype() == datatype.as_ref() => {
                if !is_valid_lexical_form(literal) {
                    failures.push(ComponentFailure::new(
                        DiagnosticKind::Datatype,
                        format!(
                            "'{}' is not a valid lexical form of {datatype}",
                            literal.value()
                        ),
                    ));
                }
            }
            Term::Literal(literal) => failures.push(ComponentFailure::new(
                DiagnosticKind::Datatype,
                format!(
                    "Literal datatype {} does not match expected {datatype}",
                    literal.datatype()
                ),
            )),
            _ => failures.push(ComponentFailure::new(
                DiagnosticKind::Datatype,
                format!("Datatype {datatype} requires a literal, got {node}"),
            )),
        }
    }

    for facet in &constraint.string_facets {
        check_string_facet(node, facet, regexes, &mut failures)?;
    }

    for facet in &constraint.numeric_facets {
        if let Some(failure) = check_numeric_facet(node, facet) {
            failures.push(failure);
        }
    }

    if !constraint.values.is_empty() && !constraint.values.iter().any(|v| matches_value(node, v)) {
        failures.push(ComponentFailure::new(
            DiagnosticKind::Values,
            format!("{node} is not in the allowed value set"),
        ));
    }

    Ok(failures)
}

/// The string that string facets look at: a literal lexical form or an IRI.
fn facet_string(term: &Term) -> Option<&str> {
    match term {
        Term::NamedNode(n) => Some(n.as_str()),
        Term::Literal(l) => Some(l.value()),
        _ => None,
    }
}

fn check_string_facet(
    node: &Term,
    facet: &StringFacet,
    regexes: &mut RegexCache,
    failures: &mut Vec<ComponentFailure>,
) -> Result<(), ShexValidationError> {
    let (kind, bound) = match facet {
        StringFacet::Length(n) => (DiagnosticKind::Length, Some(*n)),
        StringFacet::MinLength(n) => (DiagnosticKind::MinLength, Some(*n)),
        StringFacet::MaxLength(n) => (DiagnosticKind::MaxLength, Some(*n)),
        StringFacet::Pattern { .. } => (DiagnosticKind::Pattern, None),
    };
    let Some(value) = facet_string(node) else {
        failures.push(ComponentFailure::new(
            kind,
            format!("String facets do not apply to {node}"),
        ));
        return Ok(());
    };
    let length = value.chars().count();
    let failure = match (facet, bound) {
        (StringFacet::Length(_), Some(n)) if length != n => {
            Some(format!("String length {length} is not {n}"))
        }
        (StringFacet::MinLength(_), Some(n)) if length < n => {
            Some(format!("String length {length} is less than minimum {n}"))
        }
        (StringFacet::MaxLength(_), Some(n)) if length > n => {
            Some(format!("String length {length} exceeds maximum {n}"))
        }
        (StringFacet::Pattern { pattern, flags }, _) => {
            let regex = regexes.get(pattern, flags.as_deref())?;
            (!regex.is_match(value)).then(|| format!("'{value}' does not match pattern '{pattern}'"))
        }
        _ => None,
    };
    if let Some(message) = failure {
        failures.push(ComponentFailure::new(kind, message));
    }
    Ok(())
}

/// A numeric literal value, decimals kept exact.
#[derive(Debug, Clone, Copy)]
enum Numeric {
    Decimal(Decimal),
    Double(Double),
}

impl Numeric {
    fn parse(literal: &Literal) -> Option<Self> {
        let value = literal.value();
        Some(match literal.datatype().as_str() {
            "http://www.w3.org/2001/XMLSchema#decimal" => Self::Decimal(value.parse().ok()?),
            "http://www.w3.org/2001/XMLSchema#float" => {
                Self::Double(Float::from_str(value).ok()?.into())
            }
            "http://www.w3.org/2001/XMLSchema#double" => Self::Double(value.parse().ok()?),
            datatype if integer_range(datatype).is_some() => {
                Self::Decimal(parse_integer(value, datatype)?.into())
            }
            _ => return None,
        })
    }

    fn compare(self, other: Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Decimal(a), Self::Decimal(b)) => Some(a.cmp(&b)),
            (a, b) => a.to_double().partial_cmp(&b.to_double()),
        }
    }

    fn to_double(self) -> Double {
        match self {
            Self::Decimal(d) => d.into(),
            Self::Double(d) => d,
        }
    }
}

fn check_numeric_facet(node: &Term, facet: &NumericFacet) -> Option<ComponentFailure> {
    let kind = match facet {
        NumericFacet::MinInclusive(_) => DiagnosticKind::MinInclusive,
        NumericFacet::MinExclusive(_) => DiagnosticKind::MinExclusive,
        NumericFacet::MaxInclusive(_) => DiagnosticKind::MaxInclusive,
        NumericFacet::MaxExclusive(_) => DiagnosticKind::MaxExclusive,
        NumericFacet::TotalDigits(_) => DiagnosticKind::TotalDigits,
        NumericFacet::FractionDigits(_) => DiagnosticKind::FractionDigits,
    };
    let Term::Literal(literal) = node else {
        return Some(ComponentFailure::new(
            kind,
            format!("Numeric facets require a literal, got {node}"),
        ));
    };
    let Some(value) = Numeric::parse(literal) else {
        return Some(ComponentFailure::new(
            kind,
            format!("{literal} is not a valid numeric literal"),
        ));
    };
    let (bound, accepted): (&Literal, fn(Ordering) -> bool) = match facet {
        NumericFacet::MinInclusive(b) => (b, Ordering::is_ge),
        NumericFacet::MinExclusive(b) => (b, Ordering::is_gt),
        NumericFacet::MaxInclusive(b) => (b, Ordering::is_le),
        NumericFacet::MaxExclusive(b) => (b, Ordering::is_lt),
        NumericFacet::TotalDigits(max) | NumericFacet::FractionDigits(max) => {
            let Some((total, fraction)) = decimal_digits(literal) else {
                return Some(ComponentFailure::new(
                    kind,
                    format!("Digit facets only apply to decimal values, got {literal}"),
                ));
            };
            let (count, what) = if matches!(facet, NumericFacet::TotalDigits(_)) {
                (total, "digits")
            } else {
                (fraction, "fraction digits")
            };
            return (count > *max).then(|| {
                ComponentFailure::new(kind, format!("{literal} has {count} {what}, maximum is {max}"))
            });
        }
    };
    let holds = Numeric::parse(bound)
        .and_then(|bound| value.compare(bound))
        .is_some_and(accepted);
    (!holds).then(|| {
        ComponentFailure::new(
            kind,
            format!("{literal} does not satisfy {kind} {}", bound.value()),
        )
    })
}

/// Total and fraction digit counts of the canonical form of a decimal-derived literal.
fn decimal_digits(literal: &Literal) -> Option<(u32, u32)> {
    let datatype = literal.datatype().as_str();
    let value = literal.value();
    if datatype == "http://www.w3.org/2001/XMLSchema#decimal" {
        Decimal::from_str(value).ok()?;
    } else {
        parse_integer(value, datatype)?;
    }
    let unsigned = value.trim_start_matches(['+', '-']);
    let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let integer = integer.trim_start_matches('0');
    let fraction = fraction.trim_end_matches('0');
    let total = (integer.len() + fraction.len()).max(1);
    Some((
        u32::try_from(total).ok()?,
        u32::try_from(fraction.len()).ok()?,
    ))
}

/// The value range of the integer-derived XSD datatypes.
fn integer_range(datatype: &str) -> Option<(Option<i64>, Option<i64>)> {
    Some(match datatype {
        "http://www.w3.org/2001/XMLSchema#integer" | "http://www.w3.org/2001/XMLSchema#long" => {
            (None, None)
        }
        "http://www.w3.org/2001/XMLSchema#int" => {
            (Some(i32::MIN.into()), Some(i32::MAX.into()))
        }
        "http://www.w3.org/2001/XMLSchema#short" => {
            (Some(i16::MIN.into()), Some(i16::MAX.into()))
        }
        "http://www.w3.org/2001/XMLSchema#byte" => (Some(i8::MIN.into()), Some(i8::MAX.into())),
        "http://www.w3.org/2001/XMLSchema#unsignedLong"
        | "http://www.w3.org/2001/XMLSchema#nonNegativeInteger" => (Some(0), None),
        "http://www.w3.org/2001/XMLSchema#unsignedInt" => (Some(0), Some(u32::MAX.into())),
        "http://www.w3.org/2001/XMLSchema#unsignedShort" => (Some(0), Some(u16::MAX.into())),
        "http://www.w3.org/2001/XMLSchema#unsignedByte" => (Some(0), Some(u8::MAX.into())),
        "http://www.w3.org/2001/XMLSchema#positiveInteger" => (Some(1), None),
        "http://www.w3.org/2001/XMLSchema#negativeInteger" => (None, Some(-1)),
        "http://www.w3.org/2001/XMLSchema#nonPositiveInteger" => (None, Some(0)),
        _ => return None,
    })
}

fn parse_integer(value: &str, datatype: &str) -> Option<Integer> {
    let (min, max) = integer_range(datatype)?;
    let integer = Integer::from_str(value).ok()?;
    let raw = i64::from(integer);
    if min.is_some_and(|min| raw < min) || max.is_some_and(|max| raw > max) {
        return None;
    }
    Some(integer)
}

/// Lexical validity for the XSD datatypes; other datatypes are always valid.
fn is_valid_lexical_form(literal: &Literal) -> bool {
    let value = literal.value();
    match literal.datatype().as_str() {
        "http://www.w3.org/2001/XMLSchema#boolean" => Boolean::from_str(value).is_ok(),
        "http://www.w3.org/2001/XMLSchema#decimal" => Decimal::from_str(value).is_ok(),
        "http://www.w3.org/2001/XMLSchema#float" => Float::from_str(value).is_ok(),
        "http://www.w3.org/2001/XMLSchema#double" => Double::from_str(value).is_ok(),
        "http://www.w3.org/2001/XMLSchema#dateTime"
        | "http://www.w3.org/2001/XMLSchema#dateTimeStamp" => DateTime::from_str(value).is_ok(),
        "http://www.w3.org/2001/XMLSchema#date" => Date::from_str(value).is_ok(),
        "http://www.w3.org/2001/XMLSchema#time" => Time::from_str(value).is_ok(),
        "http://www.w3.org/2001/XMLSchema#duration" => Duration::from_str(value).is_ok(),
        "http://www.w3.org/2001/XMLSchema#dayTimeDuration" => {
            DayTimeDuration::from_str(value).is_ok()
        }
        "http://www.w3.org/2001/XMLSchema#yearMonthDuration" => {
            YearMonthDuration::from_str(value).is_ok()
        }
        "http://www.w3.org/2001/XMLSchema#gYear" => GYear::from_str(value).is_ok(),
        "http://www.w3.org/2001/XMLSchema#gYearMonth" => GYearMonth::from_str(value).is_ok(),
        "http://www.w3.org/2001/XMLSchema#gMonth" => GMonth::from_str(value).is_ok(),
        "http://www.w3.org/2001/XMLSchema#gMonthDay" => GMonthDay::from_str(value).is_ok(),
        "http://www.w3.org/2001/XMLSchema#gDay" => GDay::from_str(value).is_ok(),
        datatype if integer_range(datatype).is_some() => parse_integer(value, datatype).is_some(),
        _ => true,
    }
}

/// Returns true if `term` is matched by a value set entry.
pub(crate) fn matches_value(term: &Term, value: &ValueSetValue) -> bool {
    match value {
        ValueSetValue::ObjectValue(expected) => term == expected,
        ValueSetValue::IriStem(stem) => iri_has_stem(term, stem),
        ValueSetValue::IriStemRange { stem, exclusions } => {
            iri_has_stem(term, stem) && !is_excluded(term, exclusions)
        }
        ValueSetValue::LiteralStem(stem) => literal_has_stem(term, stem),
        ValueSetValue::LiteralStemRange { stem, exclusions } => {
            literal_has_stem(term, stem) && !is_excluded(term, exclusions)
        }
        ValueSetValue::Language(tag) => {
            language_of(term).is_some_and(|language| language.eq_ignore_ascii_case(tag))
        }
        ValueSetValue::LanguageStem(stem) => {
            language_of(term).is_some_and(|language| language_has_stem(language, stem))
        }
        ValueSetValue::LanguageStemRange { stem, exclusions } => {
            language_of(term).is_some_and(|language| language_has_stem(language, stem))
                && !is_excluded(term, exclusions)
        }
    }
}

fn is_excluded(term: &Term, exclusions: &[ValueSetValue]) -> bool {
    exclusions.iter().any(|exclusion| matches_value(term, exclusion))
}

fn iri_has_stem(term: &Term, stem: &str) -> bool {
    matches!(term, Term::NamedNode(n) if n.as_str().starts_with(stem))
}

fn literal_has_stem(term: &Term, stem: &str) -> bool {
    matches!(term, Term::Literal(l) if l.value().starts_with(stem))
}

fn language_of(term: &Term) -> Option<&str> {
    match term {
        Term::Literal(l) => l.language(),
        _ => None,
    }
}

/// Language range matching: the empty stem matches any tag, otherwise the stem must be the
/// tag or one of its prefixes ending on a subtag boundary.
fn language_has_stem(language: &str, stem: &str) -> bool {
    if stem.is_empty() {
        return true;
    }
    if language.len() < stem.len() || !language.is_char_boundary(stem.len()) {
        return false;
    }
    let (head, rest) = language.split_at(stem.len());
    head.eq_ignore_ascii_case(stem) && (rest.is_empty() || rest.starts_with('-'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeKind;
    use oxrdf::vocab::xsd;
    use oxrdf::{BlankNode, NamedNode};

    fn check(node: &Term, nc: &NodeConstraint) -> Vec<ComponentFailure> {
        check_node_constraint(node, nc, &mut RegexCache::new(1000)).unwrap()
    }

    fn typed(value: &str, datatype: oxrdf::NamedNodeRef<'_>) -> Term {
        Literal::new_typed_literal(value, datatype).into()
    }

    #[test]
    fn test_node_kind() {
        let nc = NodeConstraint::with_node_kind(NodeKind::Iri);
        assert!(check(&NamedNode::new_unchecked("http://example.org/x").into(), &nc).is_empty());
        let failures = check(&BlankNode::default().into(), &nc);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].kind, DiagnosticKind::NodeKind);
    }

    #[test]
    fn test_datatype_and_lexical_form() {
        let nc = NodeConstraint::with_datatype(xsd::INTEGER.into_owned());
        assert!(check(&typed("42", xsd::INTEGER), &nc).is_empty());
        assert_eq!(check(&typed("4.2", xsd::INTEGER), &nc).len(), 1);
        assert_eq!(check(&typed("42", xsd::DECIMAL), &nc).len(), 1);
        assert_eq!(
            check(&NamedNode::new_unchecked("http://example.org/x").into(), &nc).len(),
            1
        );

        let nc = NodeConstraint::with_datatype(xsd::BYTE.into_owned());
        assert!(check(&typed("127", xsd::BYTE), &nc).is_empty());
        assert_eq!(check(&typed("128", xsd::BYTE), &nc).len(), 1);

        let nc = NodeConstraint::with_datatype(xsd::DATE.into_owned());
        assert!(check(&typed("2024-02-29", xsd::DATE), &nc).is_empty());
        assert_eq!(check(&typed("2023-13-01", xsd::DATE), &nc).len(), 1);
    }

    #[test]
    fn test_string_facets() {
        let nc = NodeConstraint::new()
            .with_string_facet(StringFacet::MinLength(2))
            .with_string_facet(StringFacet::MaxLength(4));
        assert!(check(&Literal::new_simple_literal("abc").into(), &nc).is_empty());
        let failures = check(&Literal::new_simple_literal("abcdef").into(), &nc);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].kind, DiagnosticKind::MaxLength);

        let nc = NodeConstraint::new().with_string_facet(StringFacet::Length(3));
        assert!(check(&Literal::new_simple_literal("\u{e9}t\u{e9}").into(), &nc).is_empty());
        assert_eq!(check(&BlankNode::default().into(), &nc).len(), 1);
    }

    #[test]
    fn test_pattern_with_flags() {
        let nc = NodeConstraint::new().with_string_facet(StringFacet::Pattern {
            pattern: "^ab+c$".into(),
            flags: Some("i".into()),
        });
        let mut regexes = RegexCache::new(1000);
        let node: Term = Literal::new_simple_literal("ABBC").into();
        assert!(check_node_constraint(&node, &nc, &mut regexes).unwrap().is_empty());
        let node: Term = Literal::new_simple_literal("ac").into();
        assert_eq!(check_node_constraint(&node, &nc, &mut regexes).unwrap().len(), 1);
        assert_eq!(regexes.len(), 1);
    }

    #[test]
    fn test_pattern_length_limit() {
        let nc = NodeConstraint::new().with_string_facet(StringFacet::Pattern {
            pattern: "a{1,3}b".into(),
            flags: None,
        });
        let node: Term = Literal::new_simple_literal("ab").into();
        assert!(matches!(
            check_node_constraint(&node, &nc, &mut RegexCache::new(3)),
            Err(ShexValidationError::Limit(ValidationLimitError::RegexTooLong { .. }))
        ));
    }

    #[test]
    fn test_compile_pattern_rejects_unknown_flag() {
        assert!(compile_pattern("a", Some("q")).is_err());
        assert!(compile_pattern("a b", Some("x")).unwrap().is_match("ab"));
    }

    #[test]
    fn test_numeric_range() {
        let nc = NodeConstraint::new()
            .with_numeric_facet(NumericFacet::MinInclusive(Literal::from(1)))
            .with_numeric_facet(NumericFacet::MaxExclusive(Literal::from(10)));
        assert!(check(&typed("1", xsd::INTEGER), &nc).is_empty());
        assert!(check(&typed("9.5", xsd::DECIMAL), &nc).is_empty());
        assert!(check(&typed("2.5e0", xsd::DOUBLE), &nc).is_empty());
        let failures = check(&typed("10", xsd::INTEGER), &nc);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].kind, DiagnosticKind::MaxExclusive);
        assert_eq!(check(&Literal::new_simple_literal("5").into(), &nc).len(), 2);
    }

    #[test]
    fn test_digit_facets() {
        let nc = NodeConstraint::new()
            .with_numeric_facet(NumericFacet::TotalDigits(4))
            .with_numeric_facet(NumericFacet::FractionDigits(2));
        assert!(check(&typed("12.30", xsd::DECIMAL), &nc).is_empty());
        assert!(check(&typed("0012", xsd::INTEGER), &nc).is_empty());
        let failures = check(&typed("1.234", xsd::DECIMAL), &nc);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].kind, DiagnosticKind::FractionDigits);
        assert_eq!(check(&typed("12345", xsd::INTEGER), &nc).len(), 1);
        assert_eq!(check(&typed("1.5", xsd::DOUBLE), &nc).len(), 2);
    }

    #[test]
    fn test_value_set_stems() {
        let person: Term = NamedNode::new_unchecked("http://example.org/person/1").into();
        let admin: Term = NamedNode::new_unchecked("http://example.org/person/admin").into();
        let range = ValueSetValue::IriStemRange {
            stem: "http://example.org/person/".into(),
            exclusions: vec![ValueSetValue::ObjectValue(admin.clone())],
        };
        assert!(matches_value(&person, &range));
        assert!(!matches_value(&admin, &range));

        let wildcard = ValueSetValue::IriStemRange {
            stem: String::new(),
            exclusions: vec![ValueSetValue::iri_stem("http://example.org/person/")],
        };
        assert!(!matches_value(&person, &wildcard));
        assert!(matches_value(
            &NamedNode::new_unchecked("http://other.org/x").into(),
            &wildcard
        ));
        assert!(!matches_value(&Literal::new_simple_literal("x").into(), &wildcard));
    }

    #[test]
    fn test_language_matching() {
        let en_us: Term = Literal::new_language_tagged_literal_unchecked("color", "en-us").into();
        let eng: Term = Literal::new_language_tagged_literal_unchecked("colour", "eng").into();
        assert!(matches_value(&en_us, &ValueSetValue::language_stem("EN")));
        assert!(!matches_value(&eng, &ValueSetValue::language_stem("en")));
        assert!(matches_value(&en_us, &ValueSetValue::Language("en-US".into())));
        assert!(!matches_value(&en_us, &ValueSetValue::Language("en".into())));
        assert!(matches_value(&eng, &ValueSetValue::language_stem("")));
        assert!(!matches_value(
            &Literal::new_simple_literal("plain").into(),
            &ValueSetValue::language_stem("")
        ));
        let range = ValueSetValue::LanguageStemRange {
            stem: "en".into(),
            exclusions: vec![ValueSetValue::language_stem("en-us")],
        };
        assert!(!matches_value(&en_us, &range));
    }

    #[test]
    fn test_every_failing_component_is_reported() {
        let mut nc = NodeConstraint::with_datatype(xsd::STRING.into_owned())
            .with_string_facet(StringFacet::MinLength(5));
        nc.add_value(ValueSetValue::literal_stem("zz"));
        let failures = check(&Literal::new_simple_literal("abc").into(), &nc);
        let kinds: Vec<_> = failures.iter().map(|f| f.kind).collect();
        assert_eq!(kinds, [DiagnosticKind::MinLength, DiagnosticKind::Values]);
    }
}
