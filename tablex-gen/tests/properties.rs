use proptest::prelude::*;
use std::collections::BTreeSet;
use tablex::LeafClass;
use tablex_gen::alex::{CharClass, Regex, atomize, parse_regex};

fn class_strategy() -> impl Strategy<Value = CharClass> {
    let leaf = prop_oneof![
        prop::collection::btree_set(prop::char::range('a', 'j'), 0..4).prop_map(CharClass::explicit),
        (prop::char::range('a', 'j'), prop::char::range('a', 'j'))
            .prop_map(|(a, b)| CharClass::range(a.min(b), a.max(b))),
    ];
    leaf.prop_recursive(3, 16, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a.union(b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a.intersect(b)),
            inner.prop_map(CharClass::complement),
        ]
    })
}

/// Random expressions paired with the same expression in `regex` syntax.
fn regex_strategy() -> impl Strategy<Value = (Regex, String)> {
    let leaf = prop_oneof![
        prop::sample::select(vec!['a', 'b', 'c']).prop_map(|c| (Regex::char(c), c.to_string())),
        Just((Regex::set(CharClass::range('a', 'b')), "[a-b]".to_string())),
        Just((Regex::none_of("a"), "[^a]".to_string())),
    ];
    leaf.prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone())
                .prop_map(|((a, sa), (b, sb))| (a.concat(b), format!("(?:{})(?:{})", sa, sb))),
            (inner.clone(), inner.clone())
                .prop_map(|((a, sa), (b, sb))| (a.union(b), format!("(?:{}|{})", sa, sb))),
            inner.prop_map(|(a, sa)| (a.star(), format!("(?:{})*", sa))),
        ]
    })
}

/// Longest prefix of `input` fully matched by `oracle`.
fn oracle_longest<'a>(oracle: &regex::Regex, input: &'a str) -> Option<&'a str> {
    input
        .char_indices()
        .map(|(i, _)| i)
        .chain([input.len()])
        .rev()
        .map(|end| &input[..end])
        .find(|prefix| oracle.is_match(prefix))
}

fn anchored(pattern: &str) -> regex::Regex {
    regex::Regex::new(&format!("^(?s:{})$", pattern)).unwrap()
}

proptest! {
    #[test]
    fn atoms_partition_the_classes(classes in prop::collection::vec(class_strategy(), 0..5)) {
        let atomization = atomize(&classes);
        let atoms = &atomization.atoms;
        prop_assert_eq!(atomization.class_atoms.len(), classes.len());
        prop_assert!(matches!(atoms.iter().last().map(|a| &a.class), Some(LeafClass::Others)));
        for c in 'a'..='l' {
            let containing: Vec<usize> = atoms
                .iter()
                .enumerate()
                .filter(|(_, a)| a.class != LeafClass::Others && a.class.contains(c))
                .map(|(i, _)| i)
                .collect();
            prop_assert!(containing.len() <= 1, "{:?} in atoms {:?}", c, containing);
            let expected = containing.first().copied().unwrap_or(atoms.others());
            prop_assert_eq!(atoms.classify(c), expected);
            for (class, set) in classes.iter().zip(&atomization.class_atoms) {
                prop_assert_eq!(class.contains(c), set.contains(&atoms.classify(c)), "{} on {:?}", class, c);
            }
        }
    }

    #[test]
    fn dfa_is_deterministic((re, _) in regex_strategy()) {
        let pattern = re.compile();
        let dfa = pattern.dfa();
        let mut seen = BTreeSet::new();
        for edge in dfa.edges() {
            prop_assert!(seen.insert((edge.source, edge.atom)));
            prop_assert!(edge.target < dfa.nodes().len());
            prop_assert!(edge.atom < pattern.atoms().len());
        }
    }

    #[test]
    fn matches_like_the_regex_crate((re, source) in regex_strategy(), input in "[abcd]{0,8}") {
        let pattern = re.compile();
        let oracle = anchored(&source);
        prop_assert_eq!(pattern.is_match(&input), oracle.is_match(&input), "{} on {:?}", source, input);
        prop_assert_eq!(pattern.longest_match(&input), oracle_longest(&oracle, &input), "{} on {:?}", source, input);
    }

    #[test]
    fn textual_syntax_like_the_regex_crate(
        index in 0..SAMPLES.len(),
        input in "[abcxyzw.0-9-]{0,8}",
    ) {
        let source = SAMPLES[index];
        let pattern = parse_regex(source).unwrap().compile();
        let oracle = anchored(source);
        prop_assert_eq!(pattern.is_match(&input), oracle.is_match(&input), "{} on {:?}", source, input);
        prop_assert_eq!(pattern.longest_match(&input), oracle_longest(&oracle, &input), "{} on {:?}", source, input);
    }
}

const SAMPLES: &[&str] = &[
    "a|ab",
    "(a|b)*abb",
    "[a-c]+x?",
    "[^b]*",
    "a.c",
    "(ab|a)(bc|c)",
    "\\.[0-9]+",
    "x(y|z)*w+",
    "",
    "[-a]b",
    "-?[0-9]+(\\.[0-9]*)?",
    "(x|y|)z",
];

#[test]
fn longest_match_of_union() {
    let p = parse_regex("a|ab").unwrap().compile();
    assert_eq!(p.longest_match("abc"), Some("ab"));
}
