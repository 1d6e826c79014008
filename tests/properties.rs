//! Property tests for training, encoding and decoding.

use bytebpe::{
    BPEEncoder, FIRST_MERGE_ID, MergeRule, RuleTable, Token, Trainer, TrainerConfig,
    build_vocabulary, decode, encode, train,
};
use proptest::{prelude::*, sample::Index};

// ── Strategies ──────────────────────────────────────────────────────────────

/// English-ish text that exercises every split category.
fn arb_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("the".to_string()),
            Just(" The".to_string()),
            Just("don't".to_string()),
            Just(" 2024".to_string()),
            Just("!!".to_string()),
            Just("\n".to_string()),
            Just("  ".to_string()),
            Just("naïve".to_string()),
            Just("日本".to_string()),
            "[a-z]{1,6}",
            "[ -~]{0,8}",
        ],
        0..40,
    )
    .prop_map(|parts| parts.concat())
}

/// Well-formed tables built by hand rather than by training.
///
/// Ranks are gapless from 256 and every part is either a byte of `abc ` or an
/// earlier rank, so every id resolves. About a third of the rules repeat the
/// pair of an earlier rule.
fn arb_rule_table() -> impl Strategy<Value = RuleTable> {
    const BYTES: [Token; 4] = [97, 98, 99, 32];

    prop::collection::vec((any::<Index>(), any::<Index>(), 0u8..3), 0..24).prop_map(|picks| {
        let mut rules: Vec<MergeRule> = Vec::with_capacity(picks.len());
        for (i, (left, right, kind)) in picks.into_iter().enumerate() {
            let rank = FIRST_MERGE_ID + i;
            let part = |idx: Index| {
                let k = idx.index(BYTES.len() + i);
                if k < BYTES.len() { BYTES[k] } else { FIRST_MERGE_ID + k - BYTES.len() }
            };
            let rule = if kind == 0 && !rules.is_empty() {
                let earlier = rules[left.index(rules.len())];
                MergeRule { rank, ..earlier }
            } else {
                MergeRule::new(part(left), part(right), rank)
            };
            rules.push(rule);
        }
        RuleTable::new(rules)
    })
}

fn sequential(max_steps: usize) -> TrainerConfig {
    TrainerConfig {
        max_steps_per_chunk: max_steps,
        parallel: false,
        show_progress: false,
    }
}

// ── Property tests ───────────────────────────────────────────────────────────

proptest! {
    /// Decoding an encoding gives back the input, whatever the rules came from.
    #[test]
    fn round_trip_with_trained_rules(corpus in arb_text(), text in any::<String>(), steps in 0usize..20) {
        let rules = train(&corpus, steps).expect("training should succeed");
        let vocab = build_vocabulary(&rules);
        prop_assert_eq!(decode(&encode(&text, &rules), &vocab), text.clone());
        prop_assert_eq!(decode(&encode(&corpus, &rules), &vocab), corpus);
    }

    /// Round trip also holds for hand-built tables, duplicate pairs included.
    #[test]
    fn round_trip_with_any_rule_table(
        rules in arb_rule_table(),
        text in "[abc ]{0,40}",
        other in any::<String>(),
    ) {
        prop_assert_eq!(rules.validate(), Ok(()));
        let vocab = build_vocabulary(&rules);
        prop_assert_eq!(vocab.len(), 256 + rules.len());
        prop_assert_eq!(decode(&encode(&text, &rules), &vocab), text.clone());
        prop_assert_eq!(decode(&encode(&other, &rules), &vocab), other);
    }

    /// Learned ranks start at 256 and increase by one.
    #[test]
    fn ranks_are_gapless(corpus in arb_text(), steps in 0usize..20) {
        let rules = train(&corpus, steps).expect("training should succeed");
        for (i, rule) in rules.iter().enumerate() {
            prop_assert_eq!(rule.rank, FIRST_MERGE_ID + i);
        }
    }

    /// Every learned id expands to the concatenation of its parts.
    #[test]
    fn vocabulary_composes(corpus in arb_text()) {
        let rules = train(&corpus, 50).expect("training should succeed");
        let vocab = build_vocabulary(&rules);
        for rule in &rules {
            let merged = vocab.get(rule.rank).expect("learned id should resolve");
            let left = vocab.get(rule.pair.0).expect("left part should resolve");
            let right = vocab.get(rule.pair.1).expect("right part should resolve");
            prop_assert_eq!(merged.len(), left.len() + right.len());
            prop_assert_eq!(merged.to_vec(), [left, right].concat());
        }
    }

    /// Training twice, or in parallel, yields the same table.
    #[test]
    fn training_is_deterministic(corpus in arb_text(), steps in 1usize..30) {
        let first = train(&corpus, steps).expect("training should succeed");
        let second = train(&corpus, steps).expect("training should succeed");
        let parallel = Trainer::new(TrainerConfig { parallel: true, ..sequential(steps) })
            .expect("trainer init failed")
            .train(&corpus)
            .expect("training should succeed");
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first, &parallel);
    }

    /// Encoding never grows the byte sequence.
    #[test]
    fn encoding_never_expands(corpus in arb_text(), text in arb_text()) {
        let rules = train(&corpus, 20).expect("training should succeed");
        prop_assert!(encode(&text, &rules).len() <= text.len());
    }
}

#[test]
fn empty_input_is_idempotent() {
    let rules = train("", 100).expect("training should succeed");
    assert!(rules.is_empty());
    assert!(encode("", &rules).is_empty());

    let trained = train("some text to learn from", 100).expect("training should succeed");
    assert!(encode("", &trained).is_empty());
}

#[test]
fn scenario_chunk() {
    let rules = Trainer::new(sequential(2))
        .expect("trainer init failed")
        .train("aaabdaaabac")
        .expect("training should succeed");
    assert_eq!(
        rules.merge_history(),
        vec![((97, 97), 256), ((97, 98), 257)]
    );

    let encoder = BPEEncoder::new(&rules);
    assert_eq!(
        encoder.encode("aaabdaaabac"),
        vec![256, 257, 100, 256, 257, 97, 99]
    );
}

#[test]
fn later_duplicate_rule_is_inert() {
    let rules = RuleTable::from_merge_history(vec![((97, 98), 256), ((98, 99), 257), ((97, 98), 258)]);
    let ids = encode("abab", &rules);
    assert_eq!(ids, vec![256, 256]);
    assert!(!ids.contains(&258));
}
