//! Property tests over generated challenges.
//!
//! Seeds are drawn by proptest; each seed fixes one challenge.

use holevm_challenge::{
    canonicalize, generate_challenge, Challenge, ChallengeConfig, Episode, HvmEnv, Rejection,
};
use holevm_vm::{self as vm, Assignment, Hole, HoleKind, HoleName, Int};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn challenge(seed: u64, hard: bool) -> Challenge {
    let config = ChallengeConfig { hard, ..ChallengeConfig::default() };
    let mut rng = StdRng::seed_from_u64(seed);
    generate_challenge(&config, &mut rng).unwrap()
}

fn answer(assignment: &Assignment) -> String {
    let lines: Vec<String> = assignment.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    format!("<think>work it out</think>\n<HOLES>\n{}\n</HOLES>", lines.join("\n"))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn generation_is_deterministic(seed in any::<u64>(), hard in any::<bool>()) {
        prop_assert_eq!(challenge(seed, hard), challenge(seed, hard));
    }

    #[test]
    fn hidden_assignment_solves_its_challenge(seed in any::<u64>(), hard in any::<bool>()) {
        let c = challenge(seed, hard);
        let eval = c.evaluate(&answer(c.hidden()));
        prop_assert_eq!(eval.score, 1.0);
        prop_assert_eq!(eval.passed, c.cases.len());
    }

    #[test]
    fn forged_cases_are_nonempty(seed in any::<u64>()) {
        let c = challenge(seed, true);
        prop_assert_eq!(c.cases.len(), 3);
        for case in &c.cases {
            prop_assert!(!case.expected.is_empty());
            prop_assert_eq!(case.expected.lines().count(), 2);
        }
    }

    #[test]
    fn dropping_a_hole_is_incomplete(seed in any::<u64>(), pick in any::<prop::sample::Index>()) {
        let c = challenge(seed, true);
        let names: Vec<HoleName> = c.program.hole_names().cloned().collect();
        let dropped = pick.get(&names).clone();
        let partial: Assignment = c
            .hidden()
            .iter()
            .filter(|(k, _)| **k != dropped)
            .map(|(k, v)| (k.clone(), v))
            .collect();

        let eval = c.evaluate(&answer(&partial));
        prop_assert_eq!(eval.score, 0.0);
        prop_assert_eq!(
            eval.rejection,
            Some(Rejection::IncompleteHoles { missing: vec![dropped], extra: vec![] })
        );
    }

    #[test]
    fn out_of_domain_value_is_rejected(seed in any::<u64>(), pick in any::<prop::sample::Index>()) {
        let c = challenge(seed, true);
        let hole = pick.get(&c.program.holes).clone();
        let mut bad = c.hidden().clone();
        bad.insert(hole.name.clone(), hole.domain.max() + 1);

        let eval = c.evaluate(&answer(&bad));
        prop_assert_eq!(eval.score, 0.0);
        match eval.rejection {
            Some(Rejection::OutOfDomain { violations }) => {
                prop_assert_eq!(violations.len(), 1);
                prop_assert_eq!(&violations[0].hole, &hole.name);
            }
            other => prop_assert!(false, "unexpected rejection {:?}", other),
        }
    }

    #[test]
    fn score_is_all_or_nothing(
        seed in any::<u64>(),
        values in prop::collection::vec(-9i64..=30, 8),
    ) {
        let c = challenge(seed, true);
        // keep the jump targets, guess the data holes
        let guess: Assignment = c
            .program
            .holes
            .iter()
            .zip(values)
            .map(|(hole, v)| {
                let value = if hole.domain.is_singleton() { hole.domain.min() } else { v };
                (hole.name.clone(), value)
            })
            .collect();

        let eval = c.evaluate(&answer(&guess));
        prop_assert!(eval.score == 0.0 || eval.score == 1.0);
        prop_assert_eq!(eval.score == 1.0, eval.rejection.is_none() && eval.passed == eval.total);
    }

    #[test]
    fn changing_one_data_hole_scores_zero(
        seed in any::<u64>(),
        pick in any::<prop::sample::Index>(),
        other in any::<prop::sample::Index>(),
    ) {
        let c = challenge(seed, true);
        let data: Vec<&Hole> = c
            .program
            .holes
            .iter()
            .filter(|h| h.kind == HoleKind::Data && !h.domain.is_singleton())
            .collect();
        let hole = *pick.get(&data);
        let current = c.hidden().get(&hole.name).unwrap();
        let alternatives: Vec<Int> = (0..hole.domain.len())
            .filter_map(|i| hole.domain.nth(i))
            .filter(|v| *v != current)
            .collect();

        let mut flipped = c.hidden().clone();
        flipped.insert(hole.name.clone(), *other.get(&alternatives));

        // only flips some case can observe
        let observable = c.cases.iter().any(|case| {
            match vm::run(&c.program, &flipped, &case.input) {
                Ok(out) => canonicalize(&out) != canonicalize(&case.expected),
                Err(_) => true,
            }
        });
        prop_assume!(observable);

        let eval = c.evaluate(&answer(&flipped));
        prop_assert_eq!(eval.score, 0.0);
        prop_assert_eq!(eval.rejection, None);
        prop_assert!(eval.passed < eval.total);
    }

    #[test]
    fn canonicalize_is_idempotent(text in "[a-z0-9 \t\r\n-]{0,40}") {
        let once = canonicalize(&text);
        prop_assert_eq!(canonicalize(&once), once.clone());
        prop_assert!(!once.ends_with('\n'));
        prop_assert!(!once.contains('\r'));
    }
}

#[test]
fn episode_round_trip_blocking() {
    let config = ChallengeConfig { seed: Some(17), ..ChallengeConfig::default() };
    let env = HvmEnv::new(config).unwrap();
    let mut episode = Episode::new(env);

    let prompt = tokio_test::block_on(episode.reset()).unwrap();
    assert!(prompt.contains("Holes and domains:"));

    let outcome = tokio_test::block_on(episode.step("<HOLES>\n?a=0\n</HOLES>")).unwrap();
    assert_eq!(outcome.reward, 0.0);
    assert!(matches!(outcome.details.rejection, Some(Rejection::IncompleteHoles { .. })));
}
