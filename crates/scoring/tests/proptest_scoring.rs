use common::{Fundamentals, MatchResult};
use proptest::prelude::*;
use scoring::{score, sort_scored, ScoredMatch, ScoringConfig};

fn arb_field() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        Just(None),
        (-1_000_000.0f64..10_000_000.0).prop_map(Some),
    ]
}

fn arb_config() -> impl Strategy<Value = ScoringConfig> {
    (0.0f64..300.0, 0.0f64..2_000.0, any::<bool>()).prop_map(
        |(pe_max, market_cap_min, require_profit)| ScoringConfig {
            pe_max,
            market_cap_min,
            require_profit,
        },
    )
}

fn scored(symbol: usize, score: u8, change_pct: f64) -> ScoredMatch {
    ScoredMatch {
        result: MatchResult {
            symbol: format!("{symbol:06}"),
            name: None,
            date: "2024-06-28".into(),
            close: 10.0,
            change_pct,
            volume_ratio: 4.0,
            turbulence_pct: 10.0,
            min_price_m: 9.0,
        },
        score,
        score_reasons: Vec::new(),
        pe_ttm: None,
        market_cap_billion: None,
        net_profit: None,
    }
}

proptest! {
    /// Scores stay within 0..=3 and every point has a matching reason.
    #[test]
    fn score_is_bounded(
        pe in arb_field(),
        cap in arb_field(),
        profit in arb_field(),
        cfg in arb_config(),
    ) {
        let s = score(&Fundamentals { pe_ttm: pe, market_cap: cap, net_profit: profit }, &cfg);
        prop_assert!(s.points <= 3);
        let expected_reasons = s.points as usize + usize::from(!cfg.require_profit);
        prop_assert_eq!(s.reasons.len(), expected_reasons);
    }

    /// After sorting, (score, change_pct) never increases.
    #[test]
    fn sorted_matches_are_descending(
        entries in prop::collection::vec((0u8..=3, -20.0f64..20.0), 0..40),
    ) {
        let mut matches: Vec<ScoredMatch> = entries
            .iter()
            .enumerate()
            .map(|(i, &(s, c))| scored(i, s, c))
            .collect();
        sort_scored(&mut matches);

        for pair in matches.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(a.score >= b.score);
            if a.score == b.score {
                prop_assert!(a.result.change_pct >= b.result.change_pct);
            }
        }
    }
}
