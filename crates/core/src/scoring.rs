use crate::model::QuizRules;

/// Points awarded for a correct answer.
///
/// `time_elapsed_secs` is measured from question load to the answer tap;
/// `streak_before` is the streak *before* this answer counts, so the Nth
/// consecutive correct answer earns `(N - 1) * streak_bonus`.
///
/// The time bonus decays linearly from `time_bonus_max` at zero elapsed to
/// nothing at the budget's end. A correct answer that lands late still earns
/// the base points.
#[must_use]
pub fn score_correct_answer(rules: &QuizRules, time_elapsed_secs: f64, streak_before: u32) -> u32 {
    let budget = f64::from(rules.time_budget_secs());
    let ratio = (budget - time_elapsed_secs) / budget;
    let time_bonus = (ratio * f64::from(rules.time_bonus_max())).floor();
    let time_bonus = if time_bonus.is_finite() && time_bonus > 0.0 {
        let capped = time_bonus.min(f64::from(rules.time_bonus_max()));
        // floor() of a value within u32 range is exact here
        capped as u32
    } else {
        0
    };

    let streak_bonus = streak_before.saturating_mul(rules.streak_bonus());

    rules
        .base_points()
        .saturating_add(time_bonus)
        .saturating_add(streak_bonus)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instant_first_answer_earns_full_time_bonus() {
        let rules = QuizRules::default();
        assert_eq!(score_correct_answer(&rules, 0.0, 0), 1_500);
    }

    #[test]
    fn last_instant_answer_earns_base_only() {
        let rules = QuizRules::default();
        assert_eq!(score_correct_answer(&rules, 15.0, 0), 1_000);
    }

    #[test]
    fn mid_answer_with_streak() {
        // 1000 + floor(10/15 * 500) + 3 * 100 = 1000 + 333 + 300
        let rules = QuizRules::default();
        assert_eq!(score_correct_answer(&rules, 5.0, 3), 1_633);
    }

    #[test]
    fn late_answer_never_goes_negative() {
        let rules = QuizRules::default();
        assert_eq!(score_correct_answer(&rules, 20.0, 0), 1_000);
        assert_eq!(score_correct_answer(&rules, 20.0, 2), 1_200);
    }

    #[test]
    fn time_bonus_is_capped_at_max() {
        // A skewed clock must not mint more than the configured bonus.
        let rules = QuizRules::default();
        assert_eq!(score_correct_answer(&rules, -3.0, 0), 1_500);
    }

    #[test]
    fn custom_rules_flow_through() {
        let rules = QuizRules::new(5, 10, 200, 100, 50, 2_000, false).unwrap();
        // 200 + floor(5/10 * 100) + 2 * 50
        assert_eq!(score_correct_answer(&rules, 5.0, 2), 350);
    }
}
