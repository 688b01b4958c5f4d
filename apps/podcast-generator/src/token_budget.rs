//! Token budget - map a spoken duration to a completion-token ceiling

use serde::{Deserialize, Serialize};

/// Shortest and longest podcast the form accepts, in minutes
pub const MIN_DURATION_MINUTES: f64 = 1.0;
pub const MAX_DURATION_MINUTES: f64 = 60.0;

/// Clamp a requested duration into the accepted range
pub fn clamp_duration(minutes: f64) -> f64 {
    if minutes.is_nan() {
        return MIN_DURATION_MINUTES;
    }
    minutes.clamp(MIN_DURATION_MINUTES, MAX_DURATION_MINUTES)
}

/// Completion tokens derived from a duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBudget {
    pub completion_tokens: u32,
}

/// Converts minutes to completion tokens with optional clamp bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenBudgetPolicy {
    pub tokens_per_minute: f64,
    pub min_tokens: Option<u32>,
    pub max_tokens: Option<u32>,
}

impl TokenBudgetPolicy {
    /// 150 tokens per minute, bounded only by the provider itself
    pub const fn classic() -> Self {
        Self {
            tokens_per_minute: 150.0,
            min_tokens: None,
            max_tokens: None,
        }
    }

    /// 450 tokens per minute, clamped to [1000, 16000]
    pub const fn extended() -> Self {
        Self {
            tokens_per_minute: 450.0,
            min_tokens: Some(1000),
            max_tokens: Some(16000),
        }
    }

    pub fn tokens_for_duration(&self, minutes: f64) -> TokenBudget {
        let minutes = clamp_duration(minutes);
        let mut tokens = (minutes * self.tokens_per_minute).floor().max(0.0) as u32;

        if let Some(min) = self.min_tokens {
            tokens = tokens.max(min);
        }
        if let Some(max) = self.max_tokens {
            tokens = tokens.min(max);
        }

        TokenBudget {
            completion_tokens: tokens,
        }
    }
}

impl Default for TokenBudgetPolicy {
    fn default() -> Self {
        Self::classic()
    }
}

/// Hard ceiling enforced at call time by the chat provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCeiling(pub u32);

impl ProviderCeiling {
    pub fn apply(&self, budget: TokenBudget) -> BudgetOutcome {
        BudgetOutcome {
            requested: budget.completion_tokens,
            effective: budget.completion_tokens.min(self.0),
            ceiling: Some(self.0),
        }
    }
}

/// Budget actually sent with the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetOutcome {
    pub requested: u32,
    pub effective: u32,
    pub ceiling: Option<u32>,
}

impl BudgetOutcome {
    /// Resolve a budget against an optional ceiling
    pub fn resolve(budget: TokenBudget, ceiling: Option<ProviderCeiling>) -> Self {
        match ceiling {
            Some(ceiling) => ceiling.apply(budget),
            None => Self {
                requested: budget.completion_tokens,
                effective: budget.completion_tokens,
                ceiling: None,
            },
        }
    }

    pub fn was_capped(&self) -> bool {
        self.effective < self.requested
    }

    /// User-visible warning when the ceiling reduced the budget
    pub fn warning(&self) -> Option<String> {
        if !self.was_capped() {
            return None;
        }
        Some(format!(
            "Calculated {} tokens exceeds the provider limit of {}; using {}",
            self.requested, self.effective, self.effective
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extended_policy_examples() {
        let policy = TokenBudgetPolicy::extended();
        assert_eq!(policy.tokens_for_duration(1.0).completion_tokens, 1000);
        assert_eq!(policy.tokens_for_duration(10.0).completion_tokens, 4500);
        assert_eq!(policy.tokens_for_duration(100.0).completion_tokens, 16000);
    }

    #[test]
    fn test_extended_policy_stays_in_bounds() {
        let policy = TokenBudgetPolicy::extended();
        for minutes in [-5.0, 0.0, 0.5, 1.0, 2.2, 17.0, 35.5, 60.0, 61.0, 1e9, f64::NAN] {
            let tokens = policy.tokens_for_duration(minutes).completion_tokens;
            assert!((1000..=16000).contains(&tokens), "{} -> {}", minutes, tokens);
        }
    }

    #[test]
    fn test_monotonic_then_flat() {
        let policy = TokenBudgetPolicy::extended();
        let mut previous = 0;
        for tenth in 0..=900 {
            let tokens = policy.tokens_for_duration(tenth as f64 / 10.0).completion_tokens;
            assert!(tokens >= previous);
            previous = tokens;
        }
        assert_eq!(policy.tokens_for_duration(80.0), policy.tokens_for_duration(90.0));
        assert_eq!(policy.tokens_for_duration(0.1), policy.tokens_for_duration(1.0));
    }

    #[test]
    fn test_classic_policy_is_linear() {
        let policy = TokenBudgetPolicy::classic();
        assert_eq!(policy.tokens_for_duration(5.0).completion_tokens, 750);
        assert_eq!(policy.tokens_for_duration(2.5).completion_tokens, 375);
        // Duration is clamped even without token bounds
        assert_eq!(policy.tokens_for_duration(120.0).completion_tokens, 9000);
        assert_eq!(policy.tokens_for_duration(0.0).completion_tokens, 150);
    }

    #[test]
    fn test_provider_ceiling_caps_with_warning() {
        let budget = TokenBudgetPolicy::extended().tokens_for_duration(10.0);
        let outcome = BudgetOutcome::resolve(budget, Some(ProviderCeiling(4096)));

        assert_eq!(outcome.requested, 4500);
        assert_eq!(outcome.effective, 4096);
        assert!(outcome.was_capped());
        let warning = outcome.warning().unwrap();
        assert!(warning.contains("4500"));
        assert!(warning.contains("4096"));
    }

    #[test]
    fn test_provider_ceiling_passes_small_budgets() {
        let budget = TokenBudgetPolicy::extended().tokens_for_duration(5.0);
        let outcome = BudgetOutcome::resolve(budget, Some(ProviderCeiling(4096)));

        assert_eq!(outcome.effective, 2250);
        assert!(!outcome.was_capped());
        assert!(outcome.warning().is_none());
    }

    #[test]
    fn test_no_ceiling() {
        let budget = TokenBudgetPolicy::classic().tokens_for_duration(60.0);
        let outcome = BudgetOutcome::resolve(budget, None);
        assert_eq!(outcome.effective, 9000);
        assert_eq!(outcome.ceiling, None);
    }
}
