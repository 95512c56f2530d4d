//! Vault state read from chain and the metrics derived from it.

use crate::vault::units::DECIMALS;

/// Name, symbol and precision of a token contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
}

impl TokenMetadata {
    /// Stand-in when the token's metadata cannot be read.
    pub fn unknown() -> Self {
        Self {
            name: String::new(),
            symbol: "tokens".to_string(),
            decimals: DECIMALS,
        }
    }
}

/// Funds lent to one strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrategyPosition {
    pub address: String,
    pub borrowed: i128,
    pub net_impact: i128,
}

/// A queued redemption awaiting its unlock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedemptionRequest {
    pub shares: i128,
    /// Unix seconds.
    pub unlock_time: u64,
}

/// Balances of the connected account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPosition {
    pub share_balance: i128,
    pub underlying_balance: i128,
    pub pending_redemption: Option<RedemptionRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultSnapshot {
    pub vault_id: String,
    pub share_token: String,
    pub token: String,
    pub total_shares: i128,
    pub total_tokens: i128,
    pub lock_duration_secs: u64,
    pub penalty_rate: i128,
    pub min_liquidity_rate: i128,
    pub strategies: Vec<StrategyPosition>,
    pub user: Option<UserPosition>,
}

/// Countdown view of a pending redemption.
#[derive(Debug, Clone, PartialEq)]
pub struct RedemptionStatus {
    pub remaining_secs: u64,
    pub unlocked: bool,
    /// 0–100, elapsed share of the lock duration.
    pub progress_percent: f64,
    pub estimated_tokens: i128,
}

impl VaultSnapshot {
    /// Underlying tokens per share; exactly 1 for an empty vault.
    pub fn share_price(&self) -> f64 {
        if self.total_shares == 0 {
            return 1.0;
        }
        self.total_tokens as f64 / self.total_shares as f64
    }

    /// Sum lent to all strategies, saturating at the `i128` bounds.
    pub fn total_borrowed(&self) -> i128 {
        self.strategies
            .iter()
            .fold(0i128, |acc, s| acc.saturating_add(s.borrowed))
    }

    /// Tokens held by the vault itself.
    pub fn available_liquidity(&self) -> i128 {
        self.total_tokens.saturating_sub(self.total_borrowed())
    }

    /// Lent-out fraction in `0.0..=1.0`; 0 for an empty vault.
    pub fn utilization(&self) -> f64 {
        if self.total_tokens <= 0 {
            return 0.0;
        }
        let lent = self.total_borrowed() as f64 / self.total_tokens as f64;
        lent.clamp(0.0, 1.0)
    }

    /// Tokens received for `shares` at the current price.
    pub fn shares_to_tokens(&self, shares: i128) -> i128 {
        if self.total_shares <= 0 {
            return shares;
        }
        shares.saturating_mul(self.total_tokens) / self.total_shares
    }

    /// Shares minted for `tokens` at the current price.
    pub fn tokens_to_shares(&self, tokens: i128) -> i128 {
        if self.total_shares <= 0 || self.total_tokens <= 0 {
            return tokens;
        }
        tokens.saturating_mul(self.total_shares) / self.total_tokens
    }

    pub fn pending_redemption(&self) -> Option<RedemptionRequest> {
        self.user.as_ref().and_then(|u| u.pending_redemption)
    }

    /// Countdown for the user's pending redemption at `now` (unix seconds).
    pub fn redemption_status(&self, now: u64) -> Option<RedemptionStatus> {
        let request = self.pending_redemption()?;
        let remaining_secs = request.unlock_time.saturating_sub(now);
        let progress_percent = if self.lock_duration_secs == 0 {
            100.0
        } else {
            let elapsed = self.lock_duration_secs as f64 - remaining_secs as f64;
            (elapsed / self.lock_duration_secs as f64 * 100.0).clamp(0.0, 100.0)
        };
        Some(RedemptionStatus {
            remaining_secs,
            unlocked: remaining_secs == 0,
            progress_percent,
            estimated_tokens: self.shares_to_tokens(request.shares),
        })
    }
}

/// `"Ready"`, `"Hh Mm"`, `"Mm Ss"` or `"Ss"`.
pub fn format_time_remaining(secs: u64) -> String {
    if secs == 0 {
        return "Ready".to_string();
    }
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
