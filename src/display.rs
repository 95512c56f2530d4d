//! Terminal rendering of lifecycle states, vault snapshots and previews.

use crate::codec::address::short_address;
use crate::network::NetworkConfig;
use crate::transaction::{TxState, TxStatus};
use crate::vault::snapshot::{
    format_time_remaining, RedemptionStatus, TokenMetadata, VaultSnapshot,
};
use crate::vault::units::{format_amount, format_percent, format_units};

/// One-line description of a lifecycle status.
pub fn status_message(status: TxStatus) -> &'static str {
    match status {
        TxStatus::None => "Idle",
        TxStatus::Building => "Building transaction...",
        TxStatus::AwaitingSignature => "Please sign the transaction in your wallet",
        TxStatus::Submitting => "Submitting transaction to the network...",
        TxStatus::Succeeded => "Your transaction has been confirmed",
        TxStatus::Failed => "Transaction failed",
    }
}

/// `abcdef...uvwxyz` for hashes longer than 16 characters.
pub fn format_tx_hash(hash: &str) -> String {
    if hash.len() <= 16 {
        return hash.to_string();
    }
    format!("{}...{}", &hash[..6], &hash[hash.len() - 6..])
}

/// Status line plus error and explorer link once the outcome is known.
pub fn render_tx_state(state: &TxState, network: &NetworkConfig) -> String {
    let mut lines = vec![status_message(state.status).to_string()];
    if let Some(result) = &state.result {
        if let Some(error) = &result.error {
            lines.push(format!("  error: {}", error));
        }
        if let Some(hash) = &result.hash {
            lines.push(format!("  hash:  {}", format_tx_hash(hash)));
            lines.push(format!("  view:  {}", network.tx_url(hash)));
        }
    }
    lines.join("\n")
}

/// Underlying token amount with two decimals and the token's symbol.
pub fn format_tokens(value: i128, token: &TokenMetadata) -> String {
    format!("{} {}", format_units(value, token.decimals, 2), token.symbol)
}

/// Signed two-decimal profit and loss, e.g. `+12.50`.
pub fn format_pnl(net_impact: i128, token: &TokenMetadata) -> String {
    let sign = if net_impact >= 0 { "+" } else { "" };
    format!("{}{}", sign, format_tokens(net_impact, token))
}

pub fn render_network(network: &NetworkConfig) -> String {
    let relay = match (network.use_relay, network.relay_endpoint()) {
        (true, Some((url, _))) => format!("enabled ({})", url),
        (true, None) => "enabled, missing credential".to_string(),
        (false, _) => "disabled".to_string(),
    };
    [
        format!("network:    {}", network.kind),
        format!("rpc:        {}", network.rpc_url),
        format!("indexer:    {}", network.indexer_url),
        format!("passphrase: {}", network.passphrase),
        format!("explorer:   {}", network.explorer_url),
        format!("relay:      {}", relay),
    ]
    .join("\n")
}

fn token_label(address: &str, token: &TokenMetadata) -> String {
    if token.name.is_empty() {
        short_address(address)
    } else {
        format!("{} ({})", token.name, short_address(address))
    }
}

/// Full vault view at `now` (unix seconds). Underlying amounts use the
/// token's decimals; shares are always 7-decimal.
pub fn render_snapshot(
    snapshot: &VaultSnapshot,
    token: &TokenMetadata,
    network: &NetworkConfig,
    now: u64,
) -> String {
    let mut lines = vec![
        format!("Vault {}", snapshot.vault_id),
        format!("  {}", network.contract_url(&snapshot.vault_id)),
        format!("  token:        {}", token_label(&snapshot.token, token)),
        format!("  share token:  {}", short_address(&snapshot.share_token)),
        format!("  TVL:          {}", format_tokens(snapshot.total_tokens, token)),
        format!("  total shares: {}", format_amount(snapshot.total_shares, 2)),
        format!(
            "  share price:  {:.4} {}/share",
            snapshot.share_price(),
            token.symbol
        ),
        format!(
            "  liquidity:    {} available, {:.1}% utilized",
            format_tokens(snapshot.available_liquidity(), token),
            snapshot.utilization() * 100.0
        ),
        format!("  lock period:  {} minutes", snapshot.lock_duration_secs / 60),
        format!("  penalty:      {}%", format_percent(snapshot.penalty_rate)),
        format!("  min liquidity: {}%", format_percent(snapshot.min_liquidity_rate)),
    ];

    if !snapshot.strategies.is_empty() {
        lines.push("  strategies:".to_string());
        for strategy in &snapshot.strategies {
            lines.push(format!(
                "    {}  borrowed {}  P&L {}",
                short_address(&strategy.address),
                format_tokens(strategy.borrowed, token),
                format_pnl(strategy.net_impact, token)
            ));
        }
    }

    if let Some(user) = &snapshot.user {
        lines.push("  your position:".to_string());
        lines.push(format!(
            "    shares: {} (~{})",
            format_amount(user.share_balance, 4),
            format_tokens(snapshot.shares_to_tokens(user.share_balance), token)
        ));
        lines.push(format!(
            "    wallet: {}",
            format_tokens(user.underlying_balance, token)
        ));
        if let Some(status) = snapshot.redemption_status(now) {
            lines.push(render_redemption(&status, snapshot.penalty_rate, token));
        }
    }

    lines.join("\n")
}

/// Countdown block for a pending redemption.
pub fn render_redemption(
    status: &RedemptionStatus,
    penalty_rate: i128,
    token: &TokenMetadata,
) -> String {
    let mut lines = vec![format!(
        "    redemption: ~{}, {:.0}% of lock elapsed",
        format_tokens(status.estimated_tokens, token),
        status.progress_percent
    )];
    if status.unlocked {
        lines.push("    Ready to redeem".to_string());
    } else {
        lines.push(format!(
            "    unlocks in {}",
            format_time_remaining(status.remaining_secs)
        ));
        lines.push(format!(
            "    emergency redemption available with {}% penalty",
            format_percent(penalty_rate)
        ));
    }
    lines.join("\n")
}

/// Shares minted for a deposit of `amount` tokens.
pub fn deposit_preview(snapshot: &VaultSnapshot, token: &TokenMetadata, amount: i128) -> String {
    format!(
        "~{} shares at {:.4} {}/share",
        format_amount(snapshot.tokens_to_shares(amount), 4),
        snapshot.share_price(),
        token.symbol
    )
}

/// Tokens received for redeeming `shares`.
pub fn redeem_preview(snapshot: &VaultSnapshot, token: &TokenMetadata, shares: i128) -> String {
    format!(
        "~{}, unlocking after {}",
        format_tokens(snapshot.shares_to_tokens(shares), token),
        format_time_remaining(snapshot.lock_duration_secs)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransactionResult;
    use crate::vault::snapshot::{RedemptionRequest, StrategyPosition, UserPosition};
    use crate::vault::units::SCALAR_7;

    fn snapshot() -> VaultSnapshot {
        VaultSnapshot {
            vault_id: "CVAULTAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA".to_string(),
            share_token: "CSHAREAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA".to_string(),
            token: "CTOKENAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA".to_string(),
            total_shares: 100 * SCALAR_7,
            total_tokens: 110 * SCALAR_7,
            lock_duration_secs: 3600,
            penalty_rate: 1_000_000,
            min_liquidity_rate: 2_000_000,
            strategies: vec![StrategyPosition {
                address: "CSTRATAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA".to_string(),
                borrowed: 55 * SCALAR_7,
                net_impact: -25_000_000,
            }],
            user: Some(UserPosition {
                share_balance: 10 * SCALAR_7,
                underlying_balance: 5 * SCALAR_7,
                pending_redemption: Some(RedemptionRequest {
                    shares: 10 * SCALAR_7,
                    unlock_time: 1_000 + 1_800,
                }),
            }),
        }
    }

    fn usdc() -> TokenMetadata {
        TokenMetadata {
            name: "USD Coin".to_string(),
            symbol: "USDC".to_string(),
            decimals: 7,
        }
    }

    #[test]
    fn test_format_tx_hash() {
        assert_eq!(format_tx_hash("abc"), "abc");
        assert_eq!(format_tx_hash(&"a1".repeat(32)), "a1a1a1...a1a1a1");
    }

    #[test]
    fn test_render_tx_state_links_explorer() {
        let network = NetworkConfig::testnet();
        let state = TxState {
            status: TxStatus::Succeeded,
            result: Some(TransactionResult::success("ff".repeat(32), None)),
        };
        let rendered = render_tx_state(&state, &network);
        assert!(rendered.starts_with("Your transaction has been confirmed"));
        assert!(rendered.contains(&network.tx_url(&"ff".repeat(32))));
    }

    #[test]
    fn test_render_snapshot() {
        let rendered = render_snapshot(&snapshot(), &usdc(), &NetworkConfig::testnet(), 1_000);
        assert!(rendered.contains("token:        USD Coin ("));
        assert!(rendered.contains("TVL:          110.00 USDC"));
        assert!(rendered.contains("share price:  1.1000 USDC/share"));
        assert!(rendered.contains("50.0% utilized"));
        assert!(rendered.contains("penalty:      10.0%"));
        assert!(rendered.contains("P&L -2.50 USDC"));
        assert!(rendered.contains("redemption: ~11.00 USDC"));
        assert!(rendered.contains("unlocks in 30m 0s"));
        assert!(rendered.contains("50% of lock elapsed"));
    }

    #[test]
    fn test_ready_redemption() {
        let rendered = render_snapshot(&snapshot(), &usdc(), &NetworkConfig::testnet(), 10_000);
        assert!(rendered.contains("Ready to redeem"));
        assert!(!rendered.contains("emergency"));
    }

    #[test]
    fn test_previews() {
        let snap = snapshot();
        assert_eq!(
            deposit_preview(&snap, &usdc(), 11 * SCALAR_7),
            "~10.0000 shares at 1.1000 USDC/share"
        );
        assert_eq!(
            redeem_preview(&snap, &TokenMetadata::unknown(), 10 * SCALAR_7),
            "~11.00 tokens, unlocking after 1h 0m"
        );
    }

    #[test]
    fn test_token_decimals_respected() {
        let six = TokenMetadata {
            name: "Six".to_string(),
            symbol: "SIX".to_string(),
            decimals: 6,
        };
        assert_eq!(format_tokens(12_345_678, &six), "12.34 SIX");
        assert_eq!(format_pnl(1_000_000, &six), "+1.00 SIX");
        assert_eq!(format_tokens(12_345_678, &TokenMetadata::unknown()), "1.23 tokens");
    }
}
