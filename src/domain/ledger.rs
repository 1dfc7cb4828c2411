use serde::{Deserialize, Serialize};

/// One wallet ledger row as returned by the (authenticated) ledger poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEvent {
    pub id: String,
    pub reason: String,
    pub amount: f64,
    #[serde(default)]
    pub asset: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub kickoff_at: Option<String>,
    #[serde(default)]
    pub interval_label: Option<String>,
}

impl LedgerEvent {
    pub fn is_credit(&self) -> bool {
        self.amount > 0.0
    }

    /// Headline shown for the row.
    pub fn title(&self) -> String {
        if self.reason == "tip" {
            if self.is_credit() { "Tip received".into() } else { "Tip sent".into() }
        } else {
            self.reason.clone()
        }
    }

    /// Secondary line: `asset · mode` for game money, `asset · interval` otherwise.
    pub fn details(&self) -> Option<String> {
        let asset = self.asset.as_deref()?;
        let game_money = matches!(self.reason.as_str(), "stake" | "winnings" | "refund");
        let extra = if game_money { self.mode.as_deref() } else { self.interval_label.as_deref() };
        Some(match extra {
            Some(extra) => format!("{} · {}", asset, extra),
            None => asset.to_string(),
        })
    }

    /// `+1,250` / `-300`, whole units.
    pub fn amount_text(&self) -> String {
        let sign = if self.is_credit() { "+" } else { "" };
        format!("{}{}", sign, crate::time_utils::format_price(self.amount.round()))
    }
}

/// Ids present in `latest` but not in `previous`, oldest first.
///
/// Both lists are newest first, as served.
pub fn new_ids_oldest_first(previous: &[LedgerEvent], latest: &[LedgerEvent]) -> Vec<String> {
    latest
        .iter()
        .filter(|e| !previous.iter().any(|p| p.id == e.id))
        .rev()
        .map(|e| e.id.clone())
        .collect()
}
