use super::payment::{PaymentKind, TOKEN_UNIT};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    pub count: u64,
    pub total: u64,
}

/// Running totals of confirmed payments, per category, for one payout pass.
///
/// Categories are reported in the order they were first paid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentsSummary {
    tallies: Vec<(PaymentKind, Tally)>,
}

impl PaymentsSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, kind: PaymentKind, amount: u64) {
        let index = match self.tallies.iter().position(|(k, _)| *k == kind) {
            Some(index) => index,
            None => {
                self.tallies.push((kind, Tally::default()));
                self.tallies.len() - 1
            }
        };
        let tally = &mut self.tallies[index].1;
        tally.count += 1;
        tally.total += amount;
    }

    pub fn get(&self, kind: PaymentKind) -> Option<Tally> {
        self.tallies
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, tally)| *tally)
    }

    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }

    pub fn clear(&mut self) {
        self.tallies.clear();
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PaymentsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tallies.is_empty() {
            return f.write_str("No payments made!");
        }
        for (kind, tally) in &self.tallies {
            writeln!(
                f,
                "Paid {} {}s, {} {}.",
                tally.count, kind, tally.total, TOKEN_UNIT
            )?;
        }
        Ok(())
    }
}
