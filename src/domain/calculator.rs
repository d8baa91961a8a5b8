//! Turns a token balance and a scholar's terms into the ordered list of
//! transfers to make. Pure: no I/O, no clock, no randomness.

use super::address::Address;
use super::config::{Donation, LegacyScholar, ScholarAccount, ScholarConfig, SplitScholar};
use super::payment::{Payment, PaymentKind};
use super::secret::PrivateKey;
use crate::error::InsufficientBalance;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;

/// `ronin:9fa1bc784c665e683597d3f29375e45786617550`
pub const SOFTWARE_FEE_ADDRESS: Address = Address::from_bytes([
    0x9f, 0xa1, 0xbc, 0x78, 0x4c, 0x66, 0x5e, 0x68, 0x35, 0x97, 0xd3, 0xf2, 0x93, 0x75, 0xe4, 0x57,
    0x86, 0x61, 0x75, 0x50,
]);

pub const SOFTWARE_FEE_PERCENT: Decimal = dec!(1);

/// `percent` of `balance`, rounded to the nearest unit (ties to even).
pub fn share(balance: u64, percent: Decimal) -> u64 {
    (Decimal::from(balance) * percent / dec!(100))
        .round()
        .to_u64()
        .unwrap_or(0)
}

#[derive(Debug, Clone)]
pub struct PayoutCalculator {
    donations: Vec<Donation>,
    fee_address: Address,
}

impl PayoutCalculator {
    pub fn new(donations: Vec<Donation>) -> Self {
        Self {
            donations,
            fee_address: SOFTWARE_FEE_ADDRESS,
        }
    }

    /// Plans every transfer for `scholar` given its current `balance`.
    ///
    /// Zero-amount entries are left out. The scholar is skipped as a whole
    /// (no partial payout) when its own share rounds to nothing or the
    /// transfers would need more than the balance.
    pub fn plan(
        &self,
        balance: u64,
        scholar: &ScholarAccount,
    ) -> Result<Vec<Payment>, InsufficientBalance> {
        let mut plan = Plan::new(*scholar.account(), &scholar.private_key);
        match &scholar.config {
            ScholarConfig::Legacy(terms) => self.plan_legacy(&mut plan, balance, terms)?,
            ScholarConfig::New(terms) => self.plan_splits(&mut plan, balance, terms)?,
        }
        let total = plan.total();
        if total > balance {
            return Err(InsufficientBalance::PaymentsExceedBalance { balance, total });
        }
        Ok(plan.payments)
    }

    fn plan_legacy(
        &self,
        plan: &mut Plan,
        balance: u64,
        terms: &LegacyScholar,
    ) -> Result<(), InsufficientBalance> {
        let scholar_amount = match terms.fixed_payout {
            Some(fixed) => fixed,
            None => {
                let amount = share(balance, terms.percent);
                check_floor(balance, terms.percent, amount)?;
                amount
            }
        };
        plan.push(
            format!("Payment to scholar of {}", terms.name),
            PaymentKind::Scholar,
            terms.payout_address,
            scholar_amount,
        );

        if let Some(trainer) = &terms.trainer {
            plan.push(
                format!("Payment to trainer of {}", terms.name),
                PaymentKind::Trainer,
                trainer.address,
                share(balance, trainer.percent),
            );
        }

        self.push_donations(plan, balance, &terms.name);
        plan.push(
            format!("Donation to software creator for {}", terms.name),
            PaymentKind::Fee,
            self.fee_address,
            share(balance, SOFTWARE_FEE_PERCENT),
        );

        // The manager absorbs every rounding remainder.
        let committed = plan.total();
        let manager_amount =
            balance
                .checked_sub(committed)
                .ok_or(InsufficientBalance::PaymentsExceedBalance {
                    balance,
                    total: committed,
                })?;
        plan.push(
            format!("Payment to manager of {}", terms.name),
            PaymentKind::Manager,
            terms.manager,
            manager_amount,
        );
        Ok(())
    }

    fn plan_splits(
        &self,
        plan: &mut Plan,
        balance: u64,
        terms: &SplitScholar,
    ) -> Result<(), InsufficientBalance> {
        for split in &terms.splits {
            let kind = PaymentKind::from_persona(&split.persona);
            let amount = share(balance, split.percent);
            if kind == PaymentKind::Scholar {
                check_floor(balance, split.percent, amount)?;
            }
            plan.push(
                format!("Payment to {} of {}", split.persona, terms.name),
                kind,
                split.address,
                amount,
            );
        }

        self.push_donations(plan, balance, &terms.name);
        let fee = share(balance, SOFTWARE_FEE_PERCENT);
        plan.push(
            format!("Software fee for {}", terms.name),
            PaymentKind::Fee,
            self.fee_address,
            fee,
        );
        plan.push(
            format!("Donation to software creator for {}", terms.name),
            PaymentKind::Fee,
            self.fee_address,
            fee,
        );
        Ok(())
    }

    fn push_donations(&self, plan: &mut Plan, balance: u64, scholar: &str) {
        for donation in &self.donations {
            plan.push(
                format!("Donation to {} for {}", donation.name, scholar),
                PaymentKind::Donation,
                donation.address,
                share(balance, donation.percent),
            );
        }
    }
}

fn check_floor(balance: u64, percent: Decimal, amount: u64) -> Result<(), InsufficientBalance> {
    if percent > Decimal::ZERO && amount == 0 {
        return Err(InsufficientBalance::BelowScholarFloor { balance, percent });
    }
    Ok(())
}

struct Plan<'a> {
    from: Address,
    key: &'a PrivateKey,
    payments: Vec<Payment>,
}

impl<'a> Plan<'a> {
    fn new(from: Address, key: &'a PrivateKey) -> Self {
        Self {
            from,
            key,
            payments: Vec::new(),
        }
    }

    fn push(&mut self, label: String, kind: PaymentKind, to: Address, amount: u64) {
        if amount == 0 {
            return;
        }
        self.payments.push(Payment::new(
            label,
            kind,
            self.from,
            self.key.clone(),
            to,
            amount,
        ));
    }

    fn total(&self) -> u64 {
        self.payments.iter().map(|p| p.amount).sum()
    }
}
