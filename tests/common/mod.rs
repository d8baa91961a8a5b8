#![allow(dead_code)]

use scholar_payouts::application::executor::ExecutionSettings;
use scholar_payouts::application::manager::PaymentsManager;
use scholar_payouts::application::validator;
use scholar_payouts::domain::config::ValidatedPayouts;
use scholar_payouts::domain::payment::Payment;
use scholar_payouts::domain::ports::Confirmation;
use scholar_payouts::domain::secret::SecretMap;
use scholar_payouts::infrastructure::in_memory::{InMemoryChain, InMemoryResultsLog};
use serde_json::{Value, json};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SCHOLAR_ACCOUNT: &str = "ronin:12345678900987654321012345678901234567ab";
pub const SECOND_ACCOUNT: &str = "ronin:abcdefabcdefabcdefabcdefabcdefabcdefabcd";
pub const MANAGER: &str = "ronin:12345678900987000321012345678901234567ab";
pub const SCHOLAR_PAYOUT: &str = "ronin:00000000000000000000000000000000000000aa";
pub const TRAINER_PAYOUT: &str = "ronin:00000000000000000000000000000000000000bb";
pub const DONATION: &str = "ronin:0000000000000000000001234567890123456789";
pub const FEE: &str = "ronin:9fa1bc784c665e683597d3f29375e45786617550";

pub fn private_key() -> String {
    format!("0x{}", "12".repeat(32))
}

pub fn secrets_json() -> Value {
    json!({
        SCHOLAR_ACCOUNT: private_key(),
        SECOND_ACCOUNT: private_key(),
    })
}

pub fn secrets() -> SecretMap {
    serde_json::from_value(secrets_json()).unwrap()
}

/// One scholar at 45%, trainer at 10%, one 1% donation.
pub fn legacy_payments() -> Value {
    json!({
        "Manager": MANAGER,
        "Scholars": [{
            "Name": "Scholar 1",
            "AccountAddress": SCHOLAR_ACCOUNT,
            "ScholarPayoutAddress": SCHOLAR_PAYOUT,
            "ScholarPercent": 45,
            "TrainerPayoutAddress": TRAINER_PAYOUT,
            "TrainerPercent": 10
        }],
        "Donations": [{
            "Name": "Entity 1",
            "AccountAddress": DONATION,
            "Percent": 1
        }]
    })
}

/// Two scholars whose declared shares add up to 98% with the donation.
pub fn splits_payments() -> Value {
    json!({
        "scholars": [
            {
                "name": "Scholar 1",
                "ronin": SCHOLAR_ACCOUNT,
                "splits": [
                    {"persona": "Manager", "percentage": 41, "ronin": MANAGER},
                    {"persona": "Scholar", "percentage": 40, "ronin": SCHOLAR_PAYOUT},
                    {"persona": "Trainer", "percentage": 6, "ronin": TRAINER_PAYOUT},
                    {"persona": "Guild", "percentage": 10, "ronin": DONATION}
                ]
            },
            {
                "name": "Scholar 2",
                "ronin": SECOND_ACCOUNT,
                "splits": [
                    {"persona": "Manager", "percentage": 47, "ronin": MANAGER},
                    {"persona": "Scholar", "percentage": 50, "ronin": SCHOLAR_PAYOUT}
                ]
            }
        ],
        "donations": [{"name": "Entity 1", "ronin": DONATION, "percentage": 1}]
    })
}

pub fn validated(payments: &Value) -> ValidatedPayouts {
    validator::validate(payments, &secrets()).unwrap()
}

pub fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

/// Answers every prompt the same way and remembers who was asked.
#[derive(Clone, Default)]
pub struct ScriptedConfirmation {
    pub answer: bool,
    pub asked: Arc<Mutex<Vec<String>>>,
}

impl ScriptedConfirmation {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            ..Self::default()
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

impl Confirmation for ScriptedConfirmation {
    fn confirm(&self, scholar: &str, _payments: &[Payment]) -> bool {
        self.asked.lock().unwrap().push(scholar.to_string());
        self.answer
    }
}

pub fn fast_settings() -> ExecutionSettings {
    ExecutionSettings {
        poll_interval: Duration::from_millis(1),
        receipt_timeout: Duration::ZERO,
    }
}

pub fn manager(
    payouts: ValidatedPayouts,
    chain: &InMemoryChain,
    results: &InMemoryResultsLog,
    confirmation: ScriptedConfirmation,
) -> PaymentsManager {
    PaymentsManager::new(
        payouts,
        Box::new(chain.clone()),
        Box::new(results.clone()),
        Box::new(confirmation),
        fast_settings(),
    )
}

/// Collects formatted `tracing` output for assertions.
///
/// The subscriber is installed for the current thread only, which covers a
/// current-thread `#[tokio::test]`.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Lines containing `needle`.
    pub fn lines_with(&self, needle: &str) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
