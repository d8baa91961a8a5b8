//! Validation of the payments file against the secrets file.
//!
//! The payments file comes in two dialects. [`detect_dialect`] picks one by
//! looking only at top-level keys; the matching schema is then deserialized
//! and every address, percentage and private key is checked before anything
//! is paid. Validation never exits the process: the caller decides what to
//! do with a [`ConfigError`].

use crate::domain::address::Address;
use crate::domain::config::{
    Dialect, Donation, LegacyScholar, MAX_PERCENT, ScholarAccount, ScholarConfig, Split,
    SplitScholar, Trainer, ValidatedPayouts,
};
use crate::domain::secret::{PrivateKey, SecretMap};
use crate::error::{ConfigError, FieldPath};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
struct LegacyFile {
    manager: String,
    scholars: Vec<LegacyScholarEntry>,
    #[serde(default)]
    donations: Vec<LegacyDonationEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LegacyScholarEntry {
    name: String,
    account_address: String,
    scholar_payout_address: String,
    scholar_percent: Decimal,
    #[serde(default)]
    scholar_payout: Option<u64>,
    #[serde(default)]
    trainer_payout_address: Option<String>,
    #[serde(default)]
    trainer_percent: Option<Decimal>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LegacyDonationEntry {
    name: String,
    account_address: String,
    percent: Decimal,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SplitsFile {
    scholars: Vec<SplitScholarEntry>,
    #[serde(default)]
    donations: Vec<SplitDonationEntry>,
}

#[derive(Deserialize)]
struct SplitScholarEntry {
    name: String,
    ronin: String,
    splits: Vec<SplitEntry>,
}

#[derive(Deserialize)]
struct SplitEntry {
    persona: String,
    percentage: Decimal,
    ronin: String,
}

#[derive(Deserialize)]
struct SplitDonationEntry {
    name: String,
    ronin: String,
    percentage: Decimal,
}

const LEGACY_KEYS: [&str; 3] = ["Manager", "Scholars", "Donations"];
const SPLITS_KEYS: [&str; 2] = ["scholars", "donations"];

/// Classifies the payments file by its top-level keys only.
///
/// A file using keys of both layouts is rejected.
pub fn detect_dialect(payments: &Value) -> Result<Dialect, ConfigError> {
    let object = payments.as_object().ok_or_else(|| {
        ConfigError::Structure("expected a JSON object at the top level".to_string())
    })?;
    let present = |keys: &[&str]| -> Vec<String> {
        keys.iter()
            .filter(|key| object.contains_key(**key))
            .map(|key| key.to_string())
            .collect()
    };
    let legacy = present(&LEGACY_KEYS);
    let splits = present(&SPLITS_KEYS);
    if !legacy.is_empty() && !splits.is_empty() {
        return Err(ConfigError::Structure(format!(
            "file mixes the legacy layout ({}) with the splits layout ({})",
            legacy.join(", "),
            splits.join(", ")
        )));
    }
    if object.contains_key("Manager") && object.contains_key("Scholars") {
        return Ok(Dialect::Legacy);
    }
    if object.contains_key("scholars") {
        return Ok(Dialect::New);
    }
    Err(ConfigError::Structure(
        "expected either Manager and Scholars, or scholars with splits, at the top level"
            .to_string(),
    ))
}

pub fn validate(payments: &Value, secrets: &SecretMap) -> Result<ValidatedPayouts, ConfigError> {
    let dialect = detect_dialect(payments)?;
    tracing::debug!(%dialect, "Detected payments file dialect");
    let (manager, configs, donations) = match dialect {
        Dialect::Legacy => {
            let file = LegacyFile::deserialize(payments).map_err(structure_error)?;
            validate_legacy(file)?
        }
        Dialect::New => {
            let file = SplitsFile::deserialize(payments).map_err(structure_error)?;
            let (configs, donations) = validate_splits(file)?;
            (None, configs, donations)
        }
    };

    let scholars = configs
        .into_iter()
        .map(|config| {
            let private_key = resolve_key(&config, secrets)?;
            Ok(ScholarAccount {
                config,
                private_key,
            })
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    Ok(ValidatedPayouts {
        dialect,
        manager,
        scholars,
        donations,
    })
}

type Normalized = (Option<Address>, Vec<ScholarConfig>, Vec<Donation>);

fn validate_legacy(file: LegacyFile) -> Result<Normalized, ConfigError> {
    let root = FieldPath::root();
    let manager = parse_address(&file.manager, root.key("Manager"))?;

    let mut scholars = Vec::with_capacity(file.scholars.len());
    for (i, entry) in file.scholars.into_iter().enumerate() {
        let path = root.key("Scholars").index(i);
        check_name(&entry.name, path.key("Name"))?;
        let account = parse_address(&entry.account_address, path.key("AccountAddress"))?;
        let payout_address =
            parse_address(&entry.scholar_payout_address, path.key("ScholarPayoutAddress"))?;
        let percent = check_percent(entry.scholar_percent, path.key("ScholarPercent"))?;
        let trainer = match (entry.trainer_payout_address, entry.trainer_percent) {
            (Some(address), Some(percent)) => Some(Trainer {
                address: parse_address(&address, path.key("TrainerPayoutAddress"))?,
                percent: check_percent(percent, path.key("TrainerPercent"))?,
            }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::semantic(
                    "TrainerPayoutAddress and TrainerPercent must be given together",
                    path,
                ));
            }
        };
        scholars.push(LegacyScholar {
            name: entry.name,
            account,
            payout_address,
            percent,
            fixed_payout: entry.scholar_payout,
            trainer,
            manager,
        });
    }

    let mut donations = Vec::with_capacity(file.donations.len());
    for (i, entry) in file.donations.into_iter().enumerate() {
        let path = root.key("Donations").index(i);
        check_name(&entry.name, path.key("Name"))?;
        donations.push(Donation {
            address: parse_address(&entry.account_address, path.key("AccountAddress"))?,
            percent: check_percent(entry.percent, path.key("Percent"))?,
            name: entry.name,
        });
    }

    let donated = check_total(donation_total(&donations), root.key("Donations"))?;
    for (i, scholar) in scholars.iter().enumerate() {
        let trainer = scholar.trainer.as_ref().map_or(Decimal::ZERO, |t| t.percent);
        check_total(
            scholar.percent + trainer + donated,
            root.key("Scholars").index(i),
        )?;
    }

    Ok((
        Some(manager),
        scholars.into_iter().map(ScholarConfig::Legacy).collect(),
        donations,
    ))
}

fn validate_splits(file: SplitsFile) -> Result<(Vec<ScholarConfig>, Vec<Donation>), ConfigError> {
    let root = FieldPath::root();

    let mut scholars = Vec::with_capacity(file.scholars.len());
    for (i, entry) in file.scholars.into_iter().enumerate() {
        let path = root.key("scholars").index(i);
        check_name(&entry.name, path.key("name"))?;
        let account = parse_address(&entry.ronin, path.key("ronin"))?;
        if entry.splits.is_empty() {
            return Err(ConfigError::semantic(
                "[] should be non-empty",
                path.key("splits"),
            ));
        }
        let mut splits = Vec::with_capacity(entry.splits.len());
        for (j, split) in entry.splits.into_iter().enumerate() {
            let split_path = path.key("splits").index(j);
            check_name(&split.persona, split_path.key("persona"))?;
            splits.push(Split {
                address: parse_address(&split.ronin, split_path.key("ronin"))?,
                percent: check_percent(split.percentage, split_path.key("percentage"))?,
                persona: split.persona,
            });
        }
        scholars.push(SplitScholar {
            name: entry.name,
            account,
            splits,
        });
    }

    let mut donations = Vec::with_capacity(file.donations.len());
    for (i, entry) in file.donations.into_iter().enumerate() {
        let path = root.key("donations").index(i);
        check_name(&entry.name, path.key("name"))?;
        donations.push(Donation {
            address: parse_address(&entry.ronin, path.key("ronin"))?,
            percent: check_percent(entry.percentage, path.key("percentage"))?,
            name: entry.name,
        });
    }

    let donated = check_total(donation_total(&donations), root.key("donations"))?;
    for (i, scholar) in scholars.iter().enumerate() {
        let declared: Decimal = scholar.splits.iter().map(|s| s.percent).sum();
        check_total(
            declared + donated,
            root.key("scholars").index(i).key("splits"),
        )?;
    }

    Ok((
        scholars.into_iter().map(ScholarConfig::New).collect(),
        donations,
    ))
}

fn resolve_key(config: &ScholarConfig, secrets: &SecretMap) -> Result<PrivateKey, ConfigError> {
    if secrets.is_conflicting(config.account()) {
        return Err(ConfigError::SecretMalformed {
            account: config.account().to_string(),
        });
    }
    let raw = secrets
        .get(config.account())
        .ok_or_else(|| ConfigError::SecretMissing {
            scholar: config.name().to_string(),
        })?;
    PrivateKey::parse(raw).ok_or_else(|| ConfigError::SecretMalformed {
        account: config.account().to_string(),
    })
}

fn structure_error(e: serde_json::Error) -> ConfigError {
    ConfigError::Structure(e.to_string())
}

fn parse_address(raw: &str, path: FieldPath) -> Result<Address, ConfigError> {
    Address::parse(raw).map_err(|e| ConfigError::semantic(e.to_string(), path))
}

fn check_name(name: &str, path: FieldPath) -> Result<(), ConfigError> {
    if name.trim().is_empty() {
        return Err(ConfigError::semantic(format!("'{}' is too short", name), path));
    }
    Ok(())
}

fn check_percent(value: Decimal, path: FieldPath) -> Result<Decimal, ConfigError> {
    if value < Decimal::ZERO {
        return Err(ConfigError::semantic(
            format!("{} is less than the minimum of 0", value),
            path,
        ));
    }
    if value > MAX_PERCENT {
        return Err(ConfigError::semantic(
            format!("{} is greater than the maximum of {}", value, MAX_PERCENT),
            path,
        ));
    }
    Ok(value)
}

fn check_total(total: Decimal, path: FieldPath) -> Result<Decimal, ConfigError> {
    if total > MAX_PERCENT {
        return Err(ConfigError::semantic(
            format!(
                "percentages add up to {}, which is greater than the maximum of {}",
                total, MAX_PERCENT
            ),
            path,
        ));
    }
    Ok(total)
}

fn donation_total(donations: &[Donation]) -> Decimal {
    donations.iter().map(|d| d.percent).sum()
}
