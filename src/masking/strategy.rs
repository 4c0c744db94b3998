// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Strategy registry: maps a column identifier such as `ACCT` or `GENDER`
//! to the function that fakes its values. Identifiers without a dedicated
//! strategy fall back to a generator chosen from the declared data type.

use crate::error::{MaskError, Result};
use crate::masking::generators;
use crate::profile::{ColumnSpec, DataType, MaskProfile};
use rand::Rng;
use std::collections::HashMap;

const DEFAULT_ALLOWED_VALUES: [&str; 2] = ["F", "M"];

/// Result of masking one value. `PassedThrough` marks a value that was
/// intentionally left alone (length mismatch, unknown type without a length).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaskOutcome {
    Masked(String),
    PassedThrough(String),
}

impl MaskOutcome {
    pub fn is_masked(&self) -> bool {
        matches!(self, MaskOutcome::Masked(_))
    }

    pub fn value(&self) -> &str {
        match self {
            MaskOutcome::Masked(v) | MaskOutcome::PassedThrough(v) => v,
        }
    }

    pub fn into_value(self) -> String {
        match self {
            MaskOutcome::Masked(v) | MaskOutcome::PassedThrough(v) => v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskingStrategy {
    AllowedValues,
    FirstName,
    LastName,
    AnyName,
    OrgName,
    Account,
    Digits,
    /// Type-driven default for unmapped identifiers.
    ByType,
}

impl MaskingStrategy {
    pub fn name(self) -> &'static str {
        match self {
            MaskingStrategy::AllowedValues => "mask_only_allowed_values",
            MaskingStrategy::FirstName => "mask_first_name",
            MaskingStrategy::LastName => "mask_last_name",
            MaskingStrategy::AnyName => "mask_any_name",
            MaskingStrategy::OrgName => "mask_org_name",
            MaskingStrategy::Account => "mask_acct",
            MaskingStrategy::Digits => "mask_integer",
            MaskingStrategy::ByType => "by_type",
        }
    }

    /// Reject column declarations this strategy cannot honour.
    pub fn check(self, column: &ColumnSpec) -> Result<()> {
        match self {
            MaskingStrategy::Account if column.scalar_length().is_none() => {
                Err(MaskError::configuration(format!(
                    "column {} ({}): {} needs a declared length",
                    column.position,
                    column.name,
                    self.name()
                )))
            }
            MaskingStrategy::AllowedValues
                if column.param("values").is_some() && column.allowed_values().is_empty() =>
            {
                Err(MaskError::configuration(format!(
                    "column {} ({}): values list is empty",
                    column.position, column.name
                )))
            }
            _ => Ok(()),
        }
    }

    pub fn apply<R: Rng + ?Sized>(
        self,
        value: &str,
        column: &ColumnSpec,
        profile: &MaskProfile,
        rng: &mut R,
    ) -> MaskOutcome {
        let words = &profile.word_lists;
        match self {
            MaskingStrategy::AllowedValues => {
                let allowed = column.allowed_values();
                let choice = if allowed.is_empty() {
                    DEFAULT_ALLOWED_VALUES[rng.random_range(0..DEFAULT_ALLOWED_VALUES.len())]
                        .to_string()
                } else {
                    allowed[rng.random_range(0..allowed.len())].clone()
                };
                MaskOutcome::Masked(choice)
            }
            MaskingStrategy::FirstName => from_list(value, &words.first_names, rng),
            MaskingStrategy::LastName => from_list(value, &words.last_names, rng),
            MaskingStrategy::AnyName => joined(
                value,
                &words.first_names,
                &words.last_names,
                column.separator(),
                rng,
            ),
            MaskingStrategy::OrgName => joined(
                value,
                &words.org_names,
                &words.org_structure,
                column.separator(),
                rng,
            ),
            MaskingStrategy::Account => match column.scalar_length() {
                Some(len) if value.chars().count() == len => {
                    MaskOutcome::Masked(generators::alphanumeric(rng, len))
                }
                _ => MaskOutcome::PassedThrough(value.to_string()),
            },
            MaskingStrategy::Digits => {
                let len = column
                    .scalar_length()
                    .unwrap_or_else(|| value.chars().count());
                MaskOutcome::Masked(generators::digits(rng, len))
            }
            MaskingStrategy::ByType => mask_by_type(value, column, profile, rng),
        }
    }
}

fn from_list<R: Rng + ?Sized>(value: &str, words: &[String], rng: &mut R) -> MaskOutcome {
    match generators::pick(rng, words) {
        Some(word) => MaskOutcome::Masked(word.to_string()),
        None => MaskOutcome::PassedThrough(value.to_string()),
    }
}

fn joined<R: Rng + ?Sized>(
    value: &str,
    left: &[String],
    right: &[String],
    separator: &str,
    rng: &mut R,
) -> MaskOutcome {
    match (generators::pick(rng, left), generators::pick(rng, right)) {
        (Some(a), Some(b)) => MaskOutcome::Masked(format!("{a}{separator}{b}")),
        _ => MaskOutcome::PassedThrough(value.to_string()),
    }
}

fn mask_by_type<R: Rng + ?Sized>(
    value: &str,
    column: &ColumnSpec,
    profile: &MaskProfile,
    rng: &mut R,
) -> MaskOutcome {
    match &column.data_type {
        DataType::Char | DataType::Varchar => {
            let len = column
                .scalar_length()
                .unwrap_or_else(|| value.chars().count());
            MaskOutcome::Masked(generators::alphanumeric(rng, len))
        }
        DataType::Decimal => match column.decimal_shape() {
            Some((precision, scale)) => {
                MaskOutcome::Masked(generators::decimal(rng, precision, scale))
            }
            None => MaskOutcome::PassedThrough(value.to_string()),
        },
        DataType::Date => {
            let bounds = column.dates.as_ref().unwrap_or(&profile.dates);
            MaskOutcome::Masked(generators::date_between(rng, bounds))
        }
        DataType::Timestamp => {
            let bounds = column.timestamps.as_ref().unwrap_or(&profile.timestamps);
            MaskOutcome::Masked(generators::timestamp_between(rng, bounds))
        }
        DataType::Integer => match column.scalar_length() {
            Some(len) => MaskOutcome::Masked(generators::integer_of_length(rng, len as u32)),
            None => {
                let range = column.range.unwrap_or_default();
                MaskOutcome::Masked(generators::integer_in_range(rng, &range))
            }
        },
        DataType::Other(_) => match column.scalar_length() {
            Some(len) => MaskOutcome::Masked(generators::alphanumeric(rng, len)),
            None => MaskOutcome::PassedThrough(value.to_string()),
        },
    }
}

/// Identifier to strategy lookup. Identifiers are matched case-insensitively.
#[derive(Debug, Clone)]
pub struct StrategyRegistry {
    strategies: HashMap<String, MaskingStrategy>,
}

impl StrategyRegistry {
    pub fn builtin() -> Self {
        let strategies = [
            ("GENDER", MaskingStrategy::AllowedValues),
            ("FIRST_NAME", MaskingStrategy::FirstName),
            ("LAST_NAME", MaskingStrategy::LastName),
            ("ANY_NAME", MaskingStrategy::AnyName),
            ("ORG_NAME", MaskingStrategy::OrgName),
            ("ACCT", MaskingStrategy::Account),
            ("SIN", MaskingStrategy::Digits),
        ]
        .into_iter()
        .map(|(id, strategy)| (id.to_string(), strategy))
        .collect();
        Self { strategies }
    }

    pub fn resolve(&self, identifier: &str) -> MaskingStrategy {
        self.strategies
            .get(&identifier.trim().to_ascii_uppercase())
            .copied()
            .unwrap_or(MaskingStrategy::ByType)
    }

    /// Validate every column of `profile` against the strategy it resolves to.
    pub fn check_profile(&self, profile: &MaskProfile) -> Result<()> {
        for column in &profile.columns {
            self.resolve(&column.name).check(column)?;
        }
        Ok(())
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ColumnLength;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::BTreeMap;

    fn column(name: &str, data_type: DataType, length: Option<&str>) -> ColumnSpec {
        column_with(name, data_type, length, &[])
    }

    fn column_with(
        name: &str,
        data_type: DataType,
        length: Option<&str>,
        params: &[(&str, &str)],
    ) -> ColumnSpec {
        let params: BTreeMap<String, String> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ColumnSpec::new(
            0,
            name,
            data_type,
            length.map(|l| ColumnLength::parse(l).unwrap()),
            params,
        )
        .unwrap()
    }

    fn profile() -> MaskProfile {
        MaskProfile::embedded().unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn resolves_builtins_and_falls_back() {
        let registry = StrategyRegistry::builtin();
        assert_eq!(registry.resolve("ACCT"), MaskingStrategy::Account);
        assert_eq!(registry.resolve("gender"), MaskingStrategy::AllowedValues);
        assert_eq!(registry.resolve(" sin "), MaskingStrategy::Digits);
        assert_eq!(registry.resolve("BALANCE"), MaskingStrategy::ByType);
        assert_eq!(registry.resolve("ORG_NAME").name(), "mask_org_name");
    }

    #[test]
    fn acct_masks_only_exact_length_values() {
        let profile = profile();
        let spec = column("ACCT", DataType::Char, Some("10"));
        let mut rng = rng();

        let masked = MaskingStrategy::Account.apply("1234567890", &spec, &profile, &mut rng);
        assert!(masked.is_masked());
        assert_eq!(masked.value().len(), 10);
        assert!(
            masked
                .value()
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );

        let short = MaskingStrategy::Account.apply("12345678", &spec, &profile, &mut rng);
        assert_eq!(short, MaskOutcome::PassedThrough("12345678".to_string()));
    }

    #[test]
    fn acct_without_length_is_a_configuration_error() {
        let spec = column("ACCT", DataType::Char, None);
        assert!(MaskingStrategy::Account.check(&spec).is_err());
    }

    #[test]
    fn gender_only_emits_allowed_values() {
        let profile = profile();
        let mut rng = rng();
        let defaulted = column("GENDER", DataType::Char, Some("1"));
        let custom = column_with("GENDER", DataType::Char, Some("1"), &[("values", "U")]);
        for input in ["F", "M", "X", ""] {
            let out = MaskingStrategy::AllowedValues.apply(input, &defaulted, &profile, &mut rng);
            assert!(matches!(out.value(), "F" | "M"), "{out:?}");
            let out = MaskingStrategy::AllowedValues.apply(input, &custom, &profile, &mut rng);
            assert_eq!(out.value(), "U");
        }
        let empty = column_with("GENDER", DataType::Char, Some("1"), &[("values", ",")]);
        assert!(MaskingStrategy::AllowedValues.check(&empty).is_err());
    }

    #[test]
    fn names_come_from_word_lists() {
        let profile = profile();
        let mut rng = rng();
        let spec = column_with("ANY_NAME", DataType::Varchar, None, &[("separator", ", ")]);

        let first = MaskingStrategy::FirstName.apply("Bob", &spec, &profile, &mut rng);
        assert!(profile.word_lists.first_names.contains(&first.into_value()));

        let full = MaskingStrategy::AnyName.apply("Bob Smith", &spec, &profile, &mut rng);
        let (given, family) = full.value().split_once(", ").expect("separator");
        assert!(profile.word_lists.first_names.iter().any(|n| n == given));
        assert!(profile.word_lists.last_names.iter().any(|n| n == family));

        let plain = column("ORG_NAME", DataType::Varchar, None);
        let org = MaskingStrategy::OrgName.apply("Initech", &plain, &profile, &mut rng);
        let (name, structure) = org.value().split_once(' ').expect("space separator");
        assert!(profile.word_lists.org_names.iter().any(|n| n == name));
        assert!(profile.word_lists.org_structure.iter().any(|n| n == structure));
    }

    #[test]
    fn sin_digits_keep_leading_zero_possibility() {
        let profile = profile();
        let mut rng = rng();
        let spec = column("SIN", DataType::Char, Some("9"));
        let out = MaskingStrategy::Digits.apply("046454286", &spec, &profile, &mut rng);
        assert_eq!(out.value().len(), 9);
        assert!(out.value().chars().all(|c| c.is_ascii_digit()));

        let no_length = column("SIN", DataType::Char, None);
        let out = MaskingStrategy::Digits.apply("12345", &no_length, &profile, &mut rng);
        assert_eq!(out.value().len(), 5);
    }

    #[test]
    fn by_type_covers_declared_types() {
        let profile = profile();
        let mut rng = rng();

        let varchar = column("NOTE", DataType::Varchar, None);
        let out = MaskingStrategy::ByType.apply("hello", &varchar, &profile, &mut rng);
        assert_eq!(out.value().len(), 5);

        let char12 = column("CODE", DataType::Char, Some("12"));
        let out = MaskingStrategy::ByType.apply("x", &char12, &profile, &mut rng);
        assert_eq!(out.value().len(), 12);

        let dec = column("BAL", DataType::Decimal, Some("8,3"));
        let out = MaskingStrategy::ByType.apply("1.0", &dec, &profile, &mut rng);
        let (_, frac) = out.value().split_once('.').expect("point");
        assert_eq!(frac.len(), 3);

        let date = column_with(
            "DOB",
            DataType::Date,
            None,
            &[("start", "1999-12-31"), ("end", "1999-12-31")],
        );
        let out = MaskingStrategy::ByType.apply("2020-01-01", &date, &profile, &mut rng);
        assert_eq!(out.value(), "1999-12-31");

        let ts = column("SEEN", DataType::Timestamp, None);
        let out = MaskingStrategy::ByType.apply("", &ts, &profile, &mut rng);
        assert!(out.value().ends_with(":000000"));

        let int = column("BRANCH", DataType::Integer, Some("4"));
        let out = MaskingStrategy::ByType.apply("7", &int, &profile, &mut rng);
        assert_eq!(out.value().len(), 4);

        let ranged = column_with("QTY", DataType::Integer, None, &[("max", "3")]);
        let out = MaskingStrategy::ByType.apply("7", &ranged, &profile, &mut rng);
        assert!(out.value().parse::<i64>().unwrap() <= 3);
    }

    #[test]
    fn unknown_types_pass_through_without_length() {
        let profile = profile();
        let mut rng = rng();
        let blob = column("PAYLOAD", DataType::parse("BLOB"), None);
        let out = MaskingStrategy::ByType.apply("abc", &blob, &profile, &mut rng);
        assert_eq!(out, MaskOutcome::PassedThrough("abc".to_string()));

        let sized = column("PAYLOAD", DataType::parse("BLOB"), Some("6"));
        let out = MaskingStrategy::ByType.apply("abc", &sized, &profile, &mut rng);
        assert!(out.is_masked());
        assert_eq!(out.value().len(), 6);
    }

    #[test]
    fn check_profile_accepts_embedded_profile() {
        let registry = StrategyRegistry::default();
        assert!(registry.check_profile(&profile()).is_ok());
    }
}
