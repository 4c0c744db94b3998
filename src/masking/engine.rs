// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! File-level masking driver.
//!
//! The whole input is read into memory, sentinel lines are set aside, the
//! row set is padded when more records are requested than exist, the leading
//! slice of rows is masked column by column and everything is written back
//! in one go. Rows outside the masked slice are emitted byte for byte.

use crate::error::{MaskError, Result};
use crate::masking::aliases::AliasCache;
use crate::masking::normalizer::normalize;
use crate::masking::records::{
    DEFAULT_DELIMITER, RecordSet, SentinelMode, join_fields, split_fields,
};
use crate::masking::strategy::{MaskingStrategy, StrategyRegistry};
use crate::masking::summary::MaskSummary;
use crate::profile::{ColumnSpec, MaskProfile};
use rand::Rng;
use std::fs;
use std::path::Path;
use tracing::{debug, info, trace, warn};

/// How many leading data rows to mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordTarget {
    Nothing,
    All,
    Leading(usize),
}

impl RecordTarget {
    /// `-1` masks every row, `0` none, `n > 0` the first `n` (padding if needed).
    pub fn from_count(count: i64) -> Result<Self> {
        match count {
            -1 => Ok(RecordTarget::All),
            0 => Ok(RecordTarget::Nothing),
            n if n > 0 => usize::try_from(n)
                .map(RecordTarget::Leading)
                .map_err(|_| MaskError::configuration(format!("record count {n} is too large"))),
            n => Err(MaskError::configuration(format!(
                "invalid record count {n}: use -1 (all), 0 (none) or a positive number"
            ))),
        }
    }
}

/// What to do with a row that has fewer fields than the profile addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedRowPolicy {
    #[default]
    Error,
    PassThrough,
}

impl MalformedRowPolicy {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(MalformedRowPolicy::Error),
            "pass" | "pass-through" | "passthrough" => Ok(MalformedRowPolicy::PassThrough),
            other => Err(MaskError::configuration(format!(
                "invalid malformed-row policy '{other}' (expected error or pass)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskOptions {
    pub target: RecordTarget,
    pub sentinels: SentinelMode,
    /// When false the input is copied unchanged.
    pub header_present: bool,
    pub delimiter: char,
    pub malformed: MalformedRowPolicy,
    pub consistent: bool,
}

impl Default for MaskOptions {
    fn default() -> Self {
        Self {
            target: RecordTarget::All,
            sentinels: SentinelMode::None,
            header_present: true,
            delimiter: DEFAULT_DELIMITER,
            malformed: MalformedRowPolicy::Error,
            consistent: false,
        }
    }
}

pub struct MaskingEngine<'a> {
    profile: &'a MaskProfile,
    registry: &'a StrategyRegistry,
}

impl<'a> MaskingEngine<'a> {
    /// Bind a profile to a registry, rejecting columns their strategy cannot handle.
    pub fn new(profile: &'a MaskProfile, registry: &'a StrategyRegistry) -> Result<Self> {
        registry.check_profile(profile)?;
        Ok(Self { profile, registry })
    }

    /// Mask `input` into `output`. The output file is complete when this returns `Ok`.
    pub fn mask_file<R: Rng + ?Sized>(
        &self,
        input: &Path,
        output: &Path,
        options: &MaskOptions,
        rng: &mut R,
    ) -> Result<MaskSummary> {
        let bytes = fs::read(input)
            .map_err(|e| MaskError::io(format!("failed to read {}", input.display()), e))?;

        let (rendered, mut summary) = if options.header_present {
            let text = String::from_utf8(bytes).map_err(|e| {
                MaskError::data(format!(
                    "{} is not valid UTF-8 (first bad byte at offset {})",
                    input.display(),
                    e.utf8_error().valid_up_to()
                ))
            })?;
            let (masked, summary) = self.mask_text(&text, options, rng)?;
            (masked.into_bytes(), summary)
        } else {
            info!(
                input = %input.display(),
                "header flag not set, copying file without masking"
            );
            let summary = MaskSummary {
                bypassed: true,
                ..MaskSummary::for_profile(self.profile, self.registry)
            };
            (bytes, summary)
        };

        summary.input = input.display().to_string();
        summary.output = output.display().to_string();

        fs::write(output, rendered)
            .map_err(|e| MaskError::io(format!("failed to write {}", output.display()), e))?;
        info!(
            output = %output.display(),
            masked = summary.rows_masked,
            kept = summary.rows_kept,
            "wrote masked file"
        );
        Ok(summary)
    }

    /// In-memory core of [`mask_file`](Self::mask_file).
    pub fn mask_text<R: Rng + ?Sized>(
        &self,
        text: &str,
        options: &MaskOptions,
        rng: &mut R,
    ) -> Result<(String, MaskSummary)> {
        let mut records = RecordSet::split(text, options.sentinels);
        let mut summary = MaskSummary::for_profile(self.profile, self.registry);
        summary.sentinels = records.sentinel_count();
        summary.rows_read = records.rows.len();

        let mask_count = match options.target {
            RecordTarget::Nothing => 0,
            RecordTarget::All => records.rows.len(),
            RecordTarget::Leading(target) => {
                let added = normalize(&mut records.rows, target, rng)?;
                if added > 0 {
                    info!(
                        added,
                        target, "padded record set with rows sampled from the input"
                    );
                }
                summary.rows_padded = added;
                target
            }
        };

        let plan: Vec<(&ColumnSpec, MaskingStrategy)> = self
            .profile
            .columns
            .iter()
            .map(|c| (c, self.registry.resolve(&c.name)))
            .collect();
        let required = self.profile.required_fields();
        let mut aliases = AliasCache::new(options.consistent);

        for idx in 0..mask_count {
            let line = records.line_number(idx);
            let row = &mut records.rows[idx];
            if row.trim().is_empty() {
                trace!(line, "leaving blank row as is");
                summary.rows_blank += 1;
                continue;
            }
            let mut fields = split_fields(row, options.delimiter);
            if fields.len() < required {
                match options.malformed {
                    MalformedRowPolicy::Error => {
                        return Err(MaskError::data(format!(
                            "line {line}: expected at least {required} fields, found {}",
                            fields.len()
                        )));
                    }
                    MalformedRowPolicy::PassThrough => {
                        warn!(
                            line,
                            found = fields.len(),
                            required,
                            "leaving malformed row unmasked"
                        );
                        summary.rows_malformed += 1;
                        continue;
                    }
                }
            }

            for (column, strategy) in &plan {
                let original = std::mem::take(&mut fields[column.position]);
                let outcome = aliases.resolve(column.position, &original, || {
                    strategy.apply(&original, column, self.profile, rng)
                });
                summary.record(column.position, &outcome);
                fields[column.position] = outcome.into_value();
            }
            *row = join_fields(&fields, options.delimiter);
        }

        summary.rows_masked = mask_count - summary.rows_malformed - summary.rows_blank;
        summary.rows_kept = records.rows.len() - mask_count;
        debug!(
            rows = records.rows.len(),
            masked = summary.rows_masked,
            values_masked = summary.total_masked(),
            values_passed = summary.total_passed_through(),
            aliases = aliases.count(),
            "masking pass complete"
        );

        Ok((records.render(), summary))
    }
}
