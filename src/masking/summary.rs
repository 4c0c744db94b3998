// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Per-run bookkeeping: how many rows were read, padded and masked, and how
//! each configured column fared. Rendered as a table on stdout and optionally
//! written out as an XML report.

use crate::masking::strategy::{MaskOutcome, StrategyRegistry};
use crate::profile::MaskProfile;
use anyhow::Context;
use serde::Serialize;
use std::io::{self, Write};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename = "mask-run")]
pub struct MaskSummary {
    #[serde(rename = "@input")]
    pub input: String,
    #[serde(rename = "@output")]
    pub output: String,
    #[serde(rename = "@bypassed")]
    pub bypassed: bool,
    #[serde(rename = "@sentinels")]
    pub sentinels: usize,
    #[serde(rename = "@rows-read")]
    pub rows_read: usize,
    #[serde(rename = "@rows-padded")]
    pub rows_padded: usize,
    #[serde(rename = "@rows-masked")]
    pub rows_masked: usize,
    #[serde(rename = "@rows-kept")]
    pub rows_kept: usize,
    #[serde(rename = "@rows-malformed")]
    pub rows_malformed: usize,
    #[serde(rename = "@rows-blank")]
    pub rows_blank: usize,
    #[serde(rename = "column")]
    pub columns: Vec<ColumnSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSummary {
    #[serde(rename = "@position")]
    pub position: usize,
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@strategy")]
    pub strategy: &'static str,
    #[serde(rename = "@masked")]
    pub masked: usize,
    #[serde(rename = "@passed-through")]
    pub passed_through: usize,
}

impl MaskSummary {
    /// Empty summary with one entry per configured column.
    pub fn for_profile(profile: &MaskProfile, registry: &StrategyRegistry) -> Self {
        let columns = profile
            .columns
            .iter()
            .map(|c| ColumnSummary {
                position: c.position,
                name: c.name.clone(),
                strategy: registry.resolve(&c.name).name(),
                masked: 0,
                passed_through: 0,
            })
            .collect();
        Self {
            columns,
            ..Self::default()
        }
    }

    pub fn record(&mut self, position: usize, outcome: &MaskOutcome) {
        if let Some(column) = self.columns.iter_mut().find(|c| c.position == position) {
            if outcome.is_masked() {
                column.masked += 1;
            } else {
                column.passed_through += 1;
            }
        }
    }

    pub fn total_masked(&self) -> usize {
        self.columns.iter().map(|c| c.masked).sum()
    }

    pub fn total_passed_through(&self) -> usize {
        self.columns.iter().map(|c| c.passed_through).sum()
    }

    pub fn render<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Masked: {} -> {}", self.input, self.output)?;
        if self.bypassed {
            writeln!(out, "  masking disabled (no header flag); file copied unchanged")?;
            return Ok(());
        }
        writeln!(
            out,
            "  rows read {}, padded {}, masked {}, kept {}, malformed {}, blank {}, sentinels {}",
            self.rows_read,
            self.rows_padded,
            self.rows_masked,
            self.rows_kept,
            self.rows_malformed,
            self.rows_blank,
            self.sentinels
        )?;
        writeln!(
            out,
            "\n  {:>4} {:<20} {:<26} {:>8} {:>8}",
            "Pos", "Column", "Strategy", "Masked", "Passed"
        )?;
        for column in &self.columns {
            writeln!(
                out,
                "  {:>4} {:<20} {:<26} {:>8} {:>8}",
                column.position,
                column.name,
                column.strategy,
                column.masked,
                column.passed_through
            )?;
        }
        Ok(())
    }

    pub fn to_xml(&self) -> anyhow::Result<String> {
        quick_xml::se::to_string(self).context("failed to serialise run summary")
    }
}
