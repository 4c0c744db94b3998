// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Masking profile loader.
//! A profile is an XML document listing the columns to mask plus optional
//! word lists and date ranges. The built-in profile is embedded at compile
//! time; `--profile` swaps in a file from disk. Either way the result is a
//! single immutable `MaskProfile` handed to the engine by reference.

pub mod columns;
mod wordlists;

pub use columns::{ColumnLength, ColumnSpec, DataType, DateBounds, IntRange, TimestampBounds};
pub use wordlists::WordLists;

use crate::error::{MaskError, Result};
use crate::masking::records::parse_delimiter;
use roxmltree::{Document, Node};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;

const DEFAULT_PROFILE_XML: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/resources/default_profile.xml"
));

/// Everything the engine needs to know about a file layout.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskProfile {
    pub delimiter: Option<char>,
    /// Sorted by position, positions unique.
    pub columns: Vec<ColumnSpec>,
    pub word_lists: WordLists,
    pub dates: DateBounds,
    pub timestamps: TimestampBounds,
}

impl MaskProfile {
    pub fn embedded() -> Result<Self> {
        Self::from_xml(DEFAULT_PROFILE_XML)
    }

    /// Load the profile at `path`, or the embedded one when no path is given.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            None => Self::embedded(),
            Some(path) => {
                let xml = fs::read_to_string(path)
                    .map_err(|e| MaskError::io(format!("failed to read profile {path}"), e))?;
                Self::from_xml(&xml).map_err(|err| match err {
                    MaskError::Configuration { message } => {
                        MaskError::configuration(format!("{path}: {message}"))
                    }
                    other => other,
                })
            }
        }
    }

    pub fn from_xml(xml: &str) -> Result<Self> {
        let doc = Document::parse(xml)
            .map_err(|e| MaskError::configuration(format!("invalid profile XML: {e}")))?;
        let root = doc.root_element();
        if !root.has_tag_name("masking") {
            return Err(MaskError::configuration(format!(
                "expected <masking> root element, found <{}>",
                root.tag_name().name()
            )));
        }

        let delimiter = root.attribute("delimiter").map(parse_delimiter).transpose()?;

        let dates = match find_child(root, "dates") {
            Some(node) => DateBounds::parse(&attr(node, "start")?, &attr(node, "end")?)?,
            None => DateBounds::default(),
        };
        let timestamps = match find_child(root, "timestamps") {
            Some(node) => TimestampBounds::parse(&attr(node, "start")?, &attr(node, "end")?)?,
            None => TimestampBounds::default(),
        };

        let columns_node = find_child(root, "columns")
            .ok_or_else(|| MaskError::configuration("missing <columns> section"))?;
        let mut columns = children_with_tag(columns_node, "column")
            .map(parse_column)
            .collect::<Result<Vec<_>>>()?;
        columns.sort_by_key(|c| c.position);
        let mut seen = BTreeSet::new();
        for column in &columns {
            if !seen.insert(column.position) {
                return Err(MaskError::configuration(format!(
                    "column position {} is declared more than once",
                    column.position
                )));
            }
        }

        let mut word_lists = WordLists::embedded();
        for node in children_with_tag(root, "wordlist") {
            let name = attr(node, "name")?;
            let words = children_with_tag(node, "word")
                .filter_map(|w| w.text())
                .map(str::trim)
                .filter(|w| !w.is_empty())
                .map(str::to_string)
                .collect();
            word_lists.replace(&name, words)?;
        }

        Ok(MaskProfile {
            delimiter,
            columns,
            word_lists,
            dates,
            timestamps,
        })
    }

    pub fn column_at(&self, position: usize) -> Option<&ColumnSpec> {
        self.columns
            .binary_search_by_key(&position, |c| c.position)
            .ok()
            .map(|idx| &self.columns[idx])
    }

    /// Minimum number of fields a row needs before it can be masked.
    pub fn required_fields(&self) -> usize {
        self.columns.last().map(|c| c.position + 1).unwrap_or(0)
    }
}

fn parse_column(node: Node) -> Result<ColumnSpec> {
    let position_raw = attr(node, "position")?;
    let position: usize = position_raw.trim().parse().map_err(|_| {
        MaskError::configuration(format!("invalid column position '{position_raw}'"))
    })?;
    let name = node
        .attribute("name")
        .map(str::to_string)
        .unwrap_or_else(|| format!("COLUMN_{position}"));
    let data_type = DataType::parse(&attr(node, "type")?);
    let length = node
        .attribute("length")
        .filter(|s| !s.trim().is_empty())
        .map(ColumnLength::parse)
        .transpose()
        .map_err(|err| match err {
            MaskError::Configuration { message } => {
                MaskError::configuration(format!("column {position} ({name}): {message}"))
            }
            other => other,
        })?;

    let mut params = BTreeMap::new();
    for param in children_with_tag(node, "param") {
        let key = attr(param, "name")?;
        let value = param
            .attribute("value")
            .or_else(|| param.text())
            .unwrap_or_default()
            .to_string();
        params.insert(key, value);
    }

    ColumnSpec::new(position, &name, data_type, length, params)
}

fn find_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.has_tag_name(tag))
}

fn children_with_tag<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |child| child.is_element() && child.has_tag_name(tag))
}

fn attr(node: Node, name: &str) -> Result<String> {
    node.attribute(name).map(str::to_string).ok_or_else(|| {
        MaskError::configuration(format!(
            "missing attribute '{name}' on <{}>",
            node.tag_name().name()
        ))
    })
}
