//! Grid domain models.
//!
//! A [`Grid`] owns its line items and every derived total. Totals are kept in
//! step with the items by [`Grid::from_items`] at load time and by
//! [`Grid::apply_edit`](crate::grid::Grid::apply_edit) afterwards; nothing else
//! can reach the totals mutably.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::columns::{ColumnConflict, ColumnDialect};
use crate::errors::{Error, Result};
use crate::periods::{MonthKey, Period};

/// One record as returned by the row-fetch endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow(pub Map<String, Value>);

impl RawRow {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    /// Column value as trimmed text. Numbers are rendered, blanks are `None`.
    pub fn text(&self, column: &str) -> Option<String> {
        match self.0.get(column)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl From<Map<String, Value>> for RawRow {
    fn from(map: Map<String, Value>) -> Self {
        RawRow(map)
    }
}

/// Response of the row-fetch endpoint: flat records plus their column names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowSet {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<RawRow>,
}

/// One reportable row with a sparse amount per month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: String,
    pub name: String,
    pub group_key: Option<String>,
    pub amounts: BTreeMap<MonthKey, Decimal>,
    /// Source column of each month, used when writing an edit back.
    pub columns: BTreeMap<MonthKey, String>,
    pub dialect: Option<ColumnDialect>,
    pub column_prefix: Option<String>,
    pub total: Decimal,
}

impl LineItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, group_key: Option<String>) -> Self {
        LineItem {
            id: id.into(),
            name: name.into(),
            group_key,
            amounts: BTreeMap::new(),
            columns: BTreeMap::new(),
            dialect: None,
            column_prefix: None,
            total: Decimal::ZERO,
        }
    }

    /// Adds an amount, replacing any previous value for that month.
    pub fn with_amount(mut self, month: MonthKey, amount: Decimal) -> Self {
        self.amounts.insert(month, amount);
        self
    }

    /// Amount for a month; absent months are zero.
    pub fn amount(&self, month: &MonthKey) -> Decimal {
        self.amounts.get(month).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn total_over(&self, months: &[MonthKey]) -> Decimal {
        months.iter().map(|m| self.amount(m)).sum()
    }

    /// Column name to send with an update of `month`.
    pub fn column_for(&self, month: &MonthKey) -> String {
        match self.columns.get(month) {
            Some(name) => name.clone(),
            None => self
                .dialect
                .unwrap_or(ColumnDialect::Canonical)
                .format(month, self.column_prefix.as_deref()),
        }
    }

    fn recompute_total(&mut self) {
        self.total = self.amounts.values().copied().sum();
    }
}

/// Derived totals of all items sharing a group key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub key: String,
    pub member_ids: Vec<String>,
    pub monthly_totals: BTreeMap<MonthKey, Decimal>,
    pub total: Decimal,
}

impl Group {
    fn new(key: String) -> Self {
        Group {
            key,
            member_ids: Vec::new(),
            monthly_totals: BTreeMap::new(),
            total: Decimal::ZERO,
        }
    }

    pub fn total_for(&self, month: &MonthKey) -> Decimal {
        self.monthly_totals
            .get(month)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn total_over(&self, months: &[MonthKey]) -> Decimal {
        months.iter().map(|m| self.total_for(m)).sum()
    }
}

/// Outcome of one accepted cell edit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellChange {
    pub item_id: String,
    pub month: MonthKey,
    pub column: String,
    pub previous: Option<Decimal>,
    pub current: Decimal,
    pub delta: Decimal,
    pub group_key: Option<String>,
}

/// The full table with its three tiers of totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Grid {
    pub(crate) items: Vec<LineItem>,
    #[serde(skip)]
    pub(crate) index: HashMap<String, usize>,
    pub(crate) groups: BTreeMap<String, Group>,
    pub(crate) group_order: Vec<String>,
    pub(crate) grand_totals: BTreeMap<MonthKey, Decimal>,
    pub(crate) grand_total: Decimal,
    pub(crate) conflicts: Vec<ColumnConflict>,
}

struct Totals {
    groups: BTreeMap<String, Group>,
    group_order: Vec<String>,
    grand_totals: BTreeMap<MonthKey, Decimal>,
    grand_total: Decimal,
}

fn compute_totals(items: &[LineItem]) -> Totals {
    let mut groups: BTreeMap<String, Group> = BTreeMap::new();
    let mut group_order = Vec::new();

    for item in items {
        let Some(key) = &item.group_key else {
            continue;
        };
        let group = groups.entry(key.clone()).or_insert_with(|| {
            group_order.push(key.clone());
            Group::new(key.clone())
        });
        group.member_ids.push(item.id.clone());
        for (month, amount) in &item.amounts {
            *group.monthly_totals.entry(*month).or_insert(Decimal::ZERO) += *amount;
        }
        group.total += item.total;
    }

    let mut grand_totals: BTreeMap<MonthKey, Decimal> = BTreeMap::new();
    let mut grand_total = Decimal::ZERO;
    for group in groups.values() {
        for (month, amount) in &group.monthly_totals {
            *grand_totals.entry(*month).or_insert(Decimal::ZERO) += *amount;
        }
        grand_total += group.total;
    }

    Totals {
        groups,
        group_order,
        grand_totals,
        grand_total,
    }
}

impl Grid {
    /// Builds a grid from ready line items, deriving every total.
    ///
    /// Items keep their order. A later item whose id is already taken is
    /// dropped.
    pub fn from_items(items: Vec<LineItem>, conflicts: Vec<ColumnConflict>) -> Self {
        let mut index = HashMap::with_capacity(items.len());
        let mut kept = Vec::with_capacity(items.len());
        for mut item in items {
            if index.contains_key(&item.id) {
                log::warn!("Duplicate line item id '{}', dropping later row", item.id);
                continue;
            }
            item.recompute_total();
            index.insert(item.id.clone(), kept.len());
            kept.push(item);
        }

        let totals = compute_totals(&kept);
        Grid {
            items: kept,
            index,
            groups: totals.groups,
            group_order: totals.group_order,
            grand_totals: totals.grand_totals,
            grand_total: totals.grand_total,
            conflicts,
        }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn item(&self, item_id: &str) -> Option<&LineItem> {
        self.index.get(item_id).map(|&i| &self.items[i])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn group(&self, key: &str) -> Option<&Group> {
        self.groups.get(key)
    }

    /// Groups in the order their first member appeared.
    pub fn groups_in_order(&self) -> impl Iterator<Item = &Group> {
        self.group_order.iter().filter_map(|k| self.groups.get(k))
    }

    /// Items without a group key. They never count towards the grand total.
    pub fn ungrouped_items(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter().filter(|i| i.group_key.is_none())
    }

    pub fn grand_total_for(&self, month: &MonthKey) -> Decimal {
        self.grand_totals
            .get(month)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn grand_totals(&self) -> &BTreeMap<MonthKey, Decimal> {
        &self.grand_totals
    }

    pub fn grand_total(&self) -> Decimal {
        self.grand_total
    }

    /// Same-month column clashes found while reading the rows.
    pub fn column_conflicts(&self) -> &[ColumnConflict] {
        &self.conflicts
    }

    /// Every month carried by at least one item.
    pub fn months(&self) -> BTreeSet<MonthKey> {
        self.items
            .iter()
            .flat_map(|i| i.amounts.keys().copied())
            .collect()
    }

    /// Recomputes every tier from the items and reports the first mismatch.
    pub fn verify_totals(&self) -> Result<()> {
        for item in &self.items {
            let expected: Decimal = item.amounts.values().copied().sum();
            if expected != item.total {
                return Err(Error::Unexpected(format!(
                    "Row total of '{}' is {}, expected {}",
                    item.id, item.total, expected
                )));
            }
        }

        let fresh = compute_totals(&self.items);
        for (key, group) in &fresh.groups {
            let Some(current) = self.groups.get(key) else {
                return Err(Error::Unexpected(format!("Group '{}' is missing", key)));
            };
            if current.monthly_totals != group.monthly_totals || current.total != group.total {
                return Err(Error::Unexpected(format!(
                    "Totals of group '{}' drifted from its members",
                    key
                )));
            }
        }
        if fresh.groups.len() != self.groups.len() {
            return Err(Error::Unexpected(
                "Grid holds a group without members".to_string(),
            ));
        }
        if fresh.grand_totals != self.grand_totals || fresh.grand_total != self.grand_total {
            return Err(Error::Unexpected(
                "Grand totals drifted from group totals".to_string(),
            ));
        }
        Ok(())
    }

    /// The slice of the grid shown in one period tab.
    pub fn period_summary(&self, period: &Period) -> PeriodSummary {
        let months = &period.months;
        let rows = self
            .items
            .iter()
            .map(|item| RowSlice {
                item_id: item.id.clone(),
                name: item.name.clone(),
                group_key: item.group_key.clone(),
                amounts: months.iter().map(|m| item.amount(m)).collect(),
                total: item.total_over(months),
            })
            .collect();
        let groups = self
            .groups_in_order()
            .map(|group| GroupSlice {
                key: group.key.clone(),
                totals: months.iter().map(|m| group.total_for(m)).collect(),
                total: group.total_over(months),
            })
            .collect();
        let grand_totals: Vec<Decimal> = months.iter().map(|m| self.grand_total_for(m)).collect();
        let grand_total = grand_totals.iter().copied().sum();

        PeriodSummary {
            period_index: period.index,
            label: period.label.clone(),
            months: months.clone(),
            rows,
            groups,
            grand_totals,
            grand_total,
        }
    }
}

/// Visible values of one tab.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    pub period_index: usize,
    pub label: String,
    pub months: Vec<MonthKey>,
    pub rows: Vec<RowSlice>,
    pub groups: Vec<GroupSlice>,
    pub grand_totals: Vec<Decimal>,
    pub grand_total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowSlice {
    pub item_id: String,
    pub name: String,
    pub group_key: Option<String>,
    pub amounts: Vec<Decimal>,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSlice {
    pub key: String,
    pub totals: Vec<Decimal>,
    pub total: Decimal,
}
