use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ===== Catalog snapshots (read-only, fetched from the backend) =====

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MenuOption {
    pub id: i64,
    pub name: String,
    pub price: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MenuDetail {
    pub id: i64,
    pub name: String,
    pub price: u32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub available_options: Vec<MenuOption>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct VoiceGuide {
    pub categories: Vec<Category>,
    /// Category display name -> up to three sample item names
    #[serde(default)]
    pub sample_menus: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct VoiceGuideText {
    pub guide_text: String,
}

/// Categories and their items as shown on the menu page.
#[derive(Debug, Serialize, Clone, Default)]
pub struct MenuBoard {
    pub categories: Vec<Category>,
    pub items: BTreeMap<i64, Vec<MenuItem>>,
}

// ===== Cart =====

fn default_option_quantity() -> u32 {
    1
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct OptionSelection {
    pub option_id: i64,
    #[serde(default = "default_option_quantity")]
    pub quantity: u32,
    /// Price at the moment the option was picked
    pub price: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl OptionSelection {
    pub fn new(option_id: i64, price: u32) -> Self {
        Self {
            option_id,
            quantity: 1,
            price,
            name: None,
        }
    }

    pub fn from_menu_option(option: &MenuOption) -> Self {
        Self {
            option_id: option.id,
            quantity: 1,
            price: option.price,
            name: Some(option.name.clone()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub item_id: i64,
    pub name: String,
    pub unit_price: u32,
    pub quantity: u32,
    #[serde(default)]
    pub options: Vec<OptionSelection>,
    #[serde(default)]
    pub line_total: u64,
}

impl CartLine {
    pub fn new(item_id: i64, name: String, unit_price: u32, options: Vec<OptionSelection>) -> Self {
        let mut line = Self {
            item_id,
            name,
            unit_price,
            quantity: 1,
            options,
            line_total: 0,
        };
        line.recompute_total();
        line
    }

    pub fn recompute_total(&mut self) {
        let options: u64 = self
            .options
            .iter()
            .map(|opt| opt.price as u64 * opt.quantity as u64)
            .sum();
        self.line_total = self.unit_price as u64 * self.quantity as u64 + options;
    }

    pub fn option_names(&self) -> Vec<&str> {
        self.options
            .iter()
            .filter_map(|opt| opt.name.as_deref())
            .collect()
    }
}

#[derive(Debug, Serialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct CartTotals {
    pub quantity: u64,
    pub amount: u64,
}

// ===== Orders =====

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct OrderOptionRequest {
    pub option_id: i64,
    pub quantity: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct OrderLineRequest {
    pub menu_item_id: i64,
    pub quantity: u32,
    pub options: Vec<OrderOptionRequest>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub items: Vec<OrderLineRequest>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct OrderReceipt {
    #[serde(default)]
    pub id: Option<i64>,
    pub order_number: String,
    pub total_amount: u64,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct OrderSummaryLine {
    pub name: String,
    pub options: Vec<String>,
    pub quantity: u32,
    pub line_total: u64,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    pub lines: Vec<OrderSummaryLine>,
    pub total_quantity: u64,
    pub total_amount: u64,
    pub text: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct OrderConfirmation {
    pub receipt: OrderReceipt,
    pub submitted_at: String,
    pub message: String,
}
