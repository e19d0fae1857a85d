//! Backend REST client and the catalog fallbacks used by the menu page.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::KioskConfig;
use crate::error::{KioskError, Result};
use crate::models::{
    Category, MenuBoard, MenuDetail, MenuItem, MenuOption, OptionSelection, OrderReceipt,
    OrderRequest, VoiceGuide, VoiceGuideText,
};

/// The kiosk backend as seen by the front end.
#[async_trait]
pub trait KioskBackend: Send + Sync {
    async fn categories(&self) -> Result<Vec<Category>>;
    async fn menu_by_category(&self, category_id: i64) -> Result<Vec<MenuItem>>;
    async fn menu_detail(&self, item_id: i64) -> Result<MenuDetail>;
    async fn options_by_type(&self, option_type: &str) -> Result<Vec<MenuOption>>;
    async fn create_order(&self, order: &OrderRequest) -> Result<OrderReceipt>;
    async fn voice_guide_text(&self) -> Result<String>;
    async fn voice_guide(&self) -> Result<VoiceGuide>;
}

/// HTTP implementation of [`KioskBackend`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &KioskConfig) -> Result<Self> {
        Self::new(&config.api_base_url, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;

        Self::decode(path, resp).await
    }

    async fn decode<T: DeserializeOwned>(path: &str, resp: reqwest::Response) -> Result<T> {
        if !resp.status().is_success() {
            return Err(KioskError::Status {
                status: resp.status().as_u16(),
                path: path.to_string(),
            });
        }
        debug!("{} -> {}", path, resp.status());
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl KioskBackend for ApiClient {
    async fn categories(&self) -> Result<Vec<Category>> {
        self.get("/categories").await
    }

    async fn menu_by_category(&self, category_id: i64) -> Result<Vec<MenuItem>> {
        self.get(&format!("/categories/{}/menu", category_id)).await
    }

    async fn menu_detail(&self, item_id: i64) -> Result<MenuDetail> {
        self.get(&format!("/menu/{}", item_id)).await
    }

    async fn options_by_type(&self, option_type: &str) -> Result<Vec<MenuOption>> {
        self.get(&format!("/options/{}", option_type)).await
    }

    async fn create_order(&self, order: &OrderRequest) -> Result<OrderReceipt> {
        let resp = self
            .client
            .post(format!("{}/orders", self.base_url))
            .json(order)
            .send()
            .await?;

        Self::decode("/orders", resp).await
    }

    async fn voice_guide_text(&self) -> Result<String> {
        let guide: VoiceGuideText = self.get("/voice-guide/text").await?;
        Ok(guide.guide_text)
    }

    async fn voice_guide(&self) -> Result<VoiceGuide> {
        self.get("/voice-guide").await
    }
}

/// Categories shown when the backend cannot be reached.
pub fn fallback_categories() -> Vec<Category> {
    ["쌀국수", "돈카츠,카레", "1인정식", "사이드&추가메뉴"]
        .iter()
        .zip(1..)
        .map(|(name, id)| Category {
            id,
            name: name.to_string(),
            display_name: name.to_string(),
            description: None,
        })
        .collect()
}

pub async fn categories_or_fallback(backend: &dyn KioskBackend) -> Vec<Category> {
    match backend.categories().await {
        Ok(categories) => categories,
        Err(e) => {
            warn!("Failed to load categories, using built-in list: {}", e);
            fallback_categories()
        }
    }
}

/// Categories plus the items of each. Item loading stops at the first
/// failed category; categories fetched before that keep their items.
pub async fn load_menu_board(backend: &dyn KioskBackend) -> MenuBoard {
    let mut board = MenuBoard {
        categories: categories_or_fallback(backend).await,
        ..Default::default()
    };

    for category in &board.categories {
        match backend.menu_by_category(category.id).await {
            Ok(items) => {
                board.items.insert(category.id, items);
            }
            Err(e) => {
                warn!("Failed to load menu for category {}: {}", category.name, e);
                break;
            }
        }
    }

    board
}

/// What the menu page does after the order button of an item is pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemChoice {
    /// Add straight to the cart with no options
    AddDirectly,
    /// Show the option picker for this detail first
    PickOptions(MenuDetail),
}

pub async fn choose_item(backend: &dyn KioskBackend, item_id: i64) -> ItemChoice {
    match backend.menu_detail(item_id).await {
        Ok(detail) if !detail.available_options.is_empty() => ItemChoice::PickOptions(detail),
        Ok(_) => ItemChoice::AddDirectly,
        Err(e) => {
            warn!("Failed to load detail for item {}, adding without options: {}", item_id, e);
            ItemChoice::AddDirectly
        }
    }
}

/// Snapshots the picked options of `detail`, one of each, in menu order.
/// Ids not offered by the item are ignored.
pub fn confirm_options(detail: &MenuDetail, chosen: &[i64]) -> Vec<OptionSelection> {
    detail
        .available_options
        .iter()
        .filter(|option| chosen.contains(&option.id))
        .map(OptionSelection::from_menu_option)
        .collect()
}
