//! Client-side cart.
//!
//! The cart is a list of [`CartLine`]s kept as one serialized blob. Lines with
//! the same item and the same option multiset are merged. Every mutation
//! writes the whole cart back before returning.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::db::Database;
use crate::error::Result;
use crate::models::{CartLine, CartTotals, OptionSelection};

/// Key of the cart blob.
pub const CART_KEY: &str = "orders";

/// Where the serialized cart lives between page loads.
pub trait CartStorage: Send + Sync {
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, blob: &str) -> Result<()>;
    fn remove(&self) -> Result<()>;
}

/// Process-local storage; used headless and in tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryCartStorage {
    blob: Arc<Mutex<Option<String>>>,
}

impl MemoryCartStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Arc::new(Mutex::new(Some(blob.into()))),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.slot().clone()
    }

    fn slot(&self) -> MutexGuard<'_, Option<String>> {
        self.blob.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CartStorage for MemoryCartStorage {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.raw())
    }

    fn save(&self, blob: &str) -> Result<()> {
        *self.slot() = Some(blob.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        *self.slot() = None;
        Ok(())
    }
}

/// Cart blob in the SQLite key-value table.
pub struct SqliteCartStorage {
    db: Arc<Database>,
    key: String,
}

impl SqliteCartStorage {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            key: CART_KEY.to_string(),
        }
    }
}

impl CartStorage for SqliteCartStorage {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.db.get_blob(&self.key)?)
    }

    fn save(&self, blob: &str) -> Result<()> {
        Ok(self.db.put_blob(&self.key, blob)?)
    }

    fn remove(&self) -> Result<()> {
        Ok(self.db.delete_blob(&self.key)?)
    }
}

impl CartStorage for Box<dyn CartStorage> {
    fn load(&self) -> Result<Option<String>> {
        (**self).load()
    }

    fn save(&self, blob: &str) -> Result<()> {
        (**self).save(blob)
    }

    fn remove(&self) -> Result<()> {
        (**self).remove()
    }
}

/// Option lists compare as multisets: same ids with the same quantities,
/// regardless of the order they were picked in.
fn option_key(options: &[OptionSelection]) -> Vec<(i64, u32)> {
    let mut key: Vec<(i64, u32)> = options
        .iter()
        .map(|opt| (opt.option_id, opt.quantity))
        .collect();
    key.sort_unstable();
    key
}

fn same_line(line: &CartLine, item_id: i64, options: &[OptionSelection]) -> bool {
    line.item_id == item_id && option_key(&line.options) == option_key(options)
}

pub struct CartStore<S: CartStorage> {
    storage: S,
}

impl<S: CartStorage> CartStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Reads the persisted cart. A missing or unreadable blob is an empty cart.
    fn load(&self) -> Vec<CartLine> {
        match self.read() {
            Ok(lines) => lines,
            Err(e) => {
                warn!("Stored cart is unreadable, starting empty: {}", e);
                Vec::new()
            }
        }
    }

    fn read(&self) -> Result<Vec<CartLine>> {
        let Some(blob) = self.storage.load()? else {
            return Ok(Vec::new());
        };

        let mut lines: Vec<CartLine> = serde_json::from_str(&blob)?;
        // Totals are derived; never trust the stored figure.
        for line in &mut lines {
            line.quantity = line.quantity.max(1);
            line.recompute_total();
        }
        Ok(lines)
    }

    fn persist(&self, lines: &[CartLine]) {
        let written = serde_json::to_string(lines)
            .map_err(Into::into)
            .and_then(|blob| self.storage.save(&blob));
        if let Err(e) = written {
            warn!("Failed to persist cart: {}", e);
        }
    }

    pub fn add_item(
        &self,
        item_id: i64,
        name: &str,
        unit_price: u32,
        options: Vec<OptionSelection>,
    ) -> Vec<CartLine> {
        let mut lines = self.load();

        match lines
            .iter_mut()
            .find(|line| same_line(line, item_id, &options))
        {
            Some(line) => {
                line.quantity += 1;
                line.recompute_total();
                debug!("Merged {} into cart, quantity now {}", name, line.quantity);
            }
            None => {
                lines.push(CartLine::new(item_id, name.to_string(), unit_price, options));
                debug!("Added {} to cart", name);
            }
        }

        self.persist(&lines);
        lines
    }

    /// Adjusts the first line with `item_id` by `delta`. A result below one
    /// leaves the line untouched.
    pub fn set_quantity(&self, item_id: i64, delta: i32) -> Vec<CartLine> {
        let mut lines = self.load();

        if let Some(line) = lines.iter_mut().find(|line| line.item_id == item_id) {
            let next = line.quantity as i64 + delta as i64;
            if next >= 1 && next != line.quantity as i64 {
                line.quantity = u32::try_from(next).unwrap_or(u32::MAX);
                line.recompute_total();
                self.persist(&lines);
            }
        }

        lines
    }

    pub fn remove_line(&self, item_id: i64) -> Vec<CartLine> {
        let mut lines = self.load();
        let before = lines.len();
        lines.retain(|line| line.item_id != item_id);

        if lines.len() != before {
            self.persist(&lines);
        }
        lines
    }

    pub fn clear(&self) {
        match self.storage.remove() {
            Ok(()) => debug!("Cart cleared"),
            Err(e) => warn!("Failed to clear cart: {}", e),
        }
    }

    pub fn snapshot(&self) -> Vec<CartLine> {
        self.load()
    }

    pub fn totals(&self) -> CartTotals {
        totals_of(&self.load())
    }
}

pub fn totals_of(lines: &[CartLine]) -> CartTotals {
    lines.iter().fold(CartTotals::default(), |acc, line| CartTotals {
        quantity: acc.quantity + line.quantity as u64,
        amount: acc.amount + line.line_total,
    })
}
