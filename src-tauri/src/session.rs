//! One kiosk session: the cart, the backend and the dialogue engine, owned
//! together and handed to the UI handlers.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tracing::debug;

use crate::cart::{CartStorage, CartStore};
use crate::catalog::{self, ItemChoice, KioskBackend};
use crate::config::KioskConfig;
use crate::error::Result;
use crate::models::{
    CartLine, CartTotals, MenuBoard, MenuDetail, OptionSelection, OrderConfirmation, OrderSummary,
};
use crate::order;
use crate::voice::{
    DialogueControl, DialogueEngine, DialogueEvent, DialogueOutcome, DialogueTiming,
    DialogueView, SpeechRecognizer, SpeechSynthesizer, VoiceSettings,
};

pub type SharedCart = CartStore<Box<dyn CartStorage>>;

pub struct KioskSession {
    backend: Arc<dyn KioskBackend>,
    cart: Mutex<SharedCart>,
    dialogue: AsyncMutex<DialogueEngine>,
    control: DialogueControl,
}

impl KioskSession {
    pub fn new(
        config: &KioskConfig,
        backend: Arc<dyn KioskBackend>,
        storage: Box<dyn CartStorage>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        recognizer: Option<Arc<dyn SpeechRecognizer>>,
        events: Option<mpsc::UnboundedSender<DialogueEvent>>,
    ) -> Self {
        let mut engine = DialogueEngine::new(
            synthesizer,
            recognizer,
            VoiceSettings::from_config(config),
            DialogueTiming::new(config.time_unit()),
        );
        if let Some(events) = events {
            engine = engine.with_events(events);
        }
        let control = engine.control();

        Self {
            backend,
            cart: Mutex::new(CartStore::new(storage)),
            dialogue: AsyncMutex::new(engine),
            control,
        }
    }

    pub fn backend(&self) -> &dyn KioskBackend {
        self.backend.as_ref()
    }

    /// Cart mutations are read-modify-write on one blob; they go through
    /// this lock one at a time.
    fn cart(&self) -> MutexGuard<'_, SharedCart> {
        self.cart.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ===== Menu page =====

    pub async fn menu_board(&self) -> MenuBoard {
        catalog::load_menu_board(self.backend()).await
    }

    /// Order button on the menu page. Adds right away unless the item has
    /// options, in which case the detail comes back for the option picker.
    pub async fn order_item(
        &self,
        item_id: i64,
        name: &str,
        unit_price: u32,
    ) -> (Option<MenuDetail>, Vec<CartLine>) {
        match catalog::choose_item(self.backend(), item_id).await {
            ItemChoice::PickOptions(detail) => (Some(detail), self.cart_snapshot()),
            ItemChoice::AddDirectly => (None, self.add_to_cart(item_id, name, unit_price, Vec::new())),
        }
    }

    pub fn add_with_options(&self, detail: &MenuDetail, chosen: &[i64]) -> Vec<CartLine> {
        let options = catalog::confirm_options(detail, chosen);
        self.add_to_cart(detail.id, &detail.name, detail.price, options)
    }

    pub fn add_to_cart(
        &self,
        item_id: i64,
        name: &str,
        unit_price: u32,
        options: Vec<OptionSelection>,
    ) -> Vec<CartLine> {
        self.cart().add_item(item_id, name, unit_price, options)
    }

    // ===== Order page =====

    pub fn cart_snapshot(&self) -> Vec<CartLine> {
        self.cart().snapshot()
    }

    pub fn cart_totals(&self) -> CartTotals {
        self.cart().totals()
    }

    pub fn change_quantity(&self, item_id: i64, delta: i32) -> Vec<CartLine> {
        self.cart().set_quantity(item_id, delta)
    }

    pub fn remove_item(&self, item_id: i64) -> Vec<CartLine> {
        self.cart().remove_line(item_id)
    }

    pub fn clear_cart(&self) {
        self.cart().clear();
    }

    pub fn order_summary(&self) -> OrderSummary {
        order::summarize(&self.cart_snapshot())
    }

    /// Submits the current cart and clears it once the backend accepted
    /// the order. A failed submission leaves the cart as it was.
    pub async fn submit_order(&self, confirmed: bool) -> Result<OrderConfirmation> {
        let lines = self.cart_snapshot();
        let confirmation = order::submit(self.backend(), &lines, confirmed).await?;
        self.clear_cart();
        Ok(confirmation)
    }

    // ===== Voice =====

    pub async fn dialogue_view(&self) -> DialogueView {
        self.dialogue.lock().await.view().clone()
    }

    /// Any click or key press on the page. The first one unlocks audio and
    /// runs the dialogue; later ones are ignored. Returns `None` when no
    /// dialogue was started.
    pub async fn on_user_gesture(&self) -> Option<DialogueOutcome> {
        let mut engine = self.dialogue.try_lock().ok()?;
        if !engine.register_interaction() {
            return None;
        }
        Some(engine.start(self.backend()).await)
    }

    /// Start control: unlocks audio if needed and runs the dialogue again.
    /// Ignored while a dialogue is already running.
    pub async fn start_voice(&self) -> Option<DialogueOutcome> {
        self.restart("start control").await
    }

    /// Microphone icon: stops a running recognition, otherwise starts over.
    pub async fn toggle_microphone(&self) -> Option<DialogueOutcome> {
        if self.control.is_listening() {
            self.stop_listening();
            return None;
        }
        self.restart("microphone").await
    }

    async fn restart(&self, source: &str) -> Option<DialogueOutcome> {
        let Ok(mut engine) = self.dialogue.try_lock() else {
            debug!("Dialogue already running, {} press ignored", source);
            return None;
        };
        engine.register_interaction();
        Some(engine.start(self.backend()).await)
    }

    /// Ends a running dialogue without waiting for it.
    pub fn interrupt_dialogue(&self) {
        self.control.interrupt();
    }

    /// The home page was loaded again. A dialogue still running from the
    /// previous load is interrupted first, then the engine starts over.
    pub async fn reset_dialogue(&self) {
        self.interrupt_dialogue();
        self.dialogue.lock().await.reset();
    }

    pub fn stop_listening(&self) {
        self.control.stop_listening();
    }

    pub fn is_listening(&self) -> bool {
        self.control.is_listening()
    }
}

#[cfg(feature = "desktop")]
mod desktop {
    use std::sync::Arc;

    use tauri::{AppHandle, Manager};

    use super::KioskSession;
    use crate::voice::SpeechBridge;

    pub trait SessionExt {
        fn session(&self) -> Arc<KioskSession>;
        fn speech(&self) -> Arc<SpeechBridge>;
    }

    impl SessionExt for AppHandle {
        fn session(&self) -> Arc<KioskSession> {
            self.state::<Arc<KioskSession>>().inner().clone()
        }

        fn speech(&self) -> Arc<SpeechBridge> {
            self.state::<Arc<SpeechBridge>>().inner().clone()
        }
    }
}

#[cfg(feature = "desktop")]
pub use desktop::SessionExt;
