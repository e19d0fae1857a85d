use crate::models::{OrderConfirmation, OrderSummary};
use crate::order::RETRY_MESSAGE;
use crate::session::SessionExt;
use tauri::AppHandle;

#[tauri::command]
pub fn get_order_summary(app: AppHandle) -> Result<OrderSummary, String> {
    Ok(app.session().order_summary())
}

#[tauri::command]
pub async fn submit_order(app: AppHandle, confirmed: bool) -> Result<OrderConfirmation, String> {
    let session = app.session();
    session.submit_order(confirmed).await.map_err(|e| {
        if e.is_network() {
            RETRY_MESSAGE.to_string()
        } else {
            e.to_string()
        }
    })
}
