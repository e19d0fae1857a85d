use crate::catalog::categories_or_fallback;
use crate::models::{CartLine, Category, MenuBoard, MenuDetail, MenuItem, MenuOption, VoiceGuide};
use crate::session::SessionExt;
use serde::Serialize;
use tauri::AppHandle;

#[tauri::command]
pub async fn get_categories(app: AppHandle) -> Result<Vec<Category>, String> {
    let session = app.session();
    Ok(categories_or_fallback(session.backend()).await)
}

#[tauri::command]
#[allow(non_snake_case)]
pub async fn get_menu_by_category(app: AppHandle, categoryId: i64) -> Result<Vec<MenuItem>, String> {
    let session = app.session();
    session
        .backend()
        .menu_by_category(categoryId)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_menu_board(app: AppHandle) -> Result<MenuBoard, String> {
    let session = app.session();
    Ok(session.menu_board().await)
}

#[tauri::command]
#[allow(non_snake_case)]
pub async fn get_menu_detail(app: AppHandle, itemId: i64) -> Result<MenuDetail, String> {
    let session = app.session();
    session
        .backend()
        .menu_detail(itemId)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
#[allow(non_snake_case)]
pub async fn get_options_by_type(app: AppHandle, optionType: String) -> Result<Vec<MenuOption>, String> {
    let session = app.session();
    session
        .backend()
        .options_by_type(&optionType)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_voice_guide(app: AppHandle) -> Result<VoiceGuide, String> {
    let session = app.session();
    session.backend().voice_guide().await.map_err(|e| e.to_string())
}

#[derive(Debug, Serialize)]
pub struct OrderItemResult {
    /// Set when the option picker has to be shown first
    pub detail: Option<MenuDetail>,
    pub cart: Vec<CartLine>,
}

#[tauri::command]
#[allow(non_snake_case)]
pub async fn order_item(
    app: AppHandle,
    itemId: i64,
    name: String,
    price: u32,
) -> Result<OrderItemResult, String> {
    let session = app.session();
    let (detail, cart) = session.order_item(itemId, &name, price).await;
    Ok(OrderItemResult { detail, cart })
}

#[tauri::command]
#[allow(non_snake_case)]
pub fn confirm_options(
    app: AppHandle,
    detail: MenuDetail,
    optionIds: Vec<i64>,
) -> Result<Vec<CartLine>, String> {
    Ok(app.session().add_with_options(&detail, &optionIds))
}
