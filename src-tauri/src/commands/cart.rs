use crate::models::{CartLine, CartTotals, OptionSelection};
use crate::session::SessionExt;
use tauri::AppHandle;

#[tauri::command]
pub fn get_cart(app: AppHandle) -> Result<Vec<CartLine>, String> {
    Ok(app.session().cart_snapshot())
}

#[tauri::command]
pub fn get_cart_totals(app: AppHandle) -> Result<CartTotals, String> {
    Ok(app.session().cart_totals())
}

#[tauri::command]
#[allow(non_snake_case)]
pub fn add_to_cart(
    app: AppHandle,
    itemId: i64,
    name: String,
    price: u32,
    options: Option<Vec<OptionSelection>>,
) -> Result<Vec<CartLine>, String> {
    Ok(app
        .session()
        .add_to_cart(itemId, &name, price, options.unwrap_or_default()))
}

#[tauri::command]
#[allow(non_snake_case)]
pub fn increase_quantity(app: AppHandle, itemId: i64) -> Result<Vec<CartLine>, String> {
    Ok(app.session().change_quantity(itemId, 1))
}

#[tauri::command]
#[allow(non_snake_case)]
pub fn decrease_quantity(app: AppHandle, itemId: i64) -> Result<Vec<CartLine>, String> {
    Ok(app.session().change_quantity(itemId, -1))
}

/// The page asks the customer before calling this.
#[tauri::command]
#[allow(non_snake_case)]
pub fn remove_item(app: AppHandle, itemId: i64) -> Result<Vec<CartLine>, String> {
    Ok(app.session().remove_item(itemId))
}

#[tauri::command]
pub fn clear_cart(app: AppHandle) -> Result<(), String> {
    app.session().clear_cart();
    Ok(())
}
