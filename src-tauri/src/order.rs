use chrono::Local;
use tracing::{info, warn};

use crate::cart::totals_of;
use crate::catalog::KioskBackend;
use crate::error::{KioskError, Result};
use crate::models::{
    CartLine, OrderConfirmation, OrderLineRequest, OrderOptionRequest, OrderRequest, OrderSummary,
    OrderSummaryLine,
};

pub const RETRY_MESSAGE: &str = "주문 처리 중 오류가 발생했습니다. 다시 시도해주세요.";

/// Backend payload for the cart. Prices stay client-side; the backend
/// prices the order itself.
pub fn build_payload(lines: &[CartLine]) -> OrderRequest {
    OrderRequest {
        items: lines
            .iter()
            .map(|line| OrderLineRequest {
                menu_item_id: line.item_id,
                quantity: line.quantity,
                options: line
                    .options
                    .iter()
                    .map(|opt| OrderOptionRequest {
                        option_id: opt.option_id,
                        quantity: opt.quantity,
                    })
                    .collect(),
            })
            .collect(),
    }
}

/// Formats an amount the way the kiosk prints prices, e.g. `18,000원`.
pub fn format_won(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push('원');
    out
}

pub fn summarize(lines: &[CartLine]) -> OrderSummary {
    let totals = totals_of(lines);

    let summary_lines: Vec<OrderSummaryLine> = lines
        .iter()
        .map(|line| OrderSummaryLine {
            name: line.name.clone(),
            options: line.option_names().into_iter().map(String::from).collect(),
            quantity: line.quantity,
            line_total: line.line_total,
        })
        .collect();

    let details = summary_lines
        .iter()
        .map(|line| {
            let options = if line.options.is_empty() {
                String::new()
            } else {
                format!(" (옵션: {})", line.options.join(", "))
            };
            format!(
                "{} x{}{} ({})",
                line.name,
                line.quantity,
                options,
                format_won(line.line_total)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let text = format!(
        "주문을 확인하시겠습니까?\n\n{}\n\n총 수량: {}개\n총 금액: {}",
        details,
        totals.quantity,
        format_won(totals.amount)
    );

    OrderSummary {
        lines: summary_lines,
        total_quantity: totals.quantity,
        total_amount: totals.amount,
        text,
    }
}

/// Sends the order. Nothing is sent for an empty or unconfirmed cart.
/// Clearing the cart after success is the caller's job; on failure the cart
/// must stay as it is so the customer can retry.
pub async fn submit(
    backend: &dyn KioskBackend,
    lines: &[CartLine],
    confirmed: bool,
) -> Result<OrderConfirmation> {
    if lines.is_empty() {
        return Err(KioskError::EmptyCart);
    }
    if !confirmed {
        return Err(KioskError::Declined);
    }

    let payload = build_payload(lines);
    let receipt = backend.create_order(&payload).await.map_err(|e| {
        warn!("Order submission failed: {}", e);
        e
    })?;

    info!(
        "Order {} accepted, total {}",
        receipt.order_number, receipt.total_amount
    );

    let message = format!(
        "주문이 완료되었습니다! 주문번호: {}\n총 금액: {}\n감사합니다.",
        receipt.order_number,
        format_won(receipt.total_amount)
    );

    Ok(OrderConfirmation {
        receipt,
        submitted_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        message,
    })
}
