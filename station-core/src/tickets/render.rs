//! Kitchen ticket renderer
//!
//! Renders a ticket into plain text lines for the kitchen printer: a
//! centered header with the order type and creation time, then one row per
//! item with name, size and quantity. Kitchen staff never see prices or
//! totals, so neither column exists here.

use shared::models::KotTicket;

/// Characters per line on 58mm thermal paper
pub const TICKET_WIDTH: usize = 32;

/// Render a ticket to printable text
pub fn render_kot(ticket: &KotTicket) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(center(ticket.order_type.label(), TICKET_WIDTH));
    lines.push(center(&ticket.date, TICKET_WIDTH));
    lines.push("=".repeat(TICKET_WIDTH));

    for item in &ticket.items {
        let mut name = item.name.clone();
        if let Some(size) = &item.size {
            name.push_str(&format!(" ({size})"));
        }
        if item.is_free {
            name.push_str(" (FREE)");
        }
        lines.push(row(&name, &format!("x{}", item.quantity), TICKET_WIDTH));
    }

    lines.push("-".repeat(TICKET_WIDTH));
    lines.join("\n")
}

/// Center text within the paper width
fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let pad = (width - len) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

/// Left text with right-aligned quantity, wrapping long names onto the row
fn row(left: &str, right: &str, width: usize) -> String {
    let left_len = left.chars().count();
    let right_len = right.chars().count();
    if left_len + right_len + 1 > width {
        // Name too long for one row: quantity goes on its own line
        return format!("{left}\n{}{right}", " ".repeat(width.saturating_sub(right_len)));
    }
    let pad = width - left_len - right_len;
    format!("{left}{}{right}", " ".repeat(pad))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{CartLine, OrderType};

    fn ticket() -> KotTicket {
        let paid = CartLine::paid("Cheese pizza", Some("med".into()), 300, 2);
        let free = CartLine::free_for(&paid, 2);
        KotTicket::new(vec![paid, free, CartLine::paid("Garlic bread", None, 90, 1)], OrderType::DineIn)
    }

    #[test]
    fn test_header_carries_order_type() {
        let text = render_kot(&ticket());
        let first = text.lines().next().unwrap();
        assert_eq!(first.trim(), "Dine-In");
    }

    #[test]
    fn test_rows_show_name_size_and_quantity_only() {
        let text = render_kot(&ticket());
        assert!(text.contains("Cheese pizza (med)"));
        assert!(text.contains("x2"));
        assert!(text.contains("Garlic bread"));
        assert!(text.contains("(FREE)"));
        // No price column, no totals
        assert!(!text.contains("300"));
        assert!(!text.to_lowercase().contains("total"));
    }

    #[test]
    fn test_rows_fit_paper_width() {
        let text = render_kot(&ticket());
        for line in text.lines() {
            assert!(line.chars().count() <= TICKET_WIDTH, "overlong line: {line:?}");
        }
    }
}
