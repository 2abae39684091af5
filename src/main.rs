//! limit-book - demo binary
//!
//! Builds a small book, prints both ladders and the state root, then tears
//! the book down. Build with `--features logging` to see the tracing output.

use limit_book::types::price::{format_fixed, format_fixed_trimmed, parse_fixed};
use limit_book::{BookResult, Order, OrderBook, Side};

const SAMPLE_ORDERS: &[(u64, Side, &str, &str)] = &[
    (1, Side::Buy, "100.00", "5"),
    (2, Side::Buy, "105.00", "2"),
    (3, Side::Buy, "95.00", "8"),
    (4, Side::Buy, "100.00", "7"),
    (5, Side::Sell, "106.50", "3"),
    (6, Side::Sell, "110.00", "1.5"),
    (7, Side::Sell, "106.00", "4"),
];

fn main() -> BookResult<()> {
    #[cfg(feature = "logging")]
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    println!("===========================================");
    println!("  limit-book - price level demo");
    println!("===========================================");
    println!();

    let mut book = OrderBook::with_capacity(64);

    for &(id, side, price, quantity) in SAMPLE_ORDERS {
        let order = Order::create(id, side, parse_fixed(price)?, parse_fixed(quantity)?)?;
        book.add_order(order)?;
    }

    // Rejections leave the book untouched
    let duplicate = Order::create(1, Side::Sell, parse_fixed("120")?, parse_fixed("1")?)?;
    if let Err(err) = book.add_order(duplicate) {
        println!("Rejected: {err}");
        println!();
    }

    print_ladder(&book);

    println!();
    println!("Orders resting:  {}", book.order_count());
    println!("State root:      {}", book.state_root_hex()?);

    if let Err(err) = book.check_integrity() {
        println!("Integrity check FAILED: {err}");
    }

    let stats = book.destroy();
    println!(
        "Released {} orders across {} bid and {} ask levels",
        stats.orders, stats.bid_levels, stats.ask_levels
    );
    Ok(())
}

fn print_ladder(book: &OrderBook) {
    println!("{:>18} {:>18} {:>8}", "Price", "Quantity", "Orders");
    println!("{:-<18} {:-<18} {:-<8}", "", "", "");

    // Asks worst-first so the spread sits in the middle
    let asks: Vec<_> = book.levels(Side::Sell).collect();
    for level in asks.iter().rev() {
        println!(
            "{:>18} {:>18} {:>8}  ask",
            format_fixed(level.price),
            format_fixed_trimmed(level.total_quantity),
            level.order_count
        );
    }
    match book.spread() {
        Some(spread) => println!("{:>18}  spread", format_fixed(spread)),
        None => println!("{:>18}  spread", "-"),
    }
    for level in book.levels(Side::Buy) {
        println!(
            "{:>18} {:>18} {:>8}  bid",
            format_fixed(level.price),
            format_fixed_trimmed(level.total_quantity),
            level.order_count
        );
    }
}
