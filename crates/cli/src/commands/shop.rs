//! Catalog, cart, checkout, and order-history commands.

#![allow(clippy::print_stdout)]

use wirecrest_core::{PaymentMode, ProductId, format_inr};
use wirecrest_storefront::backend::Product;
use wirecrest_storefront::catalog::{self, ProductSort};
use wirecrest_storefront::checkout::{self, CheckoutSummary, ShippingDetails};
use wirecrest_storefront::session::SessionReader;

use super::{Context, settle};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// `wirecrest products`
pub async fn products(search: Option<&str>, sort: Option<&str>, fresh: bool) -> CommandResult {
    let ctx = Context::load()?;
    let sort = sort.map(str::parse::<ProductSort>).transpose()?;

    if fresh {
        ctx.backend.invalidate_catalog_cache().await;
    }
    let all = ctx.backend.products().await?;
    let listed = catalog::filter_and_sort(all, search, sort);

    if listed.is_empty() {
        println!("No products found.");
        return Ok(());
    }

    for product in &listed {
        print_product(product);
    }
    Ok(())
}

fn print_product(product: &Product) {
    let stock = if catalog::in_stock(product) {
        String::new()
    } else {
        "  [out of stock]".to_string()
    };
    let offer = product
        .offer
        .as_deref()
        .filter(|o| !o.is_empty())
        .map(|o| format!("  ({o})"))
        .unwrap_or_default();
    println!(
        "{:>5}  {}  {}{offer}{stock}",
        product.id,
        format_inr(product.price),
        product.name
    );
}

/// `wirecrest cart show`
pub async fn cart_show() -> CommandResult {
    let ctx = Context::load()?;
    let store = ctx.cart().await;

    // `connect` completes the initial fetch, but a view must not assume
    // that; block on `loaded` like any other consumer.
    let mut changes = store.subscribe();
    while !store.loaded() {
        if changes.changed().await.is_err() {
            break;
        }
    }

    let state = store.state();
    store.shutdown();

    if !store.session().is_authenticated() {
        println!("Not logged in. Run `wirecrest account login` first.");
        return Ok(());
    }

    if state.items.is_empty() {
        println!("Your cart is empty.");
        return Ok(());
    }

    for item in &state.items {
        println!(
            "{:>5}  {} x{}  {}",
            item.id,
            format_inr(item.price),
            item.quantity,
            item.name
        );
    }
    print_summary(&CheckoutSummary::from_items(&state.items));
    Ok(())
}

fn print_summary(summary: &CheckoutSummary) {
    println!();
    println!("Subtotal (before tax): {}", format_inr(summary.subtotal_before_tax));
    println!("Tax (18% GST):         {}", format_inr(summary.tax));
    if summary.free_shipping() {
        println!("Shipping:              free");
    } else {
        println!("Shipping:              {}", format_inr(summary.shipping));
    }
    println!("Total:                 {}", format_inr(summary.grand_total));
}

/// `wirecrest cart add`
pub async fn cart_add(product_id: i32) -> CommandResult {
    let ctx = Context::load()?;
    let store = ctx.cart().await;
    let product_id = ProductId::new(product_id);
    store.set_location(&format!("/products/{product_id}"));

    // The listing surface disables out-of-stock items; mirror that here.
    if let Ok(product) = ctx.backend.product(product_id).await
        && !catalog::in_stock(&product)
    {
        println!("'{}' is out of stock.", product.name);
        store.shutdown();
        return Ok(());
    }

    // The boolean is the contract: false means "send the user to login".
    if store.add_to_cart(product_id).await {
        let quantity = store.state().quantity_of(product_id).unwrap_or(1);
        println!("Added product {product_id} (quantity now {quantity}).");
    } else if store.session().is_authenticated() {
        println!("Could not add product {product_id}; please try again.");
    } else {
        println!("Please log in first: `wirecrest account login`.");
    }
    store.shutdown();
    Ok(())
}

/// `wirecrest cart set-qty`
pub async fn cart_set_qty(product_id: i32, quantity: u32) -> CommandResult {
    let ctx = Context::load()?;
    let store = ctx.cart().await;
    let product_id = ProductId::new(product_id);

    if !store.session().is_authenticated() {
        println!("Please log in first: `wirecrest account login`.");
        store.shutdown();
        return Ok(());
    }
    if quantity < 1 {
        println!("Quantity must be at least 1; use `wirecrest cart remove` instead.");
        store.shutdown();
        return Ok(());
    }
    if !store.state().contains(product_id) {
        println!("Product {product_id} is not in the cart.");
        store.shutdown();
        return Ok(());
    }

    store.update_quantity(product_id, quantity);
    // The write is debounced; wait for it to land before exiting.
    settle(&store).await;

    match store.state().quantity_of(product_id) {
        Some(q) => println!("Product {product_id} quantity is now {q}."),
        None => println!("Product {product_id} is no longer in the cart."),
    }
    store.shutdown();
    Ok(())
}

/// `wirecrest cart remove`
pub async fn cart_remove(product_id: i32) -> CommandResult {
    let ctx = Context::load()?;
    let store = ctx.cart().await;
    let product_id = ProductId::new(product_id);

    if !store.session().is_authenticated() {
        println!("Please log in first: `wirecrest account login`.");
        store.shutdown();
        return Ok(());
    }

    store.remove_from_cart(product_id).await;
    if store.state().contains(product_id) {
        println!("Could not remove product {product_id}; please try again.");
    } else {
        println!("Removed product {product_id}.");
    }
    store.shutdown();
    Ok(())
}

/// `wirecrest checkout`
#[allow(clippy::too_many_arguments)]
pub async fn checkout(
    name: String,
    phone: String,
    address1: String,
    address2: String,
    city: String,
    pincode: String,
    payment: &str,
) -> CommandResult {
    let payment_mode = match payment {
        "cod" => PaymentMode::Cod,
        "online" => PaymentMode::Online,
        other => return Err(format!("unknown payment mode '{other}'").into()),
    };

    let ctx = Context::load()?;
    let store = ctx.cart().await;
    let state = store.state();
    let session = store.session();
    store.shutdown();

    let details = ShippingDetails {
        name,
        phone,
        address1,
        address2,
        city,
        pincode,
        payment_mode,
    };

    print_summary(&CheckoutSummary::from_items(&state.items));
    let receipt = checkout::place_order(&ctx.backend, session, &state.items, &details).await?;

    println!();
    println!("Order confirmed: {}", receipt.order_id);
    if let Some(date) = receipt.order_date {
        println!("Placed on: {date}");
    }
    Ok(())
}

/// `wirecrest orders list`
pub async fn orders_list() -> CommandResult {
    let ctx = Context::load()?;
    let session = SessionReader::new(ctx.storage.clone()).current();

    let Some(user_id) = session.user_id else {
        println!("Please log in first: `wirecrest account login`.");
        return Ok(());
    };

    let orders = ctx.backend.orders(user_id).await?;
    if orders.is_empty() {
        println!("No orders yet.");
        return Ok(());
    }

    for order in &orders {
        println!(
            "#{:<6} {:<10} {}  {}",
            order.order_id,
            order.order_status,
            format_inr(order.total_amount),
            order.order_date.as_deref().unwrap_or("-"),
        );
        for item in &order.items {
            println!(
                "        {} x{}  {}",
                item.product_name,
                item.quantity,
                format_inr(item.price)
            );
        }
    }
    Ok(())
}

/// `wirecrest orders dashboard`
pub async fn dashboard() -> CommandResult {
    let ctx = Context::load()?;
    let session = SessionReader::new(ctx.storage.clone()).current();

    let Some(user_id) = session.user_id else {
        println!("Please log in first: `wirecrest account login`.");
        return Ok(());
    };

    let summary = ctx.backend.dashboard(user_id, 2).await?;
    if let Some(user) = summary.user {
        println!(
            "{} {} <{}>",
            user.first_name.unwrap_or_default(),
            user.last_name.unwrap_or_default(),
            user.email.unwrap_or_default()
        );
    }
    println!("Recent orders:");
    if summary.recent_orders.is_empty() {
        println!("  (none)");
    }
    for order in &summary.recent_orders {
        println!(
            "  #{} {} {}",
            order.order_id,
            order.order_status,
            format_inr(order.total_amount)
        );
    }
    Ok(())
}
