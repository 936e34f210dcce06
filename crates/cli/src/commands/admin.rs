//! Store-management commands for admin accounts.

#![allow(clippy::print_stdout)]

use wirecrest_admin::config::AdminConfig;
use wirecrest_admin::types::{Announcement, ImageUpload, NewProduct, ProductUpdate};
use wirecrest_admin::{AdminClient, reports};
use wirecrest_core::{OrderId, OrderStatus, ProductId, UserId, UserRole, format_inr};
use wirecrest_storefront::session::SessionReader;
use wirecrest_storefront::storage::ClientStorage;

use crate::{AdminAction, AdminOrderAction, AdminProductAction, AdminUserAction};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// UX guard only: the backend enforces authorization on its side.
fn check_admin_session() -> CommandResult {
    let config = wirecrest_storefront::config::StorefrontConfig::from_env()?;
    let storage = ClientStorage::open(&config.data_dir)?;
    let session = SessionReader::new(storage).current();

    if !session.is_authenticated() {
        return Err("not logged in; run `wirecrest account login`".into());
    }
    if !session.is_admin() {
        return Err("this account has no admin access".into());
    }
    Ok(())
}

fn read_image(path: std::path::PathBuf) -> Result<ImageUpload, Box<dyn std::error::Error>> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or("image path has no file name")?
        .to_string();
    let bytes = std::fs::read(&path)?;
    Ok(ImageUpload { file_name, bytes })
}

pub async fn run(action: AdminAction) -> CommandResult {
    check_admin_session()?;
    let config = AdminConfig::from_env()?;
    let client = AdminClient::new(&config.backend_url);

    match action {
        AdminAction::Products { action } => run_products(&client, action).await?,
        AdminAction::Orders { action } => run_orders(&client, action).await?,
        AdminAction::Users { action } => run_users(&client, action).await?,
        AdminAction::Inventory => {
            for row in client.inventory().await? {
                let low = if row.stock < 5 { "  [low]" } else { "" };
                println!("{:>5}  stock {:>4}{low}  {}", row.id, row.stock, row.name);
            }
        }
        AdminAction::Sales { by_day } => {
            let rows = client.sales().await?;
            if by_day {
                for day in reports::group_by_day(&rows) {
                    let date = day
                        .date
                        .map_or_else(|| "(no date)".to_string(), |d| d.to_string());
                    println!(
                        "{date}  {}  ({} orders)",
                        format_inr(day.total),
                        day.order_count
                    );
                }
            } else {
                for row in &rows {
                    println!(
                        "{:<10} {}  {}",
                        row.order_id,
                        row.date.as_deref().unwrap_or("-"),
                        format_inr(row.sales)
                    );
                }
            }
            println!();
            println!(
                "Total: {} across {} orders",
                format_inr(reports::total_sales(&rows)),
                reports::unique_order_count(&rows)
            );
        }
        AdminAction::SaleDetails { order_id } => {
            let details = client.sale_details(&order_id).await?;
            println!("Order {}", details.order_id);
            for item in &details.items {
                println!(
                    "  {} x{}  {}",
                    item.product_name,
                    item.quantity,
                    format_inr(item.price)
                );
            }
        }
        AdminAction::Announce { title, content } => {
            let message = client
                .post_announcement(&Announcement { title, content })
                .await?;
            println!("{message}");
        }
    }
    Ok(())
}

async fn run_products(client: &AdminClient, action: AdminProductAction) -> CommandResult {
    match action {
        AdminProductAction::List => {
            for product in client.products().await? {
                println!(
                    "{:>5}  {}  stock {:>4}  {}",
                    product.id,
                    format_inr(product.price),
                    product.stock.map_or_else(|| "-".to_string(), |s| s.to_string()),
                    product.name
                );
            }
        }
        AdminProductAction::Add {
            name,
            mrp,
            price,
            stock,
            offer,
            description,
            image,
        } => {
            client
                .create_product(NewProduct {
                    name: name.clone(),
                    mrp: mrp.parse()?,
                    price: price.parse()?,
                    stock,
                    offer,
                    description,
                    image: image.map(read_image).transpose()?,
                })
                .await?;
            println!("Added product '{name}'.");
        }
        AdminProductAction::Update {
            product_id,
            name,
            mrp,
            price,
            stock,
            offer,
            description,
            existing_image,
            image,
        } => {
            client
                .update_product(ProductUpdate {
                    id: ProductId::new(product_id),
                    name,
                    mrp: mrp.parse()?,
                    price: price.parse()?,
                    stock,
                    offer,
                    description,
                    existing_image,
                    new_image: image.map(read_image).transpose()?,
                })
                .await?;
            println!("Updated product {product_id}.");
        }
        AdminProductAction::Delete { product_id } => {
            client.delete_product(ProductId::new(product_id)).await?;
            println!("Deleted product {product_id}.");
        }
    }
    Ok(())
}

async fn run_orders(client: &AdminClient, action: AdminOrderAction) -> CommandResult {
    match action {
        AdminOrderAction::List => {
            for order in client.orders().await? {
                println!(
                    "#{:<6} {:<10} {}  {}  {}",
                    order.order_id,
                    order.order_status,
                    format_inr(order.total_amount),
                    order.order_date.as_deref().unwrap_or("-"),
                    order.name.as_deref().unwrap_or("-"),
                );
            }
        }
        AdminOrderAction::SetStatus { order_id, status } => {
            let status: OrderStatus = status.parse().map_err(|_| {
                let expected: Vec<&str> = OrderStatus::ALL.iter().map(|s| s.as_str()).collect();
                format!("unknown status '{status}'; expected one of: {}", expected.join(", "))
            })?;
            let message = client
                .update_order_status(OrderId::new(order_id), status)
                .await?;
            println!("{message}");
        }
    }
    Ok(())
}

async fn run_users(client: &AdminClient, action: AdminUserAction) -> CommandResult {
    match action {
        AdminUserAction::List => {
            for user in client.users().await? {
                let role = if user.role.is_admin() { "admin" } else { "customer" };
                println!(
                    "{:>5}  {:<9} {} {} <{}>",
                    user.id, role, user.first_name, user.last_name, user.email
                );
            }
        }
        AdminUserAction::SetRole { user_id, role } => {
            let role = match role.as_str() {
                "admin" => UserRole::Admin,
                "customer" | "user" => UserRole::Customer,
                other => return Err(format!("unknown role '{other}'").into()),
            };
            let message = client.update_user_role(UserId::new(user_id), role).await?;
            println!("{message}");
        }
        AdminUserAction::Delete { user_id } => {
            let message = client.delete_user(UserId::new(user_id)).await?;
            println!("{message}");
        }
    }
    Ok(())
}
