//! Wirecrest CLI - storefront and admin console in the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! wirecrest products --search camera --sort low
//!
//! # Cart
//! wirecrest cart show
//! wirecrest cart add 12
//! wirecrest cart set-qty 12 3
//! wirecrest cart remove 12
//!
//! # Checkout and orders
//! wirecrest checkout --name "R. Mehta" --phone 9000000000 \
//!     --address1 "14 MG Road" --city Pune --pincode 411001
//! wirecrest orders list
//!
//! # Account
//! wirecrest account login -e you@example.com -p <password>
//! wirecrest account logout
//!
//! # Store management (admin accounts)
//! wirecrest admin orders set-status 41 shipped
//! wirecrest admin sales --by-day
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "wirecrest")]
#[command(author, version, about = "Wirecrest storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the product catalog
    Products {
        /// Filter by name substring
        #[arg(short, long)]
        search: Option<String>,

        /// Price sort: `low` or `high`
        #[arg(long)]
        sort: Option<String>,

        /// Bypass the catalog cache
        #[arg(long)]
        fresh: bool,
    },
    /// Cart operations
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for the current cart
    Checkout {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        address1: String,
        #[arg(long, default_value = "")]
        address2: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        pincode: String,
        /// Payment mode: `cod` or `online`
        #[arg(long, default_value = "cod")]
        payment: String,
    },
    /// Order history
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Account operations
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Store management (admin accounts)
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart with its order summary
    Show,
    /// Add one unit of a product
    Add {
        /// Product id
        product_id: i32,
    },
    /// Set the quantity of a line item
    SetQty {
        /// Product id
        product_id: i32,
        /// New quantity (at least 1)
        quantity: u32,
    },
    /// Remove a line item
    Remove {
        /// Product id
        product_id: i32,
    },
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List past orders
    List,
    /// Account dashboard: profile plus recent orders
    Dashboard,
}

#[derive(Subcommand)]
enum AccountAction {
    /// Log in and persist the session
    Login {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Log out, clearing the session
    Logout,
    /// Create an account
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Show the profile on record
    Profile,
    /// Update profile fields
    UpdateProfile {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        /// New password (omit to keep the current one)
        #[arg(long)]
        password: Option<String>,
    },
    /// Start a password reset by requesting an OTP
    RequestOtp {
        #[arg(short, long)]
        email: String,
    },
    /// Verify a password-reset OTP
    VerifyOtp {
        #[arg(short, long)]
        email: String,
        #[arg(long)]
        otp: String,
    },
    /// Set a new password with a verified OTP
    ResetPassword {
        #[arg(short, long)]
        email: String,
        #[arg(long)]
        otp: String,
        #[arg(short, long)]
        password: String,
    },
    /// Subscribe an email to the newsletter
    Subscribe {
        #[arg(short, long)]
        email: String,
    },
    /// Send a contact-form message
    Contact {
        #[arg(long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(short, long)]
        message: String,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Catalog management
    Products {
        #[command(subcommand)]
        action: AdminProductAction,
    },
    /// Order management
    Orders {
        #[command(subcommand)]
        action: AdminOrderAction,
    },
    /// User management
    Users {
        #[command(subcommand)]
        action: AdminUserAction,
    },
    /// Current stock levels
    Inventory,
    /// Sales ledger
    Sales {
        /// Group rows by calendar day
        #[arg(long)]
        by_day: bool,
    },
    /// Line items of one order
    SaleDetails {
        /// Order reference
        order_id: String,
    },
    /// Post a storewide announcement
    Announce {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
}

#[derive(Subcommand)]
enum AdminProductAction {
    /// List the catalog with stock
    List,
    /// Add a product
    Add {
        #[arg(long)]
        name: String,
        /// Maximum retail price
        #[arg(long)]
        mrp: String,
        /// Sale price
        #[arg(long)]
        price: String,
        #[arg(long)]
        stock: u32,
        #[arg(long, default_value = "")]
        offer: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Path to an image file to upload
        #[arg(long)]
        image: Option<std::path::PathBuf>,
    },
    /// Update a product
    Update {
        product_id: i32,
        #[arg(long)]
        name: String,
        #[arg(long)]
        mrp: String,
        #[arg(long)]
        price: String,
        #[arg(long)]
        stock: u32,
        #[arg(long, default_value = "")]
        offer: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Current image file name to keep
        #[arg(long)]
        existing_image: Option<String>,
        /// Path to a replacement image file
        #[arg(long)]
        image: Option<std::path::PathBuf>,
    },
    /// Delete a product
    Delete { product_id: i32 },
}

#[derive(Subcommand)]
enum AdminOrderAction {
    /// List all orders
    List,
    /// Move an order to a new status
    SetStatus {
        order_id: i32,
        /// `pending`, `shipped`, `delivered`, or `cancelled`
        status: String,
    },
}

#[derive(Subcommand)]
enum AdminUserAction {
    /// List all accounts
    List,
    /// Change an account's role (`customer` or `admin`)
    SetRole { user_id: i32, role: String },
    /// Delete an account
    Delete { user_id: i32 },
}

#[tokio::main]
async fn main() {
    // Initialize tracing; RUST_LOG overrides the default
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "wirecrest=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Products { search, sort, fresh } => {
            commands::shop::products(search.as_deref(), sort.as_deref(), fresh).await?;
        }
        Commands::Cart { action } => match action {
            CartAction::Show => commands::shop::cart_show().await?,
            CartAction::Add { product_id } => commands::shop::cart_add(product_id).await?,
            CartAction::SetQty {
                product_id,
                quantity,
            } => commands::shop::cart_set_qty(product_id, quantity).await?,
            CartAction::Remove { product_id } => commands::shop::cart_remove(product_id).await?,
        },
        Commands::Checkout {
            name,
            phone,
            address1,
            address2,
            city,
            pincode,
            payment,
        } => {
            commands::shop::checkout(name, phone, address1, address2, city, pincode, &payment)
                .await?;
        }
        Commands::Orders { action } => match action {
            OrdersAction::List => commands::shop::orders_list().await?,
            OrdersAction::Dashboard => commands::shop::dashboard().await?,
        },
        Commands::Account { action } => commands::account::run(action).await?,
        Commands::Admin { action } => commands::admin::run(action).await?,
    }
    Ok(())
}
