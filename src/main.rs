// src/main.rs

use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shop_admin_console::config::AppConfig;
use shop_admin_console::controller::{ListController, RemoteCollection};
use shop_admin_console::dashboard::DashboardWidgets;
use shop_admin_console::errors::AppError;
use shop_admin_console::models::{ListRecord, OrderStatus};
use shop_admin_console::pagination::PageSize;
use shop_admin_console::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "shop_admin_console", about = "Konsola administracyjna sklepu")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long)]
    page_size: Option<u32>,
    #[arg(long, default_value = "")]
    search: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lista zamówień z filtrami
    Orders {
        #[command(flatten)]
        list: ListArgs,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        payment_mode: Option<String>,
    },
    /// Lista klientów
    Customers {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Widgety pulpitu: sprzedaż, najlepsze produkty, analityka zamówień
    Dashboard,
    SetOrderStatus { order_id: String, status: String },
    ToggleCustomer { customer_id: String },
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    // Inicjalizacja systemu logowania (tracing)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shop_admin_console=debug,reqwest=info".into()), // np. RUST_LOG=info
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        tracing::error!("Polecenie zakończone błędem: {:?}", err);
        eprintln!("{}", err.user_message());
        if err.is_retryable() {
            eprintln!("Spróbuj ponownie za chwilę.");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let state = AppState::new(config)?;
    tracing::info!("Adres API panelu: {}", state.api.base_url());

    match cli.command {
        Command::Orders {
            list,
            status,
            payment_mode,
        } => {
            let controller = state.orders_controller();
            controller.set_status_filter(status.map(OrderStatus::from));
            controller.set_payment_mode_filter(payment_mode);
            load_list(&controller, &list, state.config.default_page_size).await?;

            let view = controller.snapshot();
            println!("{:<9} {:<24} {:<20} {:<12} {:>10} {:<8} {}", "ID", "Produkt", "Klient", "Data", "Kwota", "Płatność", "Status");
            for order in &view.page.items {
                println!(
                    "{:<9} {:<24} {:<20} {:<12} {:>10} {:<8} {}",
                    order.short_id(),
                    order.display_product(),
                    order.display_customer(),
                    order.display_date(),
                    order.display_amount(),
                    order.payment_mode.as_deref().unwrap_or("-"),
                    order.status
                );
            }
            print_counters(&view.stats.counters());
            print_pager(&controller);
        }
        Command::Customers { list } => {
            let controller = state.customers_controller();
            load_list(&controller, &list, state.config.default_page_size).await?;

            let view = controller.snapshot();
            println!("{:<12} {:<28} {:<12} {:>8} {:>10} {}", "ID", "E-mail", "Ostatnie", "Zamów.", "Wydano", "Status");
            for customer in &view.page.items {
                println!(
                    "{:<12} {:<28} {:<12} {:>8} {:>10.2} {}",
                    customer.short_id(),
                    customer.display_email(),
                    customer.display_last_order(),
                    customer.total_orders,
                    customer.total_spent,
                    customer.status
                );
            }
            print_counters(&view.stats.counters());
            print_pager(&controller);
        }
        Command::Dashboard => {
            let mut widgets = state.dashboard();
            widgets.refresh_all().await;
            print_dashboard(&widgets);
        }
        Command::SetOrderStatus { order_id, status } => {
            let controller = state.orders_controller();
            controller
                .update_status(&order_id, OrderStatus::from(status))
                .await?;
            println!("Zaktualizowano zamówienie {}", order_id);
        }
        Command::ToggleCustomer { customer_id } => {
            let controller = state.customers_controller();
            controller.toggle_status(&customer_id).await?;
            println!("Przełączono status klienta {}", customer_id);
        }
    }

    Ok(())
}

/// Ustawia zapytanie i pobiera żądaną stronę bez czekania na opóźnienie wyszukiwania.
async fn load_list<C: RemoteCollection>(
    controller: &ListController<C>,
    args: &ListArgs,
    default_size: PageSize,
) -> Result<(), AppError> {
    let page_size = match args.page_size {
        Some(size) => PageSize::try_from(size)?,
        None => default_size,
    };
    controller.set_search_text(args.search.as_str());
    // Zmiana rozmiaru strony anuluje odliczanie i od razu pobiera stronę 1.
    controller.set_page_size(page_size).await;
    if args.page > 1 {
        controller.set_page(args.page).await;
    }
    controller.teardown();

    controller.check_loaded()
}

fn print_counters(counters: &std::collections::BTreeMap<&'static str, u64>) {
    let line: Vec<String> = counters
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect();
    println!("{}", line.join("  "));
}

fn print_pager<C: RemoteCollection>(controller: &ListController<C>) {
    let query = controller.query();
    let pages: Vec<String> = controller
        .page_numbers()
        .into_iter()
        .map(|n| if n == query.page { format!("[{}]", n) } else { n.to_string() })
        .collect();
    println!(
        "{} Strony: {} {}",
        if controller.has_previous_page() { "<" } else { " " },
        pages.join(" "),
        if controller.has_next_page() { ">" } else { " " }
    );
}

fn print_dashboard(widgets: &DashboardWidgets) {
    for card in widgets.sales_cards() {
        println!("{:<20} {:>10} {}", card.title, card.value, card.change);
    }
    if let Some(message) = &widgets.sales.error {
        println!("! {}", message);
    }

    println!();
    for row in widgets.top_product_rows() {
        println!(
            "{}. {:<28} {:>5.0}% {}",
            row.rank, row.name, row.popularity, row.sold_label
        );
    }
    if let Some(message) = &widgets.top_products.error {
        println!("! {}", message);
    }

    println!();
    if let Some(overview) = widgets.orders_overview() {
        println!("Zamówienia: {} ({})", overview.total_orders, overview.trend_label());
        for slice in &overview.by_time {
            println!("  {:<10} {:<8} {}", slice.label, slice.range.unwrap_or(""), slice.count);
        }
        let days: Vec<String> = overview
            .daily
            .iter()
            .map(|point| format!("{}:{}", point.day, point.count))
            .collect();
        println!("  {}", days.join(" "));
    }
    if let Some(message) = &widgets.analytics.error {
        println!("! {}", message);
    }
}
