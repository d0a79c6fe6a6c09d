//! RideDash desktop app - main entry point
//!
//! Loads configuration, installs logging, enters a tokio runtime for the
//! lifetime of the UI thread and runs the eframe app.

use eframe::egui;
use ridedash::client::Config;
use ridedash::dashboard::theme::styles;
use ridedash::dashboard::{views, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ridedash=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    config.app().validate()?;
    tracing::info!(api = %config.api_base_url(), maps = config.app().has_maps_key(), "starting ridedash");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let _guard = runtime.enter();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 780.0])
            .with_min_inner_size([760.0, 560.0]),
        ..Default::default()
    };
    eframe::run_native(
        "RideDash",
        options,
        Box::new(|cc| {
            styles::apply_global_theme(&cc.egui_ctx);
            Ok(Box::new(RideDashApp {
                state: AppState::new(config),
            }))
        }),
    )?;
    Ok(())
}

struct RideDashApp {
    state: AppState,
}

impl eframe::App for RideDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.update();

        views::render_top_bar(ctx, &mut self.state);
        views::render_main_panel(ctx, &mut self.state);

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}
