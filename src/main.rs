#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use critiq::app;

use iced::window;
use iced::Size;

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    iced::application(app::new, app::update, app::view)
        .title("Critiq")
        .theme(app::theme)
        .subscription(app::subscription)
        .window(window::Settings {
            size: Size::new(1280.0, 820.0),
            min_size: Some(Size::new(900.0, 600.0)),
            ..Default::default()
        })
        .settings(app::settings())
        .run()
}
