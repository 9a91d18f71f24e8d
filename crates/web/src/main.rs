use error_stack::{AttachmentKind, FrameKind, Report};
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace as sdktrace;
use opentelemetry_sdk::Resource;
use property_rank_core::{
    adapters::config::{app_config::AppConfig, sheets_config::ConfigurationError},
    prettyprint::prettyprint::PrettyFormatter,
};
use tracing::{error, info, instrument};
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Registry};

mod dashboard_factory;
mod views;
mod web_adapter;

use dashboard_factory::DashboardFactory;

#[tokio::main]
#[instrument]
async fn main() -> anyhow::Result<()> {
    setup_tracing()?;
    setup_panic_hook();

    info!("Starting property-rank web dashboard");

    let result = run().await;
    if let Err(e) = &result {
        error!("Server stopped: {:?}", e);
    }
    opentelemetry::global::shutdown_tracer_provider();
    result
}

async fn run() -> anyhow::Result<()> {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(report) => {
            error!("Failed to load configuration: {:?}", report);
            let server = AppConfig::load_server();
            return serve(&server.bind_addr, configuration_error_app(&report)).await;
        }
    };

    let app = match DashboardFactory::create(&config).await {
        Ok(state) => web_adapter::router(state),
        Err(report) => {
            error!("Failed to set up the dashboard: {:?}", report);
            configuration_error_app(&report)
        }
    };

    serve(&config.server.bind_addr, app).await
}

fn configuration_error_app(report: &Report<ConfigurationError>) -> axum::Router {
    web_adapter::configuration_error_router(describe(report))
}

/// The report's context followed by its printable attachments, one per line.
fn describe(report: &Report<ConfigurationError>) -> String {
    let mut lines = vec![report.current_context().to_string()];
    lines.extend(report.frames().filter_map(|frame| match frame.kind() {
        FrameKind::Attachment(AttachmentKind::Printable(printable)) => Some(printable.to_string()),
        _ => None,
    }));
    lines.join("\n")
}

async fn serve(bind_addr: &str, app: axum::Router) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

fn setup_tracing() -> anyhow::Result<()> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(PrettyFormatter::new(true))
        .with_writer(std::io::stderr);

    let log_file_layer = tracing_subscriber::fmt::layer()
        .event_format(PrettyFormatter::new(false))
        .with_writer(std::fs::File::create("property_rank.log")?)
        .with_ansi(false);

    // Spans are exported only when a collector is configured.
    let otel_layer = match std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") {
        Ok(endpoint) if !endpoint.trim().is_empty() => {
            let exporter = opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint);

            let tracer = opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_exporter(exporter)
                .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
                    KeyValue::new("service.name", "property_rank_web"),
                ])))
                .install_batch(opentelemetry_sdk::runtime::Tokio)?;

            Some(OpenTelemetryLayer::new(tracer))
        }
        _ => None,
    };

    Registry::default()
        .with(
            tracing_subscriber::filter::Targets::new()
                .with_target("property_rank_web", tracing::Level::TRACE)
                .with_target("property_rank_core", tracing::Level::TRACE)
                .with_target("tower_http", tracing::Level::DEBUG),
        )
        .with(otel_layer)
        .with(log_file_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}

fn setup_panic_hook() {
    tracing::trace!("Setting panic hook");
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("panic: {info}");
        opentelemetry::global::shutdown_tracer_provider();
    }));
}

#[cfg(test)]
mod tests {
    use error_stack::report;

    use super::*;

    #[test]
    fn test_describe_includes_attachments() {
        let report = report!(ConfigurationError::MissingCredentials)
            .attach_printable("Config file: 'Config'");
        let message = describe(&report);
        assert!(message.starts_with(&ConfigurationError::MissingCredentials.to_string()));
        assert!(message.contains("Config file: 'Config'"));
    }
}
