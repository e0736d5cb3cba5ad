mod config;
mod error;
mod outcome;
mod persist;
mod response;
mod search;
mod server;
mod tools;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use rmcp::{transport::stdio, ServiceExt};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::server::ImageSearchServer;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Image Search MCP Server v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    tracing::debug!(
        "Configuration loaded: endpoint={} engine={} key={}",
        config.search_api_url,
        config.search_engine_id,
        config.mask_api_key()
    );

    let server = ImageSearchServer::new(&config)?;
    let service = server.serve(stdio()).await?;

    tokio::select! {
        result = service.waiting() => {
            if let Err(e) = result {
                tracing::warn!("Service ended with error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received");
        }
        _ = parent_process_exited() => {
            tracing::info!("Parent process exited");
        }
    }

    tracing::info!("Image Search MCP Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Ctrl+C handler unavailable: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("SIGTERM handler unavailable: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// Resolves when the stdin pipe from the parent is gone. Windows does not always
/// deliver EOF to the stdio transport, so the pipe is polled there.
async fn parent_process_exited() {
    #[cfg(windows)]
    {
        use std::os::windows::io::AsRawHandle;
        use tokio::time::{interval, Duration};
        use windows_sys::Win32::Storage::FileSystem::{GetFileType, FILE_TYPE_PIPE};

        let stdin = std::io::stdin().as_raw_handle() as *mut std::ffi::c_void;

        if unsafe { GetFileType(stdin) } != FILE_TYPE_PIPE {
            tracing::debug!("Stdin is not a pipe, parent process monitor disabled");
            return std::future::pending::<()>().await;
        }

        let mut tick = interval(Duration::from_millis(500));
        loop {
            tick.tick().await;
            if pipe_closed(stdin) {
                break;
            }
        }
    }

    #[cfg(not(windows))]
    std::future::pending::<()>().await
}

#[cfg(windows)]
fn pipe_closed(handle: *mut std::ffi::c_void) -> bool {
    use windows_sys::Win32::Foundation::{GetLastError, ERROR_BROKEN_PIPE, ERROR_INVALID_HANDLE, ERROR_NO_DATA};
    use windows_sys::Win32::System::Pipes::PeekNamedPipe;

    let mut available: u32 = 0;
    let ok = unsafe {
        PeekNamedPipe(handle, std::ptr::null_mut(), 0, std::ptr::null_mut(), &mut available, std::ptr::null_mut())
    };
    ok == 0 && matches!(unsafe { GetLastError() }, ERROR_BROKEN_PIPE | ERROR_NO_DATA | ERROR_INVALID_HANDLE)
}
