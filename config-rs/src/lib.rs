//! config-rs/lib.rs
//! Shared configuration helpers for the enrichment services
//! Loads `.env` files and resolves bind addresses from the environment

use std::env;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Load variables from the nearest `.env` file, if any
///
/// Variables already present in the process environment win.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenv::dotenv() {
        Ok(path) => {
            log::debug!("Loaded environment from {}", path.display());
            Some(path)
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            log::warn!("Ignoring unreadable .env file: {}", e);
            None
        }
    }
}

/// Port from `<SERVICE>_SERVICE_PORT`, or `default_port`
pub fn get_service_port(service_name: &str, default_port: u16) -> u16 {
    let var_name = format!("{}_SERVICE_PORT", service_name.to_uppercase());
    match env::var(&var_name) {
        Ok(value) => value.trim().parse::<u16>().unwrap_or_else(|_| {
            log::warn!("Invalid port '{}' in {}, using default {}", value, var_name, default_port);
            default_port
        }),
        Err(_) => default_port,
    }
}

/// Bind address from `<SERVICE>_SERVICE_ADDR`, else all interfaces on the service port
///
/// The address override accepts `host:port` with or without an
/// `http://` / `https://` scheme.
pub fn get_bind_address(service_name: &str, default_port: u16) -> SocketAddr {
    let var_name = format!("{}_SERVICE_ADDR", service_name.to_uppercase());

    if let Ok(value) = env::var(&var_name) {
        match parse_socket_addr(&value) {
            Some(addr) => return addr,
            None => log::warn!("Invalid address '{}' in {}, using default", value, var_name),
        }
    }

    SocketAddr::from((Ipv4Addr::UNSPECIFIED, get_service_port(service_name, default_port)))
}

fn parse_socket_addr(value: &str) -> Option<SocketAddr> {
    let value = value.trim();
    let without_scheme = value
        .strip_prefix("http://")
        .or_else(|| value.strip_prefix("https://"))
        .unwrap_or(value);
    without_scheme.trim_end_matches('/').parse().ok()
}
