//! HTTP(S) transport shared by the version probe and both clients
//!
//! Built once per factory call; the resulting `reqwest::Client` is immutable
//! and cheap to clone (it shares one connection pool).

use std::{fs, time::Duration};

use reqwest::{Certificate, Client, Identity};
use tracing::debug;

use crate::{config::EtcdTlsConfig, error::ConfigurationError};

/// TCP connect timeout
pub const DIAL_TIMEOUT: Duration = Duration::from_secs(30);
/// TCP keep-alive interval
pub const KEEP_ALIVE: Duration = Duration::from_secs(30);
/// Extra connect budget granted to the TLS handshake
pub const TLS_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the transport for the given TLS material
///
/// A CA bundle that cannot be read is fatal; one that holds no usable PEM
/// certificate is ignored and the default trust store stays in effect.
/// A client identity is only loaded when both certificate and key are set.
pub fn build_transport(tls: &EtcdTlsConfig) -> Result<Client, ConfigurationError> {
    let mut builder = Client::builder()
        .connect_timeout(connect_timeout(tls.is_secure()))
        .tcp_keepalive(KEEP_ALIVE);

    if let Some(ca_file) = tls.ca_file() {
        let pem = fs::read(ca_file).map_err(|source| ConfigurationError::ReadCaBundle {
            path: ca_file.to_path_buf(),
            source,
        })?;

        match Certificate::from_pem_bundle(&pem) {
            Ok(certs) if !certs.is_empty() => {
                debug!(
                    "etcd: trusting {} CA certificates from {}",
                    certs.len(),
                    ca_file.display()
                );
                for cert in certs {
                    builder = builder.add_root_certificate(cert);
                }
            }
            Ok(_) | Err(_) => {
                debug!(
                    "etcd: no usable certificate in {}, keeping default trust store",
                    ca_file.display()
                );
            }
        }
    }

    if let Some((cert_file, key_file)) = tls.client_identity() {
        let mut pem = read_pem(cert_file)?;
        pem.push(b'\n');
        pem.extend(read_pem(key_file)?);

        let identity = Identity::from_pem(&pem).map_err(ConfigurationError::InvalidKeyPair)?;
        builder = builder.identity(identity);
    }

    builder.build().map_err(ConfigurationError::Transport)
}

/// Connect budget: the dial timeout, plus the handshake allowance over TLS
pub fn connect_timeout(secure: bool) -> Duration {
    if secure {
        DIAL_TIMEOUT + TLS_HANDSHAKE_TIMEOUT
    } else {
        DIAL_TIMEOUT
    }
}

fn read_pem(path: &std::path::Path) -> Result<Vec<u8>, ConfigurationError> {
    fs::read(path).map_err(|source| ConfigurationError::ReadKeyPair {
        path: path.to_path_buf(),
        source,
    })
}
