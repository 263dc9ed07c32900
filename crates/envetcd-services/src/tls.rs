//! TLS material loading for store clients.

use envetcd_types::config::TlsConfig;
use envetcd_types::{EnvEtcdError, Result};
use reqwest::{Certificate, ClientBuilder, Identity};
use std::path::Path;

fn read_pem(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| EnvEtcdError::File {
        path: path.to_path_buf(),
        source,
    })
}

/// Configure `builder` with the CA and client identity in `tls`.
///
/// Leaves the builder untouched when no TLS material is configured.
///
/// # Errors
///
/// - [`EnvEtcdError::File`] when a file cannot be read
/// - [`EnvEtcdError::Config`] when a file is not valid PEM, or only one of
///   certificate and key is set
pub fn apply(builder: ClientBuilder, tls: &TlsConfig) -> Result<ClientBuilder> {
    if !tls.is_configured() {
        return Ok(builder);
    }

    let mut builder = builder.use_rustls_tls();

    if let Some(ca_file) = &tls.ca_file {
        let pem = read_pem(ca_file)?;
        let cert = Certificate::from_pem(&pem).map_err(|e| {
            EnvEtcdError::Config(format!("Invalid CA cert {}: {}", ca_file.display(), e))
        })?;
        builder = builder.add_root_certificate(cert);
    }

    match (&tls.cert_file, &tls.key_file) {
        (Some(cert_file), Some(key_file)) => {
            // rustls wants key and certificate chain in a single PEM buffer.
            let mut pem = read_pem(key_file)?;
            pem.push(b'\n');
            pem.extend(read_pem(cert_file)?);
            let identity = Identity::from_pem(&pem).map_err(|e| {
                EnvEtcdError::Config(format!(
                    "Invalid client certificate {} / key {}: {}",
                    cert_file.display(),
                    key_file.display(),
                    e
                ))
            })?;
            builder = builder.identity(identity);
        }
        (None, None) => {}
        _ => {
            return Err(EnvEtcdError::Config(
                "client certificate and key must be given together".to_string(),
            ))
        }
    }

    Ok(builder)
}
