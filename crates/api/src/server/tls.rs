//! TLS material loading and rustls configuration.
//!
//! The private key, leaf certificate, and intermediate chain are read from a
//! Let's Encrypt-style directory (`live/<host>/{privkey,cert,chain}.pem`)
//! once at startup and held for the lifetime of the process. The reads are
//! synchronous; they happen before any request traffic exists.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use rustls::ServerConfig;

/// PEM-encoded TLS material loaded from disk.
#[derive(Debug)]
pub struct TlsMaterial {
    /// Contents of `privkey.pem`.
    pub key_pem: Vec<u8>,
    /// Contents of `cert.pem` (the leaf certificate).
    pub cert_pem: Vec<u8>,
    /// Contents of `chain.pem` (intermediate certificates).
    pub chain_pem: Vec<u8>,
}

/// Read `privkey.pem`, `cert.pem`, and `chain.pem` from `tls_dir`.
///
/// # Errors
///
/// Fails if any of the three files cannot be read; the error names the
/// offending file and embeds the underlying I/O error. This is a fatal
/// startup condition, never retried.
pub fn read_material(tls_dir: &str) -> Result<TlsMaterial> {
    let dir = Path::new(tls_dir);
    let read = |name: &str| -> Result<Vec<u8>> {
        let path = dir.join(name);
        std::fs::read(&path).with_context(|| {
            format!(
                "error reading SSL certificate and private key files: {}",
                path.display()
            )
        })
    };

    Ok(TlsMaterial {
        key_pem: read("privkey.pem")?,
        cert_pem: read("cert.pem")?,
        chain_pem: read("chain.pem")?,
    })
}

/// Build a [`rustls::ServerConfig`] from loaded PEM material.
///
/// The served chain is the leaf certificate followed by the intermediates;
/// client authentication is not requested.
///
/// # Errors
///
/// Returns an error if the certificates or key cannot be parsed, or if
/// rustls rejects the configuration.
pub fn build_server_config(material: &TlsMaterial) -> Result<Arc<ServerConfig>> {
    let mut certs = rustls_pemfile::certs(&mut std::io::BufReader::new(&material.cert_pem[..]))
        .collect::<Result<Vec<_>, _>>()
        .context("failed to parse TLS certificate")?;
    if certs.is_empty() {
        anyhow::bail!("no certificate found in cert.pem");
    }

    let chain = rustls_pemfile::certs(&mut std::io::BufReader::new(&material.chain_pem[..]))
        .collect::<Result<Vec<_>, _>>()
        .context("failed to parse TLS certificate chain")?;
    certs.extend(chain);

    let key = rustls_pemfile::private_key(&mut std::io::BufReader::new(&material.key_pem[..]))
        .context("failed to read TLS private key")?
        .context("no private key found in privkey.pem")?;

    let config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .context("failed to build rustls ServerConfig")?;

    Ok(Arc::new(config))
}

/// Read the TLS material from `tls_dir` and build the server configuration.
pub fn load_server_config(tls_dir: &str) -> Result<Arc<ServerConfig>> {
    let material = read_material(tls_dir)?;
    build_server_config(&material)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material(key: &[u8], cert: &[u8], chain: &[u8]) -> TlsMaterial {
        TlsMaterial {
            key_pem: key.to_vec(),
            cert_pem: cert.to_vec(),
            chain_pem: chain.to_vec(),
        }
    }

    #[test]
    fn rejects_empty_pem() {
        let result = build_server_config(&material(b"", b"", b""));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_garbage_pem() {
        let result = build_server_config(&material(b"not a pem", b"also not a pem", b""));
        assert!(result.is_err());
    }

    #[test]
    fn read_material_names_the_missing_file() {
        let err = read_material("/nonexistent/live/api.example.test").unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("privkey.pem"), "unexpected error: {msg}");
        // The underlying I/O error is preserved in the chain.
        assert!(err.chain().count() >= 2);
    }
}
