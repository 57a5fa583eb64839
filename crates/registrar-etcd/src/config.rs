// TLS configuration for the etcd backend

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Client TLS material for talking to etcd
///
/// Every path is optional. Setting a CA bundle or a client certificate
/// switches the endpoint scheme to `https://`; mutual TLS is only attempted
/// when both the certificate and the key are set. Empty paths count as unset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, clap::Args)]
#[serde(rename_all = "camelCase", default)]
pub struct EtcdTlsConfig {
    /// Identify HTTPS client using this SSL certificate file
    #[arg(long = "etcd-cert-file", env = "ETCD_CERT_FILE")]
    pub cert_file: Option<PathBuf>,

    /// Identify HTTPS client using this SSL key file
    #[arg(long = "etcd-key-file", env = "ETCD_KEY_FILE")]
    pub key_file: Option<PathBuf>,

    /// Verify certificates of HTTPS-enabled servers using this CA bundle
    #[arg(long = "etcd-ca-file", env = "ETCD_CA_FILE")]
    pub ca_file: Option<PathBuf>,
}

impl EtcdTlsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the client certificate and key used for mutual TLS
    pub fn with_client_cert(
        mut self,
        cert_file: impl Into<PathBuf>,
        key_file: impl Into<PathBuf>,
    ) -> Self {
        self.cert_file = Some(cert_file.into());
        self.key_file = Some(key_file.into());
        self
    }

    /// Set the CA bundle used to verify the server
    pub fn with_ca_file(mut self, ca_file: impl Into<PathBuf>) -> Self {
        self.ca_file = Some(ca_file.into());
        self
    }

    pub fn cert_file(&self) -> Option<&Path> {
        non_empty(&self.cert_file)
    }

    pub fn key_file(&self) -> Option<&Path> {
        non_empty(&self.key_file)
    }

    pub fn ca_file(&self) -> Option<&Path> {
        non_empty(&self.ca_file)
    }

    /// Certificate and key, only when both are set
    pub fn client_identity(&self) -> Option<(&Path, &Path)> {
        self.cert_file().zip(self.key_file())
    }

    /// Whether the store is reached over HTTPS
    pub fn is_secure(&self) -> bool {
        self.ca_file().is_some() || self.cert_file().is_some()
    }

    pub fn scheme(&self) -> &'static str {
        if self.is_secure() { "https://" } else { "http://" }
    }
}

fn non_empty(path: &Option<PathBuf>) -> Option<&Path> {
    path.as_deref().filter(|p| !p.as_os_str().is_empty())
}
