use std::path::Path;
use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, WebPkiSupportedAlgorithms};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, ProtocolVersion, RootCertStore, SignatureScheme};
use rustls_pemfile::Item;

use crate::error::TesterError;

const ALPN_HTTP1: &[u8] = b"http/1.1";

/// Builds the client TLS configuration shared by every connection of a run.
pub(crate) fn build_client_config(
    insecure: bool,
    client_certificate: Option<&Path>,
) -> Result<Arc<ClientConfig>, TesterError> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let builder = ClientConfig::builder_with_provider(Arc::clone(&provider))
        .with_protocol_versions(rustls::ALL_VERSIONS)
        .map_err(|source| TesterError::TlsConfig { source })?;

    let builder = if insecure {
        builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert::new(&provider)))
    } else {
        let roots = RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        builder.with_root_certificates(roots)
    };

    let mut config = match client_certificate {
        Some(path) => {
            let (chain, key) = load_client_identity(path)?;
            builder
                .with_client_auth_cert(chain, key)
                .map_err(|err| TesterError::CertificateFileFormat {
                    path: path.to_path_buf(),
                    reason: err.to_string(),
                })?
        }
        None => builder.with_no_client_auth(),
    };
    config.alpn_protocols = vec![ALPN_HTTP1.to_vec()];

    Ok(Arc::new(config))
}

/// Reads a PEM file holding both the certificate chain and its private key.
pub(crate) fn load_client_identity(
    path: &Path,
) -> Result<(Vec<CertificateDer<'static>>, PrivateKeyDer<'static>), TesterError> {
    let pem = std::fs::read(path).map_err(|source| TesterError::CertificateFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_client_identity(&pem).map_err(|reason| TesterError::CertificateFileFormat {
        path: path.to_path_buf(),
        reason,
    })
}

pub(crate) fn parse_client_identity(
    pem: &[u8],
) -> Result<(Vec<CertificateDer<'static>>, PrivateKeyDer<'static>), String> {
    let mut chain = Vec::new();
    let mut key = None;
    let mut reader = pem;

    for item in rustls_pemfile::read_all(&mut reader) {
        #[expect(
            clippy::wildcard_enum_match_arm,
            reason = "Public keys, CRLs and CSRs play no part in the client identity."
        )]
        match item.map_err(|err| err.to_string())? {
            Item::X509Certificate(cert) => chain.push(cert),
            Item::Pkcs1Key(der) => key = Some(PrivateKeyDer::Pkcs1(der)),
            Item::Pkcs8Key(der) => key = Some(PrivateKeyDer::Pkcs8(der)),
            Item::Sec1Key(der) => key = Some(PrivateKeyDer::Sec1(der)),
            _ => {}
        }
    }

    if chain.is_empty() {
        return Err("tls: failed to find any PEM data in certificate input".to_owned());
    }
    let key = key.ok_or_else(|| "tls: failed to find any PEM data in key input".to_owned())?;
    Ok((chain, key))
}

#[must_use]
pub(crate) const fn version_label(version: Option<ProtocolVersion>) -> &'static str {
    match version {
        Some(ProtocolVersion::TLSv1_2) => "TLSv1.2",
        Some(ProtocolVersion::TLSv1_3) => "TLSv1.3",
        Some(_) | None => "UNKNOWN",
    }
}

/// Skips certificate validation; handshake signatures are still checked.
#[derive(Debug)]
struct AcceptAnyServerCert {
    algorithms: WebPkiSupportedAlgorithms,
}

impl AcceptAnyServerCert {
    const fn new(provider: &CryptoProvider) -> Self {
        Self {
            algorithms: provider.signature_verification_algorithms,
        }
    }
}

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(message, cert, dss, &self.algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(message, cert, dss, &self.algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.algorithms.supported_schemes()
    }
}
