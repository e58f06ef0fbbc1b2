use log::debug;
use sha2::{Digest, Sha256};

/// SHA-256 (hex) of the shared edit secret.
pub(crate) const EDIT_SECRET_DIGEST: &str =
    "773120eafef45a3583324edf35d7ecaeeed4d3d84d67f214ad9109ee4a36cccc";

/// Compares a candidate secret's digest with a fixed one.
///
/// This only decides whether the session may write; it is not a security
/// boundary. There is no lockout or retry limit.
#[derive(Debug, Clone)]
pub(crate) struct AccessGate {
    digest: String,
}

impl Default for AccessGate {
    fn default() -> Self {
        Self {
            digest: EDIT_SECRET_DIGEST.to_string(),
        }
    }
}

impl AccessGate {
    /// Gate for an arbitrary hex digest.
    pub(crate) fn with_digest(hex_digest: &str) -> anyhow::Result<Self> {
        let bytes = hex::decode(hex_digest.trim())
            .map_err(|e| anyhow::anyhow!("Edit digest is not valid hex: {e}"))?;
        if bytes.len() != 32 {
            anyhow::bail!("Edit digest must be 32 bytes, got {}", bytes.len());
        }
        Ok(Self {
            digest: hex::encode(bytes),
        })
    }

    pub(crate) fn grants_edit(&self, candidate: &str) -> bool {
        let granted = digest_hex(candidate) == self.digest;
        debug!("Edit access {}", if granted { "granted" } else { "denied" });
        granted
    }
}

pub(crate) fn digest_hex(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Permission {
    #[default]
    ReadOnly,
    Granted,
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadOnly => write!(f, "READ-ONLY"),
            Self::Granted => write!(f, "EDIT"),
        }
    }
}

/// Edit permission held by the caller for one interactive session.
#[derive(Debug, Clone, Default)]
pub(crate) struct EditSession {
    permission: Permission,
}

impl EditSession {
    /// A denied attempt is not an error: the session just stays read-only.
    pub(crate) fn unlock(&mut self, gate: &AccessGate, secret: &str) -> Permission {
        if gate.grants_edit(secret) {
            self.permission = Permission::Granted;
        }
        self.permission
    }

    pub(crate) fn lock(&mut self) {
        self.permission = Permission::ReadOnly;
    }

    pub(crate) fn permission(&self) -> Permission {
        self.permission
    }

    pub(crate) fn can_edit(&self) -> bool {
        self.permission == Permission::Granted
    }
}
