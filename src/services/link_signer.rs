use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signs practitioner login tickets. The ticket itself stays
/// `(email, timestamp)`; the signature only proves the server issued it.
#[derive(Clone)]
pub struct LinkSigner {
    secret: Vec<u8>,
}

impl LinkSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    fn mac(&self, email: &str, timestamp: i64) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length");
        mac.update(email.as_bytes());
        mac.update(b":");
        mac.update(timestamp.to_string().as_bytes());
        mac
    }

    pub fn sign(&self, email: &str, timestamp: i64) -> String {
        hex::encode(self.mac(email, timestamp).finalize().into_bytes())
    }

    /// Constant-time comparison of a hex signature.
    pub fn verify(&self, email: &str, timestamp: i64, signature: &str) -> bool {
        match hex::decode(signature) {
            Ok(bytes) => self.mac(email, timestamp).verify_slice(&bytes).is_ok(),
            Err(_) => false,
        }
    }
}
