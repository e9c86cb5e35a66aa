//! # Receipt Verification
//!
//! Three checks, strictly in order. A later check never runs once an
//! earlier one fails, so the reported reason always names the first
//! property that does not hold:
//!
//! 1. **Schema**: the receipt's canonical form matches the receipt schema.
//! 2. **Signature**: `signature` is a valid Ed25519 signature by `key`
//!    over the canonical bytes of `license` alone.
//! 3. **Key window**: `key` is in the broker's register and
//!    `license.values.effective` lies within the key's interval. Both
//!    bounds are inclusive.

use lzero_core::{KeyRegister, Receipt, Timeframe, Timestamp};
use lzero_crypto::{verify_with_public_key, Ed25519PublicKey, Ed25519Signature};
use lzero_schema::{SchemaKind, SchemaRegistry};

use crate::error::TrustError;

/// Verify a receipt against its broker's key register.
///
/// # Errors
///
/// Returns the first failed check as a [`TrustError`].
pub fn verify_receipt(
    receipt: &Receipt,
    register: &KeyRegister,
    registry: &SchemaRegistry,
) -> Result<(), TrustError> {
    check_schema(receipt, registry)?;
    check_signature(receipt)?;

    let timeframe = register
        .timeframe(&receipt.key)
        .ok_or_else(|| TrustError::UnknownKey {
            key: receipt.key.clone(),
        })?;
    let effective = receipt
        .effective()
        .map_err(|e| TrustError::Malformed(e.to_string()))?;
    check_key_window(&effective, timeframe)?;

    tracing::debug!(
        offer_id = %receipt.offer_id(),
        order_id = %receipt.order_id(),
        "receipt verified"
    );
    Ok(())
}

fn check_schema(receipt: &Receipt, registry: &SchemaRegistry) -> Result<(), TrustError> {
    let canonical = receipt
        .canonical()
        .map_err(|e| TrustError::Malformed(e.to_string()))?;
    let instance: serde_json::Value = serde_json::from_slice(canonical.as_bytes())
        .map_err(|e| TrustError::Malformed(e.to_string()))?;
    registry
        .validate(SchemaKind::Receipt, &instance)
        .map_err(|e| TrustError::Malformed(e.to_string()))
}

fn check_signature(receipt: &Receipt) -> Result<(), TrustError> {
    let bad = |e: lzero_crypto::CryptoError| TrustError::BadSignature(e.to_string());
    let key = Ed25519PublicKey::from_hex(&receipt.key).map_err(bad)?;
    let signature = Ed25519Signature::from_hex(&receipt.signature).map_err(bad)?;
    let signed = receipt
        .signed_bytes()
        .map_err(|e| TrustError::Malformed(e.to_string()))?;
    verify_with_public_key(&signed, &signature, &key).map_err(bad)
}

/// Check that `effective` falls within `[from, through]`. An absent
/// `through` leaves the interval open-ended.
pub fn check_key_window(effective: &Timestamp, timeframe: &Timeframe) -> Result<(), TrustError> {
    if effective < &timeframe.from {
        return Err(TrustError::Backdated {
            effective: *effective,
            from: timeframe.from,
        });
    }
    if let Some(through) = &timeframe.through {
        if effective > through {
            return Err(TrustError::Postdated {
                effective: *effective,
                through: *through,
            });
        }
    }
    Ok(())
}
