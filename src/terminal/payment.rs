//! Payment record.

use crate::clock::Timestamp;
use crate::security::HexDigest;
use crate::terminal::amount::Amount;
use pluto_terminal_macros::RequestFields;

/// Longest card number carried in a payment.
pub const CARD_NUMBER_MAX_LEN: usize = 19;

/// Rendered device MAC (`AA:BB:CC:DD:EE:FF`).
pub type DeviceMac = heapless::String<17>;

/// One transaction attempt.
///
/// Built empty when payment creation starts and filled in by each step. Field
/// order is the request body order; the PIN is only ever held as its hash.
#[derive(Debug, Clone, Default, PartialEq, Eq, RequestFields)]
pub struct Payment {
    /// Decimal amount, e.g. `12.50`
    pub amount: Amount,
    /// Card identifier as read
    #[request(rename = "cardNumber")]
    pub card_number: heapless::String<CARD_NUMBER_MAX_LEN>,
    /// SHA-256 of the PIN digits
    #[request(rename = "pinCode")]
    pub pin_code: HexDigest,
    /// ISO-4217 currency code
    pub currency: &'static str,
    /// Local time of submission
    #[request(rename = "timeStamp")]
    pub time_stamp: Timestamp,
    /// Random single-use token
    pub nonce: HexDigest,
    /// Operation tag
    pub operation: &'static str,
    /// Station MAC address
    #[request(rename = "deviceMacAddress")]
    pub device_mac_address: DeviceMac,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::RequestFields;

    #[test]
    fn test_key_order() {
        assert_eq!(
            Payment::KEYS,
            &[
                "amount",
                "cardNumber",
                "pinCode",
                "currency",
                "timeStamp",
                "nonce",
                "operation",
                "deviceMacAddress"
            ]
        );
    }

    #[test]
    fn test_values_follow_keys() {
        let mut payment = Payment::default();
        let _ = payment.amount.push_str("5");
        let _ = payment.card_number.push_str("42");
        payment.currency = "SEK";
        payment.operation = "send_payment";

        let values = payment.values();
        assert_eq!(values.len(), Payment::KEYS.len());
        assert_eq!(values[0], "5");
        assert_eq!(values[1], "42");
        assert_eq!(values[2], "");
        assert_eq!(values[3], "SEK");
        assert_eq!(values[6], "send_payment");
    }
}
