//! # Payment Guard
//!
//! Single-flight guard for credit payments, keyed by sale id.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  click "Pay" ──► try_begin("s1") ──► Some(ticket) ──► PUT /sold/s1/...  │
//! │  click "Pay" ──► try_begin("s1") ──► None ──► PAYMENT_IN_FLIGHT          │
//! │                                                                         │
//! │  ticket dropped (success, error or cancel) ──► "s1" free again         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The ledger itself stays lock-free; two different sales never block each
//! other.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, Default)]
pub struct PaymentGuard {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl PaymentGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `sale_id`. Returns `None` while another payment holds it.
    pub fn try_begin(&self, sale_id: &str) -> Option<PaymentTicket> {
        let mut set = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !set.insert(sale_id.to_string()) {
            return None;
        }
        Some(PaymentTicket {
            in_flight: self.in_flight.clone(),
            sale_id: sale_id.to_string(),
        })
    }

    pub fn is_in_flight(&self, sale_id: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(sale_id)
    }
}

/// Releases its sale id when dropped.
#[derive(Debug)]
pub struct PaymentTicket {
    in_flight: Arc<Mutex<HashSet<String>>>,
    sale_id: String,
}

impl PaymentTicket {
    pub fn sale_id(&self) -> &str {
        &self.sale_id
    }
}

impl Drop for PaymentTicket {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.sale_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_claim_is_refused_until_release() {
        let guard = PaymentGuard::new();
        let ticket = guard.try_begin("s1").unwrap();
        assert!(guard.try_begin("s1").is_none());
        assert!(guard.is_in_flight("s1"));

        drop(ticket);
        assert!(!guard.is_in_flight("s1"));
        assert!(guard.try_begin("s1").is_some());
    }

    #[test]
    fn test_sales_are_independent() {
        let guard = PaymentGuard::new();
        let _a = guard.try_begin("s1").unwrap();
        let b = guard.try_begin("s2");
        assert_eq!(b.as_ref().map(PaymentTicket::sale_id), Some("s2"));
    }

    #[test]
    fn test_clones_share_state() {
        let guard = PaymentGuard::new();
        let _ticket = guard.clone().try_begin("s1").unwrap();
        assert!(guard.try_begin("s1").is_none());
    }
}
