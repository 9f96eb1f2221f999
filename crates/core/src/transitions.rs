//! Status transition table.
//!
//! Rows are the current status, columns the requested one, both indexed in
//! [`BoletoStatus::ALL`] order. Every transition is currently allowed,
//! including a canceled slip being marked as paid; guards are added by
//! flipping cells here rather than by changing callers.

use crate::models::BoletoStatus;

const TRANSITIONS: [[bool; 4]; 4] = [
    // pending  paid   expired canceled
    [true, true, true, true], // pending
    [true, true, true, true], // paid
    [true, true, true, true], // expired
    [true, true, true, true], // canceled
];

pub fn can_transition(from: BoletoStatus, to: BoletoStatus) -> bool {
    TRANSITIONS[from.index()][to.index()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_transition_is_allowed() {
        for from in BoletoStatus::ALL {
            for to in BoletoStatus::ALL {
                assert!(can_transition(from, to), "{from} -> {to}");
            }
        }
    }
}
