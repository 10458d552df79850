//! Why a checkout was opened

use serde::{Deserialize, Serialize};

/// The flow a checkout session runs in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PledgeReason {
    /// First pledge on the project
    #[default]
    Pledge,
    /// Changing amount or shipping of an existing pledge
    UpdatePledge,
    /// Switching an existing pledge to another reward
    UpdateReward,
    /// Replacing the payment method only
    UpdatePayment,
    /// Retrying a pledge whose payment failed
    FixPledge,
}

impl PledgeReason {
    /// Amounts (bonus, shipping) can be changed in this flow
    pub fn is_editing_amounts(&self) -> bool {
        matches!(
            self,
            PledgeReason::Pledge | PledgeReason::UpdatePledge | PledgeReason::UpdateReward
        )
    }

    /// Only the payment method changes; amounts are fixed by the backing
    pub fn is_payment_only(&self) -> bool {
        matches!(self, PledgeReason::UpdatePayment | PledgeReason::FixPledge)
    }

    /// The flow starts from an existing backing
    pub fn has_backing(&self) -> bool {
        !matches!(self, PledgeReason::Pledge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_groups() {
        assert!(PledgeReason::Pledge.is_editing_amounts());
        assert!(PledgeReason::UpdateReward.is_editing_amounts());
        assert!(!PledgeReason::FixPledge.is_editing_amounts());
        assert!(PledgeReason::UpdatePayment.is_payment_only());
        assert!(!PledgeReason::UpdatePledge.is_payment_only());
        assert!(!PledgeReason::Pledge.has_backing());
        assert!(PledgeReason::FixPledge.has_backing());
    }
}
