//! Order lifecycle statuses

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::WorkflowError;

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Assigned,
    Weighing,
    Kitchen,
    Delivery,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Created,
        OrderStatus::Assigned,
        OrderStatus::Weighing,
        OrderStatus::Kitchen,
        OrderStatus::Delivery,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// Status given to every new order
    pub const INITIAL: OrderStatus = OrderStatus::Created;

    /// Stable lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Assigned => "assigned",
            OrderStatus::Weighing => "weighing",
            OrderStatus::Kitchen => "kitchen",
            OrderStatus::Delivery => "delivery",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Terminal statuses have no outgoing edges
    pub fn is_terminal(&self) -> bool {
        match self {
            OrderStatus::Completed | OrderStatus::Cancelled => true,
            OrderStatus::Created
            | OrderStatus::Assigned
            | OrderStatus::Weighing
            | OrderStatus::Kitchen
            | OrderStatus::Delivery => false,
        }
    }

    /// Stages whose first entry time is recorded on the order
    pub fn is_timed_stage(&self) -> bool {
        match self {
            OrderStatus::Weighing | OrderStatus::Kitchen => true,
            OrderStatus::Created
            | OrderStatus::Assigned
            | OrderStatus::Delivery
            | OrderStatus::Completed
            | OrderStatus::Cancelled => false,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| WorkflowError::UnknownStatus(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert_eq!("KITCHEN".parse::<OrderStatus>().unwrap(), OrderStatus::Kitchen);
        assert!("baking".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_terminal_statuses() {
        let terminal: Vec<_> = OrderStatus::ALL.into_iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(terminal, vec![OrderStatus::Completed, OrderStatus::Cancelled]);
        assert!(!OrderStatus::INITIAL.is_terminal());
    }
}
